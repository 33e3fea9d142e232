use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{MixError, Result};

// -----------------------------------------------------------------------------
// Colors
// -----------------------------------------------------------------------------

/// 8-bit sRGB color. Serializes as a `#rrggbb` string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Result of mixing nothing at all.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn from_array(rgb: [u8; 3]) -> Self {
        Self { r: rgb[0], g: rgb[1], b: rgb[2] }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `rgb` (case-insensitive).
impl FromStr for Rgb {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MixError::InvalidHex(s.to_string());
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Rgb {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            3 => {
                // #abc -> #aabbcc
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Rgb { r: short(0)?, g: short(1)?, b: short(2)? })
            }
            _ => Err(invalid()),
        }
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for Rgb {
    type Error = MixError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// -----------------------------------------------------------------------------
// Palette
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PigmentId(pub u64);

impl fmt::Display for PigmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A base paint the user owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PigmentColor {
    pub id: PigmentId,
    pub color: Rgb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PigmentColor {
    pub fn new(id: u64, color: Rgb) -> Self {
        Self { id: PigmentId(id), color, name: None }
    }

    pub fn named(id: u64, color: Rgb, name: impl Into<String>) -> Self {
        Self { id: PigmentId(id), color, name: Some(name.into()) }
    }
}

/// Ordered set of pigments, unique by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pigments: Vec<PigmentColor>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Red, blue and yellow: the palette a fresh install starts with.
    pub fn primaries() -> Self {
        Self {
            pigments: vec![
                PigmentColor::named(1, Rgb::new(0xff, 0x00, 0x00), "Red"),
                PigmentColor::named(2, Rgb::new(0x00, 0x00, 0xff), "Blue"),
                PigmentColor::named(3, Rgb::new(0xff, 0xff, 0x00), "Yellow"),
            ],
        }
    }

    /// Build a palette from hex strings, numbering ids from 1.
    pub fn from_hex<S: AsRef<str>>(hexes: &[S]) -> Result<Self> {
        let mut palette = Self::new();
        for (i, hex) in hexes.iter().enumerate() {
            palette.add(PigmentColor::new(i as u64 + 1, hex.as_ref().parse()?))?;
        }
        Ok(palette)
    }

    pub fn add(&mut self, pigment: PigmentColor) -> Result<()> {
        if self.contains(pigment.id) {
            return Err(MixError::DuplicatePigment(pigment.id));
        }
        self.pigments.push(pigment);
        Ok(())
    }

    pub fn remove(&mut self, id: PigmentId) -> Result<PigmentColor> {
        let idx = self
            .pigments
            .iter()
            .position(|p| p.id == id)
            .ok_or(MixError::UnknownPigment(id))?;
        Ok(self.pigments.remove(idx))
    }

    pub fn contains(&self, id: PigmentId) -> bool {
        self.pigments.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: PigmentId) -> Option<&PigmentColor> {
        self.pigments.iter().find(|p| p.id == id)
    }

    pub fn pigments(&self) -> &[PigmentColor] {
        &self.pigments
    }

    pub fn len(&self) -> usize {
        self.pigments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pigments.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Recipes
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeEntry {
    pub pigment: PigmentId,
    pub color: Rgb,
    pub parts: u32,
}

/// One entry per palette pigment, in palette order. Zero parts means unused.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    entries: Vec<RecipeEntry>,
}

impl Recipe {
    /// Pair a palette snapshot with a parts vector of the same length.
    pub(crate) fn from_parts(pigments: &[PigmentColor], parts: &[u32]) -> Self {
        debug_assert_eq!(pigments.len(), parts.len());
        let entries = pigments
            .iter()
            .zip(parts)
            .map(|(p, &parts)| RecipeEntry { pigment: p.id, color: p.color, parts })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RecipeEntry] {
        &self.entries
    }

    pub fn total_parts(&self) -> u32 {
        self.entries.iter().map(|e| e.parts).sum()
    }

    pub fn parts_of(&self, id: PigmentId) -> Option<u32> {
        self.entries.iter().find(|e| e.pigment == id).map(|e| e.parts)
    }

    pub fn is_empty(&self) -> bool {
        self.total_parts() == 0
    }

    /// Human-friendly form: unused pigments dropped, ratios reduced by their GCD
    /// (6:3:0 becomes 2:1).
    pub fn normalized(&self) -> Recipe {
        let active: Vec<RecipeEntry> = self.entries.iter().copied().filter(|e| e.parts > 0).collect();
        let divisor = active.iter().fold(0, |acc, e| gcd(acc, e.parts)).max(1);
        Recipe {
            entries: active
                .into_iter()
                .map(|e| RecipeEntry { parts: e.parts / divisor, ..e })
                .collect(),
        }
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

// -----------------------------------------------------------------------------
// Modes
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    /// Small recipes (≤ 10 parts), stops at a perfect match.
    #[default]
    Normal,
    /// Deep search: up to 1000 parts, explores more, keeps simplifying forever.
    Precision,
}

impl SearchMode {
    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Normal => "Normal",
            SearchMode::Precision => "Precision",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#3b82f6".parse::<Rgb>().unwrap(), Rgb::new(0x3b, 0x82, 0xf6));
        assert_eq!("3B82F6".parse::<Rgb>().unwrap(), Rgb::new(0x3b, 0x82, 0xf6));
        assert_eq!("#f0a".parse::<Rgb>().unwrap(), Rgb::new(0xff, 0x00, 0xaa));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#", "#12345", "#1234567", "#gg0000", "#+12345", "red"] {
            assert!(
                matches!(bad.parse::<Rgb>(), Err(MixError::InvalidHex(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn hex_display_round_trips_through_serde() {
        let c = Rgb::new(0x0a, 0xbc, 0xff);
        assert_eq!(c.to_string(), "#0abcff");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#0abcff\"");
        assert_eq!(serde_json::from_str::<Rgb>(&json).unwrap(), c);
        assert!(serde_json::from_str::<Rgb>("\"#nothex\"").is_err());
    }

    #[test]
    fn palette_ids_are_unique() {
        let mut palette = Palette::primaries();
        let err = palette.add(PigmentColor::new(2, Rgb::BLACK)).unwrap_err();
        assert!(matches!(err, MixError::DuplicatePigment(PigmentId(2))));
        assert_eq!(palette.len(), 3);

        palette.add(PigmentColor::new(4, Rgb::BLACK)).unwrap();
        assert_eq!(palette.len(), 4);
    }

    #[test]
    fn palette_remove_unknown_is_an_error() {
        let mut palette = Palette::primaries();
        assert_eq!(palette.remove(PigmentId(1)).unwrap().color, Rgb::new(255, 0, 0));
        assert!(matches!(palette.remove(PigmentId(1)), Err(MixError::UnknownPigment(_))));
        assert!(!palette.contains(PigmentId(1)));
    }

    #[test]
    fn palette_from_hex_validates_every_entry() {
        assert_eq!(Palette::from_hex(&["#ff0000", "#00f"]).unwrap().len(), 2);
        assert!(Palette::from_hex(&["#ff0000", "oops"]).is_err());
    }

    #[test]
    fn total_parts_sums_entries() {
        let palette = Palette::primaries();
        let recipe = Recipe::from_parts(palette.pigments(), &[2, 0, 5]);
        assert_eq!(recipe.total_parts(), 7);
        assert_eq!(recipe.parts_of(PigmentId(3)), Some(5));
        assert_eq!(recipe.parts_of(PigmentId(9)), None);
        assert!(!recipe.is_empty());
    }

    #[test]
    fn normalized_reduces_by_gcd_and_drops_unused() {
        let palette = Palette::primaries();
        let recipe = Recipe::from_parts(palette.pigments(), &[6, 0, 3]);
        let display = recipe.normalized();
        let parts: Vec<(u64, u32)> = display.entries().iter().map(|e| (e.pigment.0, e.parts)).collect();
        assert_eq!(parts, vec![(1, 2), (3, 1)]);

        let coprime = Recipe::from_parts(palette.pigments(), &[3, 2, 0]).normalized();
        assert_eq!(coprime.total_parts(), 5);

        let empty = Recipe::from_parts(palette.pigments(), &[0, 0, 0]).normalized();
        assert!(empty.entries().is_empty());
    }
}
