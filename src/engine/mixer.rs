//! Pigment mixing.
//!
//! Paint does not mix like light: blue and yellow make green, not gray. The
//! mixer therefore never averages RGB. Each pigment is encoded into a
//! 7-component latent vector by a [`PigmentModel`], the latents are weighted by
//! their share of the total parts, and the sum is decoded back to sRGB.

use std::sync::Arc;

use super::{PigmentColor, Rgb};

pub const LATENT_SIZE: usize = 7;
pub type Latent = [f32; LATENT_SIZE];

/// Anything below this many parts counts as "no pigment".
const MIN_TOTAL_PARTS: f64 = 1e-6;

/// Latent-space pigment model. Implementations must be pure: the same input
/// always yields the same output.
pub trait PigmentModel: Send + Sync {
    fn to_latent(&self, color: Rgb) -> Latent;

    fn from_latent(&self, latent: &Latent) -> Rgb;

    /// Name for logs.
    fn name(&self) -> &str;
}

/// Kubelka–Munk based model from the `mixbox` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mixbox;

impl PigmentModel for Mixbox {
    fn to_latent(&self, color: Rgb) -> Latent {
        mixbox::rgb_to_latent(&color.to_array())
    }

    fn from_latent(&self, latent: &Latent) -> Rgb {
        Rgb::from_array(mixbox::latent_to_rgb(latent))
    }

    fn name(&self) -> &str {
        "mixbox"
    }
}

/// Weighted latent sum over `(latent, parts)` pairs. `None` when there is no pigment.
fn blend_latents<'a, I>(items: I) -> Option<Latent>
where
    I: IntoIterator<Item = (&'a Latent, f64)> + Clone,
{
    let total: f64 = items.clone().into_iter().map(|(_, parts)| parts).sum();
    if total <= MIN_TOTAL_PARTS {
        return None;
    }

    let mut acc = [0.0f64; LATENT_SIZE];
    for (latent, parts) in items {
        if parts <= MIN_TOTAL_PARTS {
            continue;
        }
        let ratio = parts / total;
        for (a, &z) in acc.iter_mut().zip(latent.iter()) {
            *a += z as f64 * ratio;
        }
    }
    Some(acc.map(|a| a as f32))
}

/// Mix `(color, parts)` pairs.
///
/// Returns [`Rgb::BLACK`] when the total is zero: an empty recipe has no
/// color, and black is the sentinel for it.
pub fn mix(model: &dyn PigmentModel, recipe: &[(Rgb, u32)]) -> Rgb {
    let latents: Vec<(Latent, f64)> = recipe
        .iter()
        .filter(|(_, parts)| *parts > 0)
        .map(|&(color, parts)| (model.to_latent(color), parts as f64))
        .collect();

    match blend_latents(latents.iter().map(|(z, p)| (z, *p))) {
        Some(latent) => model.from_latent(&latent),
        None => Rgb::BLACK,
    }
}

/// Mixer bound to one palette snapshot. Latents are encoded once up front,
/// so each trial only pays for a weighted sum and one decode.
#[derive(Clone)]
pub struct PaletteMixer {
    model: Arc<dyn PigmentModel>,
    latents: Vec<Latent>,
}

impl PaletteMixer {
    pub fn new(model: Arc<dyn PigmentModel>, pigments: &[PigmentColor]) -> Self {
        let latents = pigments.iter().map(|p| model.to_latent(p.color)).collect();
        Self { model, latents }
    }

    pub fn len(&self) -> usize {
        self.latents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latents.is_empty()
    }

    /// Mix a parts vector aligned with the palette snapshot.
    pub fn mix_parts(&self, parts: &[u32]) -> Rgb {
        debug_assert_eq!(parts.len(), self.latents.len());
        let items = self.latents.iter().zip(parts.iter().map(|&p| p as f64));
        match blend_latents(items) {
            Some(latent) => self.model.from_latent(&latent),
            None => Rgb::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Palette;

    fn hex(s: &str) -> Rgb {
        s.parse().unwrap()
    }

    fn close(a: Rgb, b: Rgb) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs();
        d(a.r, b.r) <= 1 && d(a.g, b.g) <= 1 && d(a.b, b.b) <= 1
    }

    #[test]
    fn single_pigment_mixes_to_itself() {
        for c in ["#ff0000", "#0000ff", "#ffff00", "#3b82f6", "#ffffff"] {
            for parts in [1, 5, 40] {
                let mixed = mix(&Mixbox, &[(hex(c), parts)]);
                assert!(close(mixed, hex(c)), "{c} x{parts} -> {mixed}");
            }
        }
    }

    #[test]
    fn unused_pigments_do_not_affect_the_mix() {
        let alone = mix(&Mixbox, &[(hex("#ff0000"), 5)]);
        let with_unused = mix(&Mixbox, &[(hex("#ff0000"), 5), (hex("#0000ff"), 0)]);
        assert_eq!(alone, with_unused);
    }

    #[test]
    fn empty_recipe_is_the_black_sentinel() {
        assert_eq!(mix(&Mixbox, &[]), Rgb::BLACK);
        assert_eq!(mix(&Mixbox, &[(hex("#ff0000"), 0), (hex("#ffff00"), 0)]), Rgb::BLACK);
    }

    #[test]
    fn blue_and_yellow_make_green_not_gray() {
        let mixed = mix(&Mixbox, &[(hex("#0000ff"), 1), (hex("#ffff00"), 1)]);
        // Plain RGB averaging would give (128, 128, 128)
        assert!(mixed.g > mixed.r, "{mixed}");
        assert_ne!(mixed, Rgb::new(128, 128, 128));
    }

    #[test]
    fn only_ratios_matter() {
        let a = mix(&Mixbox, &[(hex("#ff0000"), 1), (hex("#0000ff"), 2)]);
        let b = mix(&Mixbox, &[(hex("#ff0000"), 3), (hex("#0000ff"), 6)]);
        assert!(close(a, b), "{a} vs {b}");
    }

    #[test]
    fn mixing_is_deterministic() {
        let recipe = [(hex("#ff0000"), 3), (hex("#0000ff"), 4), (hex("#ffff00"), 1)];
        let first = mix(&Mixbox, &recipe);
        for _ in 0..10 {
            assert_eq!(mix(&Mixbox, &recipe), first);
        }
    }

    #[test]
    fn palette_mixer_agrees_with_free_function() {
        let palette = Palette::primaries();
        let mixer = PaletteMixer::new(Arc::new(Mixbox), palette.pigments());
        assert_eq!(mixer.len(), 3);

        let parts = [2, 5, 1];
        let pairs: Vec<(Rgb, u32)> = palette
            .pigments()
            .iter()
            .zip(parts)
            .map(|(p, n)| (p.color, n))
            .collect();
        assert!(close(mixer.mix_parts(&parts), mix(&Mixbox, &pairs)));
        assert_eq!(mixer.mix_parts(&[0, 0, 0]), Rgb::BLACK);
    }
}
