// -----------------------------------------------------------------------------
// Perceptual color model: sRGB -> XYZ (D65) -> CIE Lab, CIE94 distance
// -----------------------------------------------------------------------------
use std::fmt;

use palette::{white_point::D65, FromColor, Lab as CieLab, LinSrgb, Srgb, Xyz};
use serde::{Deserialize, Serialize};

use super::Rgb;

// CIE94 graphic-arts weights
const K1: f64 = 0.045;
const K2: f64 = 0.015;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    #[inline]
    pub fn chroma(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

impl From<CieLab<D65, f64>> for Lab {
    fn from(lab: CieLab<D65, f64>) -> Self {
        Self { l: lab.l, a: lab.a, b: lab.b }
    }
}

impl fmt::Display for Lab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L:{:.1} a:{:.1} b:{:.1}", self.l, self.a, self.b)
    }
}

#[inline]
fn linear(c: Rgb) -> LinSrgb<f64> {
    Srgb::new(c.r, c.g, c.b).into_format::<f64>().into_linear()
}

/// XYZ tristimulus values (D65) on the 0..100 scale.
pub fn to_xyz(c: Rgb) -> [f64; 3] {
    let xyz = Xyz::<D65, f64>::from_color(linear(c));
    [xyz.x * 100.0, xyz.y * 100.0, xyz.z * 100.0]
}

/// Convert an sRGB color into CIE Lab (D65).
pub fn to_lab(c: Rgb) -> Lab {
    CieLab::<D65, f64>::from_color(linear(c)).into()
}

/// CIE94 color difference. Not symmetric: the chroma weights come from `reference`.
pub fn delta_e94(reference: &Lab, other: &Lab) -> f64 {
    let c1 = reference.chroma();
    let c2 = other.chroma();
    let sc = 1.0 + K1 * c1;
    let sh = 1.0 + K2 * c1;

    let dl = reference.l - other.l;
    let da = reference.a - other.a;
    let db = reference.b - other.b;
    let dc = c1 - c2;
    // cancellation can push this slightly below zero
    let dh = (da * da + db * db - dc * dc).max(0.0).sqrt();

    let l = dl;
    let c = dc / sc;
    let h = dh / sh;
    (l * l + c * c + h * h).sqrt()
}

/// Match score in [0, 100] between two Lab colors; 100 means identical.
#[inline]
pub fn similarity_lab(a: &Lab, b: &Lab) -> f64 {
    (100.0 - delta_e94(a, b)).max(0.0)
}

/// Match score in [0, 100] between two colors. `a` is the candidate, `b` the target.
pub fn similarity(a: Rgb, b: Rgb) -> f64 {
    similarity_lab(&to_lab(a), &to_lab(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Rgb {
        s.parse().unwrap()
    }

    #[test]
    fn white_and_black_hit_lab_extremes() {
        let white = to_lab(hex("#ffffff"));
        assert!((white.l - 100.0).abs() < 1e-3, "L = {}", white.l);
        assert!(white.a.abs() < 1e-2 && white.b.abs() < 1e-2);

        let black = to_lab(Rgb::BLACK);
        assert!(black.l.abs() < 1e-9);
    }

    #[test]
    fn known_lab_value_for_pure_red() {
        let red = to_lab(hex("#ff0000"));
        assert!((red.l - 53.24).abs() < 0.1, "{red}");
        assert!((red.a - 80.09).abs() < 0.1, "{red}");
        assert!((red.b - 67.20).abs() < 0.1, "{red}");
    }

    #[test]
    fn white_xyz_is_the_d65_reference() {
        let [x, y, z] = to_xyz(hex("#ffffff"));
        assert!((x - 95.047).abs() < 0.05, "{x}");
        assert!((y - 100.0).abs() < 1e-3, "{y}");
        assert!((z - 108.883).abs() < 0.05, "{z}");
    }

    #[test]
    fn identical_colors_score_100() {
        assert_eq!(similarity(hex("#3b82f6"), hex("#3b82f6")), 100.0);
        assert_eq!(similarity(Rgb::BLACK, Rgb::BLACK), 100.0);
    }

    #[test]
    fn opposite_colors_clamp_at_zero() {
        // ΔE94 between black and white is exactly 100; farther pairs must clamp.
        let s = similarity(Rgb::BLACK, hex("#ffffff"));
        assert!((0.0..1e-3).contains(&s), "{s}");
        assert!(similarity(hex("#00ff00"), hex("#ff00ff")) >= 0.0);
    }

    #[test]
    fn closer_colors_score_higher() {
        let target = hex("#3b82f6");
        let near = similarity(hex("#3c83f5"), target);
        let far = similarity(hex("#f6823b"), target);
        assert!(near > 99.0, "{near}");
        assert!(far < near);
    }

    #[test]
    fn achromatic_hue_term_never_goes_nan() {
        // zero chroma on both sides: da² + db² - dc² is ~0 and may round negative
        for v in [0u8, 1, 17, 128, 254, 255] {
            for w in [0u8, 3, 200] {
                let s = similarity(Rgb::new(v, v, v), Rgb::new(w, w, w));
                assert!(s.is_finite());
            }
        }
    }

    #[test]
    fn lab_display_is_compact() {
        let lab = Lab { l: 53.2408, a: 80.0925, b: 67.2032 };
        assert_eq!(lab.to_string(), "L:53.2 a:80.1 b:67.2");
    }
}
