use crate::GROUP_COUNT;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear RGB color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert from HSV, every component in [0, 1]
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = if h < 1.0 {
            (c, x, 0.0)
        } else if h < 2.0 {
            (x, c, 0.0)
        } else if h < 3.0 {
            (0.0, c, x)
        } else if h < 4.0 {
            (0.0, x, c)
        } else if h < 5.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        Self::rgb(r + m, g + m, b + m)
    }

    /// HSV value (brightness) of this color
    pub fn value(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// 8-bit channels, clamped
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

/// Four primary colors, one per color group, each with a paired indicator color
/// used for borders, dots and labels drawn on top of it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayColors {
    pub primary: [Color; GROUP_COUNT],
    pub indicator: [Color; GROUP_COUNT],
}

impl DisplayColors {
    /// Pick a base hue and spread the groups a quarter turn apart.
    ///
    /// Indicators sit half a turn from their primary and 0.2 to 0.4 darker, so
    /// they stay distinguishable without relying on hue alone.
    pub fn assign<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let hue: f32 = rng.gen_range(0.0..1.0);

        let primary: [Color; GROUP_COUNT] = std::array::from_fn(|i| {
            let offset = 0.25 * i as f32;
            Color::from_hsv(
                (hue + offset) % 1.0,
                rng.gen_range(0.5..=1.0),
                rng.gen_range(0.7..=1.0),
            )
        });

        let indicator = std::array::from_fn(|i| {
            let offset = 0.5 + 0.25 * i as f32;
            let v = primary[i].value();
            Color::from_hsv(
                (hue + offset) % 1.0,
                rng.gen_range(0.3..=0.8),
                rng.gen_range((v - 0.4)..=(v - 0.2)),
            )
        });

        Self { primary, indicator }
    }

    /// Log form: `(0: #AABBCC) (1: ...)`
    pub fn describe(&self) -> String {
        self.primary
            .iter()
            .enumerate()
            .map(|(i, c)| format!("({}: {})", i, c))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
