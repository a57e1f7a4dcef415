// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps escape counts to colors.  The hue cycles slowly with the
//! count, saturation stays pinned, and brightness climbs toward white
//! as the count grows, so neighboring bands stay distinguishable while
//! the slow escapers near the boundary glow.

use num::clamp;

/// Packed `0x00RRGGBB` pixel, as stored in the framebuffer.
pub type Rgb = u32;

/// The color given to points that never escape.
pub const INSIDE: Rgb = 0x00_00_00;

/// One color for each escape count below the iteration bound.  Built
/// once per bound and never changed while a pass is reading it.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Builds the palette for `max_iterations`.  The same bound always
    /// produces the same palette.
    pub fn new(max_iterations: u32) -> Palette {
        let colors = (0..max_iterations)
            .map(|i| {
                let i = i as f32;
                hsb_to_rgb(i / 256.0, 1.0, i / (i + 8.0))
            })
            .collect();
        Palette { colors }
    }

    /// The iteration bound this palette was built for.
    pub fn max_iterations(&self) -> u32 {
        self.colors.len() as u32
    }

    /// Number of colors in the palette.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True only for the palette of a zero bound.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color of a point that escaped after `iterations` steps.
    /// Points that reached the bound are inside the set and are
    /// painted `INSIDE`.
    #[inline]
    pub fn color(&self, iterations: u32) -> Rgb {
        match self.colors.get(iterations as usize) {
            Some(rgb) => *rgb,
            None => INSIDE,
        }
    }

    /// The colors, in escape-count order.
    pub fn as_slice(&self) -> &[Rgb] {
        &self.colors
    }
}

/// Hexcone conversion from hue, saturation and brightness to a packed
/// RGB value.  Only the fractional part of the hue matters.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
    let channel = |v: f32| -> u32 { clamp(v * 255.0 + 0.5, 0.0, 255.0) as u32 };
    let (r, g, b) = if saturation == 0.0 {
        (brightness, brightness, brightness)
    } else {
        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));
        match h as u32 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        }
    };
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Splits a packed pixel into its red, green and blue bytes.
#[inline]
pub fn channels(rgb: Rgb) -> [u8; 3] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]
}
