// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the ViewWindow struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a window onto the complex plane whose lower-left corner sits
//! at an arbitrary point and whose size is set by a scale factor.
use num::Complex;

use crate::errors::RenderError;

/// How much a single zoom magnifies the view.
pub const ZOOM_FACTOR: f64 = 1.5;

/// Describes the x, y of a pixel on the integral plane.  The y axis
/// points up, as it does on the complex plane; see `flip_row` for
/// where that meets the framebuffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub u32, pub u32);

// We don't need a Point, as a single Complex number is a Point.

/// The affine map from the integral plane to the complex plane.
/// `scale` is pixels per unit of the complex plane, and the pixel at
/// 0,0 sits on `min_real + min_imag·i`.  The scale is always
/// positive; the only ways to build a window check it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewWindow {
    min_real: f64,
    min_imag: f64,
    scale: f64,
}

impl ViewWindow {
    /// Constructor.  Fails if the scale is not a positive, finite
    /// number.
    pub fn new(min_real: f64, min_imag: f64, scale: f64) -> Result<ViewWindow, RenderError> {
        if !(scale > 0.0) || !scale.is_finite() {
            return Err(RenderError::InvalidScale(scale));
        }
        Ok(ViewWindow {
            min_real,
            min_imag,
            scale,
        })
    }

    /// The real part of the point under pixel 0,0.
    pub fn min_real(&self) -> f64 {
        self.min_real
    }

    /// The imaginary part of the point under pixel 0,0.
    pub fn min_imag(&self) -> f64 {
        self.min_imag
    }

    /// Pixels per unit of the complex plane.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Given a pixel on the integral cartesian plane, map that to the
    /// point on the complex cartesian plane under its lower-left
    /// corner.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.min_real + (pixel.0 as f64) / self.scale,
            self.min_imag + (pixel.1 as f64) / self.scale,
        )
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, find the pixel that contains it.
    /// Points left of or below the window have no pixel.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = ((point.re - self.min_real) * self.scale).floor();
        let top = ((point.im - self.min_imag) * self.scale).floor();
        let limit = f64::from(u32::max_value());
        if left < 0.0 || top < 0.0 || left > limit || top > limit {
            return None;
        }
        Some(Pixel(left as u32, top as u32))
    }

    /// The window after a click at `x`, `y` on an image of the given
    /// size.  The offset is measured from a fixed third of the image
    /// rather than from its center, and is converted with the old
    /// scale before the scale grows by `ZOOM_FACTOR`.
    pub fn zoomed(&self, x: u32, y: u32, width: u32, height: u32) -> ViewWindow {
        let dx = (x as f64) - f64::from(width / 3);
        let dy = (y as f64) + f64::from(height / 3);
        ViewWindow {
            min_real: self.min_real + dx.floor() / self.scale,
            min_imag: -dy.floor() / self.scale + (height as f64) / self.scale + self.min_imag,
            scale: self.scale * ZOOM_FACTOR,
        }
    }
}

/// The complex plane grows upward but framebuffers grow downward, so
/// pixel row `y` lands on framebuffer row `height - y - 1`.  The same
/// map takes framebuffer rows back to pixel rows.
#[inline]
pub fn flip_row(y: u32, height: u32) -> u32 {
    height - y - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_fails_on_bad_scale() {
        assert_eq!(
            ViewWindow::new(0.0, 0.0, 0.0),
            Err(RenderError::InvalidScale(0.0))
        );
        assert!(ViewWindow::new(0.0, 0.0, -3.0).is_err());
        assert!(ViewWindow::new(0.0, 0.0, std::f64::NAN).is_err());
        assert!(ViewWindow::new(0.0, 0.0, std::f64::INFINITY).is_err());
    }

    #[test]
    fn window_passes_on_good_scale() {
        assert!(ViewWindow::new(-2.0, -2.0, 270.0).is_ok());
    }

    #[test]
    fn pixel_to_point_on_positive_planes() {
        let vw = ViewWindow::new(0.0, 0.0, 1.0).unwrap();
        assert_eq!(vw.pixel_to_point(&Pixel(0, 0)), Complex::new(0.0, 0.0));
        assert_eq!(vw.pixel_to_point(&Pixel(2, 2)), Complex::new(2.0, 2.0));
        assert_eq!(vw.pixel_to_point(&Pixel(4, 3)), Complex::new(4.0, 3.0));
    }

    #[test]
    fn pixel_to_points_on_mixed_planes() {
        let vw = ViewWindow::new(-2.0, -2.0, 1.0).unwrap();
        assert_eq!(vw.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(vw.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(vw.pixel_to_point(&Pixel(4, 4)), Complex::new(2.0, 2.0));
    }

    #[test]
    fn pixel_to_point_honors_scale() {
        let vw = ViewWindow::new(-1.0, -2.0, 4.0).unwrap();
        assert_eq!(vw.pixel_to_point(&Pixel(4, 8)), Complex::new(0.0, 0.0));
        assert_eq!(vw.pixel_to_point(&Pixel(2, 1)), Complex::new(-0.5, -1.75));
    }

    #[test]
    fn point_to_pixel_maps_on_large_mixed_planes() {
        let vw = ViewWindow::new(-2.0, -2.0, 160.0).unwrap();
        assert_eq!(vw.point_to_pixel(&Complex::new(0.0, 0.0)), Some(Pixel(320, 320)));
        assert_eq!(vw.point_to_pixel(&Complex::new(-2.0, -2.0)), Some(Pixel(0, 0)));
        assert_eq!(vw.point_to_pixel(&Complex::new(1.0, 2.0)), Some(Pixel(480, 640)));
        assert_eq!(vw.point_to_pixel(&Complex::new(-2.5, 0.0)), None);
    }

    #[test]
    fn point_to_pixel_inverts_pixel_to_point() {
        let vw = ViewWindow::new(-1.25, -0.5, 8.0).unwrap();
        for p in &[Pixel(0, 0), Pixel(3, 7), Pixel(17, 2)] {
            assert_eq!(vw.point_to_pixel(&vw.pixel_to_point(p)), Some(*p));
        }
    }

    #[test]
    fn zoom_multiplies_scale() {
        let vw = ViewWindow::new(-1.0, -2.0, 270.0).unwrap();
        let zoomed = vw.zoomed(960, 540, 1920, 1080);
        assert_eq!(zoomed.scale(), 405.0);
    }

    #[test]
    fn zoom_offsets_from_fixed_thirds() {
        let vw = ViewWindow::new(-1.0, -2.0, 270.0).unwrap();
        let zoomed = vw.zoomed(640, 0, 1920, 1080);
        assert_eq!(zoomed.min_real(), -1.0);
        // dy = 360, so min_imag = -360/270 + 1080/270 - 2
        assert!((zoomed.min_imag() - (-360.0 / 270.0 + 4.0 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn rows_flip() {
        assert_eq!(flip_row(0, 4), 3);
        assert_eq!(flip_row(3, 4), 0);
        assert_eq!(flip_row(flip_row(1, 4), 4), 1);
    }
}
