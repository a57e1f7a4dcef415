// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time test at the heart of the Mandelbrot set.

use num::Complex;

/// The squared radius past which an orbit is known to run off to
/// infinity.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// This is our classic iterator function.  Starting from zero, it
/// repeatedly squares `z` and adds `c`, and returns the number of
/// iterations it took for `z` to leave the circle of radius two.  If
/// the orbit never leaves, the return value is `max_iterations`, which
/// callers treat as "inside the set."
///
/// The square is multiplied out by hand, rather than going through
/// `Complex`'s `Mul`, so the arithmetic on each step is exactly the
/// five multiplies and adds it appears to be.
pub fn escape_time(c: Complex<f64>, max_iterations: u32) -> u32 {
    let (mut zr, mut zi) = (0.0_f64, 0.0_f64);
    let mut iteration = 0;
    while zr * zr + zi * zi < ESCAPE_RADIUS_SQR && iteration < max_iterations {
        let cross = zr * zi;
        zr = zr * zr - zi * zi + c.re;
        zi = 2.0 * cross + c.im;
        iteration += 1;
    }
    iteration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for limit in &[0, 1, 50, 1000] {
            assert_eq!(escape_time(Complex::new(0.0, 0.0), *limit), *limit);
        }
    }

    #[test]
    fn two_escapes_on_the_first_step() {
        assert_eq!(escape_time(Complex::new(2.0, 0.0), 50), 1);
        assert_eq!(escape_time(Complex::new(2.0, 0.0), 1), 1);
    }

    #[test]
    fn zero_bound_does_no_work() {
        assert_eq!(escape_time(Complex::new(5.0, 5.0), 0), 0);
    }

    #[test]
    fn far_points_escape_quickly() {
        assert_eq!(escape_time(Complex::new(3.0, 3.0), 100), 1);
        assert!(escape_time(Complex::new(0.5, 0.5), 100) < 10);
    }

    #[test]
    fn period_two_bulb_is_inside() {
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 500), 500);
        assert_eq!(escape_time(Complex::new(-0.1, 0.1), 500), 500);
    }

    #[test]
    fn matches_complex_multiplication() {
        let c = Complex::new(-0.75, 0.1);
        let mut z = Complex::new(0.0, 0.0);
        let mut expected = 0;
        while z.norm_sqr() < 4.0 && expected < 200 {
            z = z * z + c;
            expected += 1;
        }
        assert_eq!(escape_time(c, 200), expected);
    }
}
