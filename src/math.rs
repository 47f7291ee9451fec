//! Math utilities.

use crate::error::{RrlError, RrlResult};
use num::complex::Complex64;

/// 2/sqrt(pi).
const TWO_OVER_SQRT_PI: f64 = 1.128_379_167_095_512_6;

/// Evaluates the Faddeeva function w(z) = exp(-z^2) erfc(-iz).
///
/// Uses the region algorithm of Poppe & Wijers (1990): a power series
/// around the origin, a truncated Taylor expansion at intermediate radii
/// and the Laplace continued fraction far from the origin. The relative
/// accuracy is 1e-13 or better in the upper half plane, which is the
/// domain the Voigt profile evaluates on.
pub fn faddeeva(z: Complex64) -> Complex64 {
    if z.im < 0.0 {
        // w(z) = 2 exp(-z^2) - conj(w(conj(z))) continues the result into
        // the lower half plane.
        let w = faddeeva(z.conj());
        return 2.0 * (-z * z).exp() - w.conj();
    }

    let xabs = z.re.abs();
    let yabs = z.im;

    let x = xabs / 6.3;
    let y = yabs / 4.4;
    let qrho = x * x + y * y;

    let xquad = xabs * xabs - yabs * yabs;
    let yquad = 2.0 * xabs * yabs;

    let (u, mut v);
    if qrho < 0.085264 {
        // Power series truncated after an order chosen from |z|.
        let qrho = (1.0 - 0.85 * y) * qrho.sqrt();
        let n = (6.0 + 72.0 * qrho).round() as i32;

        let mut j = 2 * n + 1;
        let mut xsum = 1.0 / f64::from(j);
        let mut ysum = 0.0;
        for i in (1..=n).rev() {
            j -= 2;
            let xaux = (xsum * xquad - ysum * yquad) / f64::from(i);
            ysum = (xsum * yquad + ysum * xquad) / f64::from(i);
            xsum = xaux + 1.0 / f64::from(j);
        }
        let u1 = -TWO_OVER_SQRT_PI * (xsum * yabs + ysum * xabs) + 1.0;
        let v1 = TWO_OVER_SQRT_PI * (xsum * xabs - ysum * yabs);
        let daux = (-xquad).exp();
        let u2 = daux * yquad.cos();
        let v2 = -daux * yquad.sin();

        u = u1 * u2 - v1 * v2;
        v = u1 * v2 + v1 * u2;
    } else {
        let (h, kapn, nu) = if qrho > 1.0 {
            // Laplace continued fraction.
            let qrho = qrho.sqrt();
            (0.0, 0, (3.0 + 1442.0 / (26.0 * qrho + 77.0)) as i32)
        } else {
            // Truncated Taylor expansion, with the expansion parameter h
            // and the truncation orders kapn and nu chosen from |z|.
            let qrho = (1.0 - y) * (1.0 - qrho).sqrt();
            let h = 1.88 * qrho;
            (
                h,
                (7.0 + 34.0 * qrho).round() as i32,
                (16.0 + 26.0 * qrho).round() as i32,
            )
        };
        let h2 = 2.0 * h;
        let with_taylor = h > 0.0;

        let mut qlambda = if with_taylor { h2.powi(kapn) } else { 0.0 };
        let (mut rx, mut ry, mut sx, mut sy) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
        for n in (0..=nu).rev() {
            let np1 = f64::from(n + 1);
            let tx = yabs + h + np1 * rx;
            let ty = xabs - np1 * ry;
            let c = 0.5 / (tx * tx + ty * ty);
            rx = c * tx;
            ry = c * ty;
            if with_taylor && n <= kapn {
                let tx = qlambda + sx;
                sx = rx * tx - ry * sy;
                sy = ry * tx + rx * sy;
                qlambda /= h2;
            }
        }

        if with_taylor {
            u = TWO_OVER_SQRT_PI * sx;
            v = TWO_OVER_SQRT_PI * sy;
        } else {
            u = TWO_OVER_SQRT_PI * rx;
            v = TWO_OVER_SQRT_PI * ry;
        }
        if yabs == 0.0 {
            return Complex64::new(
                (-xabs * xabs).exp(),
                if z.re < 0.0 { -v } else { v },
            );
        }
    }

    // w(-conj(z)) = conj(w(z)) maps the result back to negative Re(z).
    if z.re < 0.0 {
        v = -v;
    }
    Complex64::new(u, v)
}

/// Evaluates Re[w(x + iy)], the real part of the Faddeeva function.
///
/// This is the kernel of the Voigt profile.
pub fn faddeeva_real(x: f64, y: f64) -> f64 {
    faddeeva(Complex64::new(x, y)).re
}

/// Linearly interpolates tabulated values at the given abscissa.
///
/// The abscissas `xp` must be strictly increasing. Arguments outside the
/// tabulated range are an error rather than being extrapolated; `name`
/// identifies the offending quantity in the error. Exact grid points are
/// returned without interpolation round-off.
pub fn interp_linear(x: f64, xp: &[f64], yp: &[f64], name: &'static str) -> RrlResult<f64> {
    assert_eq!(
        xp.len(),
        yp.len(),
        "Tabulated abscissas and values differ in length"
    );
    let (min, max) = (xp[0], xp[xp.len() - 1]);
    if x < min || x > max {
        return Err(RrlError::OutOfDomain {
            name,
            value: x,
            min,
            max,
        });
    }

    let i = xp.partition_point(|&xk| xk < x);
    if xp[i] == x {
        return Ok(yp[i]);
    }
    let t = (x - xp[i - 1]) / (xp[i] - xp[i - 1]);
    Ok(yp[i - 1] + t * (yp[i] - yp[i - 1]))
}
