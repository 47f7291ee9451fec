//! Gaussian, Lorentzian and Voigt line-shape algebra.
//!
//! A profile is described interchangeably by its shape parameters
//! (standard deviation `sigma` of the Gaussian core, HWHM `gamma` of the
//! Lorentzian wings), its FWHM, its peak value or its integrated area.
//! The conversions between these representations are closed forms, some
//! exact and some published approximations; each approximation documents
//! its systematic error and every conversion with a meaningful
//! measurement uncertainty has a paired `_err` variant propagating it.

use crate::error::{RrlError, RrlResult};
use crate::math::faddeeva_real;
use std::f64::consts::{LN_10, LN_2, PI};

// Coefficients of the Olivero & Longbothum Voigt FWHM approximation.
const VOIGT_FWHM_A: f64 = 0.5346;
const VOIGT_FWHM_B: f64 = 0.2166;

/// Evaluates a Gaussian with the given peak amplitude.
pub fn gaussian(x: f64, sigma: f64, center: f64, amplitude: f64) -> f64 {
    amplitude * f64::exp(-f64::powi(x - center, 2) / (2.0 * sigma * sigma))
}

/// Evaluates a Gaussian normalized to unit area.
pub fn normalized_gaussian(x: f64, sigma: f64, center: f64) -> f64 {
    f64::exp(-0.5 * f64::powi((x - center) / sigma, 2)) / (sigma * f64::sqrt(2.0 * PI))
}

/// Evaluates a Voigt profile with the given area.
///
/// `sigma` is the standard deviation of the Gaussian core and `gamma`
/// the HWHM of the Lorentzian wings. The profile reduces to a Gaussian
/// as `gamma -> 0` and to a Lorentzian as `sigma -> 0`.
pub fn voigt(x: f64, sigma: f64, gamma: f64, center: f64, amplitude: f64) -> f64 {
    let f = f64::sqrt(LN_2);
    let rx = (x - center) / sigma * f;
    let ry = gamma / sigma * f;

    amplitude * f / (sigma * f64::sqrt(PI)) * faddeeva_real(rx, ry)
}

/// Converts the standard deviation of a Gaussian to its FWHM.
pub fn sigma2fwhm(sigma: f64) -> f64 {
    sigma * 2.0 * f64::sqrt(2.0 * LN_2)
}

/// Propagates an uncertainty on sigma to the FWHM.
pub fn sigma2fwhm_err(sigma_err: f64) -> f64 {
    sigma_err * 2.0 * f64::sqrt(2.0 * LN_2)
}

/// Converts the FWHM of a Gaussian to its standard deviation.
pub fn fwhm2sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * f64::sqrt(2.0 * LN_2))
}

/// Propagates an uncertainty on the FWHM to sigma.
pub fn fwhm2sigma_err(fwhm_err: f64) -> f64 {
    fwhm_err / (2.0 * f64::sqrt(2.0 * LN_2))
}

/// Converts the standard deviation of a Gaussian to its full width at a
/// tenth of the maximum.
pub fn sigma2fwtm(sigma: f64) -> f64 {
    sigma * 2.0 * f64::sqrt(2.0 * LN_10)
}

/// Propagates an uncertainty on sigma to the full width at a tenth of
/// the maximum.
pub fn sigma2fwtm_err(sigma_err: f64) -> f64 {
    sigma_err * 2.0 * f64::sqrt(2.0 * LN_10)
}

/// Computes the FWHM of a Voigt profile from the FWHM of its Gaussian
/// core `dd` and of its Lorentzian wings `dl`.
///
/// Closed-form approximation with a systematic error of about 0.02%.
pub fn voigt_fwhm(dd: f64, dl: f64) -> f64 {
    VOIGT_FWHM_A * dl + f64::sqrt(VOIGT_FWHM_B * dl * dl + dd * dd)
}

/// Propagates the width uncertainties to the Voigt FWHM, including the
/// 0.02% systematic error of the approximation itself.
pub fn voigt_fwhm_err(dd: f64, dl: f64, dd_err: f64, dl_err: f64) -> f64 {
    let f = 0.02 / 100.0;
    let root = f64::sqrt(VOIGT_FWHM_B * dl * dl + dd * dd);

    let dt1 = f64::powi((VOIGT_FWHM_A + VOIGT_FWHM_B * dl / root) * dl_err, 2);
    let dt2 = f64::powi(dd * dd_err / root, 2);

    f64::sqrt(dt1 + dt2 + f64::powi(f * voigt_fwhm(dd, dl), 2))
}

/// Returns the area under a Gaussian of the given peak amplitude.
pub fn gauss_area(amplitude: f64, sigma: f64) -> f64 {
    amplitude * sigma * f64::sqrt(2.0 * PI)
}

/// Propagates uncorrelated uncertainties on amplitude and sigma to the
/// Gaussian area.
pub fn gauss_area_err(amplitude: f64, amplitude_err: f64, sigma: f64, sigma_err: f64) -> f64 {
    let err1 = f64::powi(amplitude_err * sigma * f64::sqrt(2.0 * PI), 2);
    let err2 = f64::powi(sigma_err * amplitude * f64::sqrt(2.0 * PI), 2);

    f64::sqrt(err1 + err2)
}

/// Returns the peak of a Gaussian with the given area. Exact inverse of
/// [`gauss_area`].
pub fn gauss_area2peak(area: f64, sigma: f64) -> f64 {
    area / (sigma * f64::sqrt(2.0 * PI))
}

/// Propagates uncertainties on area and sigma to the Gaussian peak.
pub fn gauss_area2peak_err(
    amplitude: f64,
    area: f64,
    area_err: f64,
    sigma: f64,
    sigma_err: f64,
) -> f64 {
    let err1 = amplitude / area * area_err;
    let err2 = amplitude / sigma * sigma_err;

    f64::sqrt(err1 * err1 + err2 * err2)
}

/// Returns the area under a Voigt profile with peak `amp`, total FWHM
/// `fwhm`, Lorentzian FWHM `gamma` and Gaussian standard deviation
/// `sigma`.
///
/// Cubic approximation in the Gaussian width fraction; the systematic
/// error is below 0.5% (Whiting 1968).
pub fn voigt_area(amp: f64, fwhm: f64, gamma: f64, sigma: f64) -> f64 {
    voigt_area_coef(gamma, sigma) * amp * fwhm
}

/// Alternate Voigt area approximation of Sorochenko & Smirnov (1990).
///
/// Here `gamma` and `sigma` are the FWHM of the Lorentzian and Gaussian
/// components. Not interchangeable with [`voigt_area`] beyond their
/// respective stated accuracies; callers choose explicitly.
pub fn voigt_area2(peak: f64, fwhm: f64, gamma: f64, sigma: f64) -> f64 {
    let p = 1.57 - 0.507 * f64::exp(-0.85 * gamma / sigma);

    peak * fwhm * p
}

/// Propagates uncertainties on peak and FWHM to the [`voigt_area`]
/// estimate, assuming a 0.5% error on the approximation coefficient.
pub fn voigt_area_err(
    area: f64,
    amp: f64,
    amp_err: f64,
    fwhm: f64,
    fwhm_err: f64,
    gamma: f64,
    sigma: f64,
) -> f64 {
    let c = voigt_area_coef(gamma, sigma);

    let err_a = area / amp * amp_err;
    let err_f = area / fwhm * fwhm_err;
    let err_c = area / c * 0.5 / 100.0;

    f64::sqrt(err_a * err_a + err_f * err_f + err_c * err_c)
}

fn voigt_area_coef(gamma: f64, sigma: f64) -> f64 {
    let l = 0.5 * gamma;
    let g = f64::sqrt(2.0 * LN_2) * sigma;
    let k = g / (g + l);

    1.572 + 0.05288 * k - 1.323 * k * k + 0.7658 * k * k * k
}

/// Returns the peak of a Voigt profile given its area and the HWHM of
/// its Gaussian (`alpha_d`) and Lorentzian (`alpha_l`) components.
///
/// Exact relation through the Faddeeva function; [`voigt_peak2area`] is
/// its exact inverse.
pub fn voigt_peak(area: f64, alpha_d: f64, alpha_l: f64) -> f64 {
    let y = alpha_l / alpha_d * f64::sqrt(LN_2);
    let k = faddeeva_real(0.0, y);

    area / alpha_d * f64::sqrt(LN_2 / PI) * k
}

/// Converts the peak of a Voigt profile back into its area. Exact
/// inverse of [`voigt_peak`].
pub fn voigt_peak2area(peak: f64, alpha_d: f64, alpha_l: f64) -> f64 {
    let y = alpha_l / alpha_d * f64::sqrt(LN_2);
    let k = faddeeva_real(0.0, y);

    peak * alpha_d / (f64::sqrt(LN_2 / PI) * k)
}

/// Propagates uncertainties on area and Gaussian HWHM to the Voigt peak,
/// assuming uncorrelated normal errors.
pub fn voigt_peak_err(peak: f64, area: f64, area_err: f64, alpha_d: f64, alpha_d_err: f64) -> f64 {
    f64::abs(peak)
        * f64::sqrt(f64::powi(alpha_d_err / alpha_d, 2) + f64::powi(area_err / area, 2))
}

/// Extracts the Lorentzian FWHM from a total Voigt FWHM `dv` and its
/// Doppler contribution `dd`, with propagated uncertainty.
///
/// Solves the quadratic obtained by inverting [`voigt_fwhm`] and keeps
/// the physical root (`dl < dv`; the Lorentz contribution cannot exceed
/// the total width). A negative discriminant means no real solution
/// exists for the given widths and is reported as an error.
pub fn dv_minus_doppler(dv: f64, dv_err: f64, dd: f64, dd_err: f64) -> RrlResult<(f64, f64)> {
    let (a, b) = (VOIGT_FWHM_A, VOIGT_FWHM_B);

    let d = f64::powi(2.0 * a * dv, 2) - 4.0 * (b - a * a) * (dd * dd - dv * dv);
    if d < 0.0 {
        return Err(RrlError::InvalidInput(format!(
            "no real Lorentz width for total width {dv} and Doppler width {dd}"
        )));
    }
    let sq = f64::sqrt(d);
    let two_c = 2.0 * (b - a * a);

    let dl_m = (-2.0 * a * dv - sq) / two_c;
    let dl_p = (-2.0 * a * dv + sq) / two_c;
    let (dl, sign) = if dl_m < dv { (dl_m, -1.0) } else { (dl_p, 1.0) };

    // Derivatives of the selected root with respect to dv and dd.
    let ddl_dv = (-2.0 * a + sign * 4.0 * b * dv / sq) / two_c;
    let ddl_dd = sign * 4.0 * (b - a * a) * dd / (sq * two_c);

    let ddl = f64::sqrt(f64::powi(ddl_dv * dv_err, 2) + f64::powi(ddl_dd * dd_err, 2));

    Ok((dl, ddl))
}

/// Same computation as [`dv_minus_doppler`] in an independently derived
/// algebraic form. Both produce identical results for all valid inputs.
pub fn dv_minus_doppler2(dv: f64, dv_err: f64, dd: f64, dd_err: f64) -> RrlResult<(f64, f64)> {
    let (a, b) = (VOIGT_FWHM_A, VOIGT_FWHM_B);

    let den = a * a - b;
    let dif = dv * dv - dd * dd;
    let d = f64::powi(a * dv, 2) - den * dif;
    if d < 0.0 {
        return Err(RrlError::InvalidInput(format!(
            "no real Lorentz width for total width {dv} and Doppler width {dd}"
        )));
    }
    let sq = f64::sqrt(d);

    let dl_m = (a * dv - sq) / den;
    let dl_p = (a * dv + sq) / den;
    let (dl, sign) = if dl_m < dv { (dl_m, -1.0) } else { (dl_p, 1.0) };

    let ddl_dv = (a + sign * b * dv / sq) / den;
    let ddl_dd = sign * dd / sq;

    let ddl = f64::sqrt(f64::powi(ddl_dv * dv_err, 2) + f64::powi(ddl_dd * dd_err, 2));

    Ok((dl, ddl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn sigma_fwhm_conversion_round_trips() {
        for &sigma in &[1e-3, 1.0, 2.5, 1e4] {
            assert_abs_diff_eq!(fwhm2sigma(sigma2fwhm(sigma)), sigma, epsilon = 1e-12);
        }
        assert_relative_eq!(sigma2fwhm(1.0), 2.354_820_045_030_949, max_relative = 1e-12);
    }

    #[test]
    fn sigma2fwtm_is_wider_than_fwhm() {
        assert!(sigma2fwtm(1.0) > sigma2fwhm(1.0));
        assert_relative_eq!(
            sigma2fwtm(1.0),
            2.0 * f64::sqrt(2.0 * LN_10),
            max_relative = 1e-15
        );
    }

    #[test]
    fn width_error_variants_apply_the_conversion_scale() {
        // Each conversion is linear, so its uncertainty variant must
        // apply the identical scale factor.
        for &err in &[0.1, 1.0, 30.0] {
            assert_relative_eq!(sigma2fwhm_err(err), sigma2fwhm(err), max_relative = 1e-15);
            assert_relative_eq!(fwhm2sigma_err(err), fwhm2sigma(err), max_relative = 1e-15);
            assert_relative_eq!(sigma2fwtm_err(err), sigma2fwtm(err), max_relative = 1e-15);
        }
    }

    #[test]
    fn voigt_reduces_to_gaussian_for_vanishing_lorentz_width() {
        let (sigma, center) = (1.3, 0.2);
        // voigt() takes an area, gaussian() a peak value.
        let area = 2.0;
        let peak = gauss_area2peak(area, sigma);
        for &x in &[center, center + 0.5, center - 2.0] {
            assert_relative_eq!(
                voigt(x, sigma, 1e-8, center, area),
                gaussian(x, sigma, center, peak),
                max_relative = 1e-4
            );
        }
    }

    #[test]
    fn voigt_reduces_to_lorentzian_for_vanishing_doppler_width() {
        let gamma = 1.0;
        let lorentz_peak = 1.0 / (PI * gamma);
        assert_relative_eq!(
            voigt(0.0, 1e-4, gamma, 0.0, 1.0),
            lorentz_peak,
            max_relative = 1e-3
        );
    }

    #[test]
    fn normalized_gaussian_matches_area_relation() {
        let (sigma, center) = (0.7, -1.0);
        assert_relative_eq!(
            normalized_gaussian(center, sigma, center),
            gauss_area2peak(1.0, sigma),
            max_relative = 1e-14
        );
    }

    #[test]
    fn gauss_area_and_peak_are_inverses() {
        let (amplitude, sigma) = (5.0, 2.0);
        assert_relative_eq!(
            gauss_area2peak(gauss_area(amplitude, sigma), sigma),
            amplitude,
            max_relative = 1e-15
        );
    }

    #[test]
    fn voigt_peak_and_area_are_exact_inverses() {
        let (area, alpha_d, alpha_l) = (1.0, 1.0, 0.5);
        assert_abs_diff_eq!(
            voigt_peak2area(voigt_peak(area, alpha_d, alpha_l), alpha_d, alpha_l),
            area,
            epsilon = 1e-9
        );
    }

    #[test]
    fn voigt_area_approximations_agree_on_gaussian_limit() {
        // For a pure Gaussian both approximations should recover the
        // exact Gaussian area to their stated accuracy.
        let sigma = 2.0;
        let peak = 1.0;
        let fwhm = sigma2fwhm(sigma);
        let exact = gauss_area(peak, sigma);
        assert_relative_eq!(
            voigt_area(peak, fwhm, 0.0, sigma),
            exact,
            max_relative = 5e-3
        );
        assert_relative_eq!(
            voigt_area2(peak, fwhm, 0.0, fwhm),
            exact,
            max_relative = 1e-2
        );
    }

    #[test]
    fn voigt_fwhm_collapses_to_components() {
        assert_relative_eq!(voigt_fwhm(3.0, 0.0), 3.0, max_relative = 1e-15);
        // Pure Lorentzian: 0.5346 + sqrt(0.2166) = 0.999993...
        assert_relative_eq!(voigt_fwhm(0.0, 2.0), 2.0, max_relative = 1e-4);
    }

    #[test]
    fn voigt_fwhm_err_includes_systematic_floor() {
        let err = voigt_fwhm_err(3.0, 1.0, 0.0, 0.0);
        assert_relative_eq!(
            err,
            0.0002 * voigt_fwhm(3.0, 1.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn dv_minus_doppler_variants_are_equivalent() {
        let (dl1, ddl1) = dv_minus_doppler(10.0, 1.0, 5.0, 0.5).unwrap();
        let (dl2, ddl2) = dv_minus_doppler2(10.0, 1.0, 5.0, 0.5).unwrap();
        assert_abs_diff_eq!(dl1, dl2, epsilon = 1e-9);
        assert_abs_diff_eq!(ddl1, ddl2, epsilon = 1e-9);
        assert!(dl1 < 10.0);
    }

    #[test]
    fn dv_minus_doppler_round_trips_through_voigt_fwhm() {
        let (dd, dl) = (6.0, 2.5);
        let dv = voigt_fwhm(dd, dl);
        let (recovered, _) = dv_minus_doppler(dv, 0.1, dd, 0.1).unwrap();
        assert_relative_eq!(recovered, dl, max_relative = 1e-10);
    }

    #[test]
    fn dv_minus_doppler_flags_excess_doppler_width_as_negative() {
        // A Doppler width above the total width has no physical Lorentz
        // contribution; the physical root goes negative and both forms
        // must still agree.
        let (dl1, _) = dv_minus_doppler(1.0, 0.1, 50.0, 0.1).unwrap();
        let (dl2, _) = dv_minus_doppler2(1.0, 0.1, 50.0, 0.1).unwrap();
        assert!(dl1 < 0.0);
        assert_abs_diff_eq!(dl1, dl2, epsilon = 1e-9);
    }
}
