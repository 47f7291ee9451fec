//! Doppler, pressure and radiation broadening of recombination lines.
//!
//! Pressure (collisional) and radiation broadening each come in several
//! published variants with different coefficients; they are deliberately
//! kept as distinct named strategies rather than merged, since their
//! numeric outputs differ and callers pick the model they trust.

use crate::constants::{KBOLTZMANN, KB_OVER_AMU};
use crate::error::{RrlError, RrlResult};
use crate::lineshape::{fwhm2sigma, sigma2fwhm};
use crate::math::interp_linear;
use std::f64::consts::PI;

/// Electron temperatures [K] tabulating the Salgado et al. (2017)
/// collisional broadening coefficients.
const PRESSURE_COEF_TE: [f64; 30] = [
    10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 200.0, 300.0, 400.0, 500.0,
    600.0, 700.0, 800.0, 900.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0,
    9000.0, 10000.0, 20000.0, 30000.0,
];

/// Coefficient a of the collisional broadening formula, log10 scale.
const PRESSURE_COEF_A: [f64; 30] = [
    -10.974098, -10.669695, -10.494541, -10.370271, -10.273172, -10.191374, -10.124309,
    -10.064037, -10.010153, -9.9613006, -9.6200366, -9.4001678, -9.2336349, -9.0848840,
    -8.9690170, -8.8686695, -8.7802238, -8.7012421, -8.6299908, -8.2718376, -8.0093937,
    -7.8344941, -7.7083367, -7.6126791, -7.5375720, -7.4770500, -7.4272885, -7.3857095,
    -7.1811733, -7.1132522,
];

/// Exponent gamma of the collisional broadening formula.
const PRESSURE_COEF_GAMMA: [f64; 30] = [
    5.4821631, 5.4354009, 5.4071360, 5.3861013, 5.3689105, 5.3535398, 5.3409679, 5.3290318,
    5.3180304, 5.3077770, 5.2283700, 5.1700702, 5.1224893, 5.0770049, 5.0408369, 5.0086342,
    4.9796105, 4.9532071, 4.9290080, 4.8063682, 4.7057576, 4.6356118, 4.5831746, 4.5421547,
    4.5090104, 4.4815675, 4.4584053, 4.4385507, 4.3290786, 4.2814240,
];

/// Thermal Doppler broadening of a line in m/s.
///
/// `t` is the gas temperature [K], `mass` the mass of the emitting atom
/// [amu] and `v_turb` the turbulent velocity [m/s]. Returns the sigma of
/// the Gaussian line, or its FWHM when `fwhm` is set.
pub fn doppler_broad(t: f64, mass: f64, v_turb: f64, fwhm: bool) -> f64 {
    let dv = f64::sqrt(KB_OVER_AMU * t / mass + v_turb * v_turb);

    if fwhm {
        sigma2fwhm(dv)
    } else {
        dv
    }
}

/// The gas temperature required to Doppler broaden a line to the given
/// width [m/s]. Algebraic inverse of [`doppler_broad`].
///
/// Fails if the turbulent velocity alone exceeds the observed width,
/// which would require a negative temperature.
pub fn doppler_temp(width: f64, mass: f64, v_turb: f64, fwhm: bool) -> RrlResult<f64> {
    let dv = if fwhm { fwhm2sigma(width) } else { width };

    if dv * dv < v_turb * v_turb {
        return Err(RrlError::InvalidInput(format!(
            "line width {dv} m/s is below the turbulent velocity {v_turb} m/s"
        )));
    }

    Ok((dv * dv - v_turb * v_turb) * mass / KB_OVER_AMU)
}

/// Propagates width and turbulence uncertainties to the Doppler
/// temperature of [`doppler_temp`].
pub fn doppler_temp_err(
    width: f64,
    width_err: f64,
    mass: f64,
    v_turb: f64,
    v_turb_err: f64,
    fwhm: bool,
) -> f64 {
    let (dv, dv_err) = if fwhm {
        (fwhm2sigma(width), fwhm2sigma(width_err))
    } else {
        (width, width_err)
    };

    let cte = mass / KB_OVER_AMU;
    let fac1 = 2.0 * dv * dv_err;
    let fac2 = 2.0 * v_turb * v_turb_err;

    f64::sqrt(fac1 * fac1 + fac2 * fac2) * cte
}

/// Collisional broadening FWHM in Hz after Shaver (1975).
///
/// Eq. (64a) for `te` <= 1000 K and Eq. (61) above. Not expected to
/// agree with [`pressure_broad_salgado`]; the two are different
/// published models.
pub fn pressure_broad(n: f64, te: f64, ne: f64) -> f64 {
    if te <= 1000.0 {
        2e-5 * f64::powf(te, -1.5) * f64::exp(-26.0 / f64::cbrt(te)) * ne * f64::powf(n, 5.2)
    } else {
        3.74e-8 * ne * f64::powf(n, 4.4) * f64::powf(te, -0.1)
    }
}

/// Coefficients (a, gamma) of the Salgado et al. (2017) collisional
/// broadening formula, linearly interpolated in electron temperature.
///
/// Temperatures outside the tabulated range [10, 30000] K are an error;
/// the fit is not extrapolated.
pub fn pressure_broad_coefs(te: f64) -> RrlResult<(f64, f64)> {
    let a = interp_linear(te, &PRESSURE_COEF_TE, &PRESSURE_COEF_A, "Te")?;
    let gamma = interp_linear(te, &PRESSURE_COEF_TE, &PRESSURE_COEF_GAMMA, "Te")?;

    Ok((a, gamma))
}

/// Collisional broadening FWHM in Hz after Salgado et al. (2017).
pub fn pressure_broad_salgado(n: f64, te: f64, ne: f64, dn: u32) -> RrlResult<f64> {
    let (a, g) = pressure_broad_coefs(te)?;

    Ok(ne * f64::powf(10.0, a) * (f64::powf(n, g) + f64::powf(n + f64::from(dn), g)) / (2.0 * PI))
}

/// Radiation broadening FWHM in Hz after Shaver (1975).
pub fn radiation_broad(n: f64, w: f64, tr: f64) -> f64 {
    8e-17 * w * tr * f64::powf(n, 5.8)
}

/// Radiation broadening FWHM in Hz after Salgado et al. (2017).
///
/// `w` is the cloud covering factor and `tr` the radiation field
/// temperature at 100 MHz.
pub fn radiation_broad_salgado(n: f64, w: f64, tr: f64) -> f64 {
    6.096e-17 * w * tr * f64::powf(n, 5.8)
}

/// Radiation broadening FWHM in Hz for a power-law radiation field of
/// spectral index `alpha` normalized to `tr` [K] at `nu0` [Hz], summing
/// the dominant transitions up to delta n = 3 (Salgado et al. 2017).
pub fn radiation_broad_salgado_general(n: f64, w: f64, tr: f64, nu0: f64, alpha: f64) -> f64 {
    let cte = 2.0 / PI * 2.14e4 * f64::powf(6.578e15 / nu0, alpha + 1.0) * KBOLTZMANN * nu0;
    let dn_exp = alpha - 2.0;

    w * cte
        * tr
        * f64::powf(n, -3.0 * alpha - 2.0)
        * (1.0 + f64::powf(2.0, dn_exp) + f64::powf(3.0, dn_exp))
}

/// Total Lorentzian FWHM in Hz from radiation plus collisional
/// broadening, using the Salgado et al. (2017) models for both.
///
/// This is the Lorentz width entering the Voigt profile downstream.
pub fn lorentz_width(n: f64, ne: f64, te: f64, tr: f64, w: f64, dn: u32) -> RrlResult<f64> {
    let dl_r = radiation_broad_salgado(n, w, tr);
    let dl_p = pressure_broad_salgado(n, te, ne, dn)?;

    Ok(dl_r + dl_p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn doppler_broad_and_temp_are_inverses() {
        let (t, mass, v_turb) = (100.0, 12.011, 1.5e3);
        let sigma = doppler_broad(t, mass, v_turb, false);
        assert_relative_eq!(
            doppler_temp(sigma, mass, v_turb, false).unwrap(),
            t,
            max_relative = 1e-12
        );

        let fwhm = doppler_broad(t, mass, v_turb, true);
        assert_relative_eq!(
            doppler_temp(fwhm, mass, v_turb, true).unwrap(),
            t,
            max_relative = 1e-12
        );
    }

    #[test]
    fn doppler_temp_rejects_subturbulent_widths() {
        assert!(matches!(
            doppler_temp(1.0e3, 12.011, 2.0e3, false),
            Err(RrlError::InvalidInput(_))
        ));
    }

    #[test]
    fn doppler_temp_err_scales_linearly_with_width_error() {
        let err1 = doppler_temp_err(5e3, 10.0, 12.011, 0.0, 0.0, false);
        let err2 = doppler_temp_err(5e3, 20.0, 12.011, 0.0, 0.0, false);
        assert_relative_eq!(2.0 * err1, err2, max_relative = 1e-12);
    }

    #[test]
    fn pressure_broad_coefs_hits_tabulated_points_exactly() {
        let (a, g) = pressure_broad_coefs(100.0).unwrap();
        assert_eq!(a, -9.9613006);
        assert_eq!(g, 5.3077770);
    }

    #[test]
    fn pressure_broad_coefs_interpolates_between_points() {
        let (a, g) = pressure_broad_coefs(150.0).unwrap();
        assert_abs_diff_eq!(a, 0.5 * (-9.9613006 - 9.6200366), epsilon = 1e-12);
        assert_abs_diff_eq!(g, 0.5 * (5.3077770 + 5.2283700), epsilon = 1e-12);
    }

    #[test]
    fn pressure_broad_coefs_rejects_out_of_range_temperatures() {
        assert!(matches!(
            pressure_broad_coefs(5.0),
            Err(RrlError::OutOfDomain { .. })
        ));
        assert!(matches!(
            pressure_broad_coefs(40000.0),
            Err(RrlError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn pressure_broad_salgado_is_linear_in_density() {
        let w1 = pressure_broad_salgado(500.0, 100.0, 0.05, 1).unwrap();
        let w2 = pressure_broad_salgado(500.0, 100.0, 0.10, 1).unwrap();
        assert_relative_eq!(2.0 * w1, w2, max_relative = 1e-12);
    }

    #[test]
    fn shaver_and_salgado_pressure_models_differ() {
        // Different published fits; their disagreement is expected
        // domain behavior, not a bug.
        let shaver = pressure_broad(500.0, 100.0, 0.05);
        let salgado = pressure_broad_salgado(500.0, 100.0, 0.05, 1).unwrap();
        assert!(shaver > 0.0 && salgado > 0.0);
        assert_ne!(shaver, salgado);
    }

    #[test]
    fn shaver_pressure_branches_at_1000_kelvin() {
        let below = pressure_broad(500.0, 1000.0, 0.05);
        let above = pressure_broad(500.0, 1000.1, 0.05);
        // Continuity is not promised across the published branch point.
        assert!(below > 0.0 && above > 0.0);
    }

    #[test]
    fn radiation_broad_variants_share_the_power_law() {
        let simple = radiation_broad(500.0, 1.0, 1000.0);
        let salgado = radiation_broad_salgado(500.0, 1.0, 1000.0);
        assert_relative_eq!(salgado / simple, 6.096e-17 / 8e-17, max_relative = 1e-12);
    }

    #[test]
    fn radiation_broad_general_scales_with_covering_factor() {
        let one = radiation_broad_salgado_general(500.0, 1.0, 800.0, 100e6, -2.6);
        let half = radiation_broad_salgado_general(500.0, 0.5, 800.0, 100e6, -2.6);
        assert_relative_eq!(one, 2.0 * half, max_relative = 1e-12);
        assert!(one > 0.0);
    }

    #[test]
    fn lorentz_width_is_the_sum_of_its_parts() {
        let (n, ne, te, tr, w) = (500.0, 0.05, 100.0, 1400.0, 1.0);
        let total = lorentz_width(n, ne, te, tr, w, 1).unwrap();
        let expected = radiation_broad_salgado(n, w, tr)
            + pressure_broad_salgado(n, te, ne, 1).unwrap();
        assert_relative_eq!(total, expected, max_relative = 1e-15);
    }
}
