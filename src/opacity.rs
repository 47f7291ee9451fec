//! Free-free continuum and line absorption coefficients.

use crate::constants::{CLIGHT, HPLANCK, KBOLTZMANN, M_ELECTRON, RYD_INF};
use lazy_static::lazy_static;
use std::f64::consts::PI;

lazy_static! {
    /// Saha-Boltzmann scale (h^2 / (2 pi m_e k_B))^(3/2) [cm^3 K^(3/2)].
    static ref SAHA_SCALE: f64 =
        f64::powf(HPLANCK * HPLANCK / (2.0 * PI * M_ELECTRON * KBOLTZMANN), 1.5);
}

/// Ionization exponent chi_n = Z^2 h c R_inf / (k_B n^2 Te) of level n.
pub fn chi(n: f64, te: f64, z: f64) -> f64 {
    z * z * HPLANCK * CLIGHT * RYD_INF / (KBOLTZMANN * n * n * te)
}

/// Level population of level n under LTE [cm^-3], from the
/// Saha-Boltzmann equation with ion ground-state weight 1.
pub fn level_population_lte(n: f64, ne: f64, nion: f64, te: f64, z: f64) -> f64 {
    let omega_n = 2.0 * n * n;
    ne * nion * *SAHA_SCALE / f64::powf(te, 1.5) * omega_n / 2.0 * f64::exp(chi(n, te, z))
}

/// Free-free absorption coefficient [pc^-1].
///
/// Empirical piecewise fit in the variable
/// v = 0.65290 + (2/3) log10(nu/GHz) - log10(Te); the fit vanishes
/// below v = -5 and the two correction branches join continuously at
/// v = -0.25.
pub fn free_free_opacity(nu: f64, te: f64, ne: f64, nion: f64, z: f64) -> f64 {
    let nu_ghz = nu / 1e9;
    let v = 0.65290 + 2.0 / 3.0 * nu_ghz.log10() - te.log10();

    if v <= -5.0 {
        return 0.0;
    }
    let log_correction = if v <= -0.25 {
        -1.232644 * v + 0.098747
    } else {
        -1.084191 * v + 0.135860
    };

    free_free_opacity_base(nu_ghz, te, ne, nion, z)
        * f64::powf(10.0, log_correction)
        * f64::exp(-HPLANCK * nu / (KBOLTZMANN * te))
}

/// The uncorrected free-free absorption coefficient the empirical fit
/// scales. `nu_ghz` is the frequency in GHz.
pub fn free_free_opacity_base(nu_ghz: f64, te: f64, ne: f64, nion: f64, z: f64) -> f64 {
    4.6460 / f64::powf(nu_ghz, 7.0 / 3.0) / f64::powf(te, 1.5)
        * (f64::exp(4.7993e-2 * nu_ghz / te) - 1.0)
        * f64::powf(z, 8.0 / 3.0)
        * ne
        * nion
}

/// Line absorption coefficient under LTE for the transition into level
/// n with Einstein coefficient `einstein_a` [1/s], at frequency `nu`
/// [Hz].
pub fn lte_line_opacity(
    nu: f64,
    te: f64,
    ne: f64,
    nion: f64,
    z: f64,
    n: f64,
    einstein_a: f64,
) -> f64 {
    let cte = CLIGHT * CLIGHT / (8.0 * PI);
    let stimulated = 1.0 - f64::exp(-HPLANCK * nu / (KBOLTZMANN * te));
    cte / (nu * nu) * level_population_lte(n, ne, nion, te, z) * einstein_a * stimulated
}

/// Correction factor for the Planck function in the presence of
/// non-LTE level populations.
///
/// `b_i` and `b_f` are the departure coefficients of the initial and
/// final levels and `b_fi` the stimulated-emission correction of the
/// transition.
pub fn eta(kappa_cont: f64, kappa_line: f64, b_i: f64, b_f: f64, b_fi: f64) -> f64 {
    (kappa_cont + kappa_line * b_i) / (kappa_cont + kappa_line * b_f * b_fi)
}
