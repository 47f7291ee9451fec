//! Departure-coefficient models and derived optical depths.

pub mod codec;
pub mod grid;

use crate::constants::{HPLANCK, KBOLTZMANN};
use crate::error::{RrlError, RrlResult};
use crate::models::grid::{GridKey, GridKind, GridStore};
use crate::transition::Transition;
use ndarray::Array1;

/// Which derived quantity a model lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItauQuantity {
    /// Velocity-integrated optical depth [Hz] at unit emission measure.
    Itau,
    /// b_n beta scaled by dn M(dn).
    BbnMdn,
    /// The raw b_n beta values.
    Bn,
}

/// Non-LTE velocity-integrated optical depth [Hz] at unit emission
/// measure, from the approximate solution of the radiative transfer
/// problem.
///
/// `b` is the departure coefficient folded with the stimulated-emission
/// correction, b_n beta.
pub fn itau_norad(n: f64, te: f64, b: f64, dn: u32, mdn: f64) -> f64 {
    -1.069e7 * f64::from(dn) * mdn * b * f64::exp(1.58e5 / (n * n * te)) / f64::powf(te, 2.5)
}

/// LTE velocity-integrated optical depth [Hz] for the emission measure
/// `em` [cm^-6 pc].
pub fn itau_lte(n: f64, te: f64, dn: u32, mdn: f64, em: f64) -> f64 {
    1.069e7 * f64::from(dn) * mdn * f64::exp(1.58e5 / (n * n * te)) / f64::powf(te, 2.5) * em
}

/// Looks up the integrated optical depth per level for a transition
/// under the given conditions.
///
/// Loads the b_n beta grid matching `key`, restricts it to the levels
/// closest to `n_min` and `n_max` (inclusive) and derives the requested
/// quantity. Returns the levels and their values in level order. The
/// emission measure is unity and the background radiation field is
/// assumed to dominate the continuum.
pub fn itau(
    store: &GridStore,
    transition: &Transition,
    key: &GridKey,
    n_min: f64,
    n_max: f64,
    quantity: ItauQuantity,
) -> RrlResult<(Array1<f64>, Array1<f64>)> {
    let te = codec::key_to_value(&key.te)?;
    let grid = store.load(transition.species(), key, GridKind::BnBeta, n_min, n_max)?;
    let dn = transition.dn();
    let mdn = transition.mdn();

    let n = grid.n().to_owned();
    let values = n
        .iter()
        .zip(grid.values())
        .map(|(&n, &b)| match quantity {
            ItauQuantity::Itau => itau_norad(n, te, b, dn, mdn),
            ItauQuantity::BbnMdn => b * f64::from(dn) * mdn,
            ItauQuantity::Bn => b,
        })
        .collect();
    Ok((n, values))
}

/// Correction factor beta for stimulated emission, from consecutive
/// departure coefficients and the transition frequencies [Hz] between
/// them.
///
/// `bn[i]` and `bn[i + 1]` belong to the levels joined by `freqs[i]`,
/// so the result has one entry per frequency.
pub fn beta(bn: &[f64], freqs: &[f64], te: f64) -> RrlResult<Vec<f64>> {
    if bn.len() < 2 || freqs.len() != bn.len() - 1 {
        return Err(RrlError::InvalidInput(format!(
            "need one frequency per pair of consecutive levels, got {} levels and {} frequencies",
            bn.len(),
            freqs.len()
        )));
    }
    if te <= 0.0 {
        return Err(RrlError::InvalidInput(format!(
            "electron temperature must be positive, got {te}"
        )));
    }

    Ok(freqs
        .iter()
        .zip(bn.windows(2))
        .map(|(&freq, pair)| {
            let boltzmann = f64::exp(-HPLANCK * freq / (KBOLTZMANN * te));
            (1.0 - pair[1] / pair[0] * boltzmann) / (1.0 - boltzmann)
        })
        .collect())
}

/// Approximates b_n beta from the fitted coefficients of Salas et al.
/// (2016), Eqs. (5) and (B1)-(B5).
///
/// The 17 coefficients parametrize the dependence on the radiation
/// temperature `tr`; temperature and density enter through the fitted
/// functional form.
pub fn bnbeta_approx(te: f64, ne: f64, tr: f64, coefs: &[f64; 17]) -> f64 {
    let a0 = coefs[0] + coefs[1] * tr + coefs[2] * tr * tr;
    let a1 = coefs[3] + coefs[4] * tr;
    let b0 = coefs[5] + coefs[6] * tr + coefs[7] * tr * tr;
    let b1 = coefs[8] + coefs[9] * tr + coefs[10] * tr * tr;
    let c0 = coefs[11] + coefs[12] * tr + coefs[13] * tr * tr;
    let c1 = coefs[14] + coefs[15] * tr + coefs[16] * tr * tr;

    (a0 + a1 * te) / f64::powf((b0 + b1 * te) / ne + 1.0, c0 + c1 * te)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lte_depth_is_the_negated_unit_departure_depth() {
        for &(n, te) in &[(100.0, 50.0), (500.0, 100.0), (900.0, 1000.0)] {
            assert_relative_eq!(
                itau_lte(n, te, 1, 0.1908, 1.0),
                -itau_norad(n, te, 1.0, 1, 0.1908),
                max_relative = 1e-15
            );
        }
    }

    #[test]
    fn itau_norad_is_negative_for_positive_departure_coefficients() {
        assert!(itau_norad(500.0, 100.0, 0.9, 1, 0.1908) < 0.0);
    }

    #[test]
    fn itau_norad_matches_a_hand_computed_value() {
        // -1.069e7 * 0.1908 * exp(1.58e5 / (100^2 * 100)) / 100^2.5
        //   = -2.0396052e6 * exp(0.158) / 1e5 = -23.8871666
        assert_relative_eq!(
            itau_norad(100.0, 100.0, 1.0, 1, 0.1908),
            -23.8871666,
            max_relative = 1e-6
        );
    }

    #[test]
    fn beta_is_unity_for_constant_departure_coefficients() {
        let bn = [0.9, 0.9, 0.9];
        let freqs = [1.42e9, 1.43e9];
        for value in beta(&bn, &freqs, 100.0).unwrap() {
            assert_relative_eq!(value, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn beta_checks_its_argument_lengths() {
        assert!(beta(&[1.0], &[], 100.0).is_err());
        assert!(beta(&[1.0, 0.9], &[1e9, 2e9], 100.0).is_err());
        assert!(beta(&[1.0, 0.9], &[1e9], 0.0).is_err());
    }

    #[test]
    fn bnbeta_approx_reduces_for_trivial_coefficients() {
        // a0 = 2, all other terms zero: the fit collapses to a0.
        let mut coefs = [0.0; 17];
        coefs[0] = 2.0;
        assert_relative_eq!(
            bnbeta_approx(100.0, 0.05, 2000.0, &coefs),
            2.0,
            max_relative = 1e-15
        );
    }
}
