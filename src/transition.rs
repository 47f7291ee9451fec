//! Identification of recombination-line transitions.
//!
//! A transition is a species plus a level separation delta n, written
//! canonically as `RRL_<species><greek>` (e.g. `RRL_CIalpha` for the
//! carbon delta n = 1 line). The Greek suffix encodes delta n from alpha
//! (1) through epsilon (5).

use crate::constants::{M_13CI, M_CI, M_HEI, M_HI, M_SI};
use crate::error::{RrlError, RrlResult};
use std::fmt;

/// Largest level separation with a Greek-letter name and an M(dn) entry.
pub const MAX_DN: u32 = 5;

/// M(delta n) oscillator-strength factors of Menzel (1968), delta n = 1
/// through 5.
const MDN_TABLE: [f64; MAX_DN as usize] = [0.1908, 0.02633, 0.008106, 0.003492, 0.001812];

const GREEK_SUFFIXES: [&str; MAX_DN as usize] = ["alpha", "beta", "gamma", "delta", "epsilon"];

/// Atomic species with recombination lines in the radio regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Hydrogen,
    Helium,
    Carbon,
    Carbon13,
    Sulphur,
}

impl Species {
    /// The species label used in canonical line names.
    pub fn label(self) -> &'static str {
        match self {
            Species::Hydrogen => "HI",
            Species::Helium => "HeI",
            Species::Carbon => "CI",
            Species::Carbon13 => "13CI",
            Species::Sulphur => "SI",
        }
    }

    /// The element name used by the model-grid file convention.
    pub fn atom_name(self) -> &'static str {
        match self {
            Species::Hydrogen => "Hydrogen",
            Species::Helium => "Helium",
            Species::Carbon | Species::Carbon13 => "Carbon",
            Species::Sulphur => "Sulphur",
        }
    }

    /// The critical-density key the tabulated grids for this species
    /// were computed with.
    pub fn ncrit_key(self) -> &'static str {
        match self {
            Species::Carbon | Species::Carbon13 => "1.5d3",
            _ => "8d2",
        }
    }

    /// Atomic mass [amu], as used by the Doppler broadening formulas.
    pub fn mass(self) -> f64 {
        match self {
            Species::Hydrogen => M_HI,
            Species::Helium => M_HEI,
            Species::Carbon => M_CI,
            Species::Carbon13 => M_13CI,
            Species::Sulphur => M_SI,
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "HI" => Some(Species::Hydrogen),
            "HeI" => Some(Species::Helium),
            "CI" => Some(Species::Carbon),
            "13CI" => Some(Species::Carbon13),
            "SI" => Some(Species::Sulphur),
            _ => None,
        }
    }
}

/// A recombination-line transition: a species and a level separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    species: Species,
    dn: u32,
}

impl Transition {
    /// Creates a transition, rejecting level separations without a
    /// Greek-letter name.
    pub fn new(species: Species, dn: u32) -> RrlResult<Self> {
        if dn == 0 || dn > MAX_DN {
            return Err(RrlError::InvalidInput(format!(
                "delta n = {dn} outside the named range 1..={MAX_DN}"
            )));
        }
        Ok(Transition { species, dn })
    }

    /// Parses a canonical line name such as `RRL_CIalpha`.
    pub fn from_name(name: &str) -> RrlResult<Self> {
        let stripped = name.strip_prefix("RRL_").ok_or_else(|| {
            RrlError::InvalidInput(format!("line name `{name}` lacks the RRL_ prefix"))
        })?;

        for (i, suffix) in GREEK_SUFFIXES.iter().enumerate() {
            if let Some(label) = stripped.strip_suffix(suffix) {
                let species = Species::from_label(label).ok_or_else(|| {
                    RrlError::InvalidInput(format!("unknown species `{label}` in `{name}`"))
                })?;
                return Transition::new(species, i as u32 + 1);
            }
        }
        Err(RrlError::InvalidInput(format!(
            "line name `{name}` has no Greek-letter suffix"
        )))
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// The level separation delta n encoded by the Greek suffix.
    pub fn dn(&self) -> u32 {
        self.dn
    }

    /// The M(delta n) factor for this transition.
    pub fn mdn(&self) -> f64 {
        MDN_TABLE[(self.dn - 1) as usize]
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RRL_{}{}",
            self.species.label(),
            GREEK_SUFFIXES[(self.dn - 1) as usize]
        )
    }
}

/// Gives the M(delta n) factor of Menzel (1968) for a level separation.
///
/// Separations outside 1..=5 are not tabulated and are an error.
pub fn mdn(dn: u32) -> RrlResult<f64> {
    if dn == 0 || dn > MAX_DN {
        return Err(RrlError::InvalidInput(format!(
            "M(dn) is tabulated for dn in 1..={MAX_DN}, got {dn}"
        )));
    }
    Ok(MDN_TABLE[(dn - 1) as usize])
}

/// Approximate oscillator strength n M(dn) (1 + 1.5 dn / n) of Menzel
/// (1969), Eq. (1).
pub fn fnnp_app(n: f64, dn: u32) -> RrlResult<f64> {
    Ok(n * mdn(dn)? * (1.0 + 1.5 * f64::from(dn) / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mdn_matches_menzel_table() {
        assert_eq!(mdn(1).unwrap(), 0.1908);
        assert_eq!(mdn(5).unwrap(), 0.001812);
    }

    #[test]
    fn mdn_rejects_unnamed_separations() {
        assert!(matches!(mdn(0), Err(RrlError::InvalidInput(_))));
        assert!(matches!(mdn(6), Err(RrlError::InvalidInput(_))));
    }

    #[test]
    fn transition_names_round_trip() {
        for name in [
            "RRL_CIalpha",
            "RRL_CIbeta",
            "RRL_HIgamma",
            "RRL_HeIdelta",
            "RRL_13CIalpha",
            "RRL_SIepsilon",
        ] {
            let transition = Transition::from_name(name).unwrap();
            assert_eq!(transition.to_string(), name);
        }
        assert_eq!(
            Transition::from_name("RRL_CIalpha").unwrap().dn(),
            1
        );
        assert_eq!(
            Transition::from_name("RRL_HIbeta").unwrap().dn(),
            2
        );
    }

    #[test]
    fn transition_parsing_rejects_malformed_names() {
        assert!(Transition::from_name("CIalpha").is_err());
        assert!(Transition::from_name("RRL_XYalpha").is_err());
        assert!(Transition::from_name("RRL_CI").is_err());
    }

    #[test]
    fn carbon_isotopes_share_the_grid_atom() {
        assert_eq!(Species::Carbon13.atom_name(), "Carbon");
        assert_eq!(Species::Carbon.ncrit_key(), "1.5d3");
        assert_eq!(Species::Hydrogen.ncrit_key(), "8d2");
    }

    #[test]
    fn fnnp_app_approaches_n_mdn_for_large_n() {
        let f = fnnp_app(1e4, 1).unwrap();
        assert_relative_eq!(f / 1e4, 0.1908, max_relative = 1e-3);
    }
}
