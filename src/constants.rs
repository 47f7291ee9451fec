//! Physical and mathematical constants.

/// Floating-point precision to use for constants.
#[allow(non_camel_case_types)]
pub type fcn = f64;

// Physical constants (cgs)

/// Speed of light in vacuum [cm/s].
pub const CLIGHT: fcn = 2.997_924_58e10;
/// Boltzmann constant [erg/K].
pub const KBOLTZMANN: fcn = 1.380_658e-16;
/// Planck constant [erg s].
pub const HPLANCK: fcn = 6.626_075_5e-27;
/// Electron mass [g].
pub const M_ELECTRON: fcn = 9.109_389_7e-28;
/// Rydberg constant for infinite nuclear mass [1/cm].
pub const RYD_INF: fcn = 1.097_373_156_816e5;

// Composite constants

/// Boltzmann constant over the atomic mass unit [m^2 s^-2 K^-1].
///
/// Sets the scale of the thermal Doppler width for a mass in amu and
/// speeds in m/s.
pub const KB_OVER_AMU: fcn = 8314.462_621_03;

// Atomic masses [amu]

/// Mass of a hydrogen atom.
pub const M_HI: fcn = 1.007_825;
/// Mass of a helium atom.
pub const M_HEI: fcn = 4.002_602;
/// Mass of a carbon atom.
pub const M_CI: fcn = 12.011;
/// Mass of a carbon-13 atom.
pub const M_13CI: fcn = 13.003_355;
/// Mass of a sulphur atom.
pub const M_SI: fcn = 32.06;
