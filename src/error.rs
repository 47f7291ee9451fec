//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results carrying an [`RrlError`].
pub type RrlResult<T> = Result<T, RrlError>;

/// Canonical error type for line-physics and model-grid operations.
///
/// All failures are surfaced to the caller immediately; none of the
/// numeric routines clamp, retry or fabricate values. The only sanctioned
/// fallback is [`crate::models::codec::key_to_value_lenient`], which is a
/// separate function rather than a variant of this type.
#[derive(Error, Debug)]
pub enum RrlError {
    /// A non-physical input, such as a negative width or a total line
    /// width smaller than its turbulent contribution.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No model-grid file matches the requested physical conditions.
    #[error("no model grid matching `{pattern}` under {}", .dir.display())]
    GridNotFound { dir: PathBuf, pattern: String },
    /// More than one model-grid file matches the requested physical
    /// conditions, so the lookup cannot pick one deterministically.
    #[error("{count} model grids match `{pattern}` under {}", .dir.display())]
    AmbiguousGrid {
        dir: PathBuf,
        pattern: String,
        count: usize,
    },
    /// An interpolation argument fell outside the tabulated range.
    #[error("{name} = {value} outside the tabulated range [{min}, {max}]")]
    OutOfDomain {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// A nearest-value search found no entry within the given tolerance.
    #[error("no value within {tolerance} of {target} (closest is {closest})")]
    NoMatch {
        target: f64,
        tolerance: f64,
        closest: f64,
    },
    /// A batch load failed for one of the requested parameter triples.
    #[error("loading grid for (Te = {te}, ne = {ne}, Tr = {tr}): {source}")]
    BatchLoad {
        te: String,
        ne: String,
        tr: String,
        #[source]
        source: Box<RrlError>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}
