//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use std::fmt;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Returned when an operation requiring equal-length data encounters data with
/// unequal length.
#[derive(Debug, Error)]
#[error("encountered data with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check(na: usize, nb: usize) -> Result<(), Self> {
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Pipeline stage attached to errors raised inside
/// [`Solver::compute`][crate::solve::Solver::compute].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    IndexGeneration,
    Assembly,
    Diagonalization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexGeneration => write!(f, "index generation"),
            Self::Assembly => write!(f, "assembly"),
            Self::Diagonalization => write!(f, "diagonalization"),
        }
    }
}

/// Returned from basis construction, matrix assembly, diagonalization and
/// post-processing.
#[derive(Debug, Error)]
pub enum GcmError {
    /// Returned when `compute` is called on a solver that is already
    /// computing. The caller may retry once the running call has returned.
    #[error("a computation is already in progress on this solver")]
    Busy,

    /// Returned when post-processing is requested before any successful
    /// computation.
    #[error("no eigenstates have been computed")]
    NotComputed,

    /// Returned when eigenvectors are needed but only eigenvalues were
    /// computed.
    #[error("eigenvectors were not computed")]
    NoVectors,

    /// Returned when a basis family is used in a mode it has no
    /// implementation for.
    #[error("{family} basis does not support {what}")]
    Unsupported { family: &'static str, what: String },

    /// Returned when a write to a band matrix falls outside its bandwidth.
    #[error("entry ({0}, {1}) lies outside the bandwidth {2}")]
    OutsideBand(usize, usize, usize),

    /// Returned when an eigenstate index exceeds the number of computed
    /// states.
    #[error("eigenstate index {0} out of range; {1} states computed")]
    StateIndex(usize, usize),

    /// Returned when a non-positive `epsilon` value is encountered.
    #[error("epsilon values must be greater than 0; got {0}")]
    BadEpsilon(f64),

    /// Returned when a non-positive `maxiters` value is encountered.
    #[error("maxiters must be greater than 0; got {0}")]
    BadMaxiters(usize),

    /// Returned when a grid is requested with too few points or an empty
    /// interval.
    #[error("grids need at least 2 points over a non-empty interval; got {0} points on [{1}, {2}]")]
    BadGrid(usize, f64, f64),

    /// Returned when a physical parameter that must be positive is not.
    #[error("parameter `{0}` must be positive and finite; got {1}")]
    BadParameter(&'static str, f64),

    /// Returned when a saved state does not describe a valid computation.
    #[error("inconsistent saved state: {0}")]
    BadState(String),

    /// Error raised during one stage of `compute`.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<GcmError>,
    },

    /// [`LengthError`]
    #[error("length error: {0}")]
    Length(#[from] LengthError),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),

    /// I/O error while reading or writing configuration or state files.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML input.
    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Failure to serialize to TOML.
    #[error("toml write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GcmError {
    pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Self> {
        (epsilon > 0.0).then_some(()).ok_or(Self::BadEpsilon(epsilon))
    }

    pub(crate) fn check_maxiters(maxiters: usize) -> Result<(), Self> {
        (maxiters != 0).then_some(()).ok_or(Self::BadMaxiters(maxiters))
    }

    /// Tag `self` with the pipeline stage it was raised in.
    pub fn at(self, stage: Stage) -> Self {
        Self::Stage { stage, source: Box::new(self) }
    }

    /// Return the stage an error was raised in, if it carries one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Strip any stage tags, returning the underlying error.
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            e => e,
        }
    }
}

pub type GcmResult<T> = Result<T, GcmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_tag_in_message() {
        let err = GcmError::Unsupported {
            family: "polar",
            what: "algebraic assembly".into(),
        }.at(Stage::Assembly);
        assert_eq!(err.stage(), Some(Stage::Assembly));
        assert!(err.to_string().starts_with("assembly failed:"));
        assert!(matches!(err.root(), GcmError::Unsupported { .. }));
    }

    #[test]
    fn checks() {
        assert!(GcmError::check_epsilon(0.0).is_err());
        assert!(GcmError::check_epsilon(1e-8).is_ok());
        assert!(GcmError::check_maxiters(0).is_err());
        assert!(LengthError::check(3, 4).is_err());
        assert!(LengthError::check(4, 4).is_ok());
    }
}
