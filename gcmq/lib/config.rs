//! Run configuration read from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//! ```toml
//! max_e = 20
//! count = 10
//! vectors = true
//! method = "auto"          # "dense", "banded" or "auto"
//! strategy = "quadrature"  # or "algebraic"
//!
//! [basis]
//! family = "polar"         # or "collective", "cartesian"
//! symmetry = "threefold"   # or "none"
//! parity = "both"          # or "even", "odd"
//!
//! [params]
//! a = -1.0
//! b = 1.0
//! c = 1.0
//! k = 50.0
//!
//! [oscillator]
//! hbar = 1.0
//! omega = 1.0
//!
//! [quadrature]
//! epsilon = 1e-8
//! points = 2000
//! maxiters = 1000
//! ```

use std::{ fs, path::Path };
use serde::{ Deserialize, Serialize };
use crate::{
    assemble::{ QuadratureOptions, Strategy },
    basis::BasisFamily,
    error::GcmResult,
    hamiltonian::{ GcmParams, Hamiltonian, Oscillator },
    solve::{ Method, Solver },
};

/// Serializable name of an assembly [`Strategy`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Quadrature,
    Algebraic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Energy cutoff of the basis.
    pub max_e: usize,
    /// Number of eigenpairs; 0 for all.
    pub count: usize,
    /// Whether to compute eigenvectors.
    pub vectors: bool,
    pub method: Method,
    pub strategy: StrategyKind,
    pub basis: BasisFamily,
    pub params: GcmParams,
    pub oscillator: Oscillator,
    pub quadrature: QuadratureOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_e: 20,
            count: 10,
            vectors: true,
            method: Method::default(),
            strategy: StrategyKind::default(),
            basis: BasisFamily::default(),
            params: GcmParams::default(),
            oscillator: Oscillator::default(),
            quadrature: QuadratureOptions::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> GcmResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> GcmResult<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn to_toml_string(&self) -> GcmResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Validated Hamiltonian.
    pub fn hamiltonian(&self) -> GcmResult<Hamiltonian> {
        Hamiltonian::new(self.params, self.oscillator)
    }

    pub fn strategy(&self) -> Strategy {
        match self.strategy {
            StrategyKind::Quadrature => Strategy::Quadrature(self.quadrature),
            StrategyKind::Algebraic => Strategy::Algebraic,
        }
    }

    /// Build a solver for this configuration.
    pub fn solver(&self) -> GcmResult<Solver> {
        Ok(Solver::new(self.basis, self.hamiltonian()?, self.strategy()))
    }
}
