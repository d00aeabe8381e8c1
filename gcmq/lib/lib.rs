//! Provides stationary states of the geometric collective model of nuclear
//! quadrupole shapes by expansion in a truncated harmonic-oscillator basis.
//!
//! The pipeline runs from the bottom up:
//! - [`index`] enumerates the basis states below an energy cutoff;
//! - [`basis`] describes the basis families (planar in polar or Cartesian
//!   coordinates, and five-dimensional) through a single [`BasisPolicy`]
//!   trait;
//! - [`assemble`] builds the Hamiltonian as a [`SymmetricBandMatrix`], either
//!   by quadrature over [cached][cache] basis functions or from closed-form
//!   recursion identities and [axis moments][moments];
//! - [`eigen`] diagonalizes it, fully ([`DenseEigen`]) or for the lowest
//!   eigenpairs only ([`BandEigen`]);
//! - [`solve`] drives the whole computation and [`post`] derives densities and
//!   invariants from the result.
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod special;
pub mod grid;
pub mod index;
pub mod basis;
pub mod hamiltonian;
pub mod cache;
pub mod moments;
pub mod band;
pub mod assemble;
pub mod eigen;
pub mod progress;
pub mod solve;
pub mod post;
pub mod config;
pub mod state;
pub mod utils;

pub mod docs;

pub(crate) const DEF_EPSILON: f64 = 1e-8;
pub(crate) const DEF_MAXITERS: usize = 1000;
pub(crate) const DEF_POINTS: usize = 2000;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;

pub use crate::{
    assemble::{ Assembler, QuadratureOptions, Strategy },
    band::SymmetricBandMatrix,
    basis::{
        BasisFamily,
        BasisPolicy,
        CartesianBasis,
        CollectiveBasis,
        PolarBasis,
        RadialAngular,
        Separation,
        Term,
    },
    config::{ Config, StrategyKind },
    eigen::{ BandEigen, DenseEigen, EigenPairs, EigenSolver },
    error::{ GcmError, GcmResult, Stage },
    hamiltonian::{ GcmParams, Hamiltonian, Oscillator },
    index::{ BasisIndex, ParityClass, Symmetry },
    post::Parity,
    progress::{ LogSink, NullSink, ProgressSink, TextSink },
    solve::{ EigenResult, Method, Solver, SolverState },
    state::SavedState,
};
