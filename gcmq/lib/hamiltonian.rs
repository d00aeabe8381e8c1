//! Collective-model Hamiltonian and its decomposition against the basis
//! oscillator.
//!
//! The model Hamiltonian is
//! ```text
//! H = -ħ²/(2K) ∇² + A β² + B β³ cos 3γ + C β⁴
//! ```
//! and the basis consists of eigenstates of
//! ```text
//! H₀ = -ħ²/(2K) ∇² + ½ K ω² β²
//! ```
//! so that `H = H₀ + (A - ½Kω²) β² + B β³ cos 3γ + C β⁴`. In the scaled
//! coordinate `r = β / s`, `s = √(ħ / (K ω))`, every term of `H - H₀` becomes a
//! power of `r` times an angular factor.

use serde::{ Deserialize, Serialize };
use crate::{
    basis::Term,
    error::{ GcmError, GcmResult },
};

/// Potential and inertia coefficients supplied by the classical model.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GcmParams {
    /// Coefficient of `β²`.
    pub a: f64,
    /// Coefficient of `β³ cos 3γ`.
    pub b: f64,
    /// Coefficient of `β⁴`.
    pub c: f64,
    /// Mass parameter `K` of the kinetic term.
    pub k: f64,
}

impl Default for GcmParams {
    fn default() -> Self { Self { a: -1.0, b: 1.0, c: 1.0, k: 50.0 } }
}

fn one() -> f64 { 1.0 }

/// Basis oscillator.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    #[serde(default = "one")]
    pub hbar: f64,
    #[serde(default = "one")]
    pub omega: f64,
}

impl Default for Oscillator {
    fn default() -> Self { Self { hbar: 1.0, omega: 1.0 } }
}

/// A single term `coeff · r^power · (angular factor)` of `H - H₀`, in scaled
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PotentialTerm {
    pub term: Term,
    pub power: i32,
    pub coeff: f64,
}

/// Model parameters together with the basis oscillator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hamiltonian {
    pub params: GcmParams,
    pub oscillator: Oscillator,
}

impl Hamiltonian {
    /// Create a new `Hamiltonian`, checking that `K`, `ħ` and `ω` are positive.
    pub fn new(params: GcmParams, oscillator: Oscillator) -> GcmResult<Self> {
        let check = |name: &'static str, v: f64| {
            (v > 0.0 && v.is_finite()).then_some(())
                .ok_or(GcmError::BadParameter(name, v))
        };
        check("k", params.k)?;
        check("hbar", oscillator.hbar)?;
        check("omega", oscillator.omega)?;
        Ok(Self { params, oscillator })
    }

    /// Energy quantum `ħω` of the basis oscillator.
    pub fn quantum(&self) -> f64 { self.oscillator.hbar * self.oscillator.omega }

    /// Oscillator length `s = √(ħ / (K ω))`.
    pub fn length(&self) -> f64 {
        (self.oscillator.hbar / (self.params.k * self.oscillator.omega)).sqrt()
    }

    /// Terms of `H - H₀` in scaled coordinates.
    pub fn terms(&self) -> [PotentialTerm; 3] {
        let GcmParams { a, b, c, k } = self.params;
        let s = self.length();
        let omega = self.oscillator.omega;
        [
            PotentialTerm {
                term: Term::Isotropic,
                power: 2,
                coeff: (a - 0.5 * k * omega * omega) * s.powi(2),
            },
            PotentialTerm { term: Term::Isotropic, power: 4, coeff: c * s.powi(4) },
            PotentialTerm { term: Term::Cos3Gamma, power: 3, coeff: b * s.powi(3) },
        ]
    }

    /// Classical potential `V(β, γ)`.
    pub fn potential(&self, beta: f64, gamma: f64) -> f64 {
        let GcmParams { a, b, c, .. } = self.params;
        let b2 = beta * beta;
        a * b2 + b * b2 * beta * (3.0 * gamma).cos() + c * b2 * b2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_reproduce_potential() {
        let ham = Hamiltonian::new(
            GcmParams { a: -0.7, b: 1.3, c: 0.9, k: 20.0 },
            Oscillator { hbar: 1.0, omega: 0.8 },
        ).unwrap();
        let s = ham.length();
        let (beta, gamma): (f64, f64) = (0.37, 0.4);
        let r = beta / s;
        let k = ham.params.k;
        let omega = ham.oscillator.omega;
        let from_terms: f64
            = ham.terms().iter()
            .map(|t| {
                let ang = match t.term {
                    Term::Isotropic => 1.0,
                    Term::Cos3Gamma => (3.0 * gamma).cos(),
                };
                t.coeff * r.powi(t.power) * ang
            })
            .sum::<f64>()
            + 0.5 * k * omega * omega * beta * beta;
        assert!((from_terms - ham.potential(beta, gamma)).abs() < 1e-12);
    }

    #[test]
    fn rejects_nonpositive() {
        let bad = GcmParams { k: 0.0, ..GcmParams::default() };
        assert!(matches!(
            Hamiltonian::new(bad, Oscillator::default()),
            Err(GcmError::BadParameter("k", _)),
        ));
        let bad = Oscillator { hbar: 1.0, omega: -1.0 };
        assert!(Hamiltonian::new(GcmParams::default(), bad).is_err());
    }
}
