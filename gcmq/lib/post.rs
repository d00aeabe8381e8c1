//! Quantities derived from computed eigenvectors.

use std::fmt;
use ndarray as nd;
use crate::{
    Arr1,
    basis::BasisPolicy,
    error::{ GcmResult, LengthError },
    index::BasisIndex,
};

/// Behavior under the reflection `γ → -γ`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    /// Classify from the expectation value of the reflection.
    pub fn from_reflection(r: f64) -> Self {
        if r >= 0.0 { Self::Even } else { Self::Odd }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => f.pad("+"),
            Self::Odd => f.pad("-"),
        }
    }
}

/// Reconstruct the amplitude
/// ```text
/// ψ(x, y) = s^(-d/2) Σ_i c_i φ_i(x / s, y / s)
/// ```
/// on the grid `xs × ys`, where `s` is the oscillator length and `φ_i` the
/// [basis state][BasisPolicy::value]. Element `[[i, j]]` is at
/// `(xs[i], ys[j])`.
///
/// For the planar bases `|ψ|²` integrates to 1 over the plane; for the
/// five-dimensional basis the result is a slice through the `(β, γ)` plane.
pub fn amplitude<B, S, T, U>(
    policy: &B,
    index: &BasisIndex,
    coeffs: &Arr1<S>,
    length: f64,
    xs: &Arr1<T>,
    ys: &Arr1<U>,
) -> GcmResult<nd::Array2<f64>>
where
    B: BasisPolicy + ?Sized,
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
    U: nd::Data<Elem = f64>,
{
    LengthError::check(index.len(), coeffs.len())?;
    let scale = length.powf(-0.5 * policy.dimension() as f64);
    let mut psi: nd::Array2<f64> = nd::Array2::zeros((xs.len(), ys.len()));
    for ((i, j), p) in psi.indexed_iter_mut() {
        let (x, y) = (xs[i] / length, ys[j] / length);
        *p = scale * index.iter().zip(coeffs.iter())
            .filter(|(_, c)| **c != 0.0)
            .map(|((n, l), c)| c * policy.value(n, l, x, y))
            .sum::<f64>();
    }
    Ok(psi)
}

/// `|ψ|²` from [`amplitude`].
pub fn density<B, S, T, U>(
    policy: &B,
    index: &BasisIndex,
    coeffs: &Arr1<S>,
    length: f64,
    xs: &Arr1<T>,
    ys: &Arr1<U>,
) -> GcmResult<nd::Array2<f64>>
where
    B: BasisPolicy + ?Sized,
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
    U: nd::Data<Elem = f64>,
{
    amplitude(policy, index, coeffs, length, xs, ys)
        .map(|psi| psi.mapv(|a| a * a))
}

// Σ c_i² f(n_i, l_i) / Σ c_i²
fn weighted<S, F>(index: &BasisIndex, coeffs: &Arr1<S>, f: F)
    -> GcmResult<f64>
where
    S: nd::Data<Elem = f64>,
    F: Fn(usize, i32) -> f64,
{
    LengthError::check(index.len(), coeffs.len())?;
    let (num, den)
        = index.iter().zip(coeffs.iter())
        .fold((0.0, 0.0), |(num, den), ((n, l), c)| {
            let c2 = c * c;
            (num + c2 * f(n, l), den + c2)
        });
    Ok(if den > 0.0 { num / den } else { 0.0 })
}

/// Expectation value of the reflection `γ → -γ`; `±1` for states of pure
/// parity.
pub fn reflection<B, S>(policy: &B, index: &BasisIndex, coeffs: &Arr1<S>)
    -> GcmResult<f64>
where
    B: BasisPolicy + ?Sized,
    S: nd::Data<Elem = f64>,
{
    weighted(index, coeffs, |_, l| policy.reflection_sign(l))
}

/// Reflection parity of a state.
pub fn parity<B, S>(policy: &B, index: &BasisIndex, coeffs: &Arr1<S>)
    -> GcmResult<Parity>
where
    B: BasisPolicy + ?Sized,
    S: nd::Data<Elem = f64>,
{
    reflection(policy, index, coeffs).map(Parity::from_reflection)
}

/// Weighted mean of the angular magnitude (`|m|`, `λ`, or the `y` quanta of
/// the Cartesian basis); conserved on average when the Hamiltonian has the
/// corresponding continuous symmetry.
pub fn mean_angular<B, S>(policy: &B, index: &BasisIndex, coeffs: &Arr1<S>)
    -> GcmResult<f64>
where
    B: BasisPolicy + ?Sized,
    S: nd::Data<Elem = f64>,
{
    weighted(index, coeffs, |_, l| policy.angular_magnitude(l))
}

/// Weighted mean of the oscillator quanta, zero-point included.
pub fn mean_quanta<B, S>(policy: &B, index: &BasisIndex, coeffs: &Arr1<S>)
    -> GcmResult<f64>
where
    B: BasisPolicy + ?Sized,
    S: nd::Data<Elem = f64>,
{
    weighted(index, coeffs, |n, l| policy.quanta(n, l))
}
