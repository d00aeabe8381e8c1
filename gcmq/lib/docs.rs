//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Oscillator basis](#oscillator-basis)
//! - [Matrix elements](#matrix-elements)
//! - [Band diagonalization](#band-diagonalization)
//!
//! # Background
//! The geometric collective model describes quadrupole shapes of a nucleus by
//! the deformation coordinates (*β*, *γ*). Its Hamiltonian is
//! ```text
//!        ħ²
//! H = - ---- ∇² + A β² + B β³ cos 3γ + C β⁴
//!       2 K
//! ```
//! where the coefficients *A*, *B*, *C* and the mass parameter *K* are
//! supplied by a classical potential-surface model. Stationary states are
//! found by expanding in a truncated harmonic-oscillator basis and
//! diagonalizing the resulting matrix.
//!
//! The basis consists of eigenstates of
//! ```text
//!         ħ²       1
//! H₀ = - ---- ∇² + - K ω² β²
//!        2 K       2
//! ```
//! whose natural length is *s* = √(*ħ*/(*K* *ω*)). In the scaled coordinate
//! *r* = *β*/*s*,
//! ```text
//!                     1
//! H = H₀ + (A - - K ω²) s² r² + B s³ r³ cos 3γ + C s⁴ r⁴
//!               2
//! ```
//! so every matrix element splits into an oscillator energy, an angular
//! integral and a radial moment.
//!
//! # Oscillator basis
//! A basis state is a product of a radial function
//! ```text
//! R(r) = N r^λ L_n^α(r²) exp(-r²/2),   N² = 2 n! / Γ(n + α + 1)
//! ```
//! normalized against *r*^(*d* - 1) d*r*, and an angular function of *γ*. Two
//! families are implemented:
//!
//! | family       | *d* | quantum numbers | *λ*   | *α*       | quanta           |
//! |:-------------|:---:|:----------------|:-----:|:---------:|:-----------------|
//! | `polar`      | 2   | (*n*, *m*)      | \|*m*\| | \|*m*\|   | 2*n* + \|*m*\| + 1 |
//! | `collective` | 5   | (*n*, *μ*)      | 3*μ*  | 3*μ* + 3/2 | 2*n* + 3*μ* + 5/2 |
//!
//! A third family, `cartesian`, covers the same planar space with products
//! φ_*n₁*(*x*) φ_*n₂*(*y*) of one-dimensional oscillator functions and *n₁* +
//! *n₂* + 1 quanta. Its matrix elements are sums of products of moments
//! ⟨*n*|*x*^*p*|*n*'⟩, obtained from *x* = (*a* + *a*†)/√2 or by quadrature on
//! a symmetric axis grid; at equal cutoff its spectrum coincides with that of
//! the full `polar` basis.
//!
//! The planar family uses the real functions cos(*mγ*)/√π, 1/√(2π) and
//! sin(|*m*|*γ*)/√π; the five-dimensional family is restricted to zero angular
//! momentum, where the *γ* dependence of seniority *λ* = 3*μ* is a Legendre
//! polynomial in cos 3*γ*.
//!
//! A basis is truncated by the cutoff *E*: every state with at most *E* - 1
//! quanta above the zero point is kept. The normalization constants grow
//! combinatorially with *n* and *α*, so radial functions are always evaluated
//! as `exp(ln N + λ ln r + ln|L| - r²/2)` with the sign of the Laguerre
//! polynomial carried separately.
//!
//! # Matrix elements
//! The angular integrals are closed-form. For the planar family, products of
//! cosines give
//! ```text
//! cos(aγ) cos 3γ = [cos((a + 3)γ) + cos((a - 3)γ)] / 2
//! ```
//! so `cos 3γ` couples |*m*| to |*m*| ± 3 (and *m* to 3 - *m*). For the
//! five-dimensional family it couples *μ* to *μ* ± 1 with
//! ```text
//!                 μ + 1
//! ⟨μ + 1|cos 3γ|μ⟩ = ------------------
//!                 √((2μ + 1)(2μ + 3))
//! ```
//! The radial moments follow from the Laguerre recursion in *x* = *r*²,
//! ```text
//! ⟨n|x|n⟩     = 2n + α + 1
//! ⟨n + 1|x|n⟩ = -√((n + 1)(n + α + 1))
//! ```
//! with ⟨*x*²⟩ as the product of two such tridiagonal factors, and from the
//! connection formula `L_n^α = Σ_j (-1)^j C(3, j) L_(n-j)^(α+3)` for the
//! *λ* → *λ* + 3 moment of *r*³. Alternatively all moments can be integrated
//! numerically on a radial grid; the two agree to quadrature accuracy.
//!
//! # Band diagonalization
//! Ordering states by angular number makes the selection rules confine the
//! matrix to a band. The lowest eigenvalues of a symmetric band matrix *A* are
//! isolated by bisection on the inertia count
//! ```text
//! ν(x) = #{negative pivots of LDLᵀ = A - x I}
//! ```
//! which by Sylvester's law equals the number of eigenvalues below *x*. The
//! corresponding eigenvectors come from a few steps of inverse iteration,
//! ```text
//! (A - λ I) v_(k+1) = v_k
//! ```
//! with vectors of (nearly) degenerate eigenvalues re-orthogonalized against
//! each other.
