//! Basis families and the capabilities the assembler needs from them.
//!
//! Two shapes of basis state are supported. Most families are a product of a
//! radial oscillator function
//! ```text
//! R(r) = N r^λ L_n^α(r²) exp(-r²/2)
//! ```
//! and an angular function of γ ([`RadialAngular`]); they differ in the
//! dimension of the radial measure, in how `(α, λ)` follow from the angular
//! quantum number, and in the angular functions themselves. The Cartesian
//! family instead takes products `φ_n₁(x) φ_n₂(y)` of one-dimensional
//! oscillator functions with two independent quantum numbers. Everything else
//! (quadrature, recursion identities, eigensolvers) is shared and reaches the
//! family only through [`BasisPolicy`] and its [`Separation`].

use std::f64::consts::PI;
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ GcmError, GcmResult },
    index::{ BasisIndex, ParityClass, Symmetry },
    special,
};

/// Angular dependence of a potential term.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// Independent of γ.
    Isotropic,
    /// Proportional to `cos 3γ`.
    Cos3Gamma,
}

impl Term {
    pub const ALL: [Term; 2] = [Term::Isotropic, Term::Cos3Gamma];
}

/// How the states of a family factorize.
#[derive(Copy, Clone, Debug)]
pub enum Separation<'a> {
    /// `R(r) Y(γ)`.
    RadialAngular(&'a dyn RadialAngular),
    /// `φ_n(x) φ_l(y)`.
    Cartesian(&'a CartesianBasis),
}

/// Everything the matrix assembler, the eigensolver driver and the
/// post-processing need to know about a basis family.
pub trait BasisPolicy: std::fmt::Debug + Send + Sync {
    /// Short family name used in messages.
    fn name(&self) -> &'static str;

    /// Dimension `d` of the configuration space.
    fn dimension(&self) -> usize;

    /// Enumerate the states below the cutoff.
    fn generate(&self, max_e: usize) -> BasisIndex;

    /// Oscillator energy of state `(n, l)` in units of `ħω`, zero-point
    /// included.
    fn quanta(&self, n: usize, l: i32) -> f64;

    /// Selection rule on the outer quantum number: `false` only if every
    /// matrix element of `term` between blocks `l_i` and `l_j` vanishes
    /// identically.
    fn couples(&self, term: Term, li: i32, lj: i32) -> bool;

    /// Eigenvalue (`±1`) of the reflection `γ → -γ` on states with outer
    /// number `l`.
    fn reflection_sign(&self, _l: i32) -> f64 { 1.0 }

    /// Magnitude of the quantity carried by the outer number `l`.
    fn angular_magnitude(&self, l: i32) -> f64;

    /// Factorization of the states.
    fn separation(&self) -> Separation<'_>;

    /// Normalized state `(n, l)` at the scaled point `(x, y)` of the
    /// `(β cos γ, β sin γ)` plane.
    fn value(&self, n: usize, l: i32, x: f64, y: f64) -> f64 {
        match self.separation() {
            Separation::RadialAngular(ra) => {
                let r = x.hypot(y);
                ra.radial(n, l, r) * ra.angular_value(l, y.atan2(x))
            },
            Separation::Cartesian(_) => {
                special::hermite_function(n, x)
                    * special::hermite_function(l.unsigned_abs() as usize, y)
            },
        }
    }

    /// `true` if any potential term couples `l_i` and `l_j`.
    fn couples_any(&self, li: i32, lj: i32) -> bool {
        Term::ALL.iter().any(|term| self.couples(*term, li, lj))
    }

    /// Matrix bandwidth implied by the selection rules over `index`.
    fn bandwidth(&self, index: &BasisIndex) -> usize {
        index.bandwidth(|li, lj| self.couples_any(li, lj))
    }
}

/// Families whose states are a radial oscillator function times an angular
/// function; the radial measure is `r^(d-1) dr`.
pub trait RadialAngular: BasisPolicy {
    /// Laguerre index `α` of the radial functions with angular number `l`.
    fn alpha(&self, l: i32) -> f64;

    /// Power `λ` of the radial prefactor for angular number `l`.
    fn lambda(&self, l: i32) -> f64;

    /// Closed-form angular matrix element of `term` between normalized
    /// angular functions.
    fn angular_element(&self, term: Term, li: i32, lj: i32) -> f64;

    /// Value of the normalized angular function of `l` at `gamma`.
    fn angular_value(&self, l: i32, gamma: f64) -> f64;

    /// Succeeds if matrix elements can be built from the recursion identities,
    /// which need every angular coupling to shift `λ` by exactly 3.
    fn check_algebraic(&self) -> GcmResult<()>;

    /// Normalized radial function of state `(n, l)` at scaled radius `r`.
    fn radial(&self, n: usize, l: i32, r: f64) -> f64 {
        special::radial(n, self.alpha(l), self.lambda(l), r)
    }
}

/// Two-dimensional oscillator in polar coordinates `(β, γ)` with real angular
/// functions
/// ```text
/// m > 0:  cos(mγ) / √π
/// m = 0:  1 / √(2π)
/// m < 0:  sin(|m|γ) / √π
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PolarBasis {
    pub symmetry: Symmetry,
    pub parity: ParityClass,
}

impl PolarBasis {
    fn norm(m: i32) -> f64 {
        if m == 0 { (2.0 * PI).sqrt().recip() } else { PI.sqrt().recip() }
    }
}

impl BasisPolicy for PolarBasis {
    fn name(&self) -> &'static str { "polar" }

    fn dimension(&self) -> usize { 2 }

    fn generate(&self, max_e: usize) -> BasisIndex {
        BasisIndex::polar(max_e, self.symmetry, self.parity)
    }

    fn quanta(&self, n: usize, l: i32) -> f64 {
        (2 * n) as f64 + l.unsigned_abs() as f64 + 1.0
    }

    fn couples(&self, term: Term, li: i32, lj: i32) -> bool {
        match term {
            Term::Isotropic => li == lj,
            Term::Cos3Gamma => {
                let (a, b) = (li.abs(), lj.abs());
                (li >= 0) == (lj >= 0) && ((a - b).abs() == 3 || a + b == 3)
            },
        }
    }

    fn reflection_sign(&self, l: i32) -> f64 {
        if l >= 0 { 1.0 } else { -1.0 }
    }

    fn angular_magnitude(&self, l: i32) -> f64 { l.unsigned_abs() as f64 }

    fn separation(&self) -> Separation<'_> { Separation::RadialAngular(self) }
}

impl RadialAngular for PolarBasis {
    fn alpha(&self, l: i32) -> f64 { l.unsigned_abs() as f64 }

    fn lambda(&self, l: i32) -> f64 { l.unsigned_abs() as f64 }

    fn angular_element(&self, term: Term, li: i32, lj: i32) -> f64 {
        match term {
            Term::Isotropic => if li == lj { 1.0 } else { 0.0 },
            // cos(aγ) cos 3γ = [cos((a + 3)γ) + cos((a - 3)γ)] / 2, and
            // likewise for the sine functions
            Term::Cos3Gamma if li >= 0 && lj >= 0 => {
                let (a, b) = (li, lj);
                let hits = [b == a + 3, b == a - 3, b == 3 - a].into_iter()
                    .filter(|hit| *hit)
                    .count();
                Self::norm(a) * Self::norm(b) * PI / 2.0 * hits as f64
            },
            Term::Cos3Gamma if li < 0 && lj < 0 => {
                let (a, b) = (-li, -lj);
                let hits = i32::from(b == a + 3) + i32::from(b == a - 3)
                    - i32::from(b == 3 - a);
                hits as f64 / 2.0
            },
            Term::Cos3Gamma => 0.0,
        }
    }

    fn angular_value(&self, l: i32, gamma: f64) -> f64 {
        match l {
            0 => Self::norm(0),
            m if m > 0 => Self::norm(m) * (m as f64 * gamma).cos(),
            m => Self::norm(m) * ((-m) as f64 * gamma).sin(),
        }
    }

    fn check_algebraic(&self) -> GcmResult<()> {
        match self.symmetry {
            Symmetry::Threefold => Ok(()),
            Symmetry::None => Err(GcmError::Unsupported {
                family: self.name(),
                what: "algebraic assembly without three-fold symmetry"
                    .into(),
            }),
        }
    }
}

/// Five-dimensional oscillator restricted to zero angular momentum.
///
/// States carry `(n, μ)` with seniority `λ = 3μ`; the γ dependence is the
/// Legendre function `√(3(2μ + 1)/2) P_μ(cos 3γ)`, normalized against
/// `|sin 3γ| dγ` on `[0, π/3]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectiveBasis;

impl BasisPolicy for CollectiveBasis {
    fn name(&self) -> &'static str { "collective" }

    fn dimension(&self) -> usize { 5 }

    fn generate(&self, max_e: usize) -> BasisIndex {
        BasisIndex::collective(max_e)
    }

    fn quanta(&self, n: usize, l: i32) -> f64 {
        (2 * n) as f64 + 3.0 * l as f64 + 2.5
    }

    fn couples(&self, term: Term, li: i32, lj: i32) -> bool {
        match term {
            Term::Isotropic => li == lj,
            Term::Cos3Gamma => (li - lj).abs() == 1,
        }
    }

    fn angular_magnitude(&self, l: i32) -> f64 { 3.0 * l as f64 }

    fn separation(&self) -> Separation<'_> { Separation::RadialAngular(self) }
}

impl RadialAngular for CollectiveBasis {
    fn alpha(&self, l: i32) -> f64 { 3.0 * l as f64 + 1.5 }

    fn lambda(&self, l: i32) -> f64 { 3.0 * l as f64 }

    fn angular_element(&self, term: Term, li: i32, lj: i32) -> f64 {
        match term {
            Term::Isotropic => if li == lj { 1.0 } else { 0.0 },
            Term::Cos3Gamma if (li - lj).abs() == 1 => {
                let mu = li.min(lj) as f64;
                (mu + 1.0) / ((2.0 * mu + 1.0) * (2.0 * mu + 3.0)).sqrt()
            },
            Term::Cos3Gamma => 0.0,
        }
    }

    fn angular_value(&self, l: i32, gamma: f64) -> f64 {
        let mu = l.unsigned_abs() as usize;
        (1.5 * (2 * mu + 1) as f64).sqrt()
            * special::legendre(mu, (3.0 * gamma).cos())
    }

    fn check_algebraic(&self) -> GcmResult<()> { Ok(()) }
}

/// Two-dimensional oscillator in Cartesian coordinates
/// `(x, y) = (β cos γ, β sin γ)`.
///
/// States `φ_n₁(x) φ_n₂(y)` carry the two independent axis quanta; the index
/// stores `n₁` as `n` and `n₂` as `l`. In these coordinates the potential is a
/// polynomial,
/// ```text
/// β² = x² + y²,   β⁴ = x⁴ + 2x²y² + y⁴,   β³ cos 3γ = x³ - 3xy²
/// ```
/// so every matrix element is a sum of products of one-dimensional moments
/// `⟨n|x^p|n'⟩`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CartesianBasis;

impl CartesianBasis {
    /// Expansion of the term `(term, power)` into monomials
    /// `coeff · x^a y^b`, or `None` if the term is not a polynomial in this
    /// family's coordinates.
    pub fn monomials(term: Term, power: i32) -> Option<&'static [(f64, usize, usize)]> {
        match (term, power) {
            (Term::Isotropic, 2) => Some(&[(1.0, 2, 0), (1.0, 0, 2)]),
            (Term::Isotropic, 4) => Some(&[(1.0, 4, 0), (2.0, 2, 2), (1.0, 0, 4)]),
            (Term::Cos3Gamma, 3) => Some(&[(1.0, 3, 0), (-3.0, 1, 2)]),
            _ => None,
        }
    }
}

impl BasisPolicy for CartesianBasis {
    fn name(&self) -> &'static str { "cartesian" }

    fn dimension(&self) -> usize { 2 }

    fn generate(&self, max_e: usize) -> BasisIndex {
        BasisIndex::cartesian(max_e)
    }

    fn quanta(&self, n: usize, l: i32) -> f64 {
        n as f64 + l as f64 + 1.0
    }

    // even powers of y only: x², x⁴ and x²y² for the isotropic terms, x³ and
    // xy² for cos 3γ
    fn couples(&self, term: Term, li: i32, lj: i32) -> bool {
        let d = (li - lj).abs();
        match term {
            Term::Isotropic => d % 2 == 0 && d <= 4,
            Term::Cos3Gamma => d % 2 == 0 && d <= 2,
        }
    }

    fn reflection_sign(&self, l: i32) -> f64 {
        if l % 2 == 0 { 1.0 } else { -1.0 }
    }

    /// Quanta along `y`.
    fn angular_magnitude(&self, l: i32) -> f64 { l as f64 }

    fn separation(&self) -> Separation<'_> { Separation::Cartesian(self) }
}

/// Serializable choice of basis family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum BasisFamily {
    Polar {
        #[serde(default = "default_symmetry")]
        symmetry: Symmetry,
        #[serde(default = "default_parity")]
        parity: ParityClass,
    },
    Collective,
    Cartesian,
}

fn default_symmetry() -> Symmetry { Symmetry::Threefold }

fn default_parity() -> ParityClass { ParityClass::Both }

impl Default for BasisFamily {
    fn default() -> Self {
        Self::Polar { symmetry: default_symmetry(), parity: default_parity() }
    }
}

impl BasisFamily {
    /// Build the policy object for this family.
    pub fn policy(&self) -> Box<dyn BasisPolicy> {
        match *self {
            Self::Polar { symmetry, parity } => {
                Box::new(PolarBasis { symmetry, parity })
            },
            Self::Collective => Box::new(CollectiveBasis),
            Self::Cartesian => Box::new(CartesianBasis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ∫ f(γ) dγ by composite Simpson
    fn integrate<F: Fn(f64) -> f64>(a: f64, b: f64, f: F) -> f64 {
        let n = 20_000;
        let h = (b - a) / n as f64;
        let inner: f64
            = (1..n)
            .map(|k| {
                let w = if k % 2 == 1 { 4.0 } else { 2.0 };
                w * f(a + k as f64 * h)
            })
            .sum();
        (f(a) + inner + f(b)) * h / 3.0
    }

    #[test]
    fn polar_angular_elements_match_integrals() {
        let basis = PolarBasis {
            symmetry: Symmetry::None,
            parity: ParityClass::Both,
        };
        for li in -7..=7 {
            for lj in -7..=7 {
                for term in Term::ALL {
                    let factor = |g: f64| match term {
                        Term::Isotropic => 1.0,
                        Term::Cos3Gamma => (3.0 * g).cos(),
                    };
                    let num = integrate(0.0, 2.0 * PI, |g| {
                        basis.angular_value(li, g) * factor(g)
                            * basis.angular_value(lj, g)
                    });
                    let closed = basis.angular_element(term, li, lj);
                    assert!(
                        (num - closed).abs() < 1e-8,
                        "{term:?} ({li}, {lj}): {num} vs {closed}",
                    );
                    if closed.abs() > 1e-12 {
                        assert!(basis.couples(term, li, lj));
                    }
                }
            }
        }
    }

    #[test]
    fn collective_angular_elements_match_integrals() {
        let basis = CollectiveBasis;
        for li in 0..6 {
            for lj in 0..6 {
                for term in Term::ALL {
                    let factor = |g: f64| match term {
                        Term::Isotropic => 1.0,
                        Term::Cos3Gamma => (3.0 * g).cos(),
                    };
                    let num = integrate(0.0, PI / 3.0, |g| {
                        basis.angular_value(li, g) * factor(g)
                            * basis.angular_value(lj, g) * (3.0 * g).sin()
                    });
                    let closed = basis.angular_element(term, li, lj);
                    assert!(
                        (num - closed).abs() < 1e-8,
                        "{term:?} ({li}, {lj}): {num} vs {closed}",
                    );
                }
            }
        }
    }

    #[test]
    fn algebraic_support() {
        let threefold = PolarBasis {
            symmetry: Symmetry::Threefold,
            parity: ParityClass::Even,
        };
        assert!(threefold.check_algebraic().is_ok());
        let full = PolarBasis {
            symmetry: Symmetry::None,
            parity: ParityClass::Even,
        };
        assert!(matches!(
            full.check_algebraic(),
            Err(GcmError::Unsupported { family: "polar", .. }),
        ));
        assert!(CollectiveBasis.check_algebraic().is_ok());
    }

    #[test]
    fn family_builds_policy() {
        let policy = BasisFamily::default().policy();
        assert_eq!(policy.name(), "polar");
        assert_eq!(policy.generate(7).len(), 10);
        let policy = BasisFamily::Collective.policy();
        assert_eq!(policy.dimension(), 5);
        assert_eq!(policy.quanta(1, 1), 7.5);
        let policy = BasisFamily::Cartesian.policy();
        assert_eq!(policy.name(), "cartesian");
        assert_eq!(policy.generate(7).len(), 28);
        assert_eq!(policy.quanta(2, 3), 6.0);
    }

    #[test]
    fn cartesian_and_polar_values_span_the_same_shell() {
        // the N = 1 shell: φ₁(x)φ₀(y) = √2 x g, φ₀(x)φ₁(y) = √2 y g
        let polar = PolarBasis { symmetry: Symmetry::None, parity: ParityClass::Both };
        let cart = CartesianBasis;
        for (x, y) in [(0.3, -0.8), (1.2, 0.4), (-0.5, 0.0)] {
            let g = (-(x * x + y * y) / 2.0_f64).exp() / PI.sqrt();
            assert!((cart.value(1, 0, x, y) - 2.0_f64.sqrt() * x * g).abs() < 1e-14);
            assert!((cart.value(0, 1, x, y) - 2.0_f64.sqrt() * y * g).abs() < 1e-14);
            // cos γ and sin γ partners of the same shell
            assert!((polar.value(0, 1, x, y) - cart.value(1, 0, x, y)).abs() < 1e-13);
            assert!((polar.value(0, -1, x, y) - cart.value(0, 1, x, y)).abs() < 1e-13);
        }
    }

    #[test]
    fn cartesian_monomials_reproduce_potential() {
        let (x, y): (f64, f64) = (0.7, -0.4);
        let (r, gamma) = (x.hypot(y), y.atan2(x));
        let eval = |term, power| -> f64 {
            CartesianBasis::monomials(term, power).unwrap().iter()
                .map(|(c, a, b)| c * x.powi(*a as i32) * y.powi(*b as i32))
                .sum()
        };
        assert!((eval(Term::Isotropic, 2) - r.powi(2)).abs() < 1e-14);
        assert!((eval(Term::Isotropic, 4) - r.powi(4)).abs() < 1e-14);
        assert!((eval(Term::Cos3Gamma, 3) - r.powi(3) * (3.0 * gamma).cos()).abs() < 1e-14);
        assert!(CartesianBasis::monomials(Term::Cos3Gamma, 2).is_none());
        assert!(CartesianBasis.couples(Term::Isotropic, 0, 4));
        assert!(!CartesianBasis.couples(Term::Cos3Gamma, 0, 4));
        assert!(!CartesianBasis.couples(Term::Isotropic, 1, 2));
    }
}
