//! Enumeration of truncated oscillator bases.
//!
//! Every basis state carries an inner quantum number `n` and an outer quantum
//! number `l`, whose meaning depends on the basis family: radial `n` with the
//! azimuthal `m` of the planar oscillator or the `μ = λ/3` of the
//! five-dimensional one, or the two axis quanta `(n₁, n₂)` of the Cartesian
//! planar oscillator. States
//! are produced by nested ascending loops, angular outside and radial inside,
//! so that the ordering is stable and states sharing `l` are contiguous.

use serde::{ Deserialize, Serialize };

/// Step of the azimuthal quantum number in the planar basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    /// Every `m` is included.
    None,
    /// Only multiples of 3 are included (three-fold symmetric potentials).
    Threefold,
}

impl Symmetry {
    /// Step between allowed `m` values.
    pub fn step(self) -> usize {
        match self {
            Self::None => 1,
            Self::Threefold => 3,
        }
    }
}

/// Reflection class (`γ → -γ`) retained by the planar basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityClass {
    /// `m ≥ 0`; the `cos(mγ)` states.
    Even,
    /// `m < 0`; the `sin(|m|γ)` states.
    Odd,
    /// Both classes.
    Both,
}

impl ParityClass {
    fn admits(self, m: i32) -> bool {
        match self {
            Self::Even => m >= 0,
            Self::Odd => m < 0,
            Self::Both => true,
        }
    }
}

/// An ordered, immutable set of basis states for a fixed energy cutoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisIndex {
    max_e: usize,
    n: Vec<usize>,
    l: Vec<i32>,
    max_n: usize,
    max_l: usize,
}

impl BasisIndex {
    // two passes: count the states first so that the storage is allocated
    // exactly once, then fill it in the same order
    fn enumerate<I, F>(max_e: usize, angular: I, radial_max: F) -> Self
    where
        I: Iterator<Item = i32> + Clone,
        F: Fn(i32) -> Option<usize>,
    {
        let count: usize
            = angular.clone()
            .filter_map(&radial_max)
            .map(|nmax| nmax + 1)
            .sum();
        let mut n: Vec<usize> = Vec::with_capacity(count);
        let mut l: Vec<i32> = Vec::with_capacity(count);
        for lk in angular {
            if let Some(nmax) = radial_max(lk) {
                for nk in 0..=nmax {
                    n.push(nk);
                    l.push(lk);
                }
            }
        }
        debug_assert_eq!(n.len(), count);
        let max_n = n.iter().copied().max().unwrap_or(0);
        let max_l = l.iter().map(|lk| lk.unsigned_abs() as usize).max()
            .unwrap_or(0);
        Self { max_e, n, l, max_n, max_l }
    }

    /// Enumerate planar oscillator states `(n, m)` with
    /// `2n + |m| ≤ max_e - 1`.
    ///
    /// `m` runs in ascending order over multiples of `symmetry.step()`
    /// restricted to `parity`; `max_e = 0` gives an empty basis.
    pub fn polar(max_e: usize, symmetry: Symmetry, parity: ParityClass)
        -> Self
    {
        let e = max_e as i64 - 1;
        let step = symmetry.step() as i64;
        let m_max = if e < 0 { -1 } else { e - e % step };
        let angular
            = (-m_max..=m_max)
            .filter(move |m| m % step == 0)
            .map(|m| m as i32)
            .filter(move |m| parity.admits(*m));
        Self::enumerate(max_e, angular, |m| {
            let rem = e - m.unsigned_abs() as i64;
            (rem >= 0).then_some((rem / 2) as usize)
        })
    }

    /// Enumerate five-dimensional `L = 0` states `(n, μ)` with
    /// `2n + 3μ ≤ max_e - 1`; `max_e = 0` gives an empty basis.
    pub fn collective(max_e: usize) -> Self {
        let e = max_e as i64 - 1;
        let mu_max = if e < 0 { -1 } else { e / 3 };
        Self::enumerate(max_e, (0..=mu_max).map(|mu| mu as i32), |mu| {
            let rem = e - 3 * mu as i64;
            (rem >= 0).then_some((rem / 2) as usize)
        })
    }

    /// Enumerate Cartesian states `(n₁, n₂)` with `n₁ + n₂ ≤ max_e - 1`.
    ///
    /// The `y` quanta `n₂` are stored as the outer ("angular") number and the
    /// `x` quanta `n₁` as the inner one; `max_e = 0` gives an empty basis.
    pub fn cartesian(max_e: usize) -> Self {
        let e = max_e as i64 - 1;
        Self::enumerate(max_e, (0..=e).map(|n2| n2 as i32), |n2| {
            let rem = e - n2 as i64;
            (rem >= 0).then_some(rem as usize)
        })
    }

    /// Energy cutoff the set was generated for.
    pub fn max_e(&self) -> usize { self.max_e }

    /// Number of states.
    pub fn len(&self) -> usize { self.n.len() }

    /// `true` if no state survived the cutoff.
    pub fn is_empty(&self) -> bool { self.n.is_empty() }

    /// Radial quantum number of state `i`.
    pub fn n(&self, i: usize) -> usize { self.n[i] }

    /// Angular quantum number of state `i`.
    pub fn l(&self, i: usize) -> i32 { self.l[i] }

    /// Largest radial quantum number.
    pub fn max_n(&self) -> usize { self.max_n }

    /// Largest magnitude of the angular quantum number.
    pub fn max_l(&self) -> usize { self.max_l }

    /// Iterate over `(n, l)` pairs in basis order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.n.iter().copied().zip(self.l.iter().copied())
    }

    /// Position of the state `(n, l)`, if it is part of the basis.
    pub fn position(&self, n: usize, l: i32) -> Option<usize> {
        self.iter().position(|(nk, lk)| nk == n && lk == l)
    }

    /// Indices of the states with either the largest radial or the largest
    /// angular quantum number; these have the widest spatial extent.
    pub fn extremal_states(&self) -> Vec<usize> {
        self.iter().enumerate()
            .filter(|(_, (n, l))| {
                *n == self.max_n || l.unsigned_abs() as usize == self.max_l
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Smallest bandwidth `w` such that `couples(l_i, l_j)` is false for every
    /// pair with `j - i > w`.
    ///
    /// Only the angular quantum numbers are inspected; all radial states of
    /// two coupled angular blocks are assumed to couple.
    pub fn bandwidth<F>(&self, couples: F) -> usize
    where F: Fn(i32, i32) -> bool
    {
        let n = self.len();
        let mut w: usize = 0;
        for i in 0..n {
            for j in (i + w + 1..n).rev() {
                if couples(self.l[i], self.l[j]) {
                    w = j - i;
                    break;
                }
            }
        }
        w
    }
}
