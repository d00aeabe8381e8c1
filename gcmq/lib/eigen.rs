//! Eigensolver back-ends for symmetric band matrices.
//!
//! [`DenseEigen`] expands the band into full storage and hands it to LAPACK,
//! returning the whole spectrum. [`BandEigen`] never leaves band storage: the
//! lowest eigenvalues are located by bisection on inertia counts
//! ```text
//! ν(x) = #{ negative pivots of LDLᵀ = A - x I } = #{ λ < x }
//! ```
//! (Sylvester's law of inertia), and eigenvectors are obtained by inverse
//! iteration with a partially pivoted band LU factorization.

use ndarray as nd;
use ndarray_linalg::{ self as la, EigValshInto, EighInto };
use rand::{ rngs::StdRng, Rng, SeedableRng };
use crate::{
    band::SymmetricBandMatrix,
    error::GcmResult,
    utils::{ norm, normalize },
};

/// Lowest eigenvalues in ascending order with optional eigenvectors.
///
/// Eigenvectors are stored as rows, in the order of `values`, each normalized
/// with its largest-magnitude component positive.
#[derive(Clone, Debug, PartialEq)]
pub struct EigenPairs {
    pub values: nd::Array1<f64>,
    pub vectors: Option<nd::Array2<f64>>,
}

impl EigenPairs {
    fn empty(n: usize, vectors: bool) -> Self {
        Self {
            values: nd::Array1::zeros(0),
            vectors: vectors.then(|| nd::Array2::zeros((0, n))),
        }
    }
}

/// Diagonalizes a symmetric band matrix.
pub trait EigenSolver: std::fmt::Debug {
    /// Compute the lowest `count` eigenpairs (clamped to the dimension).
    fn solve(&self, mat: &SymmetricBandMatrix, count: usize, vectors: bool)
        -> GcmResult<EigenPairs>;
}

fn fix_sign(mut v: nd::ArrayViewMut1<f64>) {
    let big
        = v.iter().copied()
        .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
    if big < 0.0 { v.mapv_inplace(|x| -x); }
}

/// Full diagonalization through LAPACK.
#[derive(Copy, Clone, Debug, Default)]
pub struct DenseEigen;

impl EigenSolver for DenseEigen {
    fn solve(&self, mat: &SymmetricBandMatrix, count: usize, vectors: bool)
        -> GcmResult<EigenPairs>
    {
        let n = mat.dim();
        let count = count.min(n);
        if count == 0 { return Ok(EigenPairs::empty(n, vectors)); }
        let a = mat.to_dense();
        if vectors {
            let (vals, vecs): (nd::Array1<f64>, nd::Array2<f64>)
                = a.eigh_into(la::UPLO::Upper)?;
            let values = vals.slice(nd::s![..count]).to_owned();
            let mut rows = vecs.slice(nd::s![.., ..count]).t().to_owned();
            rows.outer_iter_mut().for_each(fix_sign);
            Ok(EigenPairs { values, vectors: Some(rows) })
        } else {
            let vals: nd::Array1<f64> = a.eigvalsh_into(la::UPLO::Upper)?;
            Ok(EigenPairs {
                values: vals.slice(nd::s![..count]).to_owned(),
                vectors: None,
            })
        }
    }
}

/// Partial diagonalization in band storage.
#[derive(Copy, Clone, Debug)]
pub struct BandEigen {
    /// Relative width at which bisection stops (default: `1e-14`).
    pub tol: f64,
    /// Inverse iteration sweeps per eigenvector (default: `5`).
    pub iterations: usize,
    /// Seed for the random start vectors of inverse iteration.
    pub seed: u64,
}

impl Default for BandEigen {
    fn default() -> Self { Self { tol: 1e-14, iterations: 5, seed: 10958 } }
}

// Gershgorin interval containing the whole spectrum
fn gershgorin(mat: &SymmetricBandMatrix) -> (f64, f64) {
    let n = mat.dim();
    let band = mat.band();
    let mut radius: nd::Array1<f64> = nd::Array1::zeros(n);
    for ((i, d), v) in band.indexed_iter() {
        if d == 0 || i + d >= n { continue; }
        radius[i] += v.abs();
        radius[i + d] += v.abs();
    }
    band.column(0).iter().zip(&radius)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, r)| {
            (lo.min(a - r), hi.max(a + r))
        })
}

// working storage for repeated LDLᵀ inertia counts
struct Inertia<'m> {
    band: nd::ArrayView2<'m, f64>,
    n: usize,
    w: usize,
    pivmin: f64,
    // l[[i, k + w - i]] = L_ik for i - w ≤ k < i
    l: nd::Array2<f64>,
    d: Vec<f64>,
}

impl<'m> Inertia<'m> {
    fn new(mat: &'m SymmetricBandMatrix, pivmin: f64) -> Self {
        let n = mat.dim();
        let w = mat.bandwidth();
        Self {
            band: mat.band(),
            n,
            w,
            pivmin,
            l: nd::Array2::zeros((n, w)),
            d: vec![0.0; n],
        }
    }

    // number of eigenvalues below x
    fn count(&mut self, x: f64) -> usize {
        let Self { band, n, w, pivmin, l, d } = self;
        let (n, w, pivmin) = (*n, *w, *pivmin);
        let mut neg: usize = 0;
        for i in 0..n {
            let j0 = i.saturating_sub(w);
            for j in j0..i {
                let mut s = band[[j, i - j]];
                for k in j0..j {
                    s -= l[[i, k + w - i]] * d[k] * l[[j, k + w - j]];
                }
                l[[i, j + w - i]] = s / d[j];
            }
            let mut di = band[[i, 0]] - x;
            for k in j0..i {
                let lik = l[[i, k + w - i]];
                di -= lik * lik * d[k];
            }
            if di.abs() < pivmin { di = -pivmin; }
            if di < 0.0 { neg += 1; }
            d[i] = di;
        }
        neg
    }
}

// LU factorization of A - σI with partial pivoting; U has bandwidth 2w and
// entry (r, c) is stored at ab[[r, c + w - r]]
struct BandLu {
    n: usize,
    w: usize,
    ab: nd::Array2<f64>,
    mults: nd::Array2<f64>,
    piv: Vec<usize>,
}

impl BandLu {
    fn factor(mat: &SymmetricBandMatrix, shift: f64, tiny: f64) -> Self {
        let n = mat.dim();
        let w = mat.bandwidth();
        let mut ab: nd::Array2<f64> = nd::Array2::zeros((n, 3 * w + 1));
        for r in 0..n {
            for c in r.saturating_sub(w)..=(r + w).min(n - 1) {
                ab[[r, c + w - r]] = mat.get(r, c) - if r == c { shift } else { 0.0 };
            }
        }
        let mut mults: nd::Array2<f64> = nd::Array2::zeros((n, w));
        let mut piv: Vec<usize> = (0..n).collect();
        for j in 0..n {
            let last = (j + w).min(n - 1);
            let cend = (j + 2 * w).min(n - 1);
            let p
                = (j..=last)
                .max_by(|&a, &b| {
                    ab[[a, j + w - a]].abs().total_cmp(&ab[[b, j + w - b]].abs())
                })
                .unwrap_or(j);
            piv[j] = p;
            if p != j {
                for c in j..=cend {
                    let t = ab[[j, c + w - j]];
                    ab[[j, c + w - j]] = ab[[p, c + w - p]];
                    ab[[p, c + w - p]] = t;
                }
            }
            let mut pivot = ab[[j, w]];
            if pivot.abs() < tiny {
                pivot = if pivot < 0.0 { -tiny } else { tiny };
                ab[[j, w]] = pivot;
            }
            for i in j + 1..=last {
                let m = ab[[i, j + w - i]] / pivot;
                mults[[j, i - j - 1]] = m;
                ab[[i, j + w - i]] = 0.0;
                if m == 0.0 { continue; }
                for c in j + 1..=cend {
                    ab[[i, c + w - i]] -= m * ab[[j, c + w - j]];
                }
            }
        }
        Self { n, w, ab, mults, piv }
    }

    // overwrite b with the solution of (A - σI) x = b
    fn solve(&self, b: &mut nd::Array1<f64>) {
        let (n, w) = (self.n, self.w);
        for j in 0..n {
            let p = self.piv[j];
            if p != j { b.swap(j, p); }
            let bj = b[j];
            for i in j + 1..=(j + w).min(n - 1) {
                b[i] -= self.mults[[j, i - j - 1]] * bj;
            }
        }
        for j in (0..n).rev() {
            let mut s = b[j];
            for c in j + 1..=(j + 2 * w).min(n - 1) {
                s -= self.ab[[j, c + w - j]] * b[c];
            }
            b[j] = s / self.ab[[j, w]];
        }
    }
}

impl BandEigen {
    fn bisect(
        &self,
        inertia: &mut Inertia,
        k: usize,
        (lo, hi): (f64, f64),
        tol: f64,
    ) -> f64
    {
        let (mut a, mut b) = (lo, hi);
        for _ in 0..256 {
            if b - a <= tol { break; }
            let mid = 0.5 * (a + b);
            if inertia.count(mid) > k { b = mid; } else { a = mid; }
        }
        0.5 * (a + b)
    }

    fn random_unit(rng: &mut StdRng, n: usize) -> nd::Array1<f64> {
        let mut v: nd::Array1<f64>
            = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        normalize(&mut v);
        v
    }

    fn vectors(
        &self,
        mat: &SymmetricBandMatrix,
        values: &nd::Array1<f64>,
        scale: f64,
    ) -> nd::Array2<f64>
    {
        let n = mat.dim();
        let tiny = f64::EPSILON * scale;
        let cluster_tol = 1e-3 * scale;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out: nd::Array2<f64> = nd::Array2::zeros((values.len(), n));
        let mut cluster_start: usize = 0;
        for (k, &lam) in values.iter().enumerate() {
            if k > 0 && lam - values[k - 1] > cluster_tol { cluster_start = k; }
            let lu = BandLu::factor(mat, lam, tiny);
            let mut v = Self::random_unit(&mut rng, n);
            for _ in 0..self.iterations.max(1) {
                lu.solve(&mut v);
                // twice for numerical orthogonality
                for _ in 0..2 {
                    for prev in out.slice(nd::s![cluster_start..k, ..]).outer_iter() {
                        let proj = prev.dot(&v);
                        v.scaled_add(-proj, &prev);
                    }
                }
                let nrm: f64 = norm(&v);
                if nrm.is_finite() && nrm > 0.0 {
                    v /= nrm;
                } else {
                    v = Self::random_unit(&mut rng, n);
                }
            }
            fix_sign(v.view_mut());
            out.row_mut(k).assign(&v);
        }
        out
    }
}

impl EigenSolver for BandEigen {
    fn solve(&self, mat: &SymmetricBandMatrix, count: usize, vectors: bool)
        -> GcmResult<EigenPairs>
    {
        let n = mat.dim();
        let count = count.min(n);
        if count == 0 { return Ok(EigenPairs::empty(n, vectors)); }
        let (lo, hi) = gershgorin(mat);
        let scale = lo.abs().max(hi.abs()).max(f64::MIN_POSITIVE.sqrt());
        let pivmin = scale * f64::EPSILON.powi(2);
        let pad = 2.0 * n as f64 * f64::EPSILON * scale + pivmin;
        let bounds = (lo - pad, hi + pad);
        let tol = self.tol * scale;
        let mut inertia = Inertia::new(mat, pivmin);
        let mut values: Vec<f64>
            = (0..count)
            .map(|k| self.bisect(&mut inertia, k, bounds, tol))
            .collect();
        values.sort_by(f64::total_cmp);
        let values = nd::Array1::from(values);
        let vectors = vectors.then(|| self.vectors(mat, &values, scale));
        Ok(EigenPairs { values, vectors })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;

    fn laplacian(n: usize) -> SymmetricBandMatrix {
        let mut m = SymmetricBandMatrix::new(n, 1);
        for i in 0..n {
            m.set(i, i, 2.0).unwrap();
            if i + 1 < n { m.set(i, i + 1, -1.0).unwrap(); }
        }
        m
    }

    fn check_pairs(mat: &SymmetricBandMatrix, pairs: &EigenPairs, tol: f64) {
        let vecs = pairs.vectors.as_ref().unwrap();
        assert_eq!(vecs.nrows(), pairs.values.len());
        for (v, lam) in vecs.outer_iter().zip(&pairs.values) {
            let av = mat.matvec(&v).unwrap();
            let res = (&av - &(&v * *lam)).mapv(f64::abs).fold(0.0, |a: f64, b| a.max(*b));
            assert!(res < tol, "residual {res} at {lam}");
        }
        let gram = vecs.dot(&vecs.t());
        for ((i, j), g) in gram.indexed_iter() {
            let expect = if i == j { 1.0 } else { 0.0 };
            assert!((g - expect).abs() < tol, "gram[{i}, {j}] = {g}");
        }
    }

    #[test]
    fn laplacian_spectrum() {
        let n = 8;
        let mat = laplacian(n);
        let exact: Vec<f64>
            = (1..=n)
            .map(|k| 2.0 - 2.0 * (k as f64 * PI / (n + 1) as f64).cos())
            .collect();
        let solvers: [&dyn EigenSolver; 2] = [&DenseEigen, &BandEigen::default()];
        for solver in solvers {
            let pairs = solver.solve(&mat, 5, true).unwrap();
            assert_eq!(pairs.values.len(), 5);
            for (got, want) in pairs.values.iter().zip(&exact) {
                assert!((got - want).abs() < 1e-9, "{solver:?}: {got} vs {want}");
            }
            check_pairs(&mat, &pairs, 1e-8);
        }
    }

    #[test]
    fn degenerate_diagonal() {
        let diag = [3.0, 1.0, 2.0, 1.0, 3.0, 3.0];
        let mut mat = SymmetricBandMatrix::new(diag.len(), 2);
        for (i, d) in diag.iter().enumerate() { mat.set(i, i, *d).unwrap(); }
        let pairs = BandEigen::default().solve(&mat, 6, true).unwrap();
        let want = [1.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        for (got, w) in pairs.values.iter().zip(want) {
            assert!((got - w).abs() < 1e-9);
        }
        check_pairs(&mat, &pairs, 1e-8);
    }

    #[test]
    fn values_only_and_clamping() {
        let mat = laplacian(4);
        let pairs = BandEigen::default().solve(&mat, 10, false).unwrap();
        assert_eq!(pairs.values.len(), 4);
        assert!(pairs.vectors.is_none());
        let none = DenseEigen.solve(&mat, 0, true).unwrap();
        assert_eq!(none.values.len(), 0);
        assert_eq!(none.vectors.map(|v| v.dim()), Some((0, 4)));
    }

    #[test]
    fn wide_band_matches_dense() {
        let n = 30;
        let w = 4;
        let mut mat = SymmetricBandMatrix::new(n, w);
        for i in 0..n {
            for j in i..(i + w + 1).min(n) {
                let v
                    = if i == j {
                        i as f64 * 0.7 - 3.0
                    } else {
                        ((i * 7 + j * 3) as f64).sin() / (j - i) as f64
                    };
                mat.set(i, j, v).unwrap();
            }
        }
        let dense = DenseEigen.solve(&mat, 8, true).unwrap();
        let band = BandEigen::default().solve(&mat, 8, true).unwrap();
        for (a, b) in dense.values.iter().zip(&band.values) {
            assert!((a - b).abs() < 1e-9);
        }
        check_pairs(&mat, &band, 1e-8);
    }
}
