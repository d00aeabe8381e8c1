//! Real symmetric band matrices.

use ndarray as nd;
use crate::{
    Arr1,
    error::{ GcmError, GcmResult, LengthError },
};

/// Real symmetric `n × n` matrix with bandwidth `w`.
///
/// Only the upper band is stored: entry `(i, j)` with `i ≤ j ≤ i + w` lives at
/// `data[[i, j - i]]`. Entries with `|i - j| > w` are structurally zero, and
/// reads of `(j, i)` are served from `(i, j)`, so the matrix is symmetric by
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetricBandMatrix {
    n: usize,
    w: usize,
    data: nd::Array2<f64>,
}

impl SymmetricBandMatrix {
    /// Create a zero matrix.
    pub fn new(n: usize, w: usize) -> Self {
        let w = w.min(n.saturating_sub(1));
        Self { n, w, data: nd::Array2::zeros((n, w + 1)) }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize { self.n }

    /// Bandwidth.
    pub fn bandwidth(&self) -> usize { self.w }

    /// Raw upper band storage; row `i` holds `(i, i), (i, i + 1), ...`.
    pub fn band(&self) -> nd::ArrayView2<'_, f64> { self.data.view() }

    /// Set entry `(i, j)` and, implicitly, `(j, i)`.
    ///
    /// Fails if the entry lies outside the band or the matrix.
    pub fn set(&mut self, i: usize, j: usize, val: f64) -> GcmResult<()> {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        (j < self.n && j - i <= self.w).then_some(())
            .ok_or(GcmError::OutsideBand(i, j, self.w))?;
        self.data[[i, j - i]] = val;
        Ok(())
    }

    /// Get entry `(i, j)`; zero outside the band.
    ///
    /// *Panics if either index is out of bounds*.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds");
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        if j - i <= self.w { self.data[[i, j - i]] } else { 0.0 }
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> f64 { self.data.column(0).sum() }

    /// Expand into full storage.
    pub fn to_dense(&self) -> nd::Array2<f64> {
        let mut a: nd::Array2<f64> = nd::Array2::zeros((self.n, self.n));
        for ((i, d), &v) in self.data.indexed_iter() {
            let j = i + d;
            if j < self.n {
                a[[i, j]] = v;
                a[[j, i]] = v;
            }
        }
        a
    }

    /// Matrix-vector product.
    pub fn matvec<S>(&self, x: &Arr1<S>) -> GcmResult<nd::Array1<f64>>
    where S: nd::Data<Elem = f64>
    {
        LengthError::check(self.n, x.len())?;
        let mut y: nd::Array1<f64> = nd::Array1::zeros(self.n);
        for ((i, d), &v) in self.data.indexed_iter() {
            let j = i + d;
            if j >= self.n { continue; }
            y[i] += v * x[j];
            if d > 0 { y[j] += v * x[i]; }
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_storage() {
        let mut m = SymmetricBandMatrix::new(4, 1);
        m.set(0, 0, 2.0).unwrap();
        m.set(1, 0, -1.0).unwrap();
        m.set(2, 3, 5.0).unwrap();
        assert_eq!(m.get(0, 1), -1.0);
        assert_eq!(m.get(3, 2), 5.0);
        assert_eq!(m.get(0, 3), 0.0);
        assert!(matches!(m.set(0, 2, 1.0), Err(GcmError::OutsideBand(0, 2, 1))));
        assert!(m.set(3, 4, 1.0).is_err());
        let a = m.to_dense();
        assert_eq!(a, a.t());
        assert_eq!(m.trace(), 2.0);
    }

    #[test]
    fn matvec_matches_dense() {
        let n = 6;
        let mut m = SymmetricBandMatrix::new(n, 2);
        for i in 0..n {
            for j in i..(i + 3).min(n) {
                m.set(i, j, (1 + i + 2 * j) as f64).unwrap();
            }
        }
        let x: nd::Array1<f64> = (0..n).map(|k| (k as f64).sin()).collect();
        let y = m.matvec(&x).unwrap();
        let yd = m.to_dense().dot(&x);
        for (a, b) in y.iter().zip(&yd) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(m.matvec(&nd::Array1::<f64>::zeros(3)).is_err());
    }

    #[test]
    fn bandwidth_clamped() {
        let m = SymmetricBandMatrix::new(3, 10);
        assert_eq!(m.bandwidth(), 2);
        let e = SymmetricBandMatrix::new(0, 4);
        assert_eq!(e.bandwidth(), 0);
        assert_eq!(e.trace(), 0.0);
    }
}
