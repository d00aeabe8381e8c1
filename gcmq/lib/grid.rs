//! Uniform one-dimensional coordinate grids.

use ndarray as nd;
use crate::error::{ GcmError, GcmResult };

/// Uniformly spaced grid over `[min, max]` (closed) or `[min, max)`
/// (half-open).
///
/// For a closed grid of `n` points the step is `(max - min) / (n - 1)`; for a
/// half-open grid it is `(max - min) / n`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Grid {
    min: f64,
    max: f64,
    n: usize,
    step: f64,
    closed: bool,
}

impl Grid {
    /// Create a grid including both endpoints.
    pub fn closed(min: f64, max: f64, n: usize) -> GcmResult<Self> {
        Self::check(min, max, n)?;
        let step = (max - min) / (n - 1) as f64;
        Ok(Self { min, max, n, step, closed: true })
    }

    /// Create a grid excluding the upper endpoint.
    pub fn half_open(min: f64, max: f64, n: usize) -> GcmResult<Self> {
        Self::check(min, max, n)?;
        let step = (max - min) / n as f64;
        Ok(Self { min, max, n, step, closed: false })
    }

    fn check(min: f64, max: f64, n: usize) -> GcmResult<()> {
        (n >= 2 && max > min && min.is_finite() && max.is_finite())
            .then_some(())
            .ok_or(GcmError::BadGrid(n, min, max))
    }

    /// Lower end of the interval.
    pub fn min(&self) -> f64 { self.min }

    /// Upper end of the interval.
    pub fn max(&self) -> f64 { self.max }

    /// Distance between adjacent points.
    pub fn step(&self) -> f64 { self.step }

    /// Number of points.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.n }

    /// Index of the last point.
    pub fn max_index(&self) -> usize { self.n - 1 }

    /// Coordinate of the `i`-th point.
    pub fn coordinate(&self, i: usize) -> f64 {
        if self.closed && i == self.n - 1 {
            self.max
        } else {
            self.min + i as f64 * self.step
        }
    }

    /// Index of the grid point sitting at `x`, if there is one.
    ///
    /// Coordinates within a relative distance of `1e-9` steps of a point are
    /// accepted.
    pub fn index_of(&self, x: f64) -> Option<usize> {
        let t = (x - self.min) / self.step;
        let k = t.round();
        if k < 0.0 || k >= self.n as f64 { return None; }
        ((t - k).abs() < 1e-9).then_some(k as usize)
    }

    /// Iterate over all coordinates.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n).map(|i| self.coordinate(i))
    }

    /// Collect all coordinates into an array.
    pub fn points(&self) -> nd::Array1<f64> { self.iter().collect() }

    /// Trapezoid-rule weights for integrating over the closed interval
    /// spanned by the points.
    pub fn trapz_weights(&self) -> nd::Array1<f64> {
        let mut w: nd::Array1<f64> = nd::Array1::from_elem(self.n, self.step);
        w[0] *= 0.5;
        w[self.n - 1] *= 0.5;
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_mapping() {
        let g = Grid::closed(-1.0, 1.0, 5).unwrap();
        assert_eq!(g.step(), 0.5);
        assert_eq!(g.coordinate(0), -1.0);
        assert_eq!(g.coordinate(4), 1.0);
        assert_eq!(g.index_of(0.5), Some(3));
        assert_eq!(g.index_of(0.25), None);
        assert_eq!(g.index_of(1.5), None);
        for i in 0..g.len() {
            assert_eq!(g.index_of(g.coordinate(i)), Some(i));
        }
    }

    #[test]
    fn half_open_mapping() {
        let g = Grid::half_open(0.0, 1.0, 4).unwrap();
        assert_eq!(g.step(), 0.25);
        assert_eq!(g.coordinate(3), 0.75);
        assert_eq!(g.index_of(1.0), None);
        assert_eq!(g.points().len(), 4);
    }

    #[test]
    fn bad_grids() {
        assert!(Grid::closed(0.0, 1.0, 1).is_err());
        assert!(Grid::closed(1.0, 1.0, 10).is_err());
        assert!(Grid::half_open(0.0, f64::NAN, 10).is_err());
    }

    #[test]
    fn trapz_integrates_linear_exactly() {
        let g = Grid::closed(0.0, 2.0, 11).unwrap();
        let w = g.trapz_weights();
        let s: f64 = g.iter().zip(w.iter()).map(|(x, wk)| x * wk).sum();
        assert!((s - 2.0).abs() < 1e-14);
    }
}
