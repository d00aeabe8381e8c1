//! Tables of basis functions sampled on a grid, and the two-slot window that
//! keeps at most two of them alive during assembly.

use std::ops::Range;
use ndarray as nd;
use crate::grid::Grid;

/// Values of `f(i, x)` for every basis index `i` in a contiguous range and
/// every point `x` of a grid.
///
/// Queries outside the cached range, or off the grid, fall back to calling
/// `f` directly, so the cache never changes the value returned.
#[derive(Clone, Debug)]
pub struct BasisCache<'f, F>
where F: Fn(usize, f64) -> f64
{
    grid: Grid,
    range: Range<usize>,
    table: nd::Array2<f64>,
    f: &'f F,
}

impl<'f, F> BasisCache<'f, F>
where F: Fn(usize, f64) -> f64
{
    /// Evaluate `f` for indices `start..end` over `grid`.
    pub fn build(grid: Grid, start: usize, end: usize, f: &'f F) -> Self {
        let end = end.max(start);
        let points = grid.points();
        let mut table: nd::Array2<f64>
            = nd::Array2::zeros((end - start, grid.len()));
        table.outer_iter_mut()
            .zip(start..end)
            .for_each(|(mut row, i)| {
                row.iter_mut().zip(&points)
                    .for_each(|(v, x)| { *v = f(i, *x); });
            });
        Self { grid, range: start..end, table, f }
    }

    /// Grid the table was built against.
    pub fn grid(&self) -> &Grid { &self.grid }

    /// Cached basis indices.
    pub fn range(&self) -> Range<usize> { self.range.clone() }

    /// `true` if basis index `i` is cached.
    pub fn contains(&self, i: usize) -> bool { self.range.contains(&i) }

    /// Cached samples of basis index `i`, if present.
    pub fn row(&self, i: usize) -> Option<nd::ArrayView1<'_, f64>> {
        self.contains(i).then(|| self.table.row(i - self.range.start))
    }

    /// Value of basis function `i` at `x`.
    pub fn value(&self, i: usize, x: f64) -> f64 {
        match (self.contains(i), self.grid.index_of(x)) {
            (true, Some(k)) => self.table[[i - self.range.start, k]],
            _ => (self.f)(i, x),
        }
    }

    /// For every cached row, the first grid index whose magnitude is at least
    /// `eps`.
    ///
    /// Rows that never reach `eps` report the last grid index.
    pub fn lower_limits(&self, eps: f64) -> Vec<usize> {
        let max = self.grid.max_index();
        self.table.outer_iter()
            .map(|row| {
                row.iter().position(|v| v.abs() >= eps).unwrap_or(max)
            })
            .collect()
    }

    /// For every cached row, the last grid index whose magnitude is at least
    /// `eps`.
    ///
    /// Rows that never reach `eps` report index 0.
    pub fn upper_limits(&self, eps: f64) -> Vec<usize> {
        self.table.outer_iter()
            .map(|row| {
                row.iter().rposition(|v| v.abs() >= eps).unwrap_or(0)
            })
            .collect()
    }
}

/// Bounded buffer holding at most two blocks, keyed by block number.
///
/// Block `b` lives in slot `b % 2`; inserting it evicts whatever occupied the
/// slot, which during a forward sweep is always block `b - 2`.
#[derive(Debug)]
pub struct BlockWindow<T> {
    slots: [Option<(usize, T)>; 2],
}

impl<T> Default for BlockWindow<T> {
    fn default() -> Self { Self { slots: [None, None] } }
}

impl<T> BlockWindow<T> {
    pub fn new() -> Self { Self::default() }

    /// Store block `b`, returning the block it displaced, if any.
    pub fn insert(&mut self, b: usize, block: T) -> Option<(usize, T)> {
        self.slots[b % 2].replace((b, block))
    }

    /// Borrow block `b` if it is resident.
    pub fn get(&self, b: usize) -> Option<&T> {
        match &self.slots[b % 2] {
            Some((key, block)) if *key == b => Some(block),
            _ => None,
        }
    }

    /// Borrow blocks `b` and `b + 1` together.
    pub fn pair(&self, b: usize) -> (Option<&T>, Option<&T>) {
        (self.get(b), self.get(b + 1))
    }

    /// Drop block `b` if it is resident.
    pub fn evict(&mut self, b: usize) -> Option<T> {
        let slot = b % 2;
        if matches!(&self.slots[slot], Some((key, _)) if *key == b) {
            self.slots[slot].take().map(|(_, block)| block)
        } else {
            None
        }
    }

    /// Number of resident blocks; never more than 2.
    pub fn resident(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
