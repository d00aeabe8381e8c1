//! Moments `⟨n|x^p|n'⟩` of one-dimensional oscillator functions, the building
//! blocks of Cartesian matrix elements.

use ndarray as nd;
use crate::{
    assemble::{ search_range, QuadratureOptions },
    cache::BasisCache,
    error::GcmResult,
    grid::Grid,
    progress::ProgressSink,
    special::hermite_function,
};

/// Highest power of `x` tabulated.
pub const MAX_POWER: usize = 4;

/// `⟨n|x^p|n'⟩` for `p ≤ MAX_POWER` and `n, n' < size`.
#[derive(Clone, Debug, PartialEq)]
pub struct Moments {
    tables: Vec<nd::Array2<f64>>,
}

impl Moments {
    /// Exact moments from `x = (a + a†)/√2`: the tridiagonal position matrix
    /// is raised to each power on a basis padded by `MAX_POWER` states, which
    /// leaves every entry with `n, n' < size` untouched by the truncation.
    pub fn algebraic(size: usize) -> Self {
        let m = size + MAX_POWER;
        let mut x: nd::Array2<f64> = nd::Array2::zeros((m, m));
        for k in 0..m.saturating_sub(1) {
            let v = ((k + 1) as f64 / 2.0).sqrt();
            x[[k, k + 1]] = v;
            x[[k + 1, k]] = v;
        }
        let mut tables: Vec<nd::Array2<f64>> = Vec::with_capacity(MAX_POWER + 1);
        let mut power: nd::Array2<f64> = nd::Array2::eye(m);
        for _ in 0..=MAX_POWER {
            tables.push(power.slice(nd::s![..size, ..size]).to_owned());
            power = power.dot(&x);
        }
        Self { tables }
    }

    /// Moments by trapezoid quadrature on a symmetric grid whose extent is
    /// found by the same range search as the radial quadrature.
    pub fn quadrature(
        size: usize,
        opts: &QuadratureOptions,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<Self>
    {
        opts.check()?;
        let top = size.saturating_sub(1);
        let r = search_range(
            (2.0 * top as f64 + 1.0).sqrt() + 5.0,
            |x| hermite_function(top, x).abs(),
            opts,
        );
        let x_max = r + 4.0 * r / (opts.points - 1) as f64;
        let grid = Grid::closed(-x_max, x_max, opts.points)?;
        sink.write(
            &format!("axis grid [{:.4}, {:.4}] with {} points", -x_max, x_max, opts.points)
        );

        let f = |n: usize, x: f64| hermite_function(n, x);
        let cache = BasisCache::build(grid, 0, size, &f);
        let lower = cache.lower_limits(opts.epsilon);
        let upper = cache.upper_limits(opts.epsilon);
        let xs = grid.points();
        let weights = grid.trapz_weights();
        let profiles: Vec<nd::Array1<f64>>
            = (0..=MAX_POWER)
            .map(|p| {
                xs.iter().zip(&weights)
                    .map(|(x, w)| x.powi(p as i32) * w)
                    .collect()
            })
            .collect();

        let mut tables: Vec<nd::Array2<f64>>
            = vec![nd::Array2::zeros((size, size)); MAX_POWER + 1];
        for n in 0..size {
            for m in n..size {
                let (lo, hi) = (lower[n].max(lower[m]), upper[n].min(upper[m]));
                if lo > hi { continue; }
                let (Some(rn), Some(rm)) = (cache.row(n), cache.row(m))
                    else { continue; };
                let rn = rn.slice(nd::s![lo..=hi]);
                let rm = rm.slice(nd::s![lo..=hi]);
                for (p, profile) in profiles.iter().enumerate() {
                    // odd integrands vanish exactly
                    if (n + m + p) % 2 == 1 { continue; }
                    let v: f64
                        = rn.iter().zip(rm.iter())
                        .zip(profile.slice(nd::s![lo..=hi]).iter())
                        .map(|((a, b), w)| a * b * w)
                        .sum();
                    tables[p][[n, m]] = v;
                    tables[p][[m, n]] = v;
                }
            }
        }
        Ok(Self { tables })
    }

    /// Number of one-dimensional states covered.
    pub fn size(&self) -> usize { self.tables[0].nrows() }

    /// `⟨n|x^p|n'⟩`.
    ///
    /// *Panics if `p > MAX_POWER` or either state is outside the table*.
    pub fn get(&self, p: usize, n: usize, np: usize) -> f64 {
        self.tables[p][[n, np]]
    }
}
