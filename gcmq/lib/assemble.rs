//! Assembly of the Hamiltonian matrix over a basis index.
//!
//! Both strategies produce the same band matrix
//! ```text
//! H_ij = ħω q_i δ_ij + Σ_t c_t ⟨l_i|Γ_t|l_j⟩ ∫ R_i(r) r^p_t R_j(r) r^(d-1) dr
//! ```
//! where `q_i` are the oscillator quanta, `(Γ_t, p_t, c_t)` run over the
//! [terms][Hamiltonian::terms] of the potential, and the angular factor comes
//! from the [basis policy][RadialAngular]. Pairs whose angular factors all
//! vanish are skipped before any radial work is done.
//!
//! - **Quadrature** samples the radial functions on a grid and sums with
//!   trapezoid weights. The basis is processed in blocks of `w + 1` states so
//!   that every band entry couples a block only to itself or to the next one;
//!   at most two blocks of samples are resident at any time.
//! - **Algebraic** uses the Laguerre recursion identities directly and needs
//!   no grid at all. It requires every angular coupling to change `λ` by
//!   exactly 3, which holds for the five-dimensional basis and for the
//!   three-fold planar basis.
//!
//! The [Cartesian basis][CartesianBasis] has no radial part; its elements are
//! sums of products of one-dimensional [moments][Moments], which both
//! strategies provide.

use log::{ debug, warn };
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{
    band::SymmetricBandMatrix,
    basis::{ BasisPolicy, CartesianBasis, RadialAngular, Separation },
    cache::{ BasisCache, BlockWindow },
    error::{ GcmError, GcmResult },
    grid::Grid,
    hamiltonian::{ Hamiltonian, PotentialTerm },
    index::BasisIndex,
    moments::Moments,
    progress::ProgressSink,
    special::{ binomial, ln_gamma },
    DEF_EPSILON,
    DEF_MAXITERS,
    DEF_POINTS,
};

/// Parameters of the quadrature strategy.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureOptions {
    /// Magnitude below which basis function samples are treated as zero
    /// (default: `1e-8`).
    pub epsilon: f64,
    /// Number of radial grid points (default: `2000`).
    pub points: usize,
    /// Iteration limit of each phase of the integration range search
    /// (default: `1000`).
    pub maxiters: usize,
}

impl Default for QuadratureOptions {
    fn default() -> Self {
        Self { epsilon: DEF_EPSILON, points: DEF_POINTS, maxiters: DEF_MAXITERS }
    }
}

impl QuadratureOptions {
    pub(crate) fn check(&self) -> GcmResult<()> {
        GcmError::check_epsilon(self.epsilon)?;
        GcmError::check_maxiters(self.maxiters)?;
        (self.points >= 2).then_some(())
            .ok_or(GcmError::BadGrid(self.points, 0.0, 0.0))
    }
}

/// Matrix element strategy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Strategy {
    /// Numerical integration on a radial grid.
    Quadrature(QuadratureOptions),
    /// Closed-form recursion coefficients.
    Algebraic,
}

impl Default for Strategy {
    fn default() -> Self { Self::Quadrature(QuadratureOptions::default()) }
}

/// Builds Hamiltonian matrices for one basis family and one set of physical
/// parameters.
#[derive(Debug)]
pub struct Assembler<'a, B>
where B: BasisPolicy + ?Sized
{
    policy: &'a B,
    hamiltonian: Hamiltonian,
    strategy: Strategy,
}

impl<'a, B> Assembler<'a, B>
where B: BasisPolicy + ?Sized
{
    pub fn new(policy: &'a B, hamiltonian: Hamiltonian, strategy: Strategy)
        -> Self
    {
        Self { policy, hamiltonian, strategy }
    }

    /// Bandwidth implied by the selection rules of the basis family.
    pub fn bandwidth(&self, index: &BasisIndex) -> usize {
        self.policy.bandwidth(index)
    }

    /// Assemble the full band matrix.
    pub fn assemble(&self, index: &BasisIndex, sink: &mut dyn ProgressSink)
        -> GcmResult<SymmetricBandMatrix>
    {
        self.assemble_with_bandwidth(index, self.bandwidth(index), sink)
    }

    /// Assemble the band matrix, writing only entries with `j - i ≤ w`.
    pub fn assemble_with_bandwidth(
        &self,
        index: &BasisIndex,
        w: usize,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<SymmetricBandMatrix>
    {
        match (self.policy.separation(), self.strategy) {
            (Separation::RadialAngular(policy), Strategy::Quadrature(opts)) => {
                if index.is_empty() {
                    return Ok(SymmetricBandMatrix::new(0, 0));
                }
                Quadrature::new(policy, &self.hamiltonian, index, opts, sink)?
                    .assemble(w, sink)
            },
            (Separation::RadialAngular(policy), Strategy::Algebraic) => {
                Algebraic::new(policy, &self.hamiltonian, index)?
                    .assemble(w, sink)
            },
            (Separation::Cartesian(policy), strategy) => {
                Product::new(policy, &self.hamiltonian, index, strategy, sink)?
                    .assemble(w, sink)
            },
        }
    }

    /// Compute only the trace, skipping all off-diagonal work.
    pub fn trace(&self, index: &BasisIndex, sink: &mut dyn ProgressSink)
        -> GcmResult<f64>
    {
        match (self.policy.separation(), self.strategy) {
            (Separation::RadialAngular(policy), Strategy::Quadrature(opts)) => {
                if index.is_empty() { return Ok(0.0); }
                Quadrature::new(policy, &self.hamiltonian, index, opts, sink)?
                    .trace(sink)
            },
            (Separation::RadialAngular(policy), Strategy::Algebraic) => {
                Algebraic::new(policy, &self.hamiltonian, index)?.trace()
            },
            (Separation::Cartesian(policy), strategy) => {
                Product::new(policy, &self.hamiltonian, index, strategy, sink)?
                    .trace()
            },
        }
    }
}

/// Find a coordinate bound beyond which `edge` stays below `opts.epsilon`.
///
/// Starts from `start`, grows the bound while `edge` is still significant
/// there, then shrinks it while it stays negligible. Each phase stops after
/// `opts.maxiters` steps with the best bound found so far.
pub(crate) fn search_range<F>(start: f64, edge: F, opts: &QuadratureOptions)
    -> f64
where F: Fn(f64) -> f64
{
    let mut r = start;
    let mut iters: usize = 0;
    while edge(r) >= opts.epsilon {
        if iters >= opts.maxiters {
            warn!(
                "integration range search: boundary still significant after \
                {} expansions; using r = {r:.3}",
                opts.maxiters,
            );
            break;
        }
        r *= 1.5;
        iters += 1;
    }

    let dr = r / 200.0;
    iters = 0;
    while r - dr > dr && edge(r - dr) < opts.epsilon {
        if iters >= opts.maxiters {
            warn!(
                "integration range search: no significant boundary found \
                after {} contractions; using r = {r:.3}",
                opts.maxiters,
            );
            break;
        }
        r -= dr;
        iters += 1;
    }
    r
}

// radius beyond which every extremal basis state is negligible
fn integration_range<B>(
    policy: &B,
    index: &BasisIndex,
    opts: &QuadratureOptions,
) -> f64
where B: RadialAngular + ?Sized
{
    let extremal = index.extremal_states();
    let edge = |r: f64| -> f64 {
        extremal.iter()
            .map(|&i| policy.radial(index.n(i), index.l(i), r).abs())
            .fold(0.0, f64::max)
    };
    let d = policy.dimension() as f64;
    search_range(2.0 * (2.0 * index.max_e() as f64 + d).sqrt() + 5.0, edge, opts)
}

// cached samples of one block together with their significant support
struct Block<'f, F>
where F: Fn(usize, f64) -> f64
{
    cache: BasisCache<'f, F>,
    lower: Vec<usize>,
    upper: Vec<usize>,
}

impl<'f, F> Block<'f, F>
where F: Fn(usize, f64) -> f64
{
    fn build(grid: Grid, start: usize, end: usize, f: &'f F, eps: f64) -> Self {
        let cache = BasisCache::build(grid, start, end, f);
        let lower = cache.lower_limits(eps);
        let upper = cache.upper_limits(eps);
        Self { cache, lower, upper }
    }

    fn support(&self, i: usize) -> (usize, usize) {
        let k = i - self.cache.range().start;
        (self.lower[k], self.upper[k])
    }
}

struct Quadrature<'a, B>
where B: RadialAngular + ?Sized
{
    policy: &'a B,
    index: &'a BasisIndex,
    quantum: f64,
    eps: f64,
    grid: Grid,
    // c_t r^p_t r^(d-1) times the trapezoid weight, per term
    profiles: Vec<(PotentialTerm, nd::Array1<f64>)>,
}

impl<'a, B> Quadrature<'a, B>
where B: RadialAngular + ?Sized
{
    fn new(
        policy: &'a B,
        hamiltonian: &Hamiltonian,
        index: &'a BasisIndex,
        opts: QuadratureOptions,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<Self>
    {
        opts.check()?;
        let r = integration_range(policy, index, &opts);
        let r_max = r + 2.0 * r / (opts.points - 1) as f64;
        let grid = Grid::closed(0.0, r_max, opts.points)?;
        debug!("quadrature grid: [0, {r_max:.4}], {} points", opts.points);
        sink.write(
            &format!("radial grid [0, {:.4}] with {} points", r_max, opts.points)
        );

        let rr = grid.points();
        let weights = grid.trapz_weights();
        let measure = policy.dimension() as i32 - 1;
        let profiles: Vec<(PotentialTerm, nd::Array1<f64>)>
            = hamiltonian.terms().into_iter()
            .map(|t| {
                let profile: nd::Array1<f64>
                    = rr.iter().zip(&weights)
                    .map(|(r, w)| t.coeff * r.powi(t.power + measure) * w)
                    .collect();
                (t, profile)
            })
            .collect();
        Ok(Self {
            policy,
            index,
            quantum: hamiltonian.quantum(),
            eps: opts.epsilon,
            grid,
            profiles,
        })
    }

    fn element<F>(&self, bi: &Block<F>, i: usize, bj: &Block<F>, j: usize)
        -> f64
    where F: Fn(usize, f64) -> f64
    {
        let (li, lj) = (self.index.l(i), self.index.l(j));
        let mut h
            = if i == j {
                self.quantum * self.policy.quanta(self.index.n(i), li)
            } else {
                0.0
            };
        if !self.policy.couples_any(li, lj) { return h; }
        let (lo_i, hi_i) = bi.support(i);
        let (lo_j, hi_j) = bj.support(j);
        let (lo, hi) = (lo_i.max(lo_j), hi_i.min(hi_j));
        if lo > hi { return h; }
        let (Some(ri), Some(rj)) = (bi.cache.row(i), bj.cache.row(j))
            else { return h; };
        let ri = ri.slice(nd::s![lo..=hi]);
        let rj = rj.slice(nd::s![lo..=hi]);
        for (t, profile) in self.profiles.iter() {
            if !self.policy.couples(t.term, li, lj) { continue; }
            let integral: f64
                = ri.iter().zip(rj.iter())
                .zip(profile.slice(nd::s![lo..=hi]).iter())
                .map(|((a, b), p)| a * b * p)
                .sum();
            h += self.policy.angular_element(t.term, li, lj) * integral;
        }
        h
    }

    fn assemble(&self, w: usize, sink: &mut dyn ProgressSink)
        -> GcmResult<SymmetricBandMatrix>
    {
        let n = self.index.len();
        let mut mat = SymmetricBandMatrix::new(n, w);
        let w = mat.bandwidth();
        let bs = w + 1;
        let nblocks = n.div_ceil(bs);
        let basis = |i: usize, r: f64| -> f64 {
            self.policy.radial(self.index.n(i), self.index.l(i), r)
        };
        let block = |b: usize| {
            Block::build(
                self.grid, b * bs, ((b + 1) * bs).min(n), &basis, self.eps)
        };

        sink.write(&format!("{n} states in {nblocks} blocks of {bs}"));
        sink.indent(1);
        let mut window: BlockWindow<Block<_>> = BlockWindow::new();
        window.insert(0, block(0));
        for b in 0..nblocks {
            debug!("assembly: block {} / {}", b + 1, nblocks);
            sink.write(&format!("block {} / {}", b + 1, nblocks));
            if b + 1 < nblocks {
                window.insert(b + 1, block(b + 1));
            }
            // block b leaves the window here; at most it and b + 1 are alive
            let cur = window.evict(b).unwrap_or_else(|| block(b));
            let range = cur.cache.range();
            for i in range.clone() {
                for j in i..range.end.min(i + w + 1) {
                    mat.set(i, j, self.element(&cur, i, &cur, j))?;
                }
            }
            if let Some(nxt) = window.get(b + 1) {
                let next_range = nxt.cache.range();
                for i in range {
                    for j in next_range.start..next_range.end.min(i + w + 1) {
                        mat.set(i, j, self.element(&cur, i, nxt, j))?;
                    }
                }
            }
        }
        sink.indent(-1);
        Ok(mat)
    }

    fn trace(&self, sink: &mut dyn ProgressSink) -> GcmResult<f64> {
        let n = self.index.len();
        let basis = |i: usize, r: f64| -> f64 {
            self.policy.radial(self.index.n(i), self.index.l(i), r)
        };
        let bs = (self.policy.bandwidth(self.index) + 1).min(n);
        sink.write("trace only");
        let mut tr: f64 = 0.0;
        for start in (0..n).step_by(bs) {
            let blk
                = Block::build(self.grid, start, (start + bs).min(n), &basis, self.eps);
            tr += blk.cache.range().map(|i| self.element(&blk, i, &blk, i)).sum::<f64>();
        }
        Ok(tr)
    }
}

struct Algebraic<'a, B>
where B: RadialAngular + ?Sized
{
    policy: &'a B,
    index: &'a BasisIndex,
    quantum: f64,
    terms: [PotentialTerm; 3],
}

// ⟨n'|r²|n⟩ for one Laguerre index
fn r2(alpha: f64, np: usize, n: usize) -> f64 {
    if np == n {
        (2 * n) as f64 + alpha + 1.0
    } else if np.abs_diff(n) == 1 {
        let m = np.min(n) as f64;
        -((m + 1.0) * (m + alpha + 1.0)).sqrt()
    } else {
        0.0
    }
}

// ⟨n'|r⁴|n⟩ as the product of two tridiagonal factors
fn r4(alpha: f64, np: usize, n: usize) -> f64 {
    if np.abs_diff(n) > 2 { return 0.0; }
    (n.saturating_sub(1)..=n + 1)
        .map(|k| r2(alpha, np, k) * r2(alpha, k, n))
        .sum()
}

// ⟨n', α + 3|r³|n, α⟩
fn r3_raise(alpha: f64, np: usize, n: usize) -> f64 {
    if np > n || n - np > 3 { return 0.0; }
    let j = n - np;
    let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
    let ln_mag = 0.5 * (
        ln_gamma(n as f64 + 1.0) + ln_gamma(np as f64 + alpha + 4.0)
        - ln_gamma(np as f64 + 1.0) - ln_gamma(n as f64 + alpha + 1.0)
    );
    sign * binomial(3, j) * ln_mag.exp()
}

impl<'a, B> Algebraic<'a, B>
where B: RadialAngular + ?Sized
{
    fn new(policy: &'a B, hamiltonian: &Hamiltonian, index: &'a BasisIndex)
        -> GcmResult<Self>
    {
        policy.check_algebraic()?;
        Ok(Self {
            policy,
            index,
            quantum: hamiltonian.quantum(),
            terms: hamiltonian.terms(),
        })
    }

    fn unsupported(&self, power: i32, li: i32, lj: i32) -> GcmError {
        GcmError::Unsupported {
            family: self.policy.name(),
            what: format!(
                "closed-form r^{power} elements between λ = {} and λ = {}",
                self.policy.lambda(li),
                self.policy.lambda(lj),
            ),
        }
    }

    fn radial(&self, power: i32, i: usize, j: usize) -> GcmResult<f64> {
        let (ni, li) = (self.index.n(i), self.index.l(i));
        let (nj, lj) = (self.index.n(j), self.index.l(j));
        let (lam_i, lam_j) = (self.policy.lambda(li), self.policy.lambda(lj));
        let dlam = lam_j - lam_i;
        match power {
            2 if dlam == 0.0 => Ok(r2(self.policy.alpha(li), ni, nj)),
            4 if dlam == 0.0 => Ok(r4(self.policy.alpha(li), ni, nj)),
            3 if dlam == 3.0 => Ok(r3_raise(self.policy.alpha(li), nj, ni)),
            3 if dlam == -3.0 => Ok(r3_raise(self.policy.alpha(lj), ni, nj)),
            _ => Err(self.unsupported(power, li, lj)),
        }
    }

    fn element(&self, i: usize, j: usize) -> GcmResult<f64> {
        let (li, lj) = (self.index.l(i), self.index.l(j));
        let mut h
            = if i == j {
                self.quantum * self.policy.quanta(self.index.n(i), li)
            } else {
                0.0
            };
        for t in self.terms.iter() {
            if !self.policy.couples(t.term, li, lj) { continue; }
            let ang = self.policy.angular_element(t.term, li, lj);
            if ang == 0.0 { continue; }
            h += t.coeff * ang * self.radial(t.power, i, j)?;
        }
        Ok(h)
    }

    fn assemble(&self, w: usize, sink: &mut dyn ProgressSink)
        -> GcmResult<SymmetricBandMatrix>
    {
        let n = self.index.len();
        let mut mat = SymmetricBandMatrix::new(n, w);
        let w = mat.bandwidth();
        sink.write(&format!("{n} states, closed-form elements"));
        for i in 0..n {
            let li = self.index.l(i);
            for j in i..n.min(i + w + 1) {
                if i != j && !self.policy.couples_any(li, self.index.l(j)) {
                    continue;
                }
                mat.set(i, j, self.element(i, j)?)?;
            }
        }
        Ok(mat)
    }

    fn trace(&self) -> GcmResult<f64> {
        (0..self.index.len())
            .map(|i| self.element(i, i))
            .sum()
    }
}

// products of axis moments for the Cartesian basis
struct Product<'a> {
    policy: &'a CartesianBasis,
    index: &'a BasisIndex,
    quantum: f64,
    terms: [PotentialTerm; 3],
    moments: Moments,
}

impl<'a> Product<'a> {
    fn new(
        policy: &'a CartesianBasis,
        hamiltonian: &Hamiltonian,
        index: &'a BasisIndex,
        strategy: Strategy,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<Self>
    {
        let terms = hamiltonian.terms();
        if let Some(t)
            = terms.iter()
            .find(|t| CartesianBasis::monomials(t.term, t.power).is_none())
        {
            return Err(GcmError::Unsupported {
                family: policy.name(),
                what: format!("{:?} term with r^{}", t.term, t.power),
            });
        }
        let size = index.max_n().max(index.max_l()) + 1;
        let moments
            = match strategy {
                Strategy::Algebraic => Moments::algebraic(size),
                Strategy::Quadrature(opts) => Moments::quadrature(size, &opts, sink)?,
            };
        Ok(Self { policy, index, quantum: hamiltonian.quantum(), terms, moments })
    }

    fn element(&self, i: usize, j: usize) -> f64 {
        let (ni, li) = (self.index.n(i), self.index.l(i));
        let (nj, lj) = (self.index.n(j), self.index.l(j));
        let mut h
            = if i == j { self.quantum * self.policy.quanta(ni, li) } else { 0.0 };
        let (li, lj) = (li.unsigned_abs() as usize, lj.unsigned_abs() as usize);
        for t in self.terms.iter() {
            let Some(monomials) = CartesianBasis::monomials(t.term, t.power)
                else { continue; };
            let sum: f64
                = monomials.iter()
                .map(|&(c, a, b)| {
                    c * self.moments.get(a, ni, nj) * self.moments.get(b, li, lj)
                })
                .sum();
            h += t.coeff * sum;
        }
        h
    }

    fn assemble(&self, w: usize, sink: &mut dyn ProgressSink)
        -> GcmResult<SymmetricBandMatrix>
    {
        let n = self.index.len();
        let mut mat = SymmetricBandMatrix::new(n, w);
        let w = mat.bandwidth();
        sink.write(&format!("{n} states, products of axis moments"));
        for i in 0..n {
            let li = self.index.l(i);
            for j in i..n.min(i + w + 1) {
                if i != j && !self.policy.couples_any(li, self.index.l(j)) {
                    continue;
                }
                mat.set(i, j, self.element(i, j))?;
            }
        }
        Ok(mat)
    }

    fn trace(&self) -> GcmResult<f64> {
        Ok((0..self.index.len()).map(|i| self.element(i, i)).sum())
    }
}
