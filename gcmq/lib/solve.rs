//! The diagonalization driver.
//!
//! A [`Solver`] owns one basis family, one Hamiltonian and one assembly
//! strategy, and runs the pipeline
//! ```text
//! basis index → band matrix → eigensolver → EigenResult
//! ```
//! on request. Its observable state is a [`SolverState`]; at most one
//! computation may be in flight per solver, and a second call made while one
//! is running (for example from inside a progress sink) fails with
//! [`GcmError::Busy`] instead of racing it.

use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use log::{ debug, info };
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{
    Arr1,
    assemble::{ Assembler, Strategy },
    band::SymmetricBandMatrix,
    basis::{ BasisFamily, BasisPolicy },
    eigen::{ BandEigen, DenseEigen, EigenSolver },
    error::{ GcmError, GcmResult, Stage },
    hamiltonian::Hamiltonian,
    index::BasisIndex,
    post::{ self, Parity },
    progress::ProgressSink,
};

/// Eigensolver selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Full diagonalization of the expanded matrix.
    Dense,
    /// Partial diagonalization in band storage.
    Banded,
    /// `Dense` when the whole spectrum is requested, `Banded` otherwise.
    #[default]
    Auto,
}

impl Method {
    /// Replace `Auto` with a concrete method for `count` eigenpairs out of
    /// `dim`.
    pub fn resolve(self, count: usize, dim: usize) -> Self {
        match self {
            Self::Auto if count >= dim => Self::Dense,
            Self::Auto => Self::Banded,
            m => m,
        }
    }
}

/// Output of one successful computation.
#[derive(Clone, Debug)]
pub struct EigenResult {
    /// Basis the eigenvectors are expanded in.
    pub index: Arc<BasisIndex>,
    /// Method actually used.
    pub method: Method,
    /// Eigenvalues in ascending order.
    pub values: nd::Array1<f64>,
    /// Expansion coefficients, one row per eigenvalue.
    pub vectors: Option<nd::Array2<f64>>,
}

impl EigenResult {
    /// Energy cutoff of the basis.
    pub fn max_e(&self) -> usize { self.index.max_e() }

    /// Number of eigenpairs.
    pub fn len(&self) -> usize { self.values.len() }

    /// `true` if no eigenpairs were computed.
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Coefficients of eigenstate `k`.
    pub fn vector(&self, k: usize) -> GcmResult<nd::ArrayView1<'_, f64>> {
        let vectors = self.vectors.as_ref().ok_or(GcmError::NoVectors)?;
        (k < vectors.nrows()).then(|| vectors.row(k))
            .ok_or(GcmError::StateIndex(k, vectors.nrows()))
    }
}

/// Observable state of a [`Solver`].
#[derive(Clone, Debug, Default)]
pub enum SolverState {
    /// Nothing computed yet, or parameters changed since.
    #[default]
    Idle,
    /// A computation is running.
    Computing,
    /// The last computation succeeded.
    Done(Arc<EigenResult>),
    /// The last computation failed with the given message.
    Failed(String),
}

impl SolverState {
    pub fn is_computing(&self) -> bool { matches!(self, Self::Computing) }

    pub fn is_computed(&self) -> bool { matches!(self, Self::Done(_)) }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// releases the `Computing` state on every exit path; a guard dropped without
// `finish` (e.g. while unwinding) leaves the solver `Failed`
struct ComputeGuard<'s> {
    state: &'s Mutex<SolverState>,
    last: &'s Mutex<Option<Arc<EigenResult>>>,
    armed: bool,
}

impl<'s> ComputeGuard<'s> {
    fn acquire(
        state: &'s Mutex<SolverState>,
        last: &'s Mutex<Option<Arc<EigenResult>>>,
    ) -> GcmResult<Self>
    {
        let mut st = lock(state);
        if st.is_computing() { return Err(GcmError::Busy); }
        *st = SolverState::Computing;
        Ok(Self { state, last, armed: true })
    }

    fn finish(mut self, new: SolverState) {
        let mut st = lock(self.state);
        if let SolverState::Done(res) = &new {
            *lock(self.last) = Some(Arc::clone(res));
        }
        *st = new;
        self.armed = false;
    }
}

impl Drop for ComputeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *lock(self.state) = SolverState::Failed("computation aborted".into());
        }
    }
}

/// Basis-expansion eigensolver for the collective model.
#[derive(Debug)]
pub struct Solver {
    family: BasisFamily,
    policy: Box<dyn BasisPolicy>,
    hamiltonian: Hamiltonian,
    strategy: Strategy,
    band_solver: BandEigen,
    index: Mutex<Option<Arc<BasisIndex>>>,
    state: Mutex<SolverState>,
    last: Mutex<Option<Arc<EigenResult>>>,
}

impl Solver {
    pub fn new(family: BasisFamily, hamiltonian: Hamiltonian, strategy: Strategy)
        -> Self
    {
        Self {
            family,
            policy: family.policy(),
            hamiltonian,
            strategy,
            band_solver: BandEigen::default(),
            index: Mutex::new(None),
            state: Mutex::new(SolverState::Idle),
            last: Mutex::new(None),
        }
    }

    pub fn family(&self) -> BasisFamily { self.family }

    pub fn policy(&self) -> &dyn BasisPolicy { self.policy.as_ref() }

    pub fn hamiltonian(&self) -> &Hamiltonian { &self.hamiltonian }

    pub fn strategy(&self) -> Strategy { self.strategy }

    /// Replace the assembly strategy, discarding any computed result.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
        *lock(&self.state) = SolverState::Idle;
        *lock(&self.last) = None;
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SolverState { lock(&self.state).clone() }

    /// `true` if the last computation succeeded.
    pub fn is_computed(&self) -> bool { lock(&self.state).is_computed() }

    /// Result of the last successful computation.
    ///
    /// This stays available while a new computation runs and after one fails;
    /// only a parameter change discards it.
    pub fn result(&self) -> GcmResult<Arc<EigenResult>> {
        lock(&self.last).as_ref().map(Arc::clone).ok_or(GcmError::NotComputed)
    }

    /// Basis index for `max_e`, regenerated only when the cutoff changes.
    pub fn index(&self, max_e: usize) -> Arc<BasisIndex> {
        let mut cached = lock(&self.index);
        match cached.as_ref() {
            Some(idx) if idx.max_e() == max_e => Arc::clone(idx),
            _ => {
                debug!("generating {} basis for max_e = {max_e}", self.policy.name());
                let idx = Arc::new(self.policy.generate(max_e));
                *cached = Some(Arc::clone(&idx));
                idx
            },
        }
    }

    fn assembler(&self) -> Assembler<'_, dyn BasisPolicy> {
        Assembler::new(self.policy.as_ref(), self.hamiltonian, self.strategy)
    }

    /// Assemble the Hamiltonian matrix for `max_e` without diagonalizing it.
    pub fn assemble(&self, max_e: usize, sink: &mut dyn ProgressSink)
        -> GcmResult<SymmetricBandMatrix>
    {
        let index = self.index(max_e);
        self.assembler().assemble(&index, sink)
    }

    /// Trace of the Hamiltonian matrix for `max_e`, skipping all off-diagonal
    /// work.
    pub fn trace(&self, max_e: usize, sink: &mut dyn ProgressSink)
        -> GcmResult<f64>
    {
        let index = self.index(max_e);
        self.assembler().trace(&index, sink)
    }

    /// Compute the lowest `count` eigenpairs for cutoff `max_e`.
    ///
    /// `count = 0`, or any count above the basis size, requests the full
    /// spectrum. Errors are tagged with the [`Stage`] they occurred in; on
    /// error the solver is left `Failed`, nothing is published, and
    /// [`Self::result`] keeps serving the previous result.
    pub fn compute(
        &self,
        max_e: usize,
        count: usize,
        vectors: bool,
        method: Method,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<Arc<EigenResult>>
    {
        let guard = ComputeGuard::acquire(&self.state, &self.last)?;
        match self.run(max_e, count, vectors, method, sink) {
            Ok(res) => {
                let res = Arc::new(res);
                guard.finish(SolverState::Done(Arc::clone(&res)));
                Ok(res)
            },
            Err(err) => {
                guard.finish(SolverState::Failed(err.to_string()));
                Err(err)
            },
        }
    }

    fn run(
        &self,
        max_e: usize,
        count: usize,
        vectors: bool,
        method: Method,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<EigenResult>
    {
        sink.write(&format!("{} basis, max_e = {max_e}", self.policy.name()));
        sink.indent(1);
        let res = self.run_stages(max_e, count, vectors, method, sink);
        sink.indent(-1);
        res
    }

    fn run_stages(
        &self,
        max_e: usize,
        count: usize,
        vectors: bool,
        method: Method,
        sink: &mut dyn ProgressSink,
    ) -> GcmResult<EigenResult>
    {
        let index = self.index(max_e);
        let n = index.len();
        sink.write(&format!("{n} basis states"));
        let count = if count == 0 || count > n { n } else { count };
        let method = method.resolve(count, n);

        let asm = self.assembler();
        let w = asm.bandwidth(&index);
        debug!("assembling {n} x {n} matrix with bandwidth {w}");
        sink.write(&format!("assembling, bandwidth {w}"));
        sink.indent(1);
        let mat = asm.assemble_with_bandwidth(&index, w, sink);
        sink.indent(-1);
        let mat = mat.map_err(|e| e.at(Stage::Assembly))?;

        sink.write(&format!("diagonalizing ({method:?}), {count} eigenpairs"));
        let solver: &dyn EigenSolver
            = match method {
                Method::Dense | Method::Auto => &DenseEigen,
                Method::Banded => &self.band_solver,
            };
        let pairs = solver.solve(&mat, count, vectors)
            .map_err(|e| e.at(Stage::Diagonalization))?;
        drop(mat);
        if let Some(e0) = pairs.values.get(0) {
            info!("{} eigenvalues, lowest {e0:.6}", pairs.values.len());
        }
        Ok(EigenResult { index, method, values: pairs.values, vectors: pairs.vectors })
    }

    /// Install a result computed elsewhere, e.g. restored from disk.
    pub(crate) fn publish(&self, result: EigenResult) -> GcmResult<Arc<EigenResult>> {
        let guard = ComputeGuard::acquire(&self.state, &self.last)?;
        let res = Arc::new(result);
        *lock(&self.index) = Some(Arc::clone(&res.index));
        guard.finish(SolverState::Done(Arc::clone(&res)));
        Ok(res)
    }

    /// Amplitude of eigenstate `k` on the Cartesian grid `xs × ys` of the
    /// `(β cos γ, β sin γ)` plane; element `[[i, j]]` is at `(xs[i], ys[j])`.
    pub fn amplitude_matrix<S, T>(&self, k: usize, xs: &Arr1<S>, ys: &Arr1<T>)
        -> GcmResult<nd::Array2<f64>>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
    {
        let res = self.result()?;
        let c = res.vector(k)?;
        post::amplitude(
            self.policy(), &res.index, &c, self.hamiltonian.length(), xs, ys)
    }

    /// Like [`Self::amplitude_matrix`], but squared.
    pub fn density_matrix<S, T>(&self, k: usize, xs: &Arr1<S>, ys: &Arr1<T>)
        -> GcmResult<nd::Array2<f64>>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
    {
        Ok(self.amplitude_matrix(k, xs, ys)?.mapv(|a| a * a))
    }

    /// Expectation value of the reflection `γ → -γ` in eigenstate `k`.
    pub fn reflection(&self, k: usize) -> GcmResult<f64> {
        let res = self.result()?;
        post::reflection(self.policy(), &res.index, &res.vector(k)?)
    }

    /// Reflection parity of eigenstate `k`.
    pub fn parity(&self, k: usize) -> GcmResult<Parity> {
        self.reflection(k).map(Parity::from_reflection)
    }

    /// Time-averaged magnitude of the angular quantum number in eigenstate
    /// `k`.
    pub fn mean_angular(&self, k: usize) -> GcmResult<f64> {
        let res = self.result()?;
        post::mean_angular(self.policy(), &res.index, &res.vector(k)?)
    }

    /// Mean number of oscillator quanta in eigenstate `k`.
    pub fn mean_quanta(&self, k: usize) -> GcmResult<f64> {
        let res = self.result()?;
        post::mean_quanta(self.policy(), &res.index, &res.vector(k)?)
    }
}
