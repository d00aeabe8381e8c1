//! Minimal persisted state: enough to resume post-processing without
//! recomputing.

use std::{ fs, path::Path, sync::Arc };
use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{
    assemble::Strategy,
    basis::BasisFamily,
    error::{ GcmError, GcmResult, Stage },
    hamiltonian::{ GcmParams, Hamiltonian, Oscillator },
    solve::{ EigenResult, Method, Solver },
};

/// Cutoff, parameters and eigenpairs of a finished computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub max_e: usize,
    pub method: Method,
    pub eigenvalues: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eigenvectors: Option<Vec<Vec<f64>>>,
    pub basis: BasisFamily,
    pub params: GcmParams,
    pub oscillator: Oscillator,
}

impl SavedState {
    pub fn from_toml_str(s: &str) -> GcmResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> GcmResult<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> GcmResult<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> GcmResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

impl Solver {
    /// Snapshot the current result for saving.
    pub fn save_state(&self) -> GcmResult<SavedState> {
        let res = self.result()?;
        let ham = self.hamiltonian();
        Ok(SavedState {
            max_e: res.max_e(),
            method: res.method,
            eigenvalues: res.values.to_vec(),
            eigenvectors: res.vectors.as_ref()
                .map(|v| v.outer_iter().map(|row| row.to_vec()).collect()),
            basis: self.family(),
            params: ham.params,
            oscillator: ham.oscillator,
        })
    }

    /// Rebuild a solver in the `Done` state from a saved state.
    ///
    /// The basis index is regenerated from the cutoff and must match the
    /// stored eigenvectors.
    pub fn restore(state: &SavedState, strategy: Strategy) -> GcmResult<Self> {
        let ham = Hamiltonian::new(state.params, state.oscillator)?;
        let solver = Solver::new(state.basis, ham, strategy);
        let index = solver.index(state.max_e);
        let n = index.len();
        let count = state.eigenvalues.len();
        if count > n {
            return Err(GcmError::BadState(format!(
                "{count} eigenvalues for a basis of {n} states"
            )).at(Stage::IndexGeneration));
        }
        let vectors
            = match &state.eigenvectors {
                None => None,
                Some(rows) => {
                    if rows.len() != count {
                        return Err(GcmError::BadState(format!(
                            "{} eigenvectors for {count} eigenvalues", rows.len()
                        )));
                    }
                    if let Some(row) = rows.iter().find(|row| row.len() != n) {
                        return Err(GcmError::BadState(format!(
                            "eigenvector of length {} for a basis of {n} states",
                            row.len(),
                        )).at(Stage::IndexGeneration));
                    }
                    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
                    Some(nd::Array2::from_shape_vec((count, n), flat)
                        .map_err(|e| GcmError::BadState(e.to_string()))?)
                },
            };
        solver.publish(EigenResult {
            index: Arc::clone(&index),
            method: state.method,
            values: nd::Array1::from(state.eigenvalues.clone()),
            vectors,
        })?;
        Ok(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;

    fn solver() -> Solver {
        let ham = Hamiltonian::new(
            GcmParams { a: -0.5, b: 0.9, c: 0.4, k: 2.0 },
            Oscillator::default(),
        ).unwrap();
        Solver::new(BasisFamily::Collective, ham, Strategy::Algebraic)
    }

    #[test]
    fn save_and_restore_through_file() {
        let solver = solver();
        solver.compute(10, 4, true, Method::Banded, &mut NullSink).unwrap();
        let saved = solver.save_state().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        saved.write(&path).unwrap();
        let loaded = SavedState::read(&path).unwrap();
        assert_eq!(loaded, saved);

        let restored = Solver::restore(&loaded, Strategy::Algebraic).unwrap();
        assert!(restored.is_computed());
        let a = solver.result().unwrap();
        let b = restored.result().unwrap();
        assert_eq!(a.values, b.values);
        assert_eq!(a.vectors, b.vectors);
        assert_eq!(a.index.as_ref(), b.index.as_ref());
        assert_eq!(solver.mean_quanta(2).unwrap(), restored.mean_quanta(2).unwrap());
    }

    #[test]
    fn values_only() {
        let solver = solver();
        solver.compute(8, 0, false, Method::Dense, &mut NullSink).unwrap();
        let saved = solver.save_state().unwrap();
        let text = saved.to_toml_string().unwrap();
        assert!(!text.contains("eigenvectors"));
        let restored = Solver::restore(
            &SavedState::from_toml_str(&text).unwrap(), Strategy::Algebraic,
        ).unwrap();
        assert!(matches!(restored.parity(0), Err(GcmError::NoVectors)));
    }

    #[test]
    fn rejects_inconsistent_state() {
        let solver = solver();
        solver.compute(8, 2, true, Method::Banded, &mut NullSink).unwrap();
        let mut saved = solver.save_state().unwrap();
        saved.max_e = 6;
        let err = Solver::restore(&saved, Strategy::Algebraic).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::IndexGeneration));
        assert!(matches!(err.root(), GcmError::BadState(_)));
        assert!(solver.save_state().is_ok());
        let idle = Solver::new(BasisFamily::Collective, *solver.hamiltonian(), Strategy::Algebraic);
        assert!(matches!(idle.save_state(), Err(GcmError::NotComputed)));
    }
}
