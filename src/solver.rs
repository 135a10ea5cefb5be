//! Cached LU factorization of the dense MNA matrix.
//!
//! Dense BLAS LU via `ndarray_linalg::{Factorize, Solve}`. G is cached
//! because it changes only when a candidate conductance is altered; most
//! iterations touch only J and reuse the existing factorization.

use ndarray::{Array1, Array2, OwnedRepr};
use ndarray_linalg::{Factorize, LUFactorized, Solve};

use crate::error::{CircuitError, CircuitResult};

/// Caches an LU factorization of G. `None` means stale: the sparsity or
/// numeric values of G changed since the last factorization.
#[derive(Default)]
pub struct LinearSolver {
    lu: Option<LUFactorized<OwnedRepr<f64>>>,
}

impl LinearSolver {
    pub fn new() -> Self {
        Self { lu: None }
    }

    pub fn is_factorized(&self) -> bool {
        self.lu.is_some()
    }

    /// Drops the cached factorization. Called whenever a G-branch changes.
    pub fn invalidate(&mut self) {
        self.lu = None;
    }

    fn factorize(&mut self, g: &Array2<f64>) -> CircuitResult<()> {
        let lu = g.factorize().map_err(|_| CircuitError::SingularMatrix)?;
        self.lu = Some(lu);
        Ok(())
    }

    /// Factor-preserving solve against an arbitrary right-hand side.
    /// (Re)factorizes from `g` first if the cache is stale. Used both by
    /// the primal `solve()` and by `AdjointGradient`'s extra solve.
    pub fn solve_rhs(&mut self, g: &Array2<f64>, b: &Array1<f64>) -> CircuitResult<Array1<f64>> {
        if self.lu.is_none() {
            self.factorize(g)?;
        }
        let lu = self.lu.as_ref().expect("just factorized");
        lu.solve(b).map_err(|_| CircuitError::SingularMatrix)
    }
}
