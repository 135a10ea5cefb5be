use ndarray::{Array1, Array2};

use crate::branch::{BranchStore, BranchType};
use crate::error::{CircuitError, CircuitResult};
use crate::solver::LinearSolver;
use crate::stamp::{BranchStamp, StampTable, build_stamps};

/// The assembled Modified Nodal Analysis system for one circuit instance.
///
/// Owns the branch store, the dense G/J buffers, the precomputed stamp
/// table, and the cached LU factorization + solved unknown vector. A
/// `Circuit` lives for the duration of one optimization run: branches are
/// never added or removed after construction, only altered in place.
pub struct Circuit {
    store: BranchStore,
    stamps: StampTable,
    g: Array2<f64>,
    j: Array1<f64>,
    v: Option<Array1<f64>>,
    solver: LinearSolver,
}

impl Circuit {
    /// Assembles G, J and the stamp table from a branch store, then
    /// funnels the initial branch values through the same `alter` code
    /// path used for every later edit (against an implicit zero baseline),
    /// so that one code path maintains the G/J invariants.
    pub fn new(store: BranchStore) -> Self {
        let dim = store.matrix_dim();
        let b = store.branch_count();
        let stamps = build_stamps(&store);

        let mut g = Array2::<f64>::zeros((dim, dim));
        {
            let g_flat = g.as_slice_mut().expect("G is allocated as standard layout");
            for &(cell, sign) in &stamps.voltage_incidence_cells {
                g_flat[cell] = sign;
            }
        }
        let j = Array1::<f64>::zeros(dim);

        let mut circuit = Self {
            store,
            stamps,
            g,
            j,
            v: None,
            solver: LinearSolver::new(),
        };

        let indices: Vec<usize> = (0..b).collect();
        let initial_values: Vec<f64> = indices.iter().map(|&i| circuit.store.branch_value(i)).collect();
        let zero_baseline = vec![0.0; b];
        circuit.apply_deltas(&indices, &zero_baseline, &initial_values);

        circuit
    }

    pub fn store(&self) -> &BranchStore {
        &self.store
    }

    /// Indices of every V and I branch (the excitation set zeroed at the
    /// start of the adjoint procedure and at the top of every forward
    /// pass).
    pub fn excitation_index(&self) -> Vec<usize> {
        self.store.excitation_index()
    }

    /// Applies a batch of branch-value edits. `indices` and `values` must
    /// have equal length and every index must be in range, or this is a
    /// caller-contract violation. Within the batch, ordering among indices
    /// is unobservable: the net effect equals sequential application.
    pub fn alter(&mut self, indices: &[usize], values: &[f64]) -> CircuitResult<()> {
        if indices.len() != values.len() {
            return Err(CircuitError::AlterLengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        let b = self.store.branch_count();
        for &idx in indices {
            if idx >= b {
                return Err(CircuitError::AlterIndexOutOfRange(idx));
            }
        }

        let old_values: Vec<f64> = indices.iter().map(|&i| self.store.branch_value(i)).collect();
        self.apply_deltas(indices, &old_values, values);
        Ok(())
    }

    /// Applies the per-type update rules for a batch whose old/new values
    /// are already known, by a type-grouped sweep (V, then I, then G).
    /// Cache invalidation is unconditional: any V or I branch present in
    /// the batch invalidates `V`; any G branch present also invalidates
    /// `LU`. Deduplication of repeated `(u,v)` cells within the G sweep is
    /// free here because the dense backing makes each `+=`/`-=` an O(1)
    /// commutative array write.
    fn apply_deltas(&mut self, indices: &[usize], old_values: &[f64], new_values: &[f64]) {
        let mut v_dirty = false;
        let mut lu_dirty = false;

        for (k, &idx) in indices.iter().enumerate() {
            if let BranchStamp::Voltage { line } = self.stamps.stamps[idx] {
                self.j[line] = new_values[k];
                v_dirty = true;
            }
        }
        for (k, &idx) in indices.iter().enumerate() {
            if let BranchStamp::Current { u, v } = self.stamps.stamps[idx] {
                let delta = new_values[k] - old_values[k];
                if let Some(u) = u {
                    self.j[u] -= delta;
                }
                if let Some(v) = v {
                    self.j[v] += delta;
                }
                v_dirty = true;
            }
        }
        {
            let g_flat = self.g.as_slice_mut().expect("G is allocated as standard layout");
            for (k, &idx) in indices.iter().enumerate() {
                if let BranchStamp::Conductance { uu, vv, uv, vu } = self.stamps.stamps[idx] {
                    let delta = new_values[k] - old_values[k];
                    if let Some(c) = uu {
                        g_flat[c] += delta;
                    }
                    if let Some(c) = vv {
                        g_flat[c] += delta;
                    }
                    if let Some(c) = uv {
                        g_flat[c] -= delta;
                    }
                    if let Some(c) = vu {
                        g_flat[c] -= delta;
                    }
                    v_dirty = true;
                    lu_dirty = true;
                }
            }
        }

        for (k, &idx) in indices.iter().enumerate() {
            self.store.set_branch_value(idx, new_values[k]);
        }

        if v_dirty {
            self.v = None;
        }
        if lu_dirty {
            self.solver.invalidate();
        }
    }

    /// Resolves the unknown vector. No-op if `V` is already current;
    /// otherwise (re)factorizes G if stale, then solves against J.
    pub fn solve(&mut self) -> CircuitResult<()> {
        if self.v.is_some() {
            return Ok(());
        }
        let x = self.solver.solve_rhs(&self.g, &self.j)?;
        self.v = Some(x);
        Ok(())
    }

    /// Factor-preserving solve against an arbitrary right-hand side,
    /// bypassing the J/V cache entirely. Exposed for callers (such as a
    /// from-scratch adjoint implementation) that want the solve without
    /// routing the excitation through `alter`.
    pub fn solve_rhs(&mut self, b: &Array1<f64>) -> CircuitResult<Array1<f64>> {
        self.solver.solve_rhs(&self.g, b)
    }

    pub fn is_solved(&self) -> bool {
        self.v.is_some()
    }

    pub(crate) fn solution(&self) -> CircuitResult<&Array1<f64>> {
        self.v.as_ref().ok_or(CircuitError::StaleSolution)
    }

    pub(crate) fn node_row(&self, node: usize) -> Option<usize> {
        if node == 0 { None } else { Some(node - 1) }
    }

    pub(crate) fn branch_type(&self, index: usize) -> BranchType {
        self.store.branch_type(index)
    }
}
