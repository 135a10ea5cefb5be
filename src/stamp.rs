//! Precomputed per-branch matrix-cell offsets.
//!
//! G's sparsity pattern is fixed once the branch set is known, so instead
//! of looking up `(row, col)` on every `alter()` call we resolve each
//! branch's cells to flat offsets into the dense MNA buffer at assembly
//! time. `IncrementalAlter` then touches only array arithmetic.

use crate::branch::{BranchStore, BranchType};

fn dense_index(row: usize, col: usize, dim: usize) -> usize {
    row * dim + col
}

/// Cell offsets touched by one branch's value, with `None` standing in for
/// a datum-side terminal (skipped, per the MNA invariants).
#[derive(Debug, Clone, Copy)]
pub enum BranchStamp {
    /// J[line] is pinned to the branch value directly (not a delta).
    Voltage { line: usize },
    /// J[u] -= delta, J[v] += delta (node indices, not rows; `None` is the
    /// datum and is skipped).
    Current {
        u: Option<usize>,
        v: Option<usize>,
    },
    /// G[u,u] += delta, G[v,v] += delta, G[u,v] -= delta, G[v,u] -= delta.
    Conductance {
        uu: Option<usize>,
        vv: Option<usize>,
        uv: Option<usize>,
        vu: Option<usize>,
    },
}

/// Builds the stamp table once, at assembly time, plus the constant
/// voltage-source incidence cells (the ±1 couplings, which never change
/// after construction since they do not depend on branch value).
pub struct StampTable {
    pub stamps: Vec<BranchStamp>,
    /// Constant ±1 coupling cells stamped once, outside of Alter.
    pub voltage_incidence_cells: Vec<(usize, f64)>,
}

pub fn build_stamps(store: &BranchStore) -> StampTable {
    let dim = store.matrix_dim();
    let b = store.branch_count();
    let mut stamps = Vec::with_capacity(b);
    let mut voltage_incidence_cells = Vec::new();

    let node_row = |node: usize| -> Option<usize> {
        if node == 0 { None } else { Some(node - 1) }
    };

    for i in 0..b {
        let (u, v) = store.branch_endpoints(i);
        let ur = node_row(u);
        let vr = node_row(v);

        match store.branch_type(i) {
            BranchType::Voltage => {
                let line = store.voltage_row(i);
                if let Some(ur) = ur {
                    voltage_incidence_cells.push((dense_index(ur, line, dim), 1.0));
                    voltage_incidence_cells.push((dense_index(line, ur, dim), 1.0));
                }
                if let Some(vr) = vr {
                    voltage_incidence_cells.push((dense_index(vr, line, dim), -1.0));
                    voltage_incidence_cells.push((dense_index(line, vr, dim), -1.0));
                }
                stamps.push(BranchStamp::Voltage { line });
            }
            BranchType::Current => {
                stamps.push(BranchStamp::Current { u: ur, v: vr });
            }
            BranchType::Conductance => {
                let uu = ur.map(|r| dense_index(r, r, dim));
                let vv = vr.map(|r| dense_index(r, r, dim));
                let (uv, vu) = match (ur, vr) {
                    (Some(ur), Some(vr)) => (
                        Some(dense_index(ur, vr, dim)),
                        Some(dense_index(vr, ur, dim)),
                    ),
                    _ => (None, None),
                };
                stamps.push(BranchStamp::Conductance { uu, vv, uv, vu });
            }
        }
    }

    StampTable {
        stamps,
        voltage_incidence_cells,
    }
}
