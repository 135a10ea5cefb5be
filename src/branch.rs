use std::collections::HashMap;

use crate::error::{CircuitError, CircuitResult};

/// A two-terminal element type in the Modified Nodal Analysis formulation.
///
/// Branches are stored grouped by type (`V` < `I` < `G`) so that the
/// assembler and `IncrementalAlter` can sweep each type-range without a
/// per-element dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchType {
    /// Enforces V(u) - V(v) = value.
    Voltage,
    /// Injects `value` amperes from v into u.
    Current,
    /// Carries current value * (V(u) - V(v)).
    Conductance,
}

impl BranchType {
    fn rank(self) -> u8 {
        match self {
            BranchType::Voltage => 0,
            BranchType::Current => 1,
            BranchType::Conductance => 2,
        }
    }
}

/// Owns the typed, structure-of-arrays branch tables for the lifetime of a
/// circuit. Node 0 is always the datum (ground) and never appears as a
/// matrix row. Branch values are mutable only through `IncrementalAlter`;
/// everything else here is fixed at construction.
#[derive(Debug, Clone)]
pub struct BranchStore {
    node_names: Vec<String>,
    node_index: HashMap<String, usize>,

    branch_names: Vec<String>,
    branch_index: HashMap<String, usize>,
    branch_u: Vec<usize>,
    branch_v: Vec<usize>,
    branch_type: Vec<BranchType>,
    branch_value: Vec<f64>,

    /// Row assigned to each V-branch, in V-branch order (not branch-index
    /// order; V-branches are always the first `n_voltage` entries).
    voltage_rows: Vec<usize>,
    n_voltage: usize,
    n_current: usize,
    n_conductance: usize,
}

impl BranchStore {
    /// Builds the branch tables. `node_name[0]` must be `"0"` (the datum).
    /// Branches must already be ordered V < I < G; this is validated, not
    /// re-sorted, since the caller (graph post-processing, out of scope
    /// here) owns branch identity and naming order.
    pub fn new(
        node_name: Vec<String>,
        branch_name: Vec<String>,
        branch_u: Vec<usize>,
        branch_v: Vec<usize>,
        branch_type: Vec<BranchType>,
        branch_value: Vec<f64>,
    ) -> CircuitResult<Self> {
        assert!(
            !node_name.is_empty() && node_name[0] == "0",
            "node_name[0] must be the datum \"0\""
        );

        let mut node_index = HashMap::with_capacity(node_name.len());
        for (i, name) in node_name.iter().enumerate() {
            if node_index.insert(name.clone(), i).is_some() {
                return Err(CircuitError::DuplicateNode(name.clone()));
            }
        }

        let b = branch_name.len();
        assert_eq!(branch_u.len(), b);
        assert_eq!(branch_v.len(), b);
        assert_eq!(branch_type.len(), b);
        assert_eq!(branch_value.len(), b);

        let mut branch_index = HashMap::with_capacity(b);
        for (i, name) in branch_name.iter().enumerate() {
            if branch_index.insert(name.clone(), i).is_some() {
                return Err(CircuitError::DuplicateBranch(name.clone()));
            }
        }

        for i in 0..b {
            let u = branch_u[i];
            let v = branch_v[i];
            if u >= node_name.len() {
                return Err(CircuitError::UnknownNode {
                    name: branch_name[i].clone(),
                    node: u,
                });
            }
            if v >= node_name.len() {
                return Err(CircuitError::UnknownNode {
                    name: branch_name[i].clone(),
                    node: v,
                });
            }
            if u == 0 && v == 0 {
                return Err(CircuitError::DatumOnlyBranch {
                    name: branch_name[i].clone(),
                });
            }
        }

        let mut last_rank = 0u8;
        let mut n_voltage = 0;
        let mut n_current = 0;
        let mut n_conductance = 0;
        for (i, ty) in branch_type.iter().enumerate() {
            let rank = ty.rank();
            if rank < last_rank {
                return Err(CircuitError::BranchOrdering { index: i });
            }
            last_rank = rank;
            match ty {
                BranchType::Voltage => n_voltage += 1,
                BranchType::Current => n_current += 1,
                BranchType::Conductance => n_conductance += 1,
            }
        }

        let n = node_name.len();
        // Voltage rows start right after the N-1 non-datum KCL rows.
        let voltage_rows = (0..n_voltage).map(|j| (n - 1) + j).collect();

        Ok(Self {
            node_names: node_name,
            node_index,
            branch_names: branch_name,
            branch_index,
            branch_u,
            branch_v,
            branch_type,
            branch_value,
            voltage_rows,
            n_voltage,
            n_current,
            n_conductance,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branch_names.len()
    }

    pub fn voltage_count(&self) -> usize {
        self.n_voltage
    }

    pub fn current_count(&self) -> usize {
        self.n_current
    }

    pub fn conductance_count(&self) -> usize {
        self.n_conductance
    }

    /// D = N + Nv - 1, the MNA matrix dimension.
    pub fn matrix_dim(&self) -> usize {
        self.node_count() - 1 + self.n_voltage
    }

    pub fn node_name(&self, index: usize) -> &str {
        &self.node_names[index]
    }

    pub fn node_index_of(&self, name: &str) -> Option<usize> {
        self.node_index.get(name).copied()
    }

    pub fn branch_name(&self, index: usize) -> &str {
        &self.branch_names[index]
    }

    pub fn branch_index_of(&self, name: &str) -> Option<usize> {
        self.branch_index.get(name).copied()
    }

    /// Indices of every branch whose name starts with `prefix` (case
    /// sensitive, matching the graph post-processor's naming convention:
    /// `gx*` candidates, `i*` load currents, `v*` ideal supplies).
    pub fn indices_with_prefix(&self, prefix: &str) -> Vec<usize> {
        self.branch_names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn branch_endpoints(&self, index: usize) -> (usize, usize) {
        (self.branch_u[index], self.branch_v[index])
    }

    pub fn branch_type(&self, index: usize) -> BranchType {
        self.branch_type[index]
    }

    pub fn branch_value(&self, index: usize) -> f64 {
        self.branch_value[index]
    }

    pub(crate) fn set_branch_value(&mut self, index: usize, value: f64) {
        self.branch_value[index] = value;
    }

    /// MNA row of V-branch `index` (the index must name a Voltage branch).
    pub fn voltage_row(&self, index: usize) -> usize {
        debug_assert!(matches!(self.branch_type[index], BranchType::Voltage));
        self.voltage_rows[index]
    }

    /// Indices of every V and I branch, in branch order (V-group precedes
    /// I-group by the ordering invariant). These are the excitation
    /// branches zeroed at the start of the adjoint procedure.
    pub fn excitation_index(&self) -> Vec<usize> {
        (0..self.n_voltage + self.n_current).collect()
    }
}
