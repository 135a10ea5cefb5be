use crate::branch::BranchType;
use crate::circuit::Circuit;
use crate::error::CircuitResult;

impl Circuit {
    /// V(u) - V(v) for each requested branch, treating datum terminals as
    /// 0. Requires a current solution; a stale `V` is a usage error.
    pub fn branch_voltage(&self, indices: &[usize]) -> CircuitResult<Vec<f64>> {
        let v = self.solution()?;
        Ok(indices
            .iter()
            .map(|&i| {
                let (u, vv) = self.store().branch_endpoints(i);
                let vu = self.node_row(u).map(|r| v[r]).unwrap_or(0.0);
                let vv_ = self.node_row(vv).map(|r| v[r]).unwrap_or(0.0);
                vu - vv_
            })
            .collect())
    }

    /// Per-branch current, piecewise by type: V-branches read the solved
    /// constraint-row unknown; I-branches return their stored (ideal)
    /// value; G-branches return `branch_voltage * branch_value`.
    pub fn branch_current(&self, indices: &[usize]) -> CircuitResult<Vec<f64>> {
        let v = self.solution()?;
        let mut out = Vec::with_capacity(indices.len());
        for &i in indices {
            let current = match self.branch_type(i) {
                BranchType::Voltage => {
                    let line = self.store().voltage_row(i);
                    v[line]
                }
                BranchType::Current => self.store().branch_value(i),
                BranchType::Conductance => {
                    let vi = self.branch_voltage(&[i])?[0];
                    vi * self.store().branch_value(i)
                }
            };
            out.push(current);
        }
        Ok(out)
    }
}
