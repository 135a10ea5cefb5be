//! Stateless-looking façade for a host autodiff framework.
//!
//! `DifferentiableFront` is the only place that should touch a host AD
//! framework's tensor/gradient types; the conversion happens at this
//! boundary and the rest of the core stays in a plain numeric-array
//! dialect. The state machine (`Fresh -> Forwarded -> Backwarded`) exists
//! because `backward` depends on context `forward` captured; `forward`
//! always resets regardless of the current state, since it unconditionally
//! overwrites every excitation branch before doing anything else.

use crate::adjoint;
use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrontState {
    Fresh,
    Forwarded,
    Backwarded,
}

/// Captures the index context of the last forward pass so `backward` can
/// run the adjoint procedure against it. Returns gradients only for
/// `can_values`; every other forward argument is non-differentiable from
/// this façade's point of view and the host is expected to supply no
/// gradient for them.
pub struct DifferentiableFront {
    state: FrontState,
    can_index: Vec<usize>,
    vol_obs_index: Vec<usize>,
    cur_obs_index: Vec<usize>,
}

impl Default for DifferentiableFront {
    fn default() -> Self {
        Self::new()
    }
}

impl DifferentiableFront {
    pub fn new() -> Self {
        Self {
            state: FrontState::Fresh,
            can_index: Vec::new(),
            vol_obs_index: Vec::new(),
            cur_obs_index: Vec::new(),
        }
    }

    /// (a) zero all excitations; (b) write the candidate values; (c) write
    /// the non-candidate excitation values; (d) solve; (e) return the
    /// requested observations. Always resets the state machine to
    /// `Forwarded`, even if a previous forward/backward pair never
    /// completed.
    #[allow(clippy::too_many_arguments)]
    pub fn forward(
        &mut self,
        circuit: &mut Circuit,
        can_values: &[f64],
        can_index: &[usize],
        exc_values: &[f64],
        exc_index: &[usize],
        vol_obs_index: &[usize],
        cur_obs_index: &[usize],
    ) -> CircuitResult<(Vec<f64>, Vec<f64>)> {
        let all_excitations = circuit.excitation_index();
        let zeros = vec![0.0; all_excitations.len()];
        circuit.alter(&all_excitations, &zeros)?;

        circuit.alter(can_index, can_values)?;
        circuit.alter(exc_index, exc_values)?;
        circuit.solve()?;

        let vol_obs = circuit.branch_voltage(vol_obs_index)?;
        let cur_obs = circuit.branch_current(cur_obs_index)?;

        self.can_index = can_index.to_vec();
        self.vol_obs_index = vol_obs_index.to_vec();
        self.cur_obs_index = cur_obs_index.to_vec();
        self.state = FrontState::Forwarded;

        Ok((vol_obs, cur_obs))
    }

    /// Runs the adjoint procedure of `adjoint::gradient` against the
    /// context captured by the last `forward`. Fatal if called without a
    /// preceding forward, since there is no captured context to run it
    /// against.
    pub fn backward(
        &mut self,
        circuit: &mut Circuit,
        vol_grad: &[f64],
        cur_grad: &[f64],
    ) -> CircuitResult<Vec<f64>> {
        if self.state != FrontState::Forwarded {
            return Err(CircuitError::BackwardWithoutForward);
        }

        let grad = adjoint::gradient(
            circuit,
            &self.can_index,
            &self.vol_obs_index,
            vol_grad,
            &self.cur_obs_index,
            cur_grad,
        )?;

        self.state = FrontState::Backwarded;
        Ok(grad)
    }
}
