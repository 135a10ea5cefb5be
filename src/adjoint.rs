//! The adjoint-gradient (backward) pass.
//!
//! Because G is symmetric, one extra linear solve with the observation
//! gradients substituted in as the new excitation yields
//! `grad[i] = origin_can_voltage[i] * adjoint_can_voltage[i]` for every
//! candidate simultaneously. Reusing `alter` to inject the gradient
//! excitation means `origin_can_voltage` must be captured before the
//! excitation branches are overwritten -- that ordering is the whole
//! correctness argument for this function.

use crate::circuit::Circuit;
use crate::error::CircuitResult;

/// Computes `d(loss)/d(can_values)` given the observation-quantity
/// gradients `vol_grad`/`cur_grad`, assuming `circuit` already holds a
/// current forward solution over `can_index`/`vol_obs_index`/`cur_obs_index`.
///
/// Leaves the circuit "consumed": its branch values no longer match the
/// primal scene once this returns, matching the excitation-zeroing effect
/// of step 2 below. Callers must re-run a forward pass before reusing the
/// circuit for anything but another backward call against the same state.
pub fn gradient(
    circuit: &mut Circuit,
    can_index: &[usize],
    vol_obs_index: &[usize],
    vol_grad: &[f64],
    cur_obs_index: &[usize],
    cur_grad: &[f64],
) -> CircuitResult<Vec<f64>> {
    // 1. Capture the primal candidate voltages before anything is altered.
    let origin_can_voltage = circuit.branch_voltage(can_index)?;

    // 2. Zero every excitation branch (V and I). G is untouched, so LU
    //    survives; only J is rebuilt.
    let exc_index = circuit.excitation_index();
    let zeros = vec![0.0; exc_index.len()];
    circuit.alter(&exc_index, &zeros)?;

    // 3. Inject the incoming observation gradients as the new excitation.
    circuit.alter(vol_obs_index, vol_grad)?;
    circuit.alter(cur_obs_index, cur_grad)?;

    // 4. One more solve -- this is the entire cost of the adjoint pass.
    circuit.solve()?;

    // 5. Read the candidate voltages under the adjoint excitation.
    let adjoint_can_voltage = circuit.branch_voltage(can_index)?;

    // 6. Element-wise product across all candidates.
    Ok(origin_can_voltage
        .iter()
        .zip(adjoint_can_voltage.iter())
        .map(|(a, b)| a * b)
        .collect())
}
