//! Differentiable steady-state Modified Nodal Analysis (MNA) circuit
//! solver, used as the core of a power-delivery-network pad-placement
//! optimizer: given a resistive grid and a set of candidate pad
//! conductances, the core assembles G and J from typed branches
//! (voltage/current/conductance), re-solves under incremental value edits,
//! and hands back an adjoint gradient of observation quantities with
//! respect to the candidates -- one extra linear solve for all of them.
//!
//! The netlist reader, the graph post-processor that inserts the `gx*`
//! candidate branches, the outer optimization loop, and any host
//! automatic-differentiation framework are all out of scope here: this
//! crate exposes a primal solve plus a gradient kernel for a host to wrap
//! as a custom differentiable operator.

mod adjoint;
pub mod branch;
pub mod circuit;
pub mod error;
mod front;
mod query;
mod solver;
mod stamp;

pub use branch::{BranchStore, BranchType};
pub use circuit::Circuit;
pub use error::{CircuitError, CircuitResult};
pub use front::DifferentiableFront;
