use thiserror::Error;

/// Error taxonomy for the circuit core: structural (construction-time),
/// invariant violations (caller contract), numeric (factorization), and
/// usage (stale-state reads). All variants are fatal to the call that
/// raised them; none of them are retried internally.
#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("duplicate branch name: {0}")]
    DuplicateBranch(String),

    #[error("branch {name} references unknown node index {node}")]
    UnknownNode { name: String, node: usize },

    #[error("branch {name} connects the datum node to itself")]
    DatumOnlyBranch { name: String },

    #[error("branches are not grouped V < I < G at construction (branch {index})")]
    BranchOrdering { index: usize },

    #[error("alter() received {indices} indices but {values} values")]
    AlterLengthMismatch { indices: usize, values: usize },

    #[error("alter() index {0} is out of range")]
    AlterIndexOutOfRange(usize),

    #[error("G is singular and cannot be factorized; alter conductances and retry")]
    SingularMatrix,

    #[error("branch_voltage/branch_current called while V is stale; call solve() first")]
    StaleSolution,

    #[error("backward() called before a matching forward()")]
    BackwardWithoutForward,
}

pub type CircuitResult<T> = Result<T, CircuitError>;
