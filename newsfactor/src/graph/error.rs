//! Graph compile and run errors.

/// Error when compiling or running a state graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum GraphError {
    /// An edge or jump names a node that was never added.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The graph has no edges, so there is no entry node.
    #[error("graph has no edges")]
    Empty,

    /// The run exceeded the configured number of node executions.
    #[error("step limit of {0} exceeded")]
    StepLimit(usize),
}
