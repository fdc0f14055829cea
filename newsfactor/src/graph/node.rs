//! Graph node trait and routing result.

use async_trait::async_trait;

use crate::error::Result;

/// Next step after running a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Follow the edge chain; after the last node this ends the run.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}

/// One step in a graph: state in, state out plus routing.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Send + 'static,
{
    /// Node id, unique within a graph.
    fn id(&self) -> &str;

    /// Run one step.
    async fn run(&self, state: S) -> Result<(S, Next)>;
}
