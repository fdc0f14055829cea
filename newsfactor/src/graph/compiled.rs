//! Executable graph.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::error::GraphError;
use super::node::{Next, Node};
use crate::error::Result;

/// Immutable graph produced by [`StateGraph::compile`](super::StateGraph::compile).
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Box<dyn Node<S>>>,
    pub(super) edge_order: Vec<String>,
    pub(super) max_steps: usize,
}

impl<S> fmt::Debug for CompiledStateGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledStateGraph")
            .field("edge_order", &self.edge_order)
            .field("max_steps", &self.max_steps)
            .finish_non_exhaustive()
    }
}

impl<S: Send + 'static> CompiledStateGraph<S> {
    /// Node ids in chain order.
    #[must_use]
    pub fn edge_order(&self) -> &[String] {
        &self.edge_order
    }

    /// Runs the graph from the first node in the chain.
    ///
    /// `Continue` after a node that is not in the chain ends the run.
    ///
    /// # Errors
    ///
    /// Propagates node errors; fails on a jump to an unknown node or when the
    /// step limit is exceeded.
    pub async fn invoke(&self, state: S) -> Result<S> {
        let mut state = state;
        let mut current = self.edge_order.first().cloned().ok_or(GraphError::Empty)?;
        let mut steps = 0usize;

        loop {
            if steps >= self.max_steps {
                return Err(GraphError::StepLimit(self.max_steps).into());
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::NodeNotFound(current.clone()))?;
            debug!(node = %current, step = steps, "Running node");
            let (next_state, next) = node.run(state).await?;
            state = next_state;

            match next {
                Next::End => return Ok(state),
                Next::Node(id) => current = id,
                Next::Continue => {
                    let following = self
                        .edge_order
                        .iter()
                        .position(|id| *id == current)
                        .and_then(|pos| self.edge_order.get(pos + 1));
                    match following {
                        Some(id) => current = id.clone(),
                        None => return Ok(state),
                    }
                }
            }
        }
    }
}
