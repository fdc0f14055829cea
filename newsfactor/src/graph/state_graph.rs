//! Graph builder.

use std::collections::HashMap;
use std::fmt;

use super::compiled::CompiledStateGraph;
use super::error::GraphError;
use super::node::Node;

/// Nodes plus a linear edge order, generic over the state type.
pub struct StateGraph<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edge_order: Vec<String>,
    max_steps: usize,
}

impl<S> fmt::Debug for StateGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes: Vec<_> = self.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("StateGraph")
            .field("nodes", &nodes)
            .field("edge_order", &self.edge_order)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

impl<S: Send + 'static> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + 'static> StateGraph<S> {
    /// Default cap on node executions per run.
    pub const DEFAULT_MAX_STEPS: usize = 64;

    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edge_order: Vec::new(),
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    /// Adds a node under its own id, replacing any node with the same id.
    pub fn add_node(&mut self, node: Box<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(node.id().to_owned(), node);
        self
    }

    /// Appends `id` to the chain. The first edge is the entry node; the last
    /// leads to the end.
    pub fn add_edge(&mut self, id: impl Into<String>) -> &mut Self {
        self.edge_order.push(id.into());
        self
    }

    /// Caps node executions per run.
    pub fn max_steps(&mut self, max_steps: usize) -> &mut Self {
        self.max_steps = max_steps;
        self
    }

    /// Validates the chain and freezes the graph.
    ///
    /// # Errors
    ///
    /// [`GraphError::Empty`] without edges, [`GraphError::NodeNotFound`] when
    /// an edge names an unregistered node.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, GraphError> {
        if self.edge_order.is_empty() {
            return Err(GraphError::Empty);
        }
        if let Some(missing) = self.edge_order.iter().find(|id| !self.nodes.contains_key(*id)) {
            return Err(GraphError::NodeNotFound(missing.clone()));
        }
        Ok(CompiledStateGraph {
            nodes: self.nodes,
            edge_order: self.edge_order,
            max_steps: self.max_steps,
        })
    }
}
