//! A small state graph: nodes plus a linear edge chain.
//!
//! Build with [`StateGraph::add_node`] and [`StateGraph::add_edge`], then
//! [`StateGraph::compile`] and [`CompiledStateGraph::invoke`]. Each node
//! returns a [`Next`] that continues the chain, jumps to a node, or ends.

mod compiled;
mod error;
mod node;
mod state_graph;

pub use compiled::CompiledStateGraph;
pub use error::GraphError;
pub use node::{Next, Node};
pub use state_graph::StateGraph;
