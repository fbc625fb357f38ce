//! Workflow graph engine — nodes, guarded edges, streaming execution.
//!
//! A workflow is a directed graph of [`Node`]s connected by [`Edge`]s.
//! [`GraphBuilder`] accumulates nodes and edges with a fluent API and
//! validates the whole structure in one shot; [`GraphExecutor`] walks the
//! resulting [`Graph`] from its entry point, following the first matching
//! edge after each node and emitting every intermediate state as a lazy,
//! pull-based stream until the terminal marker [`END`] is reached.
//!
//! The engine never interprets what a node does: a node is any capability
//! that maps the current state to a new state, asynchronously.

pub mod builder;
pub mod context;
pub mod edge;
pub mod executor;
pub mod graph;

pub use builder::{EdgeBuilder, GraphBuilder};
pub use context::FlowContext;
pub use edge::{Edge, Predicate};
pub use executor::GraphExecutor;
pub use graph::{Graph, END};
pub use weft_core::{BuildError, ExecutionError, FnNode, Node, Result, StructuralIssue};
