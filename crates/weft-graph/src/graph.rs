use std::collections::HashMap;
use std::sync::Arc;

use weft_core::Node;

use crate::edge::{Edge, Predicate};

/// Reserved id of the terminal marker.
///
/// Reaching it ends a run: the executor emits the incoming state once and
/// stops. It is a valid edge target and a valid entry point, but it never
/// has outgoing edges and no user node may be registered under this id.
pub const END: &str = "__end__";

/// Routing table for one source node: conditional edges in registration
/// order, plus the optional fallback.
pub(crate) struct Routes<S> {
    conditional: Vec<(Predicate<S>, String)>,
    otherwise: Option<String>,
}

impl<S> Default for Routes<S> {
    fn default() -> Self {
        Self {
            conditional: Vec::new(),
            otherwise: None,
        }
    }
}

/// An immutable, validated workflow graph.
///
/// Built once via [`GraphBuilder`](crate::builder::GraphBuilder), then shared
/// read-only across any number of concurrent runs. Each run carries its own
/// state; the graph itself is never mutated after construction.
pub struct Graph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    routes: HashMap<String, Routes<S>>,
    entry: String,
}

impl<S> std::fmt::Debug for Graph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

impl<S> Graph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Invariants (entry known, endpoints known, single fallback per source)
    /// are the builder's responsibility; this only reshapes the edge list
    /// into per-source routing tables, preserving registration order.
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn Node<S>>>,
        edges: Vec<Edge<S>>,
        entry: String,
    ) -> Self {
        let mut routes: HashMap<String, Routes<S>> = HashMap::new();
        for edge in edges {
            match edge {
                Edge::Conditional {
                    from,
                    to,
                    predicate,
                } => routes
                    .entry(from)
                    .or_default()
                    .conditional
                    .push((predicate, to)),
                Edge::Otherwise { from, to } => {
                    routes.entry(from).or_default().otherwise = Some(to);
                }
            }
        }
        Self {
            nodes,
            routes,
            entry,
        }
    }

    /// Id of the node a run starts from.
    pub fn entry_point(&self) -> &str {
        &self.entry
    }

    /// Whether `id` names a node in this graph. The terminal marker counts.
    pub fn contains(&self, id: &str) -> bool {
        id == END || self.nodes.contains_key(id)
    }

    /// Ids of the registered nodes, in no particular order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub(crate) fn node(&self, id: &str) -> Option<&Arc<dyn Node<S>>> {
        self.nodes.get(id)
    }

    /// Resolve the next node for `from` given the state it produced:
    /// conditional edges first, in registration order, then the fallback.
    /// `None` means no edge matched at all.
    pub(crate) fn resolve(&self, from: &str, state: &S) -> Option<&str> {
        let routes = self.routes.get(from)?;
        for (predicate, to) in &routes.conditional {
            if predicate(state) {
                return Some(to);
            }
        }
        routes.otherwise.as_deref()
    }
}
