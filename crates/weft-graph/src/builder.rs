use std::collections::HashMap;
use std::sync::Arc;

use weft_core::{BuildError, Node, StructuralIssue};

use crate::edge::{Edge, Predicate};
use crate::graph::{Graph, END};

/// Fluent accumulator for nodes and edges.
///
/// Register nodes with [`add_node`](Self::add_node), describe transitions via
/// [`connect`](Self::connect), pick the entry point with
/// [`start_from`](Self::start_from), then call [`build`](Self::build).
/// Validation happens once, in `build()`: either every structural check
/// passes and an immutable [`Graph`] is returned, or the call fails with all
/// issues found — no partially valid graph ever escapes, and no structural
/// error can surface mid-run.
pub struct GraphBuilder<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<Edge<S>>,
    entry: Option<String>,
}

impl<S> Default for GraphBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> GraphBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            entry: None,
        }
    }

    /// Register a node under a stable id.
    ///
    /// The id is the node's identity everywhere else in the API; re-adding
    /// an id replaces the node while leaving edges referring to it intact.
    pub fn add_node(mut self, id: impl Into<String>, node: impl Node<S> + 'static) -> Self {
        self.nodes.insert(id.into(), Arc::new(node));
        self
    }

    /// Start describing an outgoing edge of `from`.
    pub fn connect(self, from: impl Into<String>) -> EdgeBuilder<S> {
        EdgeBuilder {
            builder: self,
            from: from.into(),
            predicate: None,
            fallback: false,
        }
    }

    /// Set the node a run starts from.
    pub fn start_from(mut self, id: impl Into<String>) -> Self {
        self.entry = Some(id.into());
        self
    }

    /// Validate the accumulated structure and freeze it into a [`Graph`].
    ///
    /// Checks, all collected into a single [`BuildError`]:
    /// - the entry point is set and names a registered node (or [`END`]);
    /// - every edge endpoint names a registered node ([`END`] is a valid
    ///   target but never a source);
    /// - no user node is registered under the reserved terminal id;
    /// - no source node has more than one otherwise edge.
    pub fn build(self) -> Result<Graph<S>, BuildError> {
        let mut issues = Vec::new();

        match &self.entry {
            None => issues.push(StructuralIssue::EntryPointMissing),
            Some(id) if id != END && !self.nodes.contains_key(id.as_str()) => {
                issues.push(StructuralIssue::EntryPointUnknown(id.clone()));
            }
            Some(_) => {}
        }

        if self.nodes.contains_key(END) {
            issues.push(StructuralIssue::ReservedNodeId(END.to_string()));
        }

        let mut fallbacks: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            let (from, to) = (edge.from(), edge.to());

            if from == END {
                issues.push(StructuralIssue::EdgeFromTerminal(to.to_string()));
            } else if !self.nodes.contains_key(from) {
                issues.push(StructuralIssue::UnknownEdgeSource {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }

            if to != END && !self.nodes.contains_key(to) {
                issues.push(StructuralIssue::UnknownEdgeTarget {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }

            if edge.is_otherwise() {
                let seen = fallbacks.entry(from).or_insert(0);
                *seen += 1;
                if *seen == 2 {
                    issues.push(StructuralIssue::DuplicateOtherwise(from.to_string()));
                }
            }
        }

        match self.entry {
            Some(entry) if issues.is_empty() => Ok(Graph::new(self.nodes, self.edges, entry)),
            _ => Err(BuildError { issues }),
        }
    }
}

/// One edge under construction. Created by [`GraphBuilder::connect`].
///
/// - `.when(pred).to(target)` adds a guarded edge;
/// - `.to(target)` alone adds an always-true guarded edge — it is still a
///   conditional edge and keeps its position in registration order, which is
///   what distinguishes it from a fallback;
/// - `.otherwise().to(target)` adds the fallback edge, consulted only after
///   every guarded edge of the source failed. `otherwise()` discards any
///   predicate set before it.
pub struct EdgeBuilder<S> {
    builder: GraphBuilder<S>,
    from: String,
    predicate: Option<Predicate<S>>,
    fallback: bool,
}

impl<S> EdgeBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Guard the edge with a predicate over the state the source produced.
    pub fn when(mut self, predicate: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Turn this edge into the source's fallback.
    pub fn otherwise(mut self) -> Self {
        self.fallback = true;
        self.predicate = None;
        self
    }

    /// Finish the edge and hand the builder back.
    pub fn to(self, target: impl Into<String>) -> GraphBuilder<S> {
        let EdgeBuilder {
            mut builder,
            from,
            predicate,
            fallback,
        } = self;
        let to = target.into();

        let edge = if fallback {
            Edge::Otherwise { from, to }
        } else {
            let predicate = predicate.unwrap_or_else(|| Box::new(|_: &S| true));
            Edge::Conditional {
                from,
                to,
                predicate,
            }
        };
        builder.edges.push(edge);
        builder
    }
}
