use std::fmt;

/// Guard evaluated to select an edge.
///
/// Predicates must be synchronous and side-effect-free; they are consulted
/// only after the source node has finished, and are never a suspension point.
pub type Predicate<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;

/// A transition rule between two nodes.
///
/// Edges are directional and keyed by their source node. A source may have
/// any number of `Conditional` edges, evaluated strictly in registration
/// order, and at most one `Otherwise` fallback (enforced at build time).
pub enum Edge<S> {
    /// Guarded transition: taken when its predicate holds for the state the
    /// source node produced and no earlier conditional edge matched.
    Conditional {
        from: String,
        to: String,
        predicate: Predicate<S>,
    },
    /// Unconditional fallback, consulted only after every conditional edge
    /// of the source failed.
    Otherwise { from: String, to: String },
}

impl<S> Edge<S> {
    /// Id of the source node.
    pub fn from(&self) -> &str {
        match self {
            Edge::Conditional { from, .. } | Edge::Otherwise { from, .. } => from,
        }
    }

    /// Id of the target node.
    pub fn to(&self) -> &str {
        match self {
            Edge::Conditional { to, .. } | Edge::Otherwise { to, .. } => to,
        }
    }

    pub fn is_otherwise(&self) -> bool {
        matches!(self, Edge::Otherwise { .. })
    }
}

impl<S> fmt::Debug for Edge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Conditional { from, to, .. } => f
                .debug_struct("Conditional")
                .field("from", from)
                .field("to", to)
                .finish_non_exhaustive(),
            Edge::Otherwise { from, to } => f
                .debug_struct("Otherwise")
                .field("from", from)
                .field("to", to)
                .finish(),
        }
    }
}
