use thiserror::Error;

/// A single structural defect found while validating a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralIssue {
    #[error("entry point is not set")]
    EntryPointMissing,

    #[error("entry point '{0}' is not a registered node")]
    EntryPointUnknown(String),

    #[error("edge '{from}' -> '{to}' starts at an unregistered node")]
    UnknownEdgeSource { from: String, to: String },

    #[error("edge '{from}' -> '{to}' targets an unregistered node")]
    UnknownEdgeTarget { from: String, to: String },

    #[error("terminal marker cannot have outgoing edges (edge to '{0}')")]
    EdgeFromTerminal(String),

    #[error("'{0}' is reserved for the terminal marker and cannot name a node")]
    ReservedNodeId(String),

    #[error("node '{0}' has more than one otherwise edge")]
    DuplicateOtherwise(String),
}

/// Build-time validation failure.
///
/// `GraphBuilder::build` checks the whole structure in one pass and reports
/// every issue it found, so callers see the full picture instead of fixing
/// defects one at a time. A graph with any issue is never returned.
#[derive(Debug, Error)]
#[error("invalid workflow graph: {}", .issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct BuildError {
    pub issues: Vec<StructuralIssue>,
}

/// Run-time failure that terminates a single run's state stream.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The node produced a state that no outgoing edge matched.
    #[error("no edge matched the state produced by node '{0}'")]
    UnmatchedTransition(String),

    /// An edge routed to a node missing from the graph. Unreachable for
    /// graphs built by `GraphBuilder::build`, which validates every endpoint.
    #[error("node '{0}' is not registered in this graph")]
    MissingNode(String),

    /// A node's own failure, passed through without translation or retry.
    #[error("node execution failed: {0}")]
    Node(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
