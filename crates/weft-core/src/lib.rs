pub mod error;
pub mod node;

pub use error::{BuildError, ExecutionError, Result, StructuralIssue};
pub use node::{FnNode, Node};
