use std::future::Future;

use futures::future::BoxFuture;

use crate::error::Result;

/// One unit of work in a workflow — state in, new state out.
///
/// The engine treats the state as an opaque value: a node receives the
/// current state by value and returns a replacement. What happens inside
/// (an LLM call, a tool invocation, pure computation) is the node's own
/// business, including any timeout or retry policy it needs.
pub trait Node<S>: Send + Sync
where
    S: Send + 'static,
{
    /// Execute this node against the current state.
    fn run(&self, state: S) -> BoxFuture<'_, Result<S>>;
}

/// Adapter turning an async closure into a [`Node`].
///
/// Keeps callers and tests from writing a struct per step:
///
/// ```
/// use weft_core::{FnNode, Result};
///
/// let double = FnNode::new(|n: i64| async move { Result::Ok(n * 2) });
/// ```
pub struct FnNode<F> {
    f: F,
}

impl<F> FnNode<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<S, F, Fut> Node<S> for FnNode<F>
where
    S: Send + 'static,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S>> + Send + 'static,
{
    fn run(&self, state: S) -> BoxFuture<'_, Result<S>> {
        Box::pin((self.f)(state))
    }
}

impl<S> Node<S> for std::sync::Arc<dyn Node<S>>
where
    S: Send + 'static,
{
    fn run(&self, state: S) -> BoxFuture<'_, Result<S>> {
        (**self).run(state)
    }
}
