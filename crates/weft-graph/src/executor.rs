use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tracing::{debug, error, info};

use weft_core::{ExecutionError, Result};

use crate::graph::{Graph, END};

/// Walks a [`Graph`] from its entry point, emitting every post-execution
/// state as a lazy, pull-based stream.
///
/// The executor holds the graph behind an `Arc`, so a single graph can drive
/// any number of concurrent runs; each run owns its own state sequence and
/// runs strictly sequentially within itself — node execution is the only
/// suspension point, and the routing decision for a node's output happens
/// only after that node has finished.
pub struct GraphExecutor<S> {
    graph: Arc<Graph<S>>,
}

/// Where a run currently stands between polls.
enum Cursor<S> {
    At { id: String, state: S },
    Finished,
}

impl<S> GraphExecutor<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(graph: impl Into<Arc<Graph<S>>>) -> Self {
        Self {
            graph: graph.into(),
        }
    }

    /// The graph this executor runs.
    pub fn graph(&self) -> &Arc<Graph<S>> {
        &self.graph
    }

    /// Start a run from `initial`.
    ///
    /// The stream yields one state per executed node, then the incoming
    /// state once more when the terminal marker is reached. Nothing executes
    /// until the consumer polls, so dropping the stream cancels the run
    /// before the next node starts. A routing or node failure ends the
    /// stream with an error; no state is emitted for the failed step.
    pub fn run(&self, initial: S) -> BoxStream<'static, Result<S>> {
        let graph = Arc::clone(&self.graph);
        let seed = Cursor::At {
            id: graph.entry_point().to_string(),
            state: initial,
        };

        stream::try_unfold(seed, move |cursor| {
            let graph = Arc::clone(&graph);
            async move {
                let (id, state) = match cursor {
                    Cursor::Finished => return Ok(None),
                    Cursor::At { id, state } => (id, state),
                };

                if id == END {
                    debug!("reached terminal marker, ending run");
                    return Ok(Some((state, Cursor::Finished)));
                }

                let node = graph
                    .node(&id)
                    .ok_or_else(|| ExecutionError::MissingNode(id.clone()))?;

                info!(node_id = %id, "executing workflow node");
                let state = node.run(state).await?;

                let next = match graph.resolve(&id, &state) {
                    Some(next) => next.to_string(),
                    None => {
                        error!(node_id = %id, "no edge matched the produced state");
                        return Err(ExecutionError::UnmatchedTransition(id));
                    }
                };

                debug!(node_id = %id, next = %next, "edge matched");
                Ok(Some((state.clone(), Cursor::At { id: next, state })))
            }
        })
        .boxed()
    }

    /// Drive a run to its end, returning the final state.
    pub async fn run_to_completion(&self, initial: S) -> Result<S> {
        let mut last = initial.clone();
        let mut states = self.run(initial);
        while let Some(state) = states.next().await {
            last = state?;
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::StreamExt;
    use weft_core::FnNode;

    use super::*;
    use crate::builder::GraphBuilder;

    fn add(amount: i64) -> impl weft_core::Node<i64> + 'static {
        FnNode::new(move |n: i64| futures::future::ready(Ok(n + amount)))
    }

    async fn collect_ok(mut stream: BoxStream<'static, Result<i64>>) -> Vec<i64> {
        let mut out = Vec::new();
        while let Some(state) = stream.next().await {
            out.push(state.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_linear_run_emits_one_state_per_node_plus_terminal() {
        let graph = GraphBuilder::new()
            .add_node("a", add(1))
            .add_node("b", add(10))
            .start_from("a")
            .connect("a")
            .to("b")
            .connect("b")
            .to(END)
            .build()
            .unwrap();

        let states = collect_ok(GraphExecutor::new(graph).run(0)).await;
        assert_eq!(states, vec![1, 11, 11]);
    }

    #[tokio::test]
    async fn test_tie_break_takes_first_registered_match() {
        let visited = |tag: i64| FnNode::new(move |_: i64| futures::future::ready(Ok(tag)));

        // v=10 satisfies both guards; the first registered edge must win.
        let graph = GraphBuilder::new()
            .add_node("a", FnNode::new(|n: i64| async move { Ok(n) }))
            .add_node("b", visited(100))
            .add_node("c", visited(200))
            .add_node("d", visited(300))
            .start_from("a")
            .connect("a")
            .when(|n| *n > 0)
            .to("b")
            .connect("a")
            .when(|n| *n > 5)
            .to("c")
            .connect("a")
            .otherwise()
            .to("d")
            .connect("b")
            .to(END)
            .connect("c")
            .to(END)
            .connect("d")
            .to(END)
            .build()
            .unwrap();
        let executor = GraphExecutor::new(graph);

        let final_state = executor.run_to_completion(10).await.unwrap();
        assert_eq!(final_state, 100);

        // Nothing matches the guards: the fallback routes to d.
        let final_state = executor.run_to_completion(-1).await.unwrap();
        assert_eq!(final_state, 300);
    }

    #[tokio::test]
    async fn test_loop_until_guard_fails() {
        // a adds 1, b adds 10, b loops back to a while v < 3.
        let graph = GraphBuilder::new()
            .add_node("a", add(1))
            .add_node("b", add(10))
            .start_from("a")
            .connect("a")
            .to("b")
            .connect("b")
            .when(|n| *n < 3)
            .to("a")
            .connect("b")
            .otherwise()
            .to(END)
            .build()
            .unwrap();

        let states = collect_ok(GraphExecutor::new(graph).run(0)).await;
        assert_eq!(states, vec![1, 11, 11]);
    }

    #[tokio::test]
    async fn test_unmatched_transition_fails_and_names_the_node() {
        let graph = GraphBuilder::new()
            .add_node("a", add(1))
            .add_node("b", add(1))
            .start_from("a")
            .connect("a")
            .to("b")
            .connect("b")
            .when(|_| false)
            .to("a")
            .build()
            .unwrap();

        let mut stream = GraphExecutor::new(graph).run(0);
        // a's output is emitted before b fails to route.
        assert_eq!(stream.next().await.unwrap().unwrap(), 1);
        match stream.next().await.unwrap() {
            Err(ExecutionError::UnmatchedTransition(id)) => assert_eq!(id, "b"),
            other => panic!("expected unmatched transition, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dead_end_node_is_a_routing_failure() {
        // No outgoing edges at all is the same failure as no matching edge.
        let graph = GraphBuilder::new()
            .add_node("a", add(1))
            .start_from("a")
            .build()
            .unwrap();

        let err = GraphExecutor::new(graph).run_to_completion(0).await;
        assert!(matches!(
            err,
            Err(ExecutionError::UnmatchedTransition(id)) if id == "a"
        ));
    }

    #[tokio::test]
    async fn test_node_error_passes_through_unmodified() {
        let graph = GraphBuilder::new()
            .add_node(
                "a",
                FnNode::new(|_: i64| async move { Err(anyhow::anyhow!("device offline").into()) }),
            )
            .start_from("a")
            .connect("a")
            .to(END)
            .build()
            .unwrap();

        let mut stream = GraphExecutor::new(graph).run(0);
        match stream.next().await.unwrap() {
            Err(ExecutionError::Node(e)) => assert_eq!(e.to_string(), "device offline"),
            other => panic!("expected node error, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_consumer_that_stops_polling_stops_execution() {
        let executed = Arc::new(AtomicUsize::new(0));
        let counting = |executed: Arc<AtomicUsize>| {
            FnNode::new(move |n: i64| {
                executed.fetch_add(1, Ordering::SeqCst);
                futures::future::ready(Ok(n))
            })
        };

        let graph = GraphBuilder::new()
            .add_node("a", counting(executed.clone()))
            .add_node("b", counting(executed.clone()))
            .add_node("c", counting(executed.clone()))
            .start_from("a")
            .connect("a")
            .to("b")
            .connect("b")
            .to("c")
            .connect("c")
            .to(END)
            .build()
            .unwrap();
        let executor = GraphExecutor::new(graph);

        let mut stream = executor.run(0);
        assert!(stream.next().await.is_some());
        drop(stream);

        // Only the node whose state was pulled has run.
        assert_eq!(executed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_graph_runs_do_not_interfere() {
        let graph = GraphBuilder::new()
            .add_node("a", add(1))
            .start_from("a")
            .connect("a")
            .to(END)
            .build()
            .unwrap();
        let executor = Arc::new(GraphExecutor::new(graph));

        let (x, y) = tokio::join!(
            executor.run_to_completion(1),
            executor.run_to_completion(100),
        );
        assert_eq!(x.unwrap(), 2);
        assert_eq!(y.unwrap(), 101);
    }

    #[tokio::test]
    async fn test_entry_at_terminal_emits_initial_state_once() {
        let graph = GraphBuilder::new().start_from(END).build().unwrap();
        let states = collect_ok(GraphExecutor::new(graph).run(7)).await;
        assert_eq!(states, vec![7]);
    }
}
