//! Units of work queued on a chain

use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};

use super::StepValue;

type DependentFn<T, E> = Box<dyn FnOnce(T) -> BoxFuture<'static, Result<T, E>> + Send>;

/// The work performed by one step
pub enum Task<T, E> {
    /// Already-created computation; ignores the previous step's result
    Pending(BoxFuture<'static, Result<T, E>>),

    /// Computation built from the previous step's result
    Dependent(DependentFn<T, E>),
}

impl<T, E> Task<T, E>
where
    T: StepValue,
    E: Send + 'static,
{
    /// Wrap a computation that does not depend on earlier steps
    pub fn pending<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }

    /// Build the computation from the previous step's result when the step runs
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::Dependent(Box::new(move |prev: T| f(prev).boxed()))
    }

    /// A step that succeeds immediately with `value`
    pub fn resolved(value: T) -> Self {
        Self::pending(future::ready(Ok(value)))
    }

    /// A step that fails immediately with `error`
    pub fn rejected(error: E) -> Self {
        Self::pending(future::ready(Err(error)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pending(_) => "pending",
            Self::Dependent(_) => "dependent",
        }
    }

    pub(crate) async fn run(self, prev: T) -> Result<T, E> {
        match self {
            Self::Pending(future) => future.await,
            Self::Dependent(f) => f(prev).await,
        }
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Pending(_) => "Pending",
            Self::Dependent(_) => "Dependent",
        };
        f.debug_tuple("Task").field(&kind).finish()
    }
}

type ItemsFn<I, T> = Box<dyn FnOnce(&T) -> Vec<I> + Send>;

/// Items iterated by a `foreach` step
pub enum Items<I, T> {
    /// Fixed list known when the chain is built
    List(Vec<I>),

    /// List derived from the previous step's result
    Computed(ItemsFn<I, T>),
}

impl<I, T> Items<I, T> {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> Vec<I> + Send + 'static,
    {
        Self::Computed(Box::new(f))
    }

    pub(crate) fn resolve(self, prev: &T) -> Vec<I> {
        match self {
            Self::List(items) => items,
            Self::Computed(f) => f(prev),
        }
    }
}

impl<I, T> From<Vec<I>> for Items<I, T> {
    fn from(items: Vec<I>) -> Self {
        Self::List(items)
    }
}

/// How a failed step is recovered
pub(crate) enum Recovery<T, E> {
    /// Handler output replaces the whole result sequence and the chain aggregates
    Sequence(Box<dyn FnOnce(E) -> BoxFuture<'static, Vec<T>> + Send>),

    /// Handler output becomes this step's result and the chain continues
    Step(Box<dyn FnOnce(E) -> BoxFuture<'static, T> + Send>),
}

impl<T, E> Recovery<T, E> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Step(_) => "step",
        }
    }
}

pub(crate) struct Step<T, E> {
    pub(crate) task: Task<T, E>,
    pub(crate) recovery: Option<Recovery<T, E>>,
}

impl<T, E> Step<T, E> {
    pub(crate) fn new(task: Task<T, E>) -> Self {
        Self {
            task,
            recovery: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_pending_task_ignores_previous_result() {
        let task: Task<Value, String> = Task::resolved(json!("fixed"));
        assert_eq!(task.kind(), "pending");

        let output = task.run(json!("ignored")).await;
        assert_eq!(output, Ok(json!("fixed")));
    }

    #[tokio::test]
    async fn test_dependent_task_receives_previous_result() {
        let task: Task<Value, String> =
            Task::from_fn(|prev: Value| async move { Ok(json!([prev, "next"])) });
        assert_eq!(task.kind(), "dependent");

        let output = task.run(json!("prev")).await;
        assert_eq!(output, Ok(json!(["prev", "next"])));
    }

    #[tokio::test]
    async fn test_rejected_task() {
        let task: Task<Value, String> = Task::rejected("boom".to_string());
        assert_eq!(task.run(Value::Null).await, Err("boom".to_string()));
    }

    #[test]
    fn test_items_resolution() {
        let listed: Items<i32, Value> = vec![1, 2, 3].into();
        assert_eq!(listed.resolve(&Value::Null), vec![1, 2, 3]);

        let computed: Items<u64, Value> = Items::from_fn(|prev: &Value| {
            prev.as_array()
                .map(|values| values.iter().filter_map(Value::as_u64).collect())
                .unwrap_or_default()
        });
        assert_eq!(computed.resolve(&json!([4, "x", 5])), vec![4, 5]);
    }
}
