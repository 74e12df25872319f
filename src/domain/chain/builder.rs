//! Chain builder - queues steps and runs them strictly in order

use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Deserialize;
use tracing::{debug, info_span, trace, warn, Instrument};

use super::finalized::DefaultFallback;
use super::step::{Items, Recovery, Step, Task};
use super::{ChainError, Finalized, StepValue};

type Aggregate<T, R> = Box<dyn FnOnce(Vec<T>) -> BoxFuture<'static, R> + Send>;

/// Configuration for a chain run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Label attached to the chain's tracing span
    pub name: String,
    /// Log every step result at trace level
    pub log_results: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: "chain".to_string(),
            log_results: false,
        }
    }
}

/// Builder for a sequential chain of async steps.
///
/// `T` is the value threaded between steps, `E` the failure a step may
/// produce and `R` the value the chain finally resolves to.
pub struct ChainBuilder<T, E, R> {
    steps: Vec<Step<T, E>>,
    default_fallback: Option<DefaultFallback<E, R>>,
    config: ChainConfig,
}

impl<T, E, R> Debug for ChainBuilder<T, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("steps", &self.steps.len())
            .field("has_default_fallback", &self.default_fallback.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<T, E, R> Default for ChainBuilder<T, E, R> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            default_fallback: None,
            config: ChainConfig::default(),
        }
    }
}

impl<T, E, R> ChainBuilder<T, E, R>
where
    T: StepValue,
    E: Debug + Send + 'static,
    R: Send + 'static,
{
    /// Create a chain without a default fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain whose [`Finalized`] can fall back to `handler`
    pub fn with_default_fallback<F>(handler: F) -> Self
    where
        F: Fn(E) -> R + Send + Sync + 'static,
    {
        Self {
            default_fallback: Some(Arc::new(move |error: E| {
                future::ready(handler(error)).boxed()
            })),
            ..Self::default()
        }
    }

    /// Same as [`ChainBuilder::with_default_fallback`] with an async handler
    pub fn with_default_fallback_async<F, Fut>(handler: F) -> Self
    where
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self {
            default_fallback: Some(Arc::new(move |error: E| handler(error).boxed())),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step without an error handler
    pub fn next(mut self, task: Task<T, E>) -> Self {
        self.steps.push(Step::new(task));
        self
    }

    /// Recover a failure of the most recently added step.
    ///
    /// The handler's output replaces the entire result sequence: the chain
    /// stops and the aggregation function receives it as if every step had
    /// produced it.
    pub fn catch<F>(self, handler: F) -> Result<Self, ChainError>
    where
        F: FnOnce(E) -> Vec<T> + Send + 'static,
    {
        self.attach(Recovery::Sequence(Box::new(move |error: E| {
            future::ready(handler(error)).boxed()
        })))
    }

    pub fn catch_async<F, Fut>(self, handler: F) -> Result<Self, ChainError>
    where
        F: FnOnce(E) -> Fut + Send + 'static,
        Fut: Future<Output = Vec<T>> + Send + 'static,
    {
        self.attach(Recovery::Sequence(Box::new(move |error: E| {
            handler(error).boxed()
        })))
    }

    /// Recover a failure of the most recently added step with a replacement
    /// value for that step alone; the chain then continues.
    pub fn catch_step<F>(self, handler: F) -> Result<Self, ChainError>
    where
        F: FnOnce(E) -> T + Send + 'static,
    {
        self.attach(Recovery::Step(Box::new(move |error: E| {
            future::ready(handler(error)).boxed()
        })))
    }

    pub fn catch_step_async<F, Fut>(self, handler: F) -> Result<Self, ChainError>
    where
        F: FnOnce(E) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.attach(Recovery::Step(Box::new(move |error: E| handler(error).boxed())))
    }

    fn attach(mut self, recovery: Recovery<T, E>) -> Result<Self, ChainError> {
        let Some(step) = self.steps.last_mut() else {
            return Err(ChainError::no_step_to_catch());
        };
        step.recovery = Some(recovery);
        Ok(self)
    }

    /// Append a step that runs `task` once per item, one item at a time.
    ///
    /// The per-item results, in item order, are packed into the step's result
    /// with [`StepValue::from_items`]. The first failing item fails the step.
    pub fn foreach<I, F, Fut>(self, items: impl Into<Items<I, T>>, mut task: F) -> Self
    where
        I: Send + 'static,
        F: FnMut(I, T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let items = items.into();

        self.next(Task::from_fn(move |prev: T| async move {
            let items = items.resolve(&prev);
            let mut results = Vec::with_capacity(items.len());

            for item in items {
                results.push(task(item, prev.clone()).await?);
            }

            Ok(T::from_items(results))
        }))
    }

    /// Stop building and aggregate the ordered step results with `aggregate`
    pub fn end<F>(self, aggregate: F) -> Finalized<R, E>
    where
        F: FnOnce(Vec<T>) -> R + Send + 'static,
    {
        self.finalize(Box::new(move |results: Vec<T>| {
            future::ready(aggregate(results)).boxed()
        }))
    }

    pub fn end_async<F, Fut>(self, aggregate: F) -> Finalized<R, E>
    where
        F: FnOnce(Vec<T>) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.finalize(Box::new(move |results: Vec<T>| aggregate(results).boxed()))
    }

    fn finalize(self, aggregate: Aggregate<T, R>) -> Finalized<R, E> {
        let span = info_span!("chain", name = %self.config.name, steps = self.steps.len());
        let run = run_chain(self.steps, aggregate, self.config.log_results).instrument(span);

        Finalized::new(run.boxed(), self.default_fallback)
    }
}

async fn run_chain<T, E, R>(
    steps: Vec<Step<T, E>>,
    aggregate: Aggregate<T, R>,
    log_results: bool,
) -> Result<R, E>
where
    T: StepValue,
    E: Debug + Send + 'static,
    R: Send + 'static,
{
    debug!("Executing chain");

    let mut results = Vec::with_capacity(steps.len());
    let mut prev = T::initial();

    for (index, Step { task, recovery }) in steps.into_iter().enumerate() {
        debug!(step = index, kind = task.kind(), "Executing step");

        let output = match task.run(prev).await {
            Ok(output) => output,
            Err(error) => match recovery {
                Some(Recovery::Sequence(handler)) => {
                    warn!(step = index, ?error, recovery = "sequence", "Step failed");
                    let recovered = handler(error).await;
                    return Ok(aggregate(recovered).await);
                }
                Some(Recovery::Step(handler)) => {
                    warn!(step = index, ?error, recovery = "step", "Step failed");
                    handler(error).await
                }
                None => {
                    warn!(step = index, ?error, "Step failed without handler");
                    return Err(error);
                }
            },
        };

        if log_results {
            trace!(step = index, ?output, "Step completed");
        }

        results.push(output.clone());
        prev = output;
    }

    debug!(results = results.len(), "Chain completed");
    Ok(aggregate(results).await)
}
