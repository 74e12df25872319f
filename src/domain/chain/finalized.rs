//! Finalized chains and guaranteed resolution

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use tracing::debug;

use super::ChainError;

/// Default fallback shared between a builder and the chain it finalizes
pub(crate) type DefaultFallback<E, R> = Arc<dyn Fn(E) -> BoxFuture<'static, R> + Send + Sync>;

/// Recovery applied by [`Finalized::guarantee`] when the chain failed
pub enum Fallback<E, R> {
    /// Explicit handler for this resolution
    Handler(Box<dyn FnOnce(E) -> BoxFuture<'static, R> + Send>),

    /// The default fallback registered when the chain was built
    UseDefault,
}

impl<E, R> Fallback<E, R>
where
    E: Send + 'static,
    R: Send + 'static,
{
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(E) -> R + Send + 'static,
    {
        Self::Handler(Box::new(move |error: E| future::ready(f(error)).boxed()))
    }

    pub fn handler_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce(E) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::Handler(Box::new(move |error: E| f(error).boxed()))
    }
}

impl<E, R> fmt::Debug for Fallback<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Fallback::Handler"),
            Self::UseDefault => f.write_str("Fallback::UseDefault"),
        }
    }
}

/// Outcome of a chain whose construction has ended
pub struct Finalized<R, E> {
    outcome: BoxFuture<'static, Result<R, E>>,
    default_fallback: Option<DefaultFallback<E, R>>,
}

impl<R, E> fmt::Debug for Finalized<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finalized")
            .field("has_default_fallback", &self.default_fallback.is_some())
            .finish()
    }
}

impl<R, E> Finalized<R, E>
where
    R: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(
        outcome: BoxFuture<'static, Result<R, E>>,
        default_fallback: Option<DefaultFallback<E, R>>,
    ) -> Self {
        Self {
            outcome,
            default_fallback,
        }
    }

    pub fn has_default_fallback(&self) -> bool {
        self.default_fallback.is_some()
    }

    /// Run the chain and return its outcome without any recovery
    pub async fn outcome(self) -> Result<R, E> {
        self.outcome.await
    }

    /// Run the chain and resolve it to a value even if it failed.
    ///
    /// A chain failure is passed to `fallback`. The only error returned is
    /// [`ChainError::Configuration`], when `Fallback::UseDefault` is needed
    /// but the chain was built without a default fallback.
    pub async fn guarantee(self, fallback: Fallback<E, R>) -> Result<R, ChainError> {
        let error = match self.outcome.await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        debug!(fallback = ?fallback, "Chain failed, applying fallback");

        match fallback {
            Fallback::Handler(handler) => Ok(handler(error).await),
            Fallback::UseDefault => {
                let Some(default_fallback) = self.default_fallback else {
                    return Err(ChainError::missing_default_fallback());
                };
                Ok(default_fallback(error).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio_test::{assert_err, assert_ok};

    fn finalized(
        outcome: Result<Value, String>,
        default_fallback: Option<DefaultFallback<String, Value>>,
    ) -> Finalized<Value, String> {
        Finalized::new(future::ready(outcome).boxed(), default_fallback)
    }

    fn default_fallback() -> DefaultFallback<String, Value> {
        Arc::new(|error: String| future::ready(json!({"default": error})).boxed())
    }

    #[tokio::test]
    async fn test_guarantee_returns_success_value() {
        let chain = finalized(Ok(json!("done")), None);
        let value = chain
            .guarantee(Fallback::handler(|_| json!("unused")))
            .await;
        assert_eq!(assert_ok!(value), json!("done"));
    }

    #[tokio::test]
    async fn test_guarantee_success_ignores_missing_default() {
        let chain = finalized(Ok(json!(1)), None);
        assert_eq!(assert_ok!(chain.guarantee(Fallback::UseDefault).await), json!(1));
    }

    #[tokio::test]
    async fn test_guarantee_uses_explicit_handler() {
        let chain = finalized(Err("boom".to_string()), Some(default_fallback()));
        let value = chain
            .guarantee(Fallback::handler(|error| json!({"explicit": error})))
            .await;
        assert_eq!(assert_ok!(value), json!({"explicit": "boom"}));
    }

    #[tokio::test]
    async fn test_guarantee_uses_async_handler() {
        let chain = finalized(Err("late".to_string()), None);
        let value = chain
            .guarantee(Fallback::handler_async(|error| async move {
                tokio::task::yield_now().await;
                json!({"async": error})
            }))
            .await;
        assert_eq!(assert_ok!(value), json!({"async": "late"}));
    }

    #[tokio::test]
    async fn test_guarantee_uses_default_fallback() {
        let chain = finalized(Err("boom".to_string()), Some(default_fallback()));
        assert!(chain.has_default_fallback());

        let value = chain.guarantee(Fallback::UseDefault).await;
        assert_eq!(assert_ok!(value), json!({"default": "boom"}));
    }

    #[tokio::test]
    async fn test_guarantee_without_default_is_configuration_error() {
        let chain = finalized(Err("boom".to_string()), None);
        let err = assert_err!(chain.guarantee(Fallback::UseDefault).await);
        assert!(err.is_configuration());
        assert_eq!(err, ChainError::missing_default_fallback());
    }

    #[tokio::test]
    async fn test_outcome_exposes_raw_failure() {
        let chain = finalized(Err("raw".to_string()), Some(default_fallback()));
        assert_eq!(chain.outcome().await, Err("raw".to_string()));
    }
}
