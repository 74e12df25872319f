//! seqchain
//!
//! Builder for sequential asynchronous chains:
//! - Steps run strictly in order, each receiving the previous step's result
//! - Per-step error handlers (`catch`, `catch_step`)
//! - `foreach` steps that process items one at a time
//! - A terminal `guarantee` that always resolves to a value
//!
//! ```ignore
//! let value = ChainBuilder::<Value, String, Value>::new()
//!     .next(Task::resolved(json!("A")))
//!     .next(Task::from_fn(|prev: Value| async move { Ok(json!([prev, "B"])) }))
//!     .end(Value::Array)
//!     .guarantee(Fallback::handler(|error| json!({ "error": error })))
//!     .await?;
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::chain::{
    ChainBuilder, ChainConfig, ChainError, Fallback, Finalized, Items, StepValue, Task,
};
