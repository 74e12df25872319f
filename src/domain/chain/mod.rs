//! Sequential chains - ordered async steps with per-step recovery

mod builder;
mod error;
mod finalized;
mod step;
mod value;

pub use builder::{ChainBuilder, ChainConfig};
pub use error::ChainError;
pub use finalized::{Fallback, Finalized};
pub use step::{Items, Task};
pub use value::StepValue;
