//! Domain layer - chain construction and execution

pub mod chain;

pub use chain::{
    ChainBuilder, ChainConfig, ChainError, Fallback, Finalized, Items, StepValue, Task,
};
