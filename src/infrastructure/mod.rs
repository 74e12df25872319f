//! Infrastructure layer - process-level setup for the demo binary

pub mod logging;
