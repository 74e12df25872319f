//! Values threaded between chain steps

use std::fmt::Debug;

use serde_json::Value;

/// A value that can flow through a chain.
///
/// Every step produces one `StepValue`, which becomes both the next step's
/// input and one entry of the result sequence handed to the aggregation
/// function.
pub trait StepValue: Clone + Debug + Send + 'static {
    /// Input of the first step, before any step has produced a result
    fn initial() -> Self;

    /// Pack the ordered per-item results of a `foreach` step into one value
    fn from_items(items: Vec<Self>) -> Self;
}

impl StepValue for Value {
    fn initial() -> Self {
        Value::Null
    }

    fn from_items(items: Vec<Self>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_initial_is_null() {
        assert_eq!(<Value as StepValue>::initial(), Value::Null);
    }

    #[test]
    fn test_json_from_items_keeps_order() {
        let packed = Value::from_items(vec![json!(3), json!("b"), json!({"k": 1})]);
        assert_eq!(packed, json!([3, "b", {"k": 1}]));
    }
}
