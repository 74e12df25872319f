//! Sample chain driven by the CLI flags

use serde_json::{json, Value};

use super::Cli;
use crate::domain::{ChainBuilder, ChainConfig, ChainError, Fallback, Task};

type DemoChain = ChainBuilder<Value, String, Value>;

fn failure(step: usize) -> String {
    format!("step {step} failed")
}

/// Build and resolve the sample chain
pub async fn run(cli: &Cli, config: ChainConfig) -> Result<Value, ChainError> {
    let fail_step = cli.fail_step;

    let first = if fail_step == Some(1) {
        Task::rejected(failure(1))
    } else {
        Task::resolved(json!("Task 1"))
    };

    let chain = DemoChain::with_default_fallback(|error| {
        json!({"message": "Default Error Handler", "error": error})
    })
    .with_config(config)
    .next(first)
    .next(Task::from_fn(move |_prev| async move {
        if fail_step == Some(2) {
            Err(failure(2))
        } else {
            Ok(json!("Task 2"))
        }
    }));

    let chain = if cli.step_recovery {
        chain.catch_step(|error| json!({"message": "Task 2 Error Handler", "error": error}))?
    } else {
        chain.catch(|error| vec![json!({"message": "Task 2 Error Handler", "error": error})])?
    };

    let finalized = chain
        .foreach(vec![1, 2, 3], move |item: i64, _prev| async move {
            if fail_step == Some(3) && item == 2 {
                Err(failure(3))
            } else {
                Ok(json!(item))
            }
        })
        .end(|results| {
            json!({
                "result1": results.first(),
                "result2": results.get(1),
                "result3": results.get(2),
            })
        });

    let fallback = if cli.use_default {
        Fallback::UseDefault
    } else {
        Fallback::handler(|error| json!({"message": "Guaranteed Error Handler", "error": error}))
    };

    finalized.guarantee(fallback).await
}
