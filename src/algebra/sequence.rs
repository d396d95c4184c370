use crate::domain::{CallTrace, Outcome};
use futures::Future;
use serde_json::Value;

/// Sequential pipeline for a business procedure: each collaborator call is
/// awaited in order, recorded in the shared trace, and the first failure
/// short-circuits with the accumulated trace attached. There is no retry or
/// backtracking; retries are the collaborator's own concern.
pub struct Sequence {
    trace: CallTrace,
}

impl Sequence {
    pub fn new() -> Self {
        Self {
            trace: CallTrace::new(),
        }
    }

    /// Runs one collaborator call under `name`. On success the payload is
    /// handed to the caller; on failure the collaborator's outcome comes back
    /// as the error, carrying the trace built so far.
    pub async fn step<F>(&mut self, name: &str, operation: F) -> Result<Value, Box<Outcome>>
    where
        F: Future<Output = Outcome>,
    {
        let outcome = operation.await;
        self.trace.record(name, outcome.log_value());

        if outcome.ok() {
            Ok(outcome.into_content())
        } else {
            Err(Box::new(outcome.with_trace(self.trace.clone())))
        }
    }

    /// Attaches the accumulated trace to a procedure's terminal outcome.
    pub fn finish(self, outcome: Outcome) -> Outcome {
        outcome.with_trace(self.trace)
    }

    pub fn trace(&self) -> &CallTrace {
        &self.trace
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapses the pipeline result into the single terminal outcome every
/// procedure must return.
pub fn resolve(result: Result<Outcome, Box<Outcome>>) -> Outcome {
    match result {
        Ok(outcome) => outcome,
        Err(outcome) => *outcome,
    }
}
