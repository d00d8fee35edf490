//! Runs the operation plan against one store connection.
//!
//! Steps execute strictly one after another. The first failure ends the run; it is logged
//! once here, printed to the output sink, and recorded in the [`RunReport`]. Writes made
//! by earlier steps stay in place. The store is closed on every path before `run`
//! returns.

use crate::config::AppConfig;
use crate::errors::ShelfError;
use crate::plan::{Outcome, Step, book_plan};
use crate::render::{OutputMode, render_failure, render_outcome};
use crate::store::{BookStore, MongoStore};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::time::Instant;
use uuid::Uuid;

/// Log target for per-step timings.
pub const OPS_TARGET: &str = "bookshelf::ops";

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub index: usize,
    pub label: String,
    pub outcome: Outcome,
    pub elapsed_ms: u128,
}

#[derive(Debug)]
pub struct StepFailure {
    /// 1-based step index; 0 means the connection itself failed.
    pub index: usize,
    pub label: String,
    pub error: ShelfError,
}

impl StepFailure {
    fn new(index: usize, label: &str, error: ShelfError) -> Self {
        Self { index, label: label.to_string(), error }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    pub failure: Option<StepFailure>,
    /// Set once the connection has been released.
    pub released: bool,
}

impl RunReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            steps: Vec::new(),
            failure: None,
            released: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Outcome of the 1-based step `index`, if it completed.
    pub fn outcome(&self, index: usize) -> Option<&Outcome> {
        self.steps.iter().find(|s| s.index == index).map(|s| &s.outcome)
    }
}

pub struct OperationRunner<S: BookStore> {
    store: S,
    steps: Vec<Step>,
    mode: OutputMode,
    strict_counts: bool,
}

impl<S: BookStore> OperationRunner<S> {
    /// A runner for the standard book plan.
    pub fn new(store: S) -> Self {
        Self::with_steps(store, book_plan())
    }

    pub fn with_steps(store: S, steps: Vec<Step>) -> Self {
        Self { store, steps, mode: OutputMode::Human, strict_counts: false }
    }

    pub fn output(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Treat an update/delete that affects anything other than one document as a failure.
    pub fn strict_counts(mut self, strict: bool) -> Self {
        self.strict_counts = strict;
        self
    }

    pub async fn run<W: Write>(self, out: &mut W) -> RunReport {
        let OperationRunner { store, steps, mode, strict_counts } = self;
        let mut report = RunReport::new();
        log::info!(
            "run {} started at {}: {} step(s)",
            report.run_id,
            report.started_at.to_rfc3339(),
            steps.len()
        );

        let result = run_steps(&store, &steps, mode, strict_counts, out, &mut report.steps).await;
        if let Err(failure) = result {
            log::error!(
                "run {} aborted at step {} ({}): {}",
                report.run_id,
                failure.index,
                failure.label,
                failure.error
            );
            if let Err(e) = render_failure(out, mode, failure.index, &failure.label, &failure.error) {
                log::warn!("could not print failure: {e}");
            }
            report.failure = Some(failure);
        }

        store.close().await;
        report.released = true;
        log::info!(
            "run {} finished: {}/{} step(s) completed",
            report.run_id,
            report.steps.len(),
            steps.len()
        );
        report
    }
}

async fn run_steps<S: BookStore, W: Write>(
    store: &S,
    steps: &[Step],
    mode: OutputMode,
    strict_counts: bool,
    out: &mut W,
    records: &mut Vec<StepRecord>,
) -> Result<(), StepFailure> {
    for (i, step) in steps.iter().enumerate() {
        let index = i + 1;
        let started = Instant::now();
        let outcome = step
            .operation
            .execute(store)
            .await
            .map_err(|e| StepFailure::new(index, &step.label, e))?;
        let elapsed_ms = started.elapsed().as_millis();
        log::info!(target: OPS_TARGET, "step={index} kind={} elapsed_ms={elapsed_ms}", step.operation.kind());

        // Recorded even if the count check or printing fails.
        let record = StepRecord { index, label: step.label.clone(), outcome, elapsed_ms };
        let checked = check_count(step, &record.outcome, strict_counts)
            .and_then(|()| render_outcome(out, mode, index, &step.label, &record.outcome));
        records.push(record);
        checked.map_err(|e| StepFailure::new(index, &step.label, e))?;
    }
    Ok(())
}

fn check_count(step: &Step, outcome: &Outcome, strict: bool) -> Result<(), ShelfError> {
    let Some(actual) = outcome.affected() else { return Ok(()) };
    if actual == 1 {
        return Ok(());
    }
    if strict {
        return Err(ShelfError::UnexpectedCount { label: step.label.clone(), expected: 1, actual });
    }
    log::warn!("{}: {} document(s) affected", step.label, actual);
    Ok(())
}

/// Connect with `cfg.store`, run the book plan, and release the connection.
///
/// A connection failure is logged and reported as the failure of step 0; nothing is
/// raised to the caller either way.
pub async fn run_with_config<W: Write>(cfg: &AppConfig, out: &mut W) -> RunReport {
    log::info!("connecting to {}", cfg.store.redacted_uri());
    match MongoStore::connect(&cfg.store).await {
        Ok(store) => {
            OperationRunner::new(store)
                .output(cfg.output)
                .strict_counts(cfg.strict_counts)
                .run(out)
                .await
        }
        Err(error) => {
            let mut report = RunReport::new();
            log::error!("run {} could not connect to {}: {error}", report.run_id, cfg.store.redacted_uri());
            if let Err(e) = render_failure(out, cfg.output, 0, "connect", &error) {
                log::warn!("could not print failure: {e}");
            }
            report.failure = Some(StepFailure::new(0, "connect", error));
            report.released = true;
            log::info!("run {} finished: no connection", report.run_id);
            report
        }
    }
}
