use crate::config::AppConfig;
use crate::errors::ShelfError;
use crate::fixtures;
use crate::plan::book_plan;
use crate::render::{OutputMode, render_plan};
use crate::store::{BookStore, MongoStore};
use std::io::Write;

use super::command::Command;

/// Execute `cmd` with `cfg`, printing results to `out`.
///
/// `Run` never returns an error: failures inside the run are logged and printed by the
/// runner itself. `Seed` propagates connection and write errors after closing the
/// connection.
pub async fn run<W: Write>(cfg: &AppConfig, cmd: Command, out: &mut W) -> Result<(), ShelfError> {
    match cmd {
        Command::Run => {
            let report = crate::runner::run_with_config(cfg, out).await;
            if let Some(f) = &report.failure {
                log::debug!("run {} ended early at step {}", report.run_id, f.index);
            }
            Ok(())
        }
        Command::Seed { reset } => {
            let store = MongoStore::connect(&cfg.store).await?;
            let result = fixtures::seed(&store, reset).await;
            store.close().await;
            let n = result?;
            match cfg.output {
                OutputMode::Json => {
                    let json = serde_json::json!({
                        "action": "seeded",
                        "collection": cfg.store.collection_name,
                        "inserted": n,
                    });
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => writeln!(out, "seeded {n}")?,
                OutputMode::Human => writeln!(
                    out,
                    "seeded {n} book(s) into {}.{}",
                    cfg.store.database_name, cfg.store.collection_name
                )?,
            }
            Ok(())
        }
        Command::Plan => render_plan(out, cfg.output, &book_plan()),
    }
}
