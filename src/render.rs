//! Human-readable, plain and JSON renderings of step results.

use crate::errors::ShelfError;
use crate::plan::{Outcome, Step};
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Result<Self, ShelfError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(OutputMode::Human),
            "plain" => Ok(OutputMode::Plain),
            "json" | "ndjson" => Ok(OutputMode::Json),
            other => Err(ShelfError::Config(format!(
                "unknown output mode `{other}` (expected human|plain|json)"
            ))),
        }
    }
}

pub fn to_json(doc: &Document) -> serde_json::Value {
    Bson::Document(doc.clone()).into_relaxed_extjson()
}

pub fn render_outcome<W: Write>(
    out: &mut W,
    mode: OutputMode,
    index: usize,
    label: &str,
    outcome: &Outcome,
) -> Result<(), ShelfError> {
    match mode {
        OutputMode::Human => render_human(out, index, label, outcome)?,
        OutputMode::Plain => render_plain(out, index, outcome)?,
        OutputMode::Json => {
            let mut line = serde_json::json!({ "step": index, "label": label });
            match outcome {
                Outcome::Documents(docs) => {
                    line["documents"] = serde_json::Value::Array(docs.iter().map(to_json).collect());
                }
                Outcome::Updated(r) => {
                    line["matched"] = r.matched.into();
                    line["modified"] = r.modified.into();
                }
                Outcome::Deleted(r) => line["deleted"] = r.deleted.into(),
                Outcome::IndexCreated(name) => line["index"] = name.as_str().into(),
                Outcome::Plan(plan) => line["plan"] = to_json(plan),
            }
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn render_human<W: Write>(out: &mut W, index: usize, label: &str, outcome: &Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Documents(docs) => {
            writeln!(out, "[{index}] {label} ({})", docs.len())?;
            if docs.is_empty() {
                writeln!(out, "    (no documents)")?;
            }
            for d in docs {
                writeln!(out, "    {}", to_json(d))?;
            }
        }
        Outcome::Updated(r) => {
            writeln!(out, "[{index}] {label}")?;
            writeln!(out, "    matched: {}, modified: {}", r.matched, r.modified)?;
        }
        Outcome::Deleted(r) => {
            writeln!(out, "[{index}] {label}")?;
            writeln!(out, "    deleted: {}", r.deleted)?;
        }
        Outcome::IndexCreated(name) => {
            writeln!(out, "[{index}] {label}")?;
            writeln!(out, "    index created: {name}")?;
        }
        Outcome::Plan(plan) => {
            writeln!(out, "[{index}] {label}")?;
            let pretty = serde_json::to_string_pretty(&to_json(plan))
                .unwrap_or_else(|_| "{}".into());
            for line in pretty.lines() {
                writeln!(out, "    {line}")?;
            }
        }
    }
    Ok(())
}

fn render_plain<W: Write>(out: &mut W, index: usize, outcome: &Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Documents(docs) => {
            writeln!(out, "step={index} count={}", docs.len())?;
            for d in docs {
                writeln!(out, "{}", to_json(d))?;
            }
        }
        Outcome::Updated(r) => writeln!(out, "step={index} matched={} modified={}", r.matched, r.modified)?,
        Outcome::Deleted(r) => writeln!(out, "step={index} deleted={}", r.deleted)?,
        Outcome::IndexCreated(name) => writeln!(out, "step={index} index={name}")?,
        Outcome::Plan(plan) => writeln!(out, "step={index} plan={}", to_json(plan))?,
    }
    Ok(())
}

/// Print the error that ended a run.
pub fn render_failure<W: Write>(
    out: &mut W,
    mode: OutputMode,
    index: usize,
    label: &str,
    error: &ShelfError,
) -> Result<(), ShelfError> {
    match mode {
        OutputMode::Human => {
            writeln!(out, "[{index}] {label}")?;
            writeln!(out, "    error: {error}")?;
        }
        OutputMode::Plain => writeln!(out, "step={index} error={error}")?,
        OutputMode::Json => {
            let line = serde_json::json!({ "step": index, "label": label, "error": error.to_string() });
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

/// List the steps without running them.
pub fn render_plan<W: Write>(out: &mut W, mode: OutputMode, steps: &[Step]) -> Result<(), ShelfError> {
    for (i, step) in steps.iter().enumerate() {
        let index = i + 1;
        let kind = step.operation.kind();
        let args = step.operation.describe();
        match mode {
            OutputMode::Human => writeln!(out, "[{index:>2}] {:<12} {}  {args}", kind, step.label)?,
            OutputMode::Plain => writeln!(out, "step={index} kind={kind} args={args}")?,
            OutputMode::Json => {
                let line = serde_json::json!({ "step": index, "label": step.label, "kind": kind, "args": args });
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{DeleteReport, UpdateReport};
    use bson::doc;

    fn rendered(mode: OutputMode, outcome: &Outcome) -> String {
        let mut buf = Vec::new();
        render_outcome(&mut buf, mode, 4, "Reprice", outcome).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn output_mode_parsing() {
        assert_eq!(OutputMode::parse("JSON").unwrap(), OutputMode::Json);
        assert_eq!(OutputMode::parse("plain").unwrap(), OutputMode::Plain);
        assert_eq!(OutputMode::parse(" human ").unwrap(), OutputMode::Human);
        assert!(OutputMode::parse("yaml").is_err());
    }

    #[test]
    fn human_update_shows_counts() {
        let s = rendered(OutputMode::Human, &Outcome::Updated(UpdateReport { matched: 1, modified: 1 }));
        assert_eq!(s, "[4] Reprice\n    matched: 1, modified: 1\n");
    }

    #[test]
    fn human_empty_result_is_called_out() {
        let s = rendered(OutputMode::Human, &Outcome::Documents(vec![]));
        assert!(s.contains("(0)"));
        assert!(s.contains("(no documents)"));
    }

    #[test]
    fn plain_delete_is_one_line() {
        let s = rendered(OutputMode::Plain, &Outcome::Deleted(DeleteReport { deleted: 0 }));
        assert_eq!(s, "step=4 deleted=0\n");
    }

    #[test]
    fn json_documents_use_relaxed_extjson() {
        let s = rendered(
            OutputMode::Json,
            &Outcome::Documents(vec![doc! { "title": "1984", "publishedYear": 1949, "price": 9.99 }]),
        );
        let v: serde_json::Value = serde_json::from_str(s.trim()).unwrap();
        assert_eq!(v["step"], 4);
        assert_eq!(v["documents"][0]["title"], "1984");
        assert_eq!(v["documents"][0]["publishedYear"], 1949);
    }

    #[test]
    fn explain_prints_the_whole_reply() {
        let plan = doc! {
            "queryPlanner": { "winningPlan": { "stage": "FETCH", "inputStage": { "stage": "IXSCAN", "indexName": "title_1" } } },
            "executionStats": { "nReturned": 1, "totalDocsExamined": 1 },
        };
        for mode in [OutputMode::Human, OutputMode::Plain, OutputMode::Json] {
            let s = rendered(mode, &Outcome::Plan(plan.clone()));
            assert!(s.contains("title_1"), "{mode:?}: {s}");
            assert!(s.contains("IXSCAN"), "{mode:?}: {s}");
            assert!(s.contains("totalDocsExamined"), "{mode:?}: {s}");
        }

        let v: serde_json::Value = serde_json::from_str(rendered(OutputMode::Json, &Outcome::Plan(plan)).trim()).unwrap();
        assert_eq!(v["plan"]["queryPlanner"]["winningPlan"]["inputStage"]["indexName"], "title_1");
        assert_eq!(v["plan"]["executionStats"]["nReturned"], 1);
    }

    #[test]
    fn failure_is_printed_in_every_mode() {
        let err = ShelfError::Config("boom".into());
        for mode in [OutputMode::Human, OutputMode::Plain, OutputMode::Json] {
            let mut buf = Vec::new();
            render_failure(&mut buf, mode, 2, "Recent", &err).unwrap();
            assert!(String::from_utf8(buf).unwrap().contains("boom"));
        }
    }

    #[test]
    fn plan_listing_has_one_line_per_step() {
        let steps = crate::plan::book_plan();
        let mut buf = Vec::new();
        render_plan(&mut buf, OutputMode::Json, &steps).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), steps.len());
        for line in text.lines() {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(v["kind"].is_string());
        }
    }
}
