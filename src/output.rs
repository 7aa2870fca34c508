use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchOutcome, FetchReport, ProgressEvent, ProgressSink, RunOutcome, SearchResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_outcome(outcome: &RunOutcome) -> io::Result<()> {
        Self::print_json(outcome)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message)
            }
            None => tracing::info!("{}", event.message),
        }
    }
}

pub fn render_search(result: &SearchResult) -> String {
    let mut out = String::new();
    match &result.columns {
        Some(columns) => {
            out.push_str(&columns.join("\t"));
            out.push('\n');
            for row in &result.rows {
                if let Some(fields) = &row.fields {
                    out.push_str(&fields.join("\t"));
                    out.push('\n');
                }
            }
        }
        None => {
            out.push_str(&pipe_row(&["Name", "Group", "Subgroup", "Status"]));
            for row in &result.rows {
                out.push_str(&pipe_row(&[
                    row.name.as_str(),
                    row.group.as_str(),
                    row.subgroup.as_str(),
                    row.status.as_str(),
                ]));
            }
        }
    }
    out
}

fn pipe_row(cells: &[&str]) -> String {
    format!("|{}|\n", cells.join("|\t|"))
}

pub fn render_fetch_summary(report: &FetchReport) -> String {
    let mut out = String::new();
    let downloaded = report.count(FetchOutcome::Downloaded);
    let planned = report.count(FetchOutcome::Planned);
    let failed = report.count(FetchOutcome::Failed);
    let skipped = report.count(FetchOutcome::Skipped);

    if report.dry_run {
        out.push_str(&format!("Planned downloads: {planned} into {}\n", report.outdir));
    } else {
        out.push_str(&format!(
            "Downloaded: {downloaded}  Failed: {failed}  Skipped: {skipped}\n"
        ));
    }
    for item in &report.items {
        let marker = match item.outcome {
            FetchOutcome::Downloaded => "ok",
            FetchOutcome::Planned => "plan",
            FetchOutcome::Failed => "FAILED",
            FetchOutcome::Skipped => "SKIPPED",
        };
        out.push_str(&format!("[{marker}] {} ({})", item.name, item.taxonomy_id));
        if let Some(path) = &item.local_path {
            out.push_str(&format!(" -> {path}"));
        }
        if let Some(error) = &item.error {
            out.push_str(&format!(": {error}"));
        }
        out.push('\n');
    }
    out
}
