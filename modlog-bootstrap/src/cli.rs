// One-shot CLI operations: parse a log dump, or ingest one into the store.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::info;

use modlog_application::commands::ingest_commands::split_lines;
use modlog_application::IngestReport;
use modlog_domain::{parse_line, SourceRef};

use crate::context::AppContext;

/// Reads `path`, or stdin when it is `-`.
async fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))
}

/// Writes every recognized event as one JSON line. Touches no database.
pub async fn parse_input<W: Write>(path: &str, out: &mut W) -> Result<usize> {
    let text = read_input(path).await?;
    let mut matched = 0;
    for line in split_lines(&text) {
        if let Some(event) = parse_line(line) {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
            matched += 1;
        }
    }
    info!("parsed {} moderation event(s) from {}", matched, path);
    Ok(matched)
}

pub async fn ingest_file(
    context: &AppContext,
    path: &Path,
    source: SourceRef,
) -> Result<IngestReport> {
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = context.state.pipeline.ingest_text(&text, &source).await?;
    context.state.metrics.record_ingest(&report);
    Ok(report)
}
