//! Single-document cleaning: one export in, one cleaned export out.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use awc_core::CleanReport;
use serde_json::Value;

use crate::Config;

pub fn run(input: Option<&Path>, config: &Config, out: &mut impl Write) -> Result<()> {
    let text = read_input(input)?;
    let label = input.map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string());
    let cleaned = clean_text(&text, &label, config)?;
    write_json(out, &cleaned, config.pretty)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Parses and cleans one document, logging what each stream went through.
pub(crate) fn clean_text(text: &str, label: &str, config: &Config) -> Result<Value> {
    let document: Value = serde_json::from_str(text).context("invalid JSON input")?;
    let (cleaned, report) = awc_core::clean_with_report(&document, &config.clean)
        .with_context(|| format!("failed to clean {label}"))?;
    log_report(label, &report);
    Ok(cleaned)
}

fn log_report(label: &str, report: &CleanReport) {
    for stream in &report.streams {
        let bucket = stream.bucket.as_deref().unwrap_or("-");
        tracing::info!(
            source = label,
            bucket,
            watcher = %stream.watcher,
            input = stream.counts.input,
            output = stream.counts.output,
            "cleaned stream"
        );
        for line in stream.counts.summary() {
            tracing::debug!(source = label, bucket, "{line}");
        }
    }
    tracing::debug!(source = label, container = ?report.container, totals = ?report.totals(), "cleaned document");
}

pub(crate) fn write_json(out: &mut impl Write, value: &Value, pretty: bool) -> Result<()> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut *out, value)
    } else {
        serde_json::to_writer(&mut *out, value)
    };
    written.context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}
