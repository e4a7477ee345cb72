//! Directory mode: every `*.json` file in a directory, one output line each.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use awc_core::CleanConfig;

use super::clean::{clean_text, write_json};
use crate::Config;

/// One output line: a cleaned document with where it came from and how it
/// was cleaned.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    source_file: String,
    cleaning_options: &'a CleanConfig,
    data: Value,
}

/// Cleans every JSON file in `dir` in parallel and writes one envelope per
/// file, in file-name order.
///
/// Files that fail to read or clean are logged and skipped. Returns the
/// number of envelopes written.
pub fn run(dir: &Path, config: &Config, out: &mut impl Write) -> Result<usize> {
    let files = json_files(dir)?;
    tracing::debug!(dir = %dir.display(), files = files.len(), "cleaning directory");

    let envelopes: Vec<Envelope<'_>> = files
        .par_iter()
        .filter_map(|path| match clean_file(path, config) {
            Ok(data) => Some(Envelope {
                source_file: path.display().to_string(),
                cleaning_options: &config.clean,
                data,
            }),
            Err(e) => {
                tracing::error!(path = %path.display(), error = ?e, "skipping file");
                None
            }
        })
        .collect();

    for envelope in &envelopes {
        let value = serde_json::to_value(envelope).context("failed to serialize output")?;
        // One line per file, whatever `pretty` says
        write_json(out, &value, false)?;
    }

    let skipped = files.len() - envelopes.len();
    if skipped > 0 {
        tracing::warn!(skipped, "some files could not be cleaned");
    }
    Ok(envelopes.len())
}

fn clean_file(path: &Path, config: &Config) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    clean_text(&text, &path.display().to_string(), config)
}

/// Lists `*.json` files directly inside `dir`, sorted by path.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("'{}' is not a valid directory", dir.display());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }

    if files.is_empty() {
        bail!("no JSON files found in {}", dir.display());
    }
    files.sort();
    Ok(files)
}
