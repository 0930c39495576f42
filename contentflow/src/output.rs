//! Flat JSON output files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::pages::Page;
use crate::pipeline::RunMetadata;

/// File name of the run metadata.
pub const RUN_METADATA_FILE: &str = "run_metadata.json";

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    fs::write(path, to_json(value, pretty)?)?;
    debug!(path = %path.display(), "Wrote document");
    Ok(())
}

/// Writes each document to `<dir>/<key>.json`, creating `dir` if needed.
///
/// Returns the written paths in key order.
pub fn write_documents(
    dir: &Path,
    documents: &BTreeMap<String, Page>,
    pretty: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(documents.len());
    for (key, page) in documents {
        let path = dir.join(format!("{key}.json"));
        write_json(&path, page, pretty)?;
        written.push(path);
    }
    Ok(written)
}

/// Writes the run audit trail to `<dir>/run_metadata.json`.
pub fn write_run_metadata(dir: &Path, metadata: &RunMetadata, pretty: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(RUN_METADATA_FILE);
    write_json(&path, metadata, pretty)?;
    Ok(path)
}
