//! Export of a verified registry.
//!
//! Three artifacts are produced:
//!
//! - `symbol.json`: extra symbols in caller order, then every id symbol sorted.
//! - `index.json`: `{ id: [offset, length] }` locating each record in `data.json`.
//! - `data.json`: `"[\r\n"`, records joined by `",\r\n"`, then `"\r\n]"`.
//!
//! Offsets and lengths are in bytes. Each separator is 3 bytes, so the first
//! record starts at 3 and every next one at `offset + length + 3`.

use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use crate::error::{Result, TemplateError};
use crate::registry::Registry;

/// Symbol artifact name.
pub const SYMBOL_FILE: &str = "symbol.json";
/// Index artifact name.
pub const INDEX_FILE: &str = "index.json";
/// Data artifact name.
pub const DATA_FILE: &str = "data.json";

const HEAD: &str = "[\r\n";
const SEPARATOR: &str = ",\r\n";
const TAIL: &str = "\r\n]";

/// In-memory export artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifacts {
    /// Contents of `symbol.json`.
    pub symbols: String,
    /// Contents of `index.json`.
    pub index: String,
    /// Contents of `data.json`.
    pub data: String,
}

/// Counts reported after writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Records written.
    pub resources: usize,
    /// Symbols written, extra symbols included.
    pub symbols: usize,
    /// Size of `data.json`.
    pub bytes: usize,
}

/// Verify every resource, then render the artifacts.
pub fn render(reg: &Registry, extra_symbols: &[String]) -> Result<ExportArtifacts> {
    reg.verify()?;

    let symbols: Vec<&str> = extra_symbols
        .iter()
        .map(String::as_str)
        .chain(reg.symbols().iter().map(String::as_str))
        .collect();

    let mut index: IndexMap<&str, [usize; 2]> = IndexMap::with_capacity(reg.len());
    let mut records = Vec::with_capacity(reg.len());
    let mut offset = HEAD.len();
    for res in reg.resources() {
        let json = serde_json::to_string(res)?;
        index.insert(res.id(), [offset, json.len()]);
        offset += json.len() + SEPARATOR.len();
        records.push(json);
    }

    let mut data = String::with_capacity(offset + TAIL.len());
    data.push_str(HEAD);
    data.push_str(&records.join(SEPARATOR));
    data.push_str(TAIL);

    Ok(ExportArtifacts {
        symbols: serde_json::to_string(&symbols)?,
        index: serde_json::to_string(&index)?,
        data,
    })
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> TemplateError + '_ {
    move |source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Verify, render, and write the artifacts into `folder`.
///
/// `folder` is removed and recreated first. Nothing is touched when
/// verification fails.
pub fn write(reg: &Registry, folder: &Path, extra_symbols: &[String]) -> Result<ExportSummary> {
    let artifacts = render(reg, extra_symbols)?;

    match fs::remove_dir_all(folder) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(io_error(folder)(err)),
        _ => {}
    }
    fs::create_dir_all(folder).map_err(io_error(folder))?;

    for (name, contents) in [
        (SYMBOL_FILE, &artifacts.symbols),
        (INDEX_FILE, &artifacts.index),
        (DATA_FILE, &artifacts.data),
    ] {
        let path = folder.join(name);
        fs::write(&path, contents).map_err(io_error(&path))?;
    }

    let summary = ExportSummary {
        resources: reg.len(),
        symbols: extra_symbols.len() + reg.symbols().len(),
        bytes: artifacts.data.len(),
    };
    info!(
        folder = %folder.display(),
        resources = summary.resources,
        symbols = summary.symbols,
        bytes = summary.bytes,
        "exported templates"
    );
    Ok(summary)
}
