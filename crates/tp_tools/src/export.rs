//! Roster export.

use std::path::Path;

use tp_core::error::Result;
use tp_core::export::{self, ExportSummary};
use tp_core::registry::Registry;
use tp_core::roster::Roster;

/// Load a roster and write its artifacts into `out`.
///
/// `extra_symbols` are written first in `symbol.json`, in the given order.
///
/// # Errors
///
/// Returns the first load, field or reference error, or an I/O error.
pub fn export_roster(path: &Path, out: &Path, extra_symbols: &[String]) -> Result<ExportSummary> {
    let mut registry = Registry::new();
    Roster::load(path)?.register(&mut registry)?;
    export::write(&registry, out, extra_symbols)
}
