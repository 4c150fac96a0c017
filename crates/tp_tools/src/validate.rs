//! Roster validation.

use std::path::Path;

use tp_core::error::Result;
use tp_core::registry::Registry;
use tp_core::roster::Roster;

/// Load a roster, register every resource and verify the references.
///
/// # Errors
///
/// Returns the first load, field or reference error.
pub fn validate_roster(path: &Path) -> Result<Registry> {
    let registry = Roster::load(path)?.build_registry()?;
    tracing::info!(
        path = %path.display(),
        resources = registry.len(),
        "roster is valid"
    );
    Ok(registry)
}
