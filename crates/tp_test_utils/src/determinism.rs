//! Export determinism utilities.
//!
//! The runtime locates records in `data.json` by byte offset, so the same
//! roster must always produce byte-identical artifacts. Sources of drift
//! this harness is meant to catch:
//!
//! - **Map iteration order**: resources, attribute tables and var tables are
//!   kept in insertion order; the symbol table is sorted.
//! - **Float formatting**: values must serialize the same way every run.
//! - **Thread scheduling**: building registries on several threads at once
//!   must still agree.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use tp_core::error::Result;
use tp_core::export::{self, ExportArtifacts};
use tp_core::registry::Registry;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical artifacts.
    pub is_deterministic: bool,
    /// Artifact hash of each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
        Self {
            is_deterministic,
            hashes,
        }
    }

    /// Distinct hashes (1 for a deterministic export).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different artifacts.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Export is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash the three artifacts together.
#[must_use]
pub fn artifacts_hash(artifacts: &ExportArtifacts) -> u64 {
    let mut hasher = DefaultHasher::new();
    artifacts.symbols.hash(&mut hasher);
    artifacts.index.hash(&mut hasher);
    artifacts.data.hash(&mut hasher);
    hasher.finish()
}

fn render_hash<Setup>(setup: &Setup, extra_symbols: &[String]) -> Result<u64>
where
    Setup: Fn() -> Registry,
{
    let reg = setup();
    export::render(&reg, extra_symbols).map(|artifacts| artifacts_hash(&artifacts))
}

/// Build a registry `runs` times and compare the rendered artifacts.
///
/// # Example
///
/// ```ignore
/// use tp_test_utils::determinism::verify_export_determinism;
/// use tp_test_utils::fixtures::hero_registry;
///
/// let result = verify_export_determinism(5, hero_registry, &[]).unwrap();
/// result.assert_deterministic();
/// ```
pub fn verify_export_determinism<Setup>(
    runs: usize,
    setup: Setup,
    extra_symbols: &[String],
) -> Result<DeterminismResult>
where
    Setup: Fn() -> Registry,
{
    let hashes = (0..runs)
        .map(|_| render_hash(&setup, extra_symbols))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(runs, "compared export runs");
    Ok(DeterminismResult::from_hashes(hashes))
}

/// Build and render on `num_threads` scoped threads at once.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn verify_parallel_export_determinism<Setup>(
    num_threads: usize,
    setup: Setup,
    extra_symbols: &[String],
) -> Result<DeterminismResult>
where
    Setup: Fn() -> Registry + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|_| s.spawn(|| render_hash(&setup, extra_symbols)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("export thread panicked"))
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(DeterminismResult::from_hashes(hashes))
}
