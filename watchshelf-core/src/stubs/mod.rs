//! Stub video templates and the synthesizer that copies them into libraries.
//!
//! The catalog is a directory of short template videos named after their
//! nominal duration (`10min.mkv`, `90min.mp4`, ...). A stub only has to be
//! long enough for the media server to report a plausible runtime, so the
//! closest template wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{Result, ShelfError};

/// Stubs smaller than this are leftovers of an interrupted copy.
pub const MIN_VALID_STUB_BYTES: u64 = 20 * 1024;

pub const MIN_STUB_MINUTES: u32 = 10;
pub const MAX_STUB_MINUTES: u32 = 240;

const STUB_EXTENSIONS: &[&str] = &["mkv", "mp4"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubCatalogEntry {
    pub nominal_minutes: u32,
    pub path: PathBuf,
}

/// Read-only set of stub templates, discovered once at startup.
#[derive(Debug, Clone, Default)]
pub struct StubCatalog {
    entries: Vec<StubCatalogEntry>,
}

impl StubCatalog {
    pub fn new(mut entries: Vec<StubCatalogEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.nominal_minutes
                .cmp(&b.nominal_minutes)
                .then_with(|| a.path.cmp(&b.path))
        });
        Self { entries }
    }

    /// List `dir` for `<minutes>min*.mkv|mp4` templates.
    pub async fn discover(dir: &Path) -> Result<Self> {
        let mut read_dir = tokio::fs::read_dir(dir).await.map_err(|e| {
            ShelfError::NotFound(format!("stub directory {}: {}", dir.display(), e))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(nominal_minutes) = parse_nominal_minutes(&path) {
                entries.push(StubCatalogEntry {
                    nominal_minutes,
                    path,
                });
            }
        }

        if entries.is_empty() {
            return Err(ShelfError::NotFound(format!(
                "no stub files matching '<minutes>min' in {}",
                dir.display()
            )));
        }

        Ok(Self::new(entries))
    }

    /// Like [`StubCatalog::discover`] but degrades to an empty catalog. Every
    /// later materialization then fails with a counted error instead of
    /// aborting the import.
    pub async fn discover_or_empty(dir: &Path) -> Self {
        match Self::discover(dir).await {
            Ok(catalog) => {
                debug!(
                    dir = %dir.display(),
                    stubs = catalog.len(),
                    "Discovered stub catalog"
                );
                catalog
            }
            Err(err) => {
                error!(dir = %dir.display(), "Stub catalog unavailable: {}", err);
                Self::default()
            }
        }
    }

    pub fn entries(&self) -> &[StubCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `25min.mkv` -> 25, `90MIN-stub.mp4` -> 90, anything else -> None.
fn parse_nominal_minutes(path: &Path) -> Option<u32> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !STUB_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
    let idx = stem.find("min")?;
    if idx == 0 {
        return None;
    }
    stem[..idx].trim().parse().ok()
}

/// Exists and is at least [`MIN_VALID_STUB_BYTES`] long.
pub async fn is_valid_stub(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(md) => md.is_file() && md.len() >= MIN_VALID_STUB_BYTES,
        Err(_) => false,
    }
}

/// Picks the closest stub for a runtime and copies it into place.
///
/// Copies are not serialized here; callers must not materialize the same
/// destination from two tasks at once.
#[derive(Debug, Clone)]
pub struct StubSynthesizer {
    catalog: Arc<StubCatalog>,
}

impl StubSynthesizer {
    pub fn new(catalog: Arc<StubCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StubCatalog {
        &self.catalog
    }

    /// Closest entry to `target_minutes` clamped to 10..=240; ties go to the
    /// shorter stub.
    pub fn select_stub(&self, target_minutes: u32) -> Option<&StubCatalogEntry> {
        let target = target_minutes.clamp(MIN_STUB_MINUTES, MAX_STUB_MINUTES);
        let selected = self
            .catalog
            .entries()
            .iter()
            .min_by_key(|entry| (entry.nominal_minutes.abs_diff(target), entry.nominal_minutes));

        if let Some(entry) = selected {
            debug!(
                requested = target_minutes,
                clamped = target,
                stub_minutes = entry.nominal_minutes,
                stub = %entry.path.display(),
                "Selected stub"
            );
        }
        selected
    }

    /// Copy the closest stub to `destination`, overwriting whatever is there.
    pub async fn materialize(
        &self,
        destination: &Path,
        target_minutes: u32,
    ) -> Result<&StubCatalogEntry> {
        let entry = self
            .select_stub(target_minutes)
            .ok_or(ShelfError::StubUnavailable {
                minutes: target_minutes,
            })?;

        tokio::fs::copy(&entry.path, destination).await?;
        Ok(entry)
    }
}
