//! Durable list of stubs that were written with a guessed runtime.
//!
//! One record per line, `simklId|kind|filePath`. The whole file is rewritten
//! on every mutation, so all access goes through one lock. I/O failures are
//! logged and swallowed: losing an entry only means a stub keeps its guessed
//! runtime until it is replaced by hand. A ledger that cannot be read is never
//! rewritten.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::catalog::CatalogKind;

const FIELD_DELIMITER: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderRecord {
    pub simkl_id: u64,
    pub kind: CatalogKind,
    pub file_path: PathBuf,
}

impl PlaceholderRecord {
    fn matches(&self, simkl_id: u64, kind: CatalogKind) -> bool {
        self.simkl_id == simkl_id && self.kind == kind
    }

    /// `None` for paths that are not valid UTF-8; they cannot be written
    /// back unchanged.
    fn to_line(&self) -> Option<String> {
        let path = self.file_path.to_str()?;
        Some(format!(
            "{}{}{}{}{}",
            self.simkl_id,
            FIELD_DELIMITER,
            self.kind.ledger_tag(),
            FIELD_DELIMITER,
            path
        ))
    }

    fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, FIELD_DELIMITER);
        let simkl_id = parts.next()?.trim().parse().ok()?;
        let kind = CatalogKind::from_ledger_tag(parts.next()?.trim())?;
        let file_path = parts.next()?;
        if file_path.is_empty() {
            return None;
        }
        Some(Self {
            simkl_id,
            kind,
            file_path: PathBuf::from(file_path),
        })
    }
}

#[derive(Debug)]
pub struct PlaceholderLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PlaceholderLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert unless `(simkl_id, kind)` is already tracked.
    pub async fn record(&self, simkl_id: u64, kind: CatalogKind, file_path: &Path) {
        if file_path.to_str().is_none() {
            warn!(simkl_id, kind = %kind, path = %file_path.display(), "Placeholder path is not UTF-8, not tracking it");
            return;
        }

        let _guard = self.lock.lock().await;
        let Some(mut entries) = self.read_entries().await else {
            return;
        };
        if entries.iter().any(|e| e.matches(simkl_id, kind)) {
            return;
        }

        entries.push(PlaceholderRecord {
            simkl_id,
            kind,
            file_path: file_path.to_path_buf(),
        });
        if self.write_entries(&entries).await {
            debug!(simkl_id, kind = %kind, path = %file_path.display(), "Tracking placeholder stub");
        }
    }

    pub async fn list(&self) -> Vec<PlaceholderRecord> {
        let _guard = self.lock.lock().await;
        self.read_entries().await.unwrap_or_default()
    }

    /// Delete the entry for `(simkl_id, kind)`; no-op when absent.
    pub async fn remove(&self, simkl_id: u64, kind: CatalogKind) {
        let _guard = self.lock.lock().await;
        let Some(mut entries) = self.read_entries().await else {
            return;
        };
        let before = entries.len();
        entries.retain(|e| !e.matches(simkl_id, kind));
        if entries.len() != before {
            self.write_entries(&entries).await;
        }
    }

    /// `None` when the file exists but cannot be read; callers must not
    /// rewrite it then. Lines that are not UTF-8 or do not parse are skipped.
    async fn read_entries(&self) -> Option<Vec<PlaceholderRecord>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Some(Vec::new()),
            Err(err) => {
                error!(path = %self.path.display(), "Failed to read placeholder ledger: {}", err);
                return None;
            }
        };

        let entries = contents
            .split(|byte| *byte == b'\n')
            .filter_map(|raw| {
                let Ok(line) = std::str::from_utf8(raw) else {
                    warn!(path = %self.path.display(), "Skipping non UTF-8 placeholder ledger line");
                    return None;
                };
                let line = line.trim_end_matches('\r');
                if line.trim().is_empty() {
                    return None;
                }
                let parsed = PlaceholderRecord::parse_line(line);
                if parsed.is_none() {
                    warn!(line, "Skipping unparseable placeholder ledger line");
                }
                parsed
            })
            .collect();
        Some(entries)
    }

    async fn write_entries(&self, entries: &[PlaceholderRecord]) -> bool {
        match self.try_write_entries(entries).await {
            Ok(()) => true,
            Err(err) => {
                error!(path = %self.path.display(), "Failed to write placeholder ledger: {}", err);
                false
            }
        }
    }

    async fn try_write_entries(&self, entries: &[PlaceholderRecord]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut body = String::new();
        for line in entries.iter().filter_map(PlaceholderRecord::to_line) {
            body.push_str(&line);
            body.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }
}
