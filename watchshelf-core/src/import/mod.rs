//! Watchlist import: turns the remote list into folders and stub files inside
//! the host's libraries.

mod job;
mod orchestrator;
mod result;
mod review;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogKind, ListStatus};

pub use job::{ImportJob, ImportProgress};
pub use orchestrator::{Destinations, ImportOrchestrator};
pub use result::{CategoryCounters, ImportErrorKind, ImportResult};

/// Where one category lands. A host library id wins over the explicit path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTarget {
    #[serde(default)]
    pub library_id: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LibraryTarget {
    pub fn library(id: impl Into<String>) -> Self {
        Self {
            library_id: Some(id.into()),
            path: None,
        }
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_id: None,
            path: Some(path.into()),
        }
    }

    pub(crate) fn library_id(&self) -> Option<&str> {
        self.library_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub(crate) fn explicit_path(&self) -> Option<&PathBuf> {
        self.path.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.library_id().is_some() || self.explicit_path().is_some()
    }
}

/// Per-run import configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    #[serde(default)]
    pub list_status: ListStatus,
    #[serde(default)]
    pub movies: LibraryTarget,
    #[serde(default)]
    pub shows: LibraryTarget,
    #[serde(default)]
    pub anime: LibraryTarget,
    #[serde(default)]
    pub anime_movies: LibraryTarget,
}

impl ImportSettings {
    pub fn target(&self, kind: CatalogKind) -> &LibraryTarget {
        match kind {
            CatalogKind::Movie => &self.movies,
            CatalogKind::Show => &self.shows,
            CatalogKind::AnimeTv => &self.anime,
            CatalogKind::AnimeMovie => &self.anime_movies,
        }
    }

    pub fn has_any_target(&self) -> bool {
        CatalogKind::ALL
            .iter()
            .any(|kind| self.target(*kind).is_configured())
    }
}
