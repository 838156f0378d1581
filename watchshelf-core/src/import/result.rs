use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogKind, ListStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounters {
    pub created: usize,
    pub files_copied: usize,
    pub errors: usize,
}

/// Why a run reported `success = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportErrorKind {
    Configuration,
    InvalidToken,
    Remote,
    Cancelled,
}

/// Outcome of one import run. Per-item failures only show up in the
/// category counters; `success` is false for run-level failures alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ImportErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub list_status: ListStatus,
    pub movies: CategoryCounters,
    pub shows: CategoryCounters,
    pub anime_tv: CategoryCounters,
    pub anime_movies: CategoryCounters,
    pub placeholders_upgraded: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportResult {
    pub(crate) fn started(list_status: ListStatus) -> Self {
        Self {
            success: false,
            error: None,
            error_kind: None,
            message: None,
            list_status,
            movies: CategoryCounters::default(),
            shows: CategoryCounters::default(),
            anime_tv: CategoryCounters::default(),
            anime_movies: CategoryCounters::default(),
            placeholders_upgraded: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn counters(&self, kind: CatalogKind) -> &CategoryCounters {
        match kind {
            CatalogKind::Movie => &self.movies,
            CatalogKind::Show => &self.shows,
            CatalogKind::AnimeTv => &self.anime_tv,
            CatalogKind::AnimeMovie => &self.anime_movies,
        }
    }

    pub(crate) fn counters_mut(&mut self, kind: CatalogKind) -> &mut CategoryCounters {
        match kind {
            CatalogKind::Movie => &mut self.movies,
            CatalogKind::Show => &mut self.shows,
            CatalogKind::AnimeTv => &mut self.anime_tv,
            CatalogKind::AnimeMovie => &mut self.anime_movies,
        }
    }

    fn sum(&self, field: impl Fn(&CategoryCounters) -> usize) -> usize {
        CatalogKind::ALL
            .iter()
            .map(|kind| field(self.counters(*kind)))
            .sum()
    }

    pub fn total_created(&self) -> usize {
        self.sum(|c| c.created)
    }

    pub fn total_files_copied(&self) -> usize {
        self.sum(|c| c.files_copied)
    }

    pub fn total_errors(&self) -> usize {
        self.sum(|c| c.errors)
    }

    pub(crate) fn fail(mut self, kind: ImportErrorKind, error: impl Into<String>) -> Self {
        self.success = false;
        self.error_kind = Some(kind);
        self.error = Some(error.into());
        self.finish()
    }

    pub(crate) fn succeed(mut self, message: impl Into<String>) -> Self {
        self.success = true;
        self.message = Some(message.into());
        self.finish()
    }

    fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serialises_error_kind() {
        let result = ImportResult::started(ListStatus::Watching)
            .fail(ImportErrorKind::InvalidToken, "Invalid user token");

        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "invalid_token");
        assert_eq!(json["list_status"], "watching");
        assert!(json.get("message").is_none());
        assert!(result.finished_at.is_some());
    }

    #[test]
    fn totals_sum_every_category() {
        let mut result = ImportResult::started(ListStatus::PlanToWatch);
        result.counters_mut(CatalogKind::Movie).created = 2;
        result.counters_mut(CatalogKind::AnimeMovie).created = 1;
        result.counters_mut(CatalogKind::AnimeMovie).files_copied = 1;
        result.counters_mut(CatalogKind::Show).errors = 3;

        assert_eq!(result.total_created(), 3);
        assert_eq!(result.total_files_copied(), 1);
        assert_eq!(result.total_errors(), 3);
    }
}
