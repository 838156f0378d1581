//! Remote catalog records as fetched from the tracking service.
//!
//! A [`WatchlistSnapshot`] is an immutable view of one list status taken at
//! the start of an import run. Nothing in here is persisted; the remote
//! service stays authoritative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The four destination categories an import run fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Movie,
    Show,
    AnimeTv,
    AnimeMovie,
}

impl CatalogKind {
    /// Processing order of an import run.
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Movie,
        CatalogKind::Show,
        CatalogKind::AnimeTv,
        CatalogKind::AnimeMovie,
    ];

    /// Tag written to the placeholder ledger.
    pub fn ledger_tag(self) -> &'static str {
        match self {
            CatalogKind::Movie => "movie",
            CatalogKind::Show => "show",
            CatalogKind::AnimeTv => "animetv",
            CatalogKind::AnimeMovie => "animemovie",
        }
    }

    pub fn from_ledger_tag(tag: &str) -> Option<Self> {
        match tag {
            "movie" => Some(CatalogKind::Movie),
            "show" => Some(CatalogKind::Show),
            "animetv" => Some(CatalogKind::AnimeTv),
            "animemovie" => Some(CatalogKind::AnimeMovie),
            _ => None,
        }
    }

    /// Movies get a stub video file; series only need their folder.
    pub fn uses_stub(self) -> bool {
        matches!(self, CatalogKind::Movie | CatalogKind::AnimeMovie)
    }

    /// Runtime assumed when the remote record carries none.
    pub fn fallback_runtime(self) -> u32 {
        match self {
            CatalogKind::Movie => 90,
            CatalogKind::AnimeMovie => 50,
            CatalogKind::Show | CatalogKind::AnimeTv => 0,
        }
    }

    /// Provider tag embedded in folder names so the media server can match
    /// the title without a lookup.
    pub fn id_tag(self) -> &'static str {
        match self {
            CatalogKind::Movie | CatalogKind::AnimeMovie => "tmdbid",
            CatalogKind::Show | CatalogKind::AnimeTv => "tvdbid",
        }
    }

    pub fn unknown_title(self) -> &'static str {
        match self {
            CatalogKind::Movie => "Unknown Movie",
            CatalogKind::Show => "Unknown Show",
            CatalogKind::AnimeTv => "Unknown Anime",
            CatalogKind::AnimeMovie => "Unknown Anime Movie",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CatalogKind::Movie => "movie",
            CatalogKind::Show => "TV show",
            CatalogKind::AnimeTv => "anime",
            CatalogKind::AnimeMovie => "anime movie",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simkl: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
}

impl ExternalIds {
    /// Provider id matching [`CatalogKind::id_tag`], ignoring blank values.
    pub fn tag_value(&self, kind: CatalogKind) -> Option<&str> {
        let value = match kind {
            CatalogKind::Movie | CatalogKind::AnimeMovie => self.tmdb.as_deref(),
            CatalogKind::Show | CatalogKind::AnimeTv => self.tvdb.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCatalogRecord {
    pub title: String,
    pub year: Option<i32>,
    pub kind: CatalogKind,
    pub runtime_minutes: Option<i64>,
    pub ids: ExternalIds,
}

impl RemoteCatalogRecord {
    /// Runtime reported by the remote service, if it is usable.
    pub fn true_runtime(&self) -> Option<u32> {
        self.runtime_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| u32::try_from(minutes).unwrap_or(u32::MAX))
    }
}

/// All records of one list status, already split per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistSnapshot {
    pub movies: Vec<RemoteCatalogRecord>,
    pub shows: Vec<RemoteCatalogRecord>,
    pub anime_tv: Vec<RemoteCatalogRecord>,
    pub anime_movies: Vec<RemoteCatalogRecord>,
}

impl WatchlistSnapshot {
    pub fn records(&self, kind: CatalogKind) -> &[RemoteCatalogRecord] {
        match kind {
            CatalogKind::Movie => &self.movies,
            CatalogKind::Show => &self.shows,
            CatalogKind::AnimeTv => &self.anime_tv,
            CatalogKind::AnimeMovie => &self.anime_movies,
        }
    }

    pub fn is_empty(&self) -> bool {
        CatalogKind::ALL
            .iter()
            .all(|kind| self.records(*kind).is_empty())
    }

    pub fn find(&self, kind: CatalogKind, simkl_id: u64) -> Option<&RemoteCatalogRecord> {
        self.records(kind)
            .iter()
            .find(|record| record.ids.simkl == Some(simkl_id))
    }

    pub fn len(&self) -> usize {
        CatalogKind::ALL
            .iter()
            .map(|kind| self.records(*kind).len())
            .sum()
    }
}

/// Remote list a user can import from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    #[default]
    PlanToWatch,
    Watching,
    Completed,
    Hold,
    Dropped,
}

impl ListStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListStatus::PlanToWatch => "plantowatch",
            ListStatus::Watching => "watching",
            ListStatus::Completed => "completed",
            ListStatus::Hold => "hold",
            ListStatus::Dropped => "dropped",
        }
    }

    /// Parse a user supplied status, falling back to plan-to-watch.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            if !raw.trim().is_empty() {
                warn!(status = raw, "Invalid list status, defaulting to plantowatch");
            }
            ListStatus::PlanToWatch
        })
    }
}

impl FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plantowatch" => Ok(ListStatus::PlanToWatch),
            "watching" => Ok(ListStatus::Watching),
            "completed" => Ok(ListStatus::Completed),
            "hold" => Ok(ListStatus::Hold),
            "dropped" => Ok(ListStatus::Dropped),
            other => Err(format!("unknown list status '{other}'")),
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(simkl: u64, runtime: Option<i64>) -> RemoteCatalogRecord {
        RemoteCatalogRecord {
            title: "Dune".into(),
            year: Some(2021),
            kind: CatalogKind::Movie,
            runtime_minutes: runtime,
            ids: ExternalIds {
                simkl: Some(simkl),
                ..ExternalIds::default()
            },
        }
    }

    #[test]
    fn true_runtime_ignores_non_positive_values() {
        assert_eq!(movie(1, Some(155)).true_runtime(), Some(155));
        assert_eq!(movie(1, Some(0)).true_runtime(), None);
        assert_eq!(movie(1, Some(-4)).true_runtime(), None);
        assert_eq!(movie(1, None).true_runtime(), None);
    }

    #[test]
    fn ledger_tags_round_trip() {
        for kind in CatalogKind::ALL {
            assert_eq!(CatalogKind::from_ledger_tag(kind.ledger_tag()), Some(kind));
        }
        assert_eq!(CatalogKind::from_ledger_tag("episode"), None);
    }

    #[test]
    fn list_status_parsing_is_lenient() {
        assert_eq!(ListStatus::parse_lenient("Watching"), ListStatus::Watching);
        assert_eq!(ListStatus::parse_lenient(" HOLD "), ListStatus::Hold);
        assert_eq!(ListStatus::parse_lenient("later"), ListStatus::PlanToWatch);
        assert_eq!(ListStatus::parse_lenient(""), ListStatus::PlanToWatch);
    }

    #[test]
    fn snapshot_lookup_by_simkl_id() {
        let snapshot = WatchlistSnapshot {
            movies: vec![movie(7, None), movie(8, Some(120))],
            ..WatchlistSnapshot::default()
        };

        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_empty());
        assert_eq!(
            snapshot.find(CatalogKind::Movie, 8).and_then(|r| r.true_runtime()),
            Some(120)
        );
        assert!(snapshot.find(CatalogKind::AnimeMovie, 8).is_none());
        assert!(WatchlistSnapshot::default().is_empty());
    }
}
