//! Port to the remote tracking service and the payloads crossing it.

pub mod client;
mod dto;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{ExternalIds, ListStatus, WatchlistSnapshot};
use crate::error::Result;

pub use client::{DEFAULT_API_BASE, SimklClient};

#[async_trait]
pub trait WatchlistRemote: Send + Sync {
    /// Every movie, show and anime on the user's list with `status`.
    async fn fetch_by_status(&self, token: &str, status: ListStatus) -> Result<WatchlistSnapshot>;

    /// Ask the service which title a file name or path refers to. `Ok(None)`
    /// means the service answered but recognised nothing.
    async fn identify_by_file(&self, token: &str, file: &str) -> Result<Option<FileIdentification>>;

    /// Record a batch as watched and return how many entries were accepted.
    async fn submit_watched(&self, token: &str, batch: &WatchedBatch) -> Result<AcceptedCounts>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub ids: ExternalIds,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedEpisode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub ids: ExternalIds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<WatchedEntry>,
}

/// Transient scrobble payload built for one playback event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedBatch {
    pub movies: Vec<WatchedEntry>,
    pub shows: Vec<WatchedEntry>,
    pub episodes: Vec<WatchedEpisode>,
}

impl WatchedBatch {
    pub fn counts(&self) -> AcceptedCounts {
        AcceptedCounts {
            movies: self.movies.len(),
            shows: self.shows.len(),
            episodes: self.episodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty() && self.episodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedCounts {
    pub movies: usize,
    pub shows: usize,
    pub episodes: usize,
}

/// What the service reported a file to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifiedKind {
    Movie,
    Show,
    Episode,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedTitle {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub ids: ExternalIds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedEpisode {
    pub title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub ids: ExternalIds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIdentification {
    pub kind: IdentifiedKind,
    pub movie: Option<IdentifiedTitle>,
    pub show: Option<IdentifiedTitle>,
    pub episode: Option<IdentifiedEpisode>,
}
