//! Recording a finished playback on the remote service.
//!
//! A playback is first submitted from the item's own metadata. When the
//! service does not accept all of it, the file is identified remotely, first
//! by its full path and then by its bare file name, and the resolved title is
//! submitted instead.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::ExternalIds;
use crate::error::{Result, ShelfError};
use crate::remote::{
    AcceptedCounts, FileIdentification, IdentifiedKind, WatchedBatch, WatchedEntry,
    WatchedEpisode, WatchlistRemote,
};
use crate::token::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackKind {
    Movie,
    Series,
    Episode,
}

impl FromStr for PlaybackKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(PlaybackKind::Movie),
            "series" | "show" => Ok(PlaybackKind::Series),
            "episode" => Ok(PlaybackKind::Episode),
            other => Err(format!("unknown playback kind '{other}'")),
        }
    }
}

/// A local item whose playback just completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackItem {
    pub kind: PlaybackKind,
    pub path: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub series_title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(default)]
    pub ids: ExternalIds,
}

impl PlaybackItem {
    /// Batch describing the item with nothing but its own metadata.
    pub fn to_batch(&self) -> WatchedBatch {
        let mut batch = WatchedBatch::default();
        match self.kind {
            PlaybackKind::Movie => batch.movies.push(WatchedEntry {
                title: self.title.clone(),
                year: self.year,
                ids: self.ids.clone(),
            }),
            PlaybackKind::Series => batch.shows.push(WatchedEntry {
                title: self.series_title.clone().or_else(|| self.title.clone()),
                year: self.year,
                ids: self.ids.clone(),
            }),
            PlaybackKind::Episode => batch.episodes.push(WatchedEpisode {
                title: self.title.clone(),
                season: self.season,
                number: self.episode,
                ids: self.ids.clone(),
                show: self.series_title.clone().map(|title| WatchedEntry {
                    title: Some(title),
                    year: self.year,
                    ids: ExternalIds::default(),
                }),
            }),
        }
        batch
    }
}

/// Remote lookups tried in order once direct submission falls short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    FullPath,
    FileName,
}

impl LookupStrategy {
    pub const CHAIN: [LookupStrategy; 2] = [LookupStrategy::FullPath, LookupStrategy::FileName];

    fn file_ref(self, item: &PlaybackItem) -> Option<String> {
        match self {
            LookupStrategy::FullPath => Some(item.path.to_string_lossy().into_owned()),
            LookupStrategy::FileName => item
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        }
        .filter(|s| !s.is_empty())
    }
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStrategy::FullPath => f.write_str("full path"),
            LookupStrategy::FileName => f.write_str("file name"),
        }
    }
}

/// Result of one lookup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The service identified the file; submit `batch` for the updated item.
    Matched {
        batch: WatchedBatch,
        item: PlaybackItem,
    },
    /// Nothing usable came back; try the next strategy.
    NeedsFallback(String),
    /// The lookup itself failed.
    Failed(String),
}

/// Map an identification onto the local item. A kind that disagrees with
/// the item is never accepted.
pub fn resolve_identification(item: &PlaybackItem, ident: FileIdentification) -> AttemptOutcome {
    let mut resolved = item.clone();
    let mut batch = WatchedBatch::default();

    match item.kind {
        PlaybackKind::Movie => {
            if ident.kind != IdentifiedKind::Movie {
                return AttemptOutcome::NeedsFallback(format!(
                    "expected a movie, got {:?}",
                    ident.kind
                ));
            }
            let Some(movie) = ident.movie else {
                return AttemptOutcome::NeedsFallback("response has no movie".into());
            };
            resolved.title = movie.title.clone().or(resolved.title);
            resolved.year = movie.year.or(resolved.year);
            batch.movies.push(WatchedEntry {
                title: movie.title,
                year: movie.year,
                ids: movie.ids,
            });
        }
        PlaybackKind::Episode => {
            if ident.kind != IdentifiedKind::Episode {
                return AttemptOutcome::NeedsFallback(format!(
                    "expected an episode, got {:?}",
                    ident.kind
                ));
            }
            let (Some(show), Some(episode)) = (ident.show, ident.episode) else {
                return AttemptOutcome::NeedsFallback("response has no show or episode".into());
            };
            resolved.title = episode.title.clone().or(resolved.title);
            resolved.series_title = show.title.clone().or(resolved.series_title);
            resolved.season = episode.season.or(resolved.season);
            resolved.episode = episode.episode.or(resolved.episode);
            resolved.year = show.year.or(resolved.year);
            batch.episodes.push(WatchedEpisode {
                title: episode.title,
                season: episode.season,
                number: episode.episode,
                ids: episode.ids,
                show: Some(WatchedEntry {
                    title: show.title,
                    year: show.year,
                    ids: show.ids,
                }),
            });
        }
        PlaybackKind::Series => {
            if !matches!(ident.kind, IdentifiedKind::Show | IdentifiedKind::Episode) {
                return AttemptOutcome::NeedsFallback(format!(
                    "expected a show, got {:?}",
                    ident.kind
                ));
            }
            let Some(show) = ident.show else {
                return AttemptOutcome::NeedsFallback("response has no show".into());
            };
            resolved.series_title = show.title.clone().or(resolved.series_title);
            resolved.year = show.year.or(resolved.year);
            batch.shows.push(WatchedEntry {
                title: show.title,
                year: show.year,
                ids: show.ids,
            });
        }
    }

    AttemptOutcome::Matched {
        batch,
        item: resolved,
    }
}

fn fully_accepted(batch: &WatchedBatch, accepted: AcceptedCounts) -> bool {
    !batch.is_empty() && accepted == batch.counts()
}

pub struct ScrobbleReconciler {
    remote: Arc<dyn WatchlistRemote>,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for ScrobbleReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrobbleReconciler")
            .field("remote_type", &std::any::type_name_of_val(self.remote.as_ref()))
            .finish_non_exhaustive()
    }
}

impl ScrobbleReconciler {
    pub fn new(remote: Arc<dyn WatchlistRemote>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { remote, tokens }
    }

    /// Record `item` as watched. Returns whether the service accepted every
    /// submitted entry, along with the item as finally resolved.
    ///
    /// A rejected token is cleared from the store and returned as
    /// [`ShelfError::InvalidToken`].
    pub async fn reconcile_scrobble(
        &self,
        item: PlaybackItem,
        token: &str,
    ) -> Result<(bool, PlaybackItem)> {
        let result = self.reconcile(item, token).await;
        if let Err(ShelfError::InvalidToken) = &result {
            warn!("Simkl rejected the user token, clearing it");
            self.tokens.invalidate(token).await;
        }
        result
    }

    async fn reconcile(&self, item: PlaybackItem, token: &str) -> Result<(bool, PlaybackItem)> {
        let direct = item.to_batch();
        let accepted = self.remote.submit_watched(token, &direct).await?;
        if fully_accepted(&direct, accepted) {
            info!(path = %item.path.display(), "Scrobbled from metadata");
            return Ok((true, item));
        }
        info!(
            path = %item.path.display(),
            submitted = ?direct.counts(),
            accepted = ?accepted,
            "Metadata scrobble not accepted, identifying file"
        );

        for strategy in LookupStrategy::CHAIN {
            match self.attempt(strategy, &item, token).await? {
                AttemptOutcome::Matched { batch, item: resolved } => {
                    let accepted = self.remote.submit_watched(token, &batch).await?;
                    let ok = fully_accepted(&batch, accepted);
                    info!(
                        strategy = %strategy,
                        title = resolved.title.as_deref().unwrap_or_default(),
                        success = ok,
                        "Scrobbled identified file"
                    );
                    return Ok((ok, resolved));
                }
                AttemptOutcome::NeedsFallback(reason) => {
                    debug!(strategy = %strategy, reason = %reason, "File lookup unusable, falling back");
                }
                AttemptOutcome::Failed(reason) => {
                    warn!(strategy = %strategy, reason = %reason, "File lookup failed");
                    return Ok((false, item));
                }
            }
        }

        warn!(path = %item.path.display(), "Could not identify played file");
        Ok((false, item))
    }

    async fn attempt(
        &self,
        strategy: LookupStrategy,
        item: &PlaybackItem,
        token: &str,
    ) -> Result<AttemptOutcome> {
        let Some(file_ref) = strategy.file_ref(item) else {
            return Ok(AttemptOutcome::NeedsFallback("no file reference".into()));
        };

        match self.remote.identify_by_file(token, &file_ref).await {
            Ok(Some(ident)) => Ok(resolve_identification(item, ident)),
            Ok(None) => Ok(AttemptOutcome::NeedsFallback("no match".into())),
            Err(ShelfError::InvalidToken) => Err(ShelfError::InvalidToken),
            Err(err) => Ok(AttemptOutcome::Failed(err.to_string())),
        }
    }
}
