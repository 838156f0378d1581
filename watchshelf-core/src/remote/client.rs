use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::{ListStatus, WatchlistSnapshot};
use crate::error::{Result, ShelfError};

use super::dto::{AnimeListDto, MovieListDto, SearchFileDto, ShowListDto, SyncHistoryDto};
use super::{AcceptedCounts, FileIdentification, WatchedBatch, WatchlistRemote};

pub const DEFAULT_API_BASE: &str = "https://api.simkl.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest client for the Simkl REST API.
#[derive(Debug, Clone)]
pub struct SimklClient {
    http: Client,
    base: Url,
    client_id: String,
}

impl SimklClient {
    pub fn new(base: &str, client_id: impl Into<String>) -> Result<Self> {
        let mut base = Url::parse(base).map_err(|e| {
            ShelfError::Configuration(format!("invalid Simkl API base '{}': {}", base, e))
        })?;
        // `Url::join` drops the last segment unless the base ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("watchshelf/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base,
            client_id: client_id.into(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ShelfError::Internal(format!("bad endpoint '{}': {}", path, e)))
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        let request = request.header("simkl-api-key", &self.client_id);
        if token.is_empty() {
            request
        } else {
            request.bearer_auth(token)
        }
    }

    /// Map the response status and decode the body. Empty and `null` bodies
    /// decode to `None`.
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ShelfError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShelfError::Unexpected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(trimmed)?))
    }

    async fn fetch_list<T: DeserializeOwned + Default>(
        &self,
        token: &str,
        segment: &str,
        status: ListStatus,
    ) -> Result<T> {
        let mut url = self.endpoint(&format!("sync/all-items/{}/{}", segment, status))?;
        url.query_pairs_mut().append_pair("extended", "full");
        debug!(%url, "Fetching list");

        let response = self.authorized(self.http.get(url), token).send().await?;
        let list = Self::read_json::<T>(response).await?;
        if list.is_none() {
            warn!(segment, status = %status, "Empty list response");
        }
        Ok(list.unwrap_or_default())
    }
}

#[async_trait]
impl WatchlistRemote for SimklClient {
    async fn fetch_by_status(&self, token: &str, status: ListStatus) -> Result<WatchlistSnapshot> {
        let movies = self
            .fetch_list::<MovieListDto>(token, "movie", status)
            .await?
            .into_records();
        let shows = self
            .fetch_list::<ShowListDto>(token, "tv", status)
            .await?
            .into_records();
        let (anime_tv, anime_movies) = self
            .fetch_list::<AnimeListDto>(token, "anime", status)
            .await?
            .into_records();

        info!(
            status = %status,
            movies = movies.len(),
            shows = shows.len(),
            anime_tv = anime_tv.len(),
            anime_movies = anime_movies.len(),
            "Fetched watchlist"
        );

        Ok(WatchlistSnapshot {
            movies,
            shows,
            anime_tv,
            anime_movies,
        })
    }

    async fn identify_by_file(&self, token: &str, file: &str) -> Result<Option<FileIdentification>> {
        debug!(file, "Identifying file");
        let response = self
            .authorized(self.http.post(self.endpoint("search/file/")?), token)
            .json(&json!({ "file": file }))
            .send()
            .await?;

        Ok(Self::read_json::<SearchFileDto>(response)
            .await?
            .map(FileIdentification::from))
    }

    async fn submit_watched(&self, token: &str, batch: &WatchedBatch) -> Result<AcceptedCounts> {
        info!(
            movies = batch.movies.len(),
            shows = batch.shows.len(),
            episodes = batch.episodes.len(),
            "Syncing history"
        );
        let response = self
            .authorized(self.http.post(self.endpoint("sync/history")?), token)
            .json(batch)
            .send()
            .await?;

        Ok(Self::read_json::<SyncHistoryDto>(response)
            .await?
            .map(AcceptedCounts::from)
            .unwrap_or_default())
    }
}
