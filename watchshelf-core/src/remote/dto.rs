//! Wire shapes of the Simkl API. The service is loose with types (ids and
//! runtimes arrive as numbers or strings), so everything is read through
//! `serde_json::Value` and narrowed when converting into domain types.

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{CatalogKind, ExternalIds, RemoteCatalogRecord};

use super::{AcceptedCounts, FileIdentification, IdentifiedEpisode, IdentifiedKind, IdentifiedTitle};

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdsDto {
    #[serde(default)]
    simkl: Value,
    #[serde(default)]
    tmdb: Value,
    #[serde(default)]
    tvdb: Value,
    #[serde(default)]
    imdb: Value,
}

impl From<IdsDto> for ExternalIds {
    fn from(ids: IdsDto) -> Self {
        ExternalIds {
            simkl: value_to_i64(&ids.simkl).and_then(|id| u64::try_from(id).ok()),
            tmdb: value_to_string(&ids.tmdb),
            tvdb: value_to_string(&ids.tvdb),
            imdb: value_to_string(&ids.imdb),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaDto {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Value,
    #[serde(default)]
    runtime: Value,
    #[serde(default)]
    ids: IdsDto,
}

impl MediaDto {
    fn year(&self) -> Option<i32> {
        value_to_i64(&self.year).and_then(|y| i32::try_from(y).ok())
    }

    fn into_record(self, kind: CatalogKind) -> RemoteCatalogRecord {
        RemoteCatalogRecord {
            year: self.year(),
            runtime_minutes: value_to_i64(&self.runtime),
            title: self.title.unwrap_or_default(),
            kind,
            ids: self.ids.into(),
        }
    }

    fn into_identified(self) -> IdentifiedTitle {
        IdentifiedTitle {
            year: self.year(),
            title: self.title,
            ids: self.ids.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MovieListDto {
    #[serde(default)]
    movies: Option<Vec<MovieItemDto>>,
}

#[derive(Debug, Deserialize)]
struct MovieItemDto {
    #[serde(default)]
    movie: Option<MediaDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShowListDto {
    #[serde(default)]
    shows: Option<Vec<ShowItemDto>>,
}

#[derive(Debug, Deserialize)]
struct ShowItemDto {
    #[serde(default)]
    show: Option<MediaDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnimeListDto {
    #[serde(default)]
    anime: Option<Vec<AnimeItemDto>>,
}

#[derive(Debug, Deserialize)]
struct AnimeItemDto {
    #[serde(default)]
    show: Option<MediaDto>,
    #[serde(default)]
    anime_type: Option<String>,
}

impl MovieListDto {
    pub(crate) fn into_records(self) -> Vec<RemoteCatalogRecord> {
        self.movies
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.movie)
            .map(|movie| movie.into_record(CatalogKind::Movie))
            .collect()
    }
}

impl ShowListDto {
    pub(crate) fn into_records(self) -> Vec<RemoteCatalogRecord> {
        self.shows
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.show)
            .map(|show| show.into_record(CatalogKind::Show))
            .collect()
    }
}

impl AnimeListDto {
    /// Split into (tv, movie) by the `anime_type` discriminator. Specials,
    /// OVAs and untyped entries belong to neither library.
    pub(crate) fn into_records(self) -> (Vec<RemoteCatalogRecord>, Vec<RemoteCatalogRecord>) {
        let mut tv = Vec::new();
        let mut movies = Vec::new();
        for item in self.anime.unwrap_or_default() {
            let Some(show) = item.show else { continue };
            match item.anime_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("tv") => tv.push(show.into_record(CatalogKind::AnimeTv)),
                Some("movie") => movies.push(show.into_record(CatalogKind::AnimeMovie)),
                _ => {}
            }
        }
        (tv, movies)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EpisodeDto {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    season: Value,
    #[serde(default)]
    episode: Value,
    #[serde(default)]
    ids: IdsDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchFileDto {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    movie: Option<MediaDto>,
    #[serde(default)]
    show: Option<MediaDto>,
    #[serde(default)]
    episode: Option<EpisodeDto>,
}

impl From<SearchFileDto> for FileIdentification {
    fn from(dto: SearchFileDto) -> Self {
        let kind = match dto.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("movie") => IdentifiedKind::Movie,
            Some("show") | Some("tv") => IdentifiedKind::Show,
            Some("episode") => IdentifiedKind::Episode,
            _ => IdentifiedKind::Other,
        };
        let number = |v: &Value| value_to_i64(v).and_then(|n| u32::try_from(n).ok());

        FileIdentification {
            kind,
            movie: dto.movie.map(MediaDto::into_identified),
            show: dto.show.map(MediaDto::into_identified),
            episode: dto.episode.map(|ep| IdentifiedEpisode {
                season: number(&ep.season),
                episode: number(&ep.episode),
                title: ep.title,
                ids: ep.ids.into(),
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SyncHistoryDto {
    #[serde(default)]
    added: AddedDto,
}

#[derive(Debug, Default, Deserialize)]
struct AddedDto {
    #[serde(default)]
    movies: usize,
    #[serde(default)]
    shows: usize,
    #[serde(default)]
    episodes: usize,
}

impl From<SyncHistoryDto> for AcceptedCounts {
    fn from(dto: SyncHistoryDto) -> Self {
        AcceptedCounts {
            movies: dto.added.movies,
            shows: dto.added.shows,
            episodes: dto.added.episodes,
        }
    }
}
