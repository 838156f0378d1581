use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use watchshelf_core::catalog::{CatalogKind, ListStatus};
use watchshelf_core::import::{ImportSettings, LibraryTarget};
use watchshelf_core::library::LibraryInfo;
use watchshelf_core::remote::DEFAULT_API_BASE;

/// Complete watchshelf configuration. Every field has a default so a config
/// file only needs the parts it changes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShelfConfig {
    pub simkl: SimklConfig,
    pub targets: TargetsConfig,
    pub host: HostConfig,
    pub stubs: StubsConfig,
    pub ledger: LedgerConfig,
    pub schedule: ScheduleConfig,
    pub server: ServerConfig,
}

impl ShelfConfig {
    pub fn list_status(&self) -> ListStatus {
        ListStatus::parse_lenient(&self.simkl.list_status)
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            list_status: self.list_status(),
            movies: self.targets.movies.clone(),
            shows: self.targets.shows.clone(),
            anime: self.targets.anime.clone(),
            anime_movies: self.targets.anime_movies.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimklConfig {
    pub api_base: String,
    /// Application key sent as `simkl-api-key`.
    pub client_id: String,
    /// File holding the paired user token.
    pub token_file: PathBuf,
    /// Token written to `token_file` at startup, e.g. after pairing on
    /// another machine. `SIMKL_TOKEN` overrides it.
    pub token: Option<String>,
    pub list_status: String,
}

impl Default for SimklConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            client_id: String::new(),
            token_file: PathBuf::from("data/simkl-token"),
            token: None,
            list_status: ListStatus::PlanToWatch.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub movies: LibraryTarget,
    pub shows: LibraryTarget,
    pub anime: LibraryTarget,
    pub anime_movies: LibraryTarget,
}

impl TargetsConfig {
    pub fn get(&self, kind: CatalogKind) -> &LibraryTarget {
        match kind {
            CatalogKind::Movie => &self.movies,
            CatalogKind::Show => &self.shows,
            CatalogKind::AnimeTv => &self.anime,
            CatalogKind::AnimeMovie => &self.anime_movies,
        }
    }
}

/// The media server side: which libraries exist and how to ask for a
/// rescan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    pub libraries: Vec<LibraryInfo>,
    pub rescan_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StubsConfig {
    pub dir: PathBuf,
}

impl Default for StubsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("stubs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/placeholders.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    #[serde(with = "human_duration")]
    pub interval: Duration,
    /// Runs still going after this long are cancelled.
    #[serde(with = "human_duration")]
    pub max_runtime: Duration,
    pub rescan_after_import: bool,
    #[serde(with = "human_duration")]
    pub rescan_delay: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(6 * 60 * 60),
            max_runtime: Duration::from_secs(30 * 60),
            rescan_after_import: true,
            rescan_delay: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

/// `"6h"`, `"30m"`, `"1h 30m"` and friends.
mod human_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(D::Error::custom)
    }
}
