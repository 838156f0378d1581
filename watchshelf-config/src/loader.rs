use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::debug;

use crate::models::ShelfConfig;
use crate::validation::ConfigWarnings;

pub const CONFIG_PATH_ENV: &str = "WATCHSHELF_CONFIG_PATH";
pub const CONFIG_JSON_ENV: &str = "WATCHSHELF_CONFIG_JSON";
pub const TOKEN_ENV: &str = "SIMKL_TOKEN";

const CANDIDATES: &[&str] = &[
    "watchshelf.toml",
    "watchshelf.json",
    "config/watchshelf.toml",
    "config/watchshelf.json",
];

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ShelfConfig,
    pub source: ConfigSource,
    pub warnings: ConfigWarnings,
}

/// Resolves the configuration. Evaluation order:
/// 1) `$WATCHSHELF_CONFIG_PATH` (TOML or JSON file),
/// 2) `$WATCHSHELF_CONFIG_JSON` (inline JSON),
/// 3) the first existing candidate file under the search root,
/// 4) defaults.
///
/// `$SIMKL_TOKEN` overrides `simkl.token` whichever source won.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    inline_json: Option<String>,
    search_root: PathBuf,
    token: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader primed from the process environment.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            config_path: non_empty(CONFIG_PATH_ENV).map(PathBuf::from),
            inline_json: non_empty(CONFIG_JSON_ENV),
            search_root: PathBuf::new(),
            token: non_empty(TOKEN_ENV),
        }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_inline_json<S: Into<String>>(mut self, raw: S) -> Self {
        self.inline_json = Some(raw.into());
        self
    }

    pub fn with_search_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.search_root = root.into();
        self
    }

    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        let (mut config, source) = self.resolve()?;
        if let Some(token) = &self.token {
            config.simkl.token = Some(token.trim().to_string());
        }
        debug!(source = ?source, "Loaded configuration");

        let warnings = config.validate();
        Ok(ConfigLoad {
            config,
            source,
            warnings,
        })
    }

    fn resolve(&self) -> anyhow::Result<(ShelfConfig, ConfigSource)> {
        if let Some(path) = &self.config_path {
            let config = ShelfConfig::load_from_file(path)?;
            return Ok((config, ConfigSource::EnvPath(path.clone())));
        }

        if let Some(raw) = &self.inline_json {
            let config = ShelfConfig::parse_json(raw)
                .with_context(|| format!("failed to parse {}", CONFIG_JSON_ENV))?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = self.find_default_file() {
            let config = ShelfConfig::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((ShelfConfig::default(), ConfigSource::Default))
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        CANDIDATES
            .iter()
            .map(|candidate| self.search_root.join(candidate))
            .find(|path| path.is_file())
    }
}

impl ShelfConfig {
    /// Shorthand for [`ConfigLoader::from_env`] followed by `load`.
    pub fn load_from_env() -> anyhow::Result<ConfigLoad> {
        ConfigLoader::from_env().load()
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents)
                .with_context(|| format!("invalid config {}", path.display())),
            Some("toml") => toml::from_str(&contents)
                .map_err(|err| anyhow!("invalid config {}: {}", path.display(), err)),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        // TOML first, then JSON.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).map_err(|err| anyhow!("invalid config json: {err}"))
    }
}

/// Load a `.env` file into the process environment. A missing file is not
/// an error; returns whether one was loaded.
pub fn load_env_file(path: Option<&Path>) -> anyhow::Result<bool> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| true),
        None => dotenvy::dotenv().map(|_| true),
    };
    match loaded {
        Ok(loaded) => Ok(loaded),
        Err(dotenvy::Error::Io(_)) => Ok(false),
        Err(err) => Err(err).context("failed to parse .env file"),
    }
}
