use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;
use watchshelf_core::error::{Result, ShelfError};
use watchshelf_core::library::{LibraryHost, LibraryInfo, first_root_path};

const API_KEY_HEADER: &str = "X-Emby-Token";
const RESCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Library host backed by the configuration file. Libraries are declared
/// statically; a rescan is a bare `POST` against the media server's refresh
/// endpoint when one is configured.
#[derive(Debug, Clone)]
pub struct ConfigLibraryHost {
    libraries: Vec<LibraryInfo>,
    rescan_url: Option<Url>,
    api_key: Option<String>,
    http: Client,
}

impl ConfigLibraryHost {
    pub fn new(
        libraries: Vec<LibraryInfo>,
        rescan_url: Option<&str>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let rescan_url = rescan_url
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                Url::parse(raw).map_err(|err| {
                    ShelfError::Configuration(format!("invalid rescan url '{raw}': {err}"))
                })
            })
            .transpose()?;

        let http = Client::builder().timeout(RESCAN_TIMEOUT).build()?;

        Ok(Self {
            libraries,
            rescan_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            http,
        })
    }

    async fn post_rescan(&self, url: &Url) -> Result<()> {
        let mut request = self.http.post(url.clone());
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShelfError::Unexpected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryHost for ConfigLibraryHost {
    async fn list_configured_libraries(&self) -> Result<Vec<LibraryInfo>> {
        Ok(self.libraries.clone())
    }

    async fn resolve_library_path(&self, id: &str) -> Result<Option<PathBuf>> {
        Ok(first_root_path(&self.libraries, id))
    }

    async fn request_library_rescan(&self, cancel: &CancellationToken) -> Result<()> {
        let Some(url) = &self.rescan_url else {
            debug!("No rescan url configured, skipping library rescan");
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ShelfError::Cancelled("library rescan".into())),
            result = self.post_rescan(url) => {
                result?;
                info!(url = %url, "Library rescan requested");
                Ok(())
            }
        }
    }
}
