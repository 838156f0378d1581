use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, warn};

/// Holder of the user's remote access token.
///
/// A token rejected by the remote service is cleared through
/// [`TokenStore::invalidate`]; it only takes effect when the stored token is
/// still the rejected one, so a re-pairing that raced the failing request is
/// kept.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn current(&self) -> Option<String>;

    async fn store(&self, token: String);

    async fn invalidate(&self, rejected: &str);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn current(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn store(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    async fn invalidate(&self, rejected: &str) {
        let mut guard = self.token.write().await;
        if guard.as_deref() == Some(rejected) {
            warn!("Clearing rejected user token");
            *guard = None;
        }
    }
}

/// Token persisted as the only line of a small file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl FileTokenStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Some(raw.trim().to_string()).filter(|t| !t.is_empty()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!(path = %path.display(), "Failed to read token file: {}", err);
                None
            }
        };
        Self {
            path,
            token: RwLock::new(token),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn current(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn store(&self, token: String) {
        let mut guard = self.token.write().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(err) = tokio::fs::create_dir_all(parent).await
        {
            error!(path = %parent.display(), "Failed to create token directory: {}", err);
        }
        if let Err(err) = tokio::fs::write(&self.path, format!("{token}\n")).await {
            error!(path = %self.path.display(), "Failed to persist token: {}", err);
        }
        *guard = Some(token);
    }

    async fn invalidate(&self, rejected: &str) {
        let mut guard = self.token.write().await;
        if guard.as_deref() != Some(rejected) {
            return;
        }
        warn!(path = %self.path.display(), "Clearing rejected user token");
        *guard = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => error!(path = %self.path.display(), "Failed to delete token file: {}", err),
        }
    }
}
