//! Port to the media server that owns the libraries stubs are written into.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub root_paths: Vec<PathBuf>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryHost: Send + Sync {
    async fn list_configured_libraries(&self) -> Result<Vec<LibraryInfo>>;

    /// First root path of the library with `id`, if the library exists and
    /// has one.
    async fn resolve_library_path(&self, id: &str) -> Result<Option<PathBuf>>;

    /// Ask the server to rescan its libraries. Must return promptly once
    /// `cancel` fires.
    async fn request_library_rescan(&self, cancel: &CancellationToken) -> Result<()>;
}

/// Library ids are GUIDs on most servers; compare them ignoring case and
/// hyphenation so `ABCD-...` and `abcd...` resolve to the same library.
pub fn library_ids_match(a: &str, b: &str) -> bool {
    let normalize = |s: &str| {
        s.trim()
            .chars()
            .filter(|c| *c != '-' && *c != '{' && *c != '}')
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    normalize(a) == normalize(b)
}

/// Resolve `id` against an already fetched library list.
pub fn first_root_path(libraries: &[LibraryInfo], id: &str) -> Option<PathBuf> {
    libraries
        .iter()
        .find(|library| library_ids_match(&library.id, id))
        .and_then(|library| library.root_paths.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_across_guid_formats() {
        assert!(library_ids_match(
            "f137a2dd-21bb-c1b9-9aa5-c0f6bf02a805",
            "F137A2DD21BBC1B99AA5C0F6BF02A805"
        ));
        assert!(library_ids_match("{abc}", "ABC"));
        assert!(!library_ids_match("abc", "abd"));
    }

    #[test]
    fn resolves_first_root_path() {
        let libraries = vec![
            LibraryInfo {
                id: "movies".into(),
                name: "Movies".into(),
                root_paths: vec!["/media/movies".into(), "/media/movies2".into()],
            },
            LibraryInfo {
                id: "empty".into(),
                name: "Empty".into(),
                root_paths: Vec::new(),
            },
        ];

        assert_eq!(
            first_root_path(&libraries, "MOVIES"),
            Some(PathBuf::from("/media/movies"))
        );
        assert_eq!(first_root_path(&libraries, "empty"), None);
        assert_eq!(first_root_path(&libraries, "shows"), None);
    }
}
