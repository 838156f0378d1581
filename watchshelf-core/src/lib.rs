//! # Watchshelf Core
//!
//! Keeps a media library in step with a user's Simkl lists.
//!
//! - **Import**: every title on a remote list gets a folder in the matching
//!   library and, for movies, a small stub video sized after the title's
//!   runtime, so the media server lists it as present.
//! - **Placeholders**: stubs written with a guessed runtime are remembered in
//!   a ledger and replaced once the real runtime shows up.
//! - **Scrobbling**: finished playbacks are recorded remotely, falling back to
//!   file-name identification when the item's own metadata is not enough.
//!
//! ## Architecture
//!
//! - [`catalog`]: remote records and list statuses
//! - [`naming`]: deterministic folder and file names
//! - [`stubs`]: stub catalog discovery and nearest-runtime copies
//! - [`ledger`]: durable placeholder tracking
//! - [`import`]: the import orchestrator and its scheduled job
//! - [`scrobble`]: playback reconciliation
//! - [`remote`], [`library`], [`token`]: ports to the tracking service, the
//!   media server and the credential store

#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod import;
pub mod ledger;
pub mod library;
pub mod naming;
pub mod remote;
pub mod scrobble;
pub mod stubs;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{CatalogKind, ExternalIds, ListStatus, RemoteCatalogRecord, WatchlistSnapshot};
pub use error::{Result, ShelfError};
pub use import::{
    CategoryCounters, ImportErrorKind, ImportJob, ImportOrchestrator, ImportProgress,
    ImportResult, ImportSettings, LibraryTarget,
};
pub use ledger::{PlaceholderLedger, PlaceholderRecord};
pub use library::{LibraryHost, LibraryInfo};
pub use naming::{DefaultNamingStrategy, NamingStrategy};
pub use remote::{SimklClient, WatchlistRemote};
pub use scrobble::{PlaybackItem, PlaybackKind, ScrobbleReconciler};
pub use stubs::{StubCatalog, StubCatalogEntry, StubSynthesizer};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
