use std::any::type_name_of_val;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogKind, RemoteCatalogRecord};
use crate::error::ShelfError;
use crate::ledger::PlaceholderLedger;
use crate::library::LibraryHost;
use crate::naming::{DefaultNamingStrategy, NamingStrategy};
use crate::remote::WatchlistRemote;
use crate::stubs::{StubSynthesizer, is_valid_stub};
use crate::token::TokenStore;

use super::review::review_placeholders;
use super::{CategoryCounters, ImportErrorKind, ImportProgress, ImportResult, ImportSettings};

/// Resolved destination root per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations {
    roots: HashMap<CatalogKind, PathBuf>,
}

impl Destinations {
    pub fn get(&self, kind: CatalogKind) -> Option<&Path> {
        self.roots.get(&kind).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Drives one import run at a time: fetch, placeholder review, then folders
/// and stubs per category.
pub struct ImportOrchestrator {
    remote: Arc<dyn WatchlistRemote>,
    host: Arc<dyn LibraryHost>,
    tokens: Arc<dyn TokenStore>,
    ledger: Arc<PlaceholderLedger>,
    synthesizer: StubSynthesizer,
    naming: Arc<dyn NamingStrategy>,
    run_lock: Mutex<()>,
}

impl fmt::Debug for ImportOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOrchestrator")
            .field("remote_type", &type_name_of_val(self.remote.as_ref()))
            .field("host_type", &type_name_of_val(self.host.as_ref()))
            .field("tokens_type", &type_name_of_val(self.tokens.as_ref()))
            .field("naming_type", &type_name_of_val(self.naming.as_ref()))
            .field("ledger", &self.ledger.path())
            .field("stub_count", &self.synthesizer.catalog().len())
            .field("running", &self.run_lock.try_lock().is_err())
            .finish()
    }
}

impl ImportOrchestrator {
    pub fn new(
        remote: Arc<dyn WatchlistRemote>,
        host: Arc<dyn LibraryHost>,
        tokens: Arc<dyn TokenStore>,
        ledger: Arc<PlaceholderLedger>,
        synthesizer: StubSynthesizer,
    ) -> Self {
        Self {
            remote,
            host,
            tokens,
            ledger,
            synthesizer,
            naming: Arc::new(DefaultNamingStrategy),
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_naming(mut self, naming: Arc<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    pub fn host(&self) -> &Arc<dyn LibraryHost> {
        &self.host
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn ledger(&self) -> &Arc<PlaceholderLedger> {
        &self.ledger
    }

    pub fn synthesizer(&self) -> &StubSynthesizer {
        &self.synthesizer
    }

    /// Resolve every configured target. A library id is looked up on the
    /// host; only targets without one fall back to their explicit path.
    pub async fn resolve_destinations(&self, settings: &ImportSettings) -> Destinations {
        let mut roots = HashMap::new();
        for kind in CatalogKind::ALL {
            let target = settings.target(kind);
            if let Some(id) = target.library_id() {
                match self.host.resolve_library_path(id).await {
                    Ok(Some(path)) => {
                        debug!(kind = %kind, library_id = id, path = %path.display(), "Resolved library");
                        roots.insert(kind, path);
                    }
                    Ok(None) => {
                        warn!(kind = %kind, library_id = id, "Configured library not found or has no paths");
                    }
                    Err(err) => {
                        warn!(kind = %kind, library_id = id, "Failed to resolve library: {}", err);
                    }
                }
            } else if let Some(path) = target.explicit_path() {
                roots.insert(kind, path.clone());
            }
        }
        Destinations { roots }
    }

    pub async fn import_plan_to_watch(&self, settings: &ImportSettings) -> ImportResult {
        self.import_with(settings, &CancellationToken::new(), &|_: f64| {})
            .await
    }

    /// Full import run. Progress is reported as a percentage: 10 after the
    /// fetch, 20 after the review, then per category up to 90.
    pub async fn import_with(
        &self,
        settings: &ImportSettings,
        cancel: &CancellationToken,
        progress: &dyn ImportProgress,
    ) -> ImportResult {
        let _run = self.run_lock.lock().await;
        let mut result = ImportResult::started(settings.list_status);

        let Some(token) = self.tokens.current().await else {
            warn!("Import requested without a user token");
            return result.fail(
                ImportErrorKind::Configuration,
                "No user token configured, pair with Simkl first",
            );
        };

        let destinations = self.resolve_destinations(settings).await;
        if destinations.is_empty() {
            warn!("Import requested without any destination library");
            return result.fail(
                ImportErrorKind::Configuration,
                "No destination library configured",
            );
        }

        info!(status = %settings.list_status, "Starting watchlist import");
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return result.fail(ImportErrorKind::Cancelled, "Import cancelled before fetching the list");
            }
            fetched = self.remote.fetch_by_status(&token, settings.list_status) => fetched,
        };

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(ShelfError::InvalidToken) => {
                error!("Simkl rejected the user token, clearing it");
                self.tokens.invalidate(&token).await;
                return result.fail(
                    ImportErrorKind::InvalidToken,
                    "Simkl rejected the user token, pair again",
                );
            }
            Err(err) => {
                error!("Failed to fetch Simkl list: {}", err);
                return result.fail(
                    ImportErrorKind::Remote,
                    format!("Failed to fetch Simkl list: {}", err),
                );
            }
        };
        progress.report(10.0);

        result.placeholders_upgraded =
            review_placeholders(&self.ledger, &self.synthesizer, &snapshot).await;
        progress.report(20.0);

        if snapshot.is_empty() {
            info!(status = %settings.list_status, "Remote list is empty");
            return result.succeed(format!(
                "No items found in Simkl {} list",
                settings.list_status
            ));
        }

        let step = 70.0 / CatalogKind::ALL.len() as f64;
        for (index, kind) in CatalogKind::ALL.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!(kind = %kind, "Import cancelled");
                return result.fail(ImportErrorKind::Cancelled, "Import cancelled");
            }

            let records = snapshot.records(kind);
            match destinations.get(kind) {
                Some(root) if !records.is_empty() => {
                    self.import_category(kind, records, root, result.counters_mut(kind))
                        .await;
                }
                Some(_) => {}
                None if !records.is_empty() => {
                    debug!(kind = %kind, count = records.len(), "No destination, skipping category");
                }
                None => {}
            }
            progress.report(20.0 + step * (index + 1) as f64);
        }

        let created = result.total_created();
        let copied = result.total_files_copied();
        let errors = result.total_errors();
        if created == 0 && errors == 0 {
            warn!("Import created nothing, every item already exists");
        }
        info!(
            created,
            files_copied = copied,
            errors,
            upgraded = result.placeholders_upgraded,
            "Watchlist import finished"
        );

        result.succeed(format!(
            "Created {} folders and copied {} stub files ({} errors)",
            created, copied, errors
        ))
    }

    async fn import_category(
        &self,
        kind: CatalogKind,
        records: &[RemoteCatalogRecord],
        root: &Path,
        counters: &mut CategoryCounters,
    ) {
        info!(kind = %kind, count = records.len(), root = %root.display(), "Importing category");

        // Every folder exists before the first copy.
        for record in records {
            let folder = root.join(self.naming.folder_name(record));
            if is_dir(&folder).await {
                continue;
            }
            match tokio::fs::create_dir_all(&folder).await {
                Ok(()) => {
                    counters.created += 1;
                    debug!(path = %folder.display(), "Created folder");
                }
                Err(err) => {
                    counters.errors += 1;
                    error!(path = %folder.display(), "Failed to create folder: {}", err);
                }
            }
        }

        if !kind.uses_stub() {
            return;
        }

        for record in records {
            let folder = root.join(self.naming.folder_name(record));
            if !is_dir(&folder).await {
                continue;
            }
            let file = folder.join(self.naming.file_name(record));
            if is_valid_stub(&file).await {
                continue;
            }

            let (minutes, placeholder) = match record.true_runtime() {
                Some(minutes) => (minutes, false),
                None => (kind.fallback_runtime(), true),
            };

            match self.synthesizer.materialize(&file, minutes).await {
                Ok(stub) => {
                    counters.files_copied += 1;
                    debug!(
                        path = %file.display(),
                        runtime = minutes,
                        stub_minutes = stub.nominal_minutes,
                        placeholder,
                        "Copied stub"
                    );
                    match (record.ids.simkl, placeholder) {
                        (Some(id), true) => self.ledger.record(id, kind, &file).await,
                        (Some(id), false) => self.ledger.remove(id, kind).await,
                        (None, true) => {
                            warn!(title = %record.title, "No Simkl id, placeholder cannot be tracked")
                        }
                        (None, false) => {}
                    }
                }
                Err(err) => {
                    counters.errors += 1;
                    error!(path = %file.display(), "Failed to copy stub: {}", err);
                }
            }
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ExternalIds, WatchlistSnapshot};
    use crate::import::LibraryTarget;
    use crate::library::MockLibraryHost;
    use crate::stubs::StubCatalog;
    use crate::testing::{FakeRemote, Reply};
    use crate::token::MemoryTokenStore;
    use tempfile::{TempDir, tempdir};

    const STUB_BASE: usize = 21 * 1024;

    struct Fixture {
        _tmp: TempDir,
        library: PathBuf,
        remote: Arc<FakeRemote>,
        tokens: Arc<MemoryTokenStore>,
        ledger: Arc<PlaceholderLedger>,
        orchestrator: ImportOrchestrator,
    }

    fn stub_size(minutes: u32) -> u64 {
        (STUB_BASE + minutes as usize) as u64
    }

    async fn fixture_with(
        snapshot: WatchlistSnapshot,
        stub_minutes: &[u32],
        host: MockLibraryHost,
    ) -> Fixture {
        let tmp = tempdir().expect("tempdir");
        let stubs = tmp.path().join("stubs");
        tokio::fs::create_dir_all(&stubs).await.expect("stub dir");
        for minutes in stub_minutes {
            tokio::fs::write(
                stubs.join(format!("{minutes}min.mkv")),
                vec![0u8; stub_size(*minutes) as usize],
            )
            .await
            .expect("write stub");
        }

        let catalog = StubCatalog::discover_or_empty(&stubs).await;
        let remote = Arc::new(FakeRemote::new(snapshot));
        let tokens = Arc::new(MemoryTokenStore::new(Some("tok".into())));
        let ledger = Arc::new(PlaceholderLedger::new(tmp.path().join("state").join("ledger.txt")));
        let orchestrator = ImportOrchestrator::new(
            remote.clone(),
            Arc::new(host),
            tokens.clone(),
            ledger.clone(),
            StubSynthesizer::new(Arc::new(catalog)),
        );

        Fixture {
            library: tmp.path().join("library"),
            _tmp: tmp,
            remote,
            tokens,
            ledger,
            orchestrator,
        }
    }

    async fn fixture(snapshot: WatchlistSnapshot) -> Fixture {
        fixture_with(snapshot, &[45, 60, 90, 120, 150], MockLibraryHost::new()).await
    }

    fn record(kind: CatalogKind, simkl: u64, title: &str, runtime: Option<i64>) -> RemoteCatalogRecord {
        RemoteCatalogRecord {
            title: title.into(),
            year: Some(2021),
            kind,
            runtime_minutes: runtime,
            ids: ExternalIds {
                simkl: Some(simkl),
                tmdb: Some("438631".into()),
                tvdb: Some("81189".into()),
                imdb: None,
            },
        }
    }

    fn dune(runtime: Option<i64>) -> WatchlistSnapshot {
        WatchlistSnapshot {
            movies: vec![record(CatalogKind::Movie, 1, "Dune", runtime)],
            ..WatchlistSnapshot::default()
        }
    }

    fn settings_for(fx: &Fixture) -> ImportSettings {
        ImportSettings {
            movies: LibraryTarget::path(fx.library.join("movies")),
            shows: LibraryTarget::path(fx.library.join("shows")),
            anime: LibraryTarget::path(fx.library.join("anime")),
            anime_movies: LibraryTarget::path(fx.library.join("anime-movies")),
            ..ImportSettings::default()
        }
    }

    fn dune_file(fx: &Fixture) -> PathBuf {
        fx.library
            .join("movies")
            .join("Dune (2021) [tmdbid-438631]")
            .join("Dune (2021) [tmdbid-438631].mkv")
    }

    async fn file_len(path: &Path) -> u64 {
        tokio::fs::metadata(path).await.expect("metadata").len()
    }

    #[tokio::test]
    async fn creates_folder_and_closest_stub() {
        let fx = fixture(dune(Some(155))).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(result.success, "{result:?}");
        assert_eq!(
            result.movies,
            CategoryCounters {
                created: 1,
                files_copied: 1,
                errors: 0
            }
        );
        assert_eq!(file_len(&dune_file(&fx)).await, stub_size(150));
        assert!(fx.ledger.list().await.is_empty());
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let fx = fixture(dune(Some(155))).await;
        let settings = settings_for(&fx);

        fx.orchestrator.import_plan_to_watch(&settings).await;
        let second = fx.orchestrator.import_plan_to_watch(&settings).await;

        assert!(second.success);
        assert_eq!(second.total_created(), 0);
        assert_eq!(second.total_files_copied(), 0);
        assert_eq!(second.total_errors(), 0);
    }

    #[tokio::test]
    async fn undersized_stub_is_replaced() {
        let fx = fixture(dune(Some(90))).await;
        let file = dune_file(&fx);
        tokio::fs::create_dir_all(file.parent().expect("parent"))
            .await
            .expect("folder");
        tokio::fs::write(&file, b"partial").await.expect("partial");

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert_eq!(result.movies.created, 0);
        assert_eq!(result.movies.files_copied, 1);
        assert_eq!(file_len(&file).await, stub_size(90));
    }

    #[tokio::test]
    async fn fallback_runtime_is_tracked_then_upgraded() {
        let fx = fixture(dune(None)).await;
        let settings = settings_for(&fx);

        let first = fx.orchestrator.import_plan_to_watch(&settings).await;
        assert_eq!(first.movies.files_copied, 1);
        assert_eq!(file_len(&dune_file(&fx)).await, stub_size(90));
        let tracked = fx.ledger.list().await;
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].simkl_id, 1);
        assert_eq!(tracked[0].kind, CatalogKind::Movie);
        assert_eq!(tracked[0].file_path, dune_file(&fx));

        fx.remote.set_snapshot(Reply::Ok(dune(Some(120))));
        let second = fx.orchestrator.import_plan_to_watch(&settings).await;

        assert!(second.success);
        assert_eq!(second.placeholders_upgraded, 1);
        assert_eq!(second.movies.files_copied, 0);
        assert_eq!(file_len(&dune_file(&fx)).await, stub_size(120));
        assert!(fx.ledger.list().await.is_empty());
    }

    #[tokio::test]
    async fn vanished_placeholders_are_dropped() {
        let fx = fixture(WatchlistSnapshot::default()).await;
        fx.ledger
            .record(5, CatalogKind::AnimeMovie, &fx.library.join("gone.mkv"))
            .await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(result.success);
        assert_eq!(result.placeholders_upgraded, 0);
        assert!(fx.ledger.list().await.is_empty());
    }

    #[tokio::test]
    async fn placeholder_is_kept_when_no_replacement_stub_exists() {
        let fx = fixture_with(dune(Some(120)), &[], MockLibraryHost::new()).await;
        let file = dune_file(&fx);
        tokio::fs::create_dir_all(file.parent().expect("parent"))
            .await
            .expect("folder");
        tokio::fs::write(&file, vec![0u8; stub_size(90) as usize])
            .await
            .expect("placeholder");
        fx.ledger.record(1, CatalogKind::Movie, &file).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(result.success);
        assert_eq!(result.placeholders_upgraded, 0);
        assert_eq!(file_len(&file).await, stub_size(90));
        assert_eq!(fx.ledger.list().await.len(), 1);
    }

    #[tokio::test]
    async fn series_ledger_entries_are_not_reviewed() {
        let snapshot = WatchlistSnapshot {
            shows: vec![record(CatalogKind::Show, 2, "Lost", Some(45))],
            ..WatchlistSnapshot::default()
        };
        let fx = fixture(snapshot).await;
        let stray = fx.library.join("stray.mkv");
        tokio::fs::create_dir_all(&fx.library).await.expect("library");
        tokio::fs::write(&stray, b"keep").await.expect("stray");
        fx.ledger.record(2, CatalogKind::Show, &stray).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(result.success);
        assert_eq!(result.placeholders_upgraded, 0);
        assert_eq!(tokio::fs::read(&stray).await.expect("read"), b"keep");
        assert_eq!(fx.ledger.list().await.len(), 1);
    }

    #[tokio::test]
    async fn dot_titles_stay_inside_the_library() {
        let mut dots = record(CatalogKind::Movie, 6, "..", Some(90));
        dots.year = None;
        dots.ids.tmdb = None;
        let snapshot = WatchlistSnapshot {
            movies: vec![dots],
            ..WatchlistSnapshot::default()
        };
        let fx = fixture(snapshot).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert_eq!(result.movies.created, 1);
        assert_eq!(result.movies.files_copied, 1);
        let stub = fx.library.join("movies").join("__").join("__.mkv");
        assert_eq!(file_len(&stub).await, stub_size(90));
        assert!(!fx.library.join("...mkv").exists());
    }

    #[tokio::test]
    async fn concurrent_imports_run_one_at_a_time() {
        let fx = fixture(dune(Some(155))).await;
        let settings = settings_for(&fx);

        let (first, second) = tokio::join!(
            fx.orchestrator.import_plan_to_watch(&settings),
            fx.orchestrator.import_plan_to_watch(&settings),
        );

        assert!(first.success && second.success);
        assert_eq!(first.movies.created + second.movies.created, 1);
        assert_eq!(first.movies.files_copied + second.movies.files_copied, 1);
        assert_eq!(file_len(&dune_file(&fx)).await, stub_size(150));
    }

    #[tokio::test]
    async fn series_get_folders_and_anime_movies_use_their_fallback() {
        let snapshot = WatchlistSnapshot {
            shows: vec![record(CatalogKind::Show, 2, "Lost", None)],
            anime_tv: vec![record(CatalogKind::AnimeTv, 3, "Frieren", None)],
            anime_movies: vec![record(CatalogKind::AnimeMovie, 4, "Akira", None)],
            ..WatchlistSnapshot::default()
        };
        let fx = fixture(snapshot).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert_eq!(result.shows.created, 1);
        assert_eq!(result.shows.files_copied, 0);
        assert_eq!(result.anime_tv.created, 1);
        assert_eq!(result.anime_movies.files_copied, 1);

        let show = fx.library.join("shows").join("Lost (2021) [tvdbid-81189]");
        assert!(show.is_dir());
        assert!(!show.join("Lost (2021) [tvdbid-81189].mkv").exists());
        assert!(fx.library.join("anime").join("Frieren (2021) [tvdbid-81189]").is_dir());

        let akira = fx
            .library
            .join("anime-movies")
            .join("Akira (2021) [tmdbid-438631]")
            .join("Akira (2021) [tmdbid-438631].mkv");
        assert_eq!(file_len(&akira).await, stub_size(45));
        assert_eq!(fx.ledger.list().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_list_succeeds_without_touching_libraries() {
        let fx = fixture(WatchlistSnapshot::default()).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(result.success);
        assert!(result.message.as_deref().unwrap_or_default().contains("No items"));
        assert!(!fx.library.exists());
    }

    #[tokio::test]
    async fn empty_stub_catalog_counts_errors_but_creates_folders() {
        let fx = fixture_with(dune(Some(155)), &[], MockLibraryHost::new()).await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(result.success);
        assert_eq!(
            result.movies,
            CategoryCounters {
                created: 1,
                files_copied: 0,
                errors: 1
            }
        );
    }

    #[tokio::test]
    async fn missing_token_aborts_before_fetch() {
        let fx = fixture(dune(Some(155))).await;
        fx.tokens.invalidate("tok").await;

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ImportErrorKind::Configuration));
        assert_eq!(fx.remote.fetches(), 0);
    }

    #[tokio::test]
    async fn missing_destination_aborts_before_fetch() {
        let fx = fixture(dune(Some(155))).await;

        let result = fx
            .orchestrator
            .import_plan_to_watch(&ImportSettings::default())
            .await;

        assert_eq!(result.error_kind, Some(ImportErrorKind::Configuration));
        assert_eq!(fx.remote.fetches(), 0);
    }

    #[tokio::test]
    async fn rejected_token_is_cleared() {
        let fx = fixture(dune(Some(155))).await;
        fx.remote.set_snapshot(Reply::InvalidToken);

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ImportErrorKind::InvalidToken));
        assert_eq!(fx.tokens.current().await, None);
    }

    #[tokio::test]
    async fn remote_failure_is_reported() {
        let fx = fixture(dune(Some(155))).await;
        fx.remote.set_snapshot(Reply::ServerError);

        let result = fx.orchestrator.import_plan_to_watch(&settings_for(&fx)).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ImportErrorKind::Remote));
        assert!(result.error.as_deref().unwrap_or_default().contains("500"));
        assert_eq!(fx.tokens.current().await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn cancelled_run_does_not_fetch() {
        let fx = fixture(dune(Some(155))).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fx
            .orchestrator
            .import_with(&settings_for(&fx), &cancel, &|_: f64| {})
            .await;

        assert_eq!(result.error_kind, Some(ImportErrorKind::Cancelled));
        assert_eq!(fx.remote.fetches(), 0);
    }

    #[tokio::test]
    async fn library_ids_resolve_through_the_host() {
        let tmp = tempdir().expect("tempdir");
        let movies_root = tmp.path().join("host-movies");
        let resolved = movies_root.clone();

        let mut host = MockLibraryHost::new();
        host.expect_resolve_library_path()
            .withf(|id| id.eq_ignore_ascii_case("lib-movies"))
            .returning(move |_| Ok(Some(resolved.clone())));
        host.expect_resolve_library_path()
            .withf(|id| id.eq_ignore_ascii_case("lib-shows"))
            .returning(|_| Ok(None));

        let snapshot = WatchlistSnapshot {
            movies: vec![record(CatalogKind::Movie, 1, "Dune", Some(155))],
            shows: vec![record(CatalogKind::Show, 2, "Lost", None)],
            ..WatchlistSnapshot::default()
        };
        let fx = fixture_with(snapshot, &[150], host).await;
        let settings = ImportSettings {
            movies: LibraryTarget {
                library_id: Some("lib-movies".into()),
                path: Some(fx.library.join("ignored")),
            },
            shows: LibraryTarget::library("lib-shows"),
            ..ImportSettings::default()
        };

        let progress = std::sync::Mutex::new(Vec::new());
        let report = |p: f64| progress.lock().expect("lock").push(p);
        let result = fx
            .orchestrator
            .import_with(&settings, &CancellationToken::new(), &report)
            .await;

        assert!(result.success);
        assert_eq!(result.movies.created, 1);
        assert_eq!(result.shows, CategoryCounters::default());
        assert!(movies_root.join("Dune (2021) [tmdbid-438631]").is_dir());
        assert!(!fx.library.join("ignored").exists());

        let seen = progress.into_inner().expect("progress");
        assert_eq!(seen.first().copied(), Some(10.0));
        assert_eq!(seen.last().copied(), Some(90.0));
    }
}
