use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use watchshelf_config::ShelfConfig;
use watchshelf_core::{
    FileTokenStore, ImportJob, ImportOrchestrator, ImportSettings, LibraryHost,
    PlaceholderLedger, ScrobbleReconciler, SimklClient, StubCatalog, StubSynthesizer,
    TokenStore, WatchlistRemote,
};

use crate::library_host::ConfigLibraryHost;

/// Shared handler state. Handlers and the scheduler hold the same
/// orchestrator so imports are serialised by its run lock.
#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: Arc<ImportOrchestrator>,
    pub reconciler: Arc<ScrobbleReconciler>,
    pub settings: Arc<ImportSettings>,
}

impl AppState {
    pub fn new(
        remote: Arc<dyn WatchlistRemote>,
        host: Arc<dyn LibraryHost>,
        tokens: Arc<dyn TokenStore>,
        ledger: Arc<PlaceholderLedger>,
        synthesizer: StubSynthesizer,
        settings: ImportSettings,
    ) -> Self {
        let orchestrator = Arc::new(ImportOrchestrator::new(
            remote.clone(),
            host,
            tokens.clone(),
            ledger,
            synthesizer,
        ));
        let reconciler = Arc::new(ScrobbleReconciler::new(remote, tokens));
        Self {
            orchestrator,
            reconciler,
            settings: Arc::new(settings),
        }
    }

    /// Build the production wiring from a loaded configuration.
    pub async fn from_config(config: &ShelfConfig) -> anyhow::Result<Self> {
        let tokens = FileTokenStore::open(&config.simkl.token_file).await;
        if let Some(seed) = config.simkl.token.as_deref().filter(|t| !t.is_empty())
            && tokens.current().await.as_deref() != Some(seed)
        {
            info!(path = %tokens.path().display(), "Seeding user token from configuration");
            tokens.store(seed.to_string()).await;
        }

        let catalog = StubCatalog::discover_or_empty(&config.stubs.dir).await;
        info!(
            dir = %config.stubs.dir.display(),
            stubs = catalog.len(),
            "Stub catalog loaded"
        );

        let remote = SimklClient::new(&config.simkl.api_base, config.simkl.client_id.clone())
            .context("failed to build Simkl client")?;
        let host = ConfigLibraryHost::new(
            config.host.libraries.clone(),
            config.host.rescan_url.as_deref(),
            config.host.api_key.clone(),
        )
        .context("failed to build library host")?;

        Ok(Self::new(
            Arc::new(remote),
            Arc::new(host),
            Arc::new(tokens),
            Arc::new(PlaceholderLedger::new(&config.ledger.path)),
            StubSynthesizer::new(Arc::new(catalog)),
            config.import_settings(),
        ))
    }

    /// Import job configured from the schedule section.
    pub fn import_job(&self, config: &ShelfConfig) -> ImportJob {
        ImportJob::new(self.orchestrator.clone(), (*self.settings).clone()).with_rescan(
            config.schedule.rescan_after_import,
            config.schedule.rescan_delay,
        )
    }
}
