use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::{ImportOrchestrator, ImportResult, ImportSettings};

/// Sink for coarse progress updates, in percent.
pub trait ImportProgress: Send + Sync {
    fn report(&self, percent: f64);
}

impl<F> ImportProgress for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// Scheduled import: one orchestrator run followed by an optional delayed
/// library rescan.
#[derive(Debug, Clone)]
pub struct ImportJob {
    orchestrator: Arc<ImportOrchestrator>,
    settings: ImportSettings,
    rescan_after_import: bool,
    rescan_delay: Duration,
}

impl ImportJob {
    pub const DEFAULT_RESCAN_DELAY: Duration = Duration::from_secs(60);

    pub fn new(orchestrator: Arc<ImportOrchestrator>, settings: ImportSettings) -> Self {
        Self {
            orchestrator,
            settings,
            rescan_after_import: true,
            rescan_delay: Self::DEFAULT_RESCAN_DELAY,
        }
    }

    pub fn with_rescan(mut self, enabled: bool, delay: Duration) -> Self {
        self.rescan_after_import = enabled;
        self.rescan_delay = delay;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Returns `None` when the job had nothing to do (no token or no
    /// destination), otherwise the import result.
    pub async fn run(
        &self,
        progress: &dyn ImportProgress,
        cancel: &CancellationToken,
    ) -> Option<ImportResult> {
        if self.orchestrator.tokens().current().await.is_none() {
            info!("No user token configured, skipping scheduled import");
            progress.report(100.0);
            return None;
        }
        if self
            .orchestrator
            .resolve_destinations(&self.settings)
            .await
            .is_empty()
        {
            warn!("No destination library configured, skipping scheduled import");
            progress.report(100.0);
            return None;
        }

        let result = self
            .orchestrator
            .import_with(&self.settings, cancel, progress)
            .await;
        if result.success {
            info!(
                created = result.total_created(),
                files_copied = result.total_files_copied(),
                errors = result.total_errors(),
                "Scheduled import finished"
            );
        } else {
            error!(
                error = result.error.as_deref().unwrap_or("unknown"),
                "Scheduled import failed"
            );
        }

        if result.success && self.rescan_after_import {
            self.rescan(cancel).await;
        }

        progress.report(100.0);
        Some(result)
    }

    async fn rescan(&self, cancel: &CancellationToken) {
        info!(delay = ?self.rescan_delay, "Waiting before library rescan");
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Library rescan cancelled");
                return;
            }
            _ = tokio::time::sleep(self.rescan_delay) => {}
        }

        match self.orchestrator.host().request_library_rescan(cancel).await {
            Ok(()) => info!("Requested library rescan"),
            Err(err) => error!("Library rescan failed: {}", err),
        }
    }
}
