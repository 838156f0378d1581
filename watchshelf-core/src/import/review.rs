use tracing::{debug, error, info, warn};

use crate::catalog::WatchlistSnapshot;
use crate::ledger::PlaceholderLedger;
use crate::stubs::StubSynthesizer;

/// Replace placeholder stubs whose true runtime is now known and forget
/// entries whose file is gone. Only kinds that get stubs are reviewed; other
/// entries are left as they are. Returns how many stubs were upgraded.
///
/// Never fails: every problem is logged and the entry is left for the next
/// run.
pub(super) async fn review_placeholders(
    ledger: &PlaceholderLedger,
    synthesizer: &StubSynthesizer,
    snapshot: &WatchlistSnapshot,
) -> usize {
    let entries = ledger.list().await;
    if entries.is_empty() {
        return 0;
    }
    debug!(count = entries.len(), "Reviewing placeholder stubs");

    let mut upgraded = 0;
    for entry in entries {
        if !entry.kind.uses_stub() {
            warn!(
                simkl_id = entry.simkl_id,
                kind = %entry.kind,
                "Ignoring placeholder entry for a kind without stubs"
            );
            continue;
        }

        let exists = tokio::fs::try_exists(&entry.file_path)
            .await
            .unwrap_or(false);
        if !exists {
            debug!(
                simkl_id = entry.simkl_id,
                kind = %entry.kind,
                path = %entry.file_path.display(),
                "Placeholder file vanished, dropping ledger entry"
            );
            ledger.remove(entry.simkl_id, entry.kind).await;
            continue;
        }

        let Some(minutes) = snapshot
            .find(entry.kind, entry.simkl_id)
            .and_then(|record| record.true_runtime())
        else {
            continue;
        };

        if synthesizer.select_stub(minutes).is_none() {
            warn!(
                simkl_id = entry.simkl_id,
                runtime = minutes,
                "No stub available, keeping placeholder"
            );
            continue;
        }

        // The copy overwrites the placeholder in place.
        match synthesizer.materialize(&entry.file_path, minutes).await {
            Ok(stub) => {
                ledger.remove(entry.simkl_id, entry.kind).await;
                upgraded += 1;
                info!(
                    simkl_id = entry.simkl_id,
                    kind = %entry.kind,
                    runtime = minutes,
                    stub_minutes = stub.nominal_minutes,
                    "Upgraded placeholder stub"
                );
            }
            Err(err) => {
                error!(
                    simkl_id = entry.simkl_id,
                    path = %entry.file_path.display(),
                    "Failed to replace placeholder stub: {}", err
                );
            }
        }
    }
    upgraded
}
