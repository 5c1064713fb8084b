use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::ledger::Ledger;

const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Background task that compacts the reservation log once `threshold` appends
/// have accumulated since the last compaction.
pub async fn run_compactor(ledger: Arc<Ledger>, threshold: u64) {
    let mut interval = tokio::time::interval(CHECK_INTERVAL);
    loop {
        interval.tick().await;
        compact_if_needed(&ledger, threshold).await;
    }
}

/// Returns whether a compaction ran.
pub async fn compact_if_needed(ledger: &Ledger, threshold: u64) -> bool {
    let appends = ledger.wal_appends_since_compact().await;
    if appends < threshold {
        return false;
    }
    match ledger.compact_wal().await {
        Ok(()) => {
            info!("compacted reservation log after {appends} appends");
            true
        }
        Err(e) => {
            warn!("compaction failed: {e}");
            false
        }
    }
}
