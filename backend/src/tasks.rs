//! Background tasks
//!
//! Currently one task: the expiry reaper, which periodically sweeps expired
//! stock lots into waste records.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::config::ReaperConfig;
use crate::services::WasteService;

/// Spawn the periodic expiry reaper
///
/// The loop never exits on its own; a failed sweep is logged and retried at
/// the next tick.
pub fn spawn_expiry_reaper(db: PgPool, config: ReaperConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let service = WasteService::new(db);
        let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
        // First tick fires immediately; that initial sweep clears anything
        // that expired while the server was down.
        loop {
            ticker.tick().await;
            match service.sweep_expired(chrono::Utc::now()).await {
                Ok(outcome) if outcome.waste_records_created > 0 => {
                    tracing::info!(
                        reaped = outcome.waste_records_created,
                        "expiry reaper tick complete"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "expiry sweep failed, will retry next tick");
                }
            }
        }
    })
}
