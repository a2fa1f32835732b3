//! Periodic fleet-summary refresh.
//!
//! The dashboard-facing summary is recomputed on a fixed period rather than
//! on every read. The task is lifecycle-scoped: `main` owns the returned
//! handle and aborts it on teardown, so no timer state outlives the server.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::{stats, store};

// ---

/// Spawn the repeating refresh task.
///
/// The first refresh runs immediately, then once per `period`. A failed
/// refresh is logged and retried on the next tick; the task itself never
/// exits on its own.
pub fn spawn(pool: PgPool, period: Duration) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = refresh_once(&pool).await {
                warn!("fleet summary refresh failed: {}", e);
            }
        }
    })
}

/// List, aggregate, persist. One full pass over the reading set.
async fn refresh_once(pool: &PgPool) -> AppResult<()> {
    // ---
    let readings = store::list(pool, None).await?;
    let normalized: Vec<_> = readings.iter().map(|r| r.to_normalized()).collect();

    let fleet = stats::aggregate(&normalized);
    store::save_summary(pool, &fleet).await?;

    debug!(
        "fleet summary refreshed: {} readings, mean AQI {}",
        fleet.reading_count, fleet.mean_aqi
    );
    Ok(())
}
