//! Background expiry sweep

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::store::SessionStore;

/// Spawns a task that sweeps `store` every `period`, independent of request traffic.
///
/// The first sweep runs one full period after spawning. Abort the handle to stop it.
pub fn spawn_sweeper(store: Arc<SessionStore>, period: Duration) -> JoinHandle<()> {
    info!(
        "Session sweeper started: interval={:?}, lifetime={:?}",
        period,
        store.lifetime()
    );

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() yields immediately on the first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.sweep();
            if removed.is_empty() {
                debug!("Session sweep: nothing to remove ({} active)", store.len());
            } else {
                info!("Session sweep removed {} expired sessions", removed.len());
            }
        }
    })
}
