//! Expiration Cleaner Task
//!
//! Background loop that wakes every cleaner interval, locks the table and
//! runs the expiration sampler against it until told to stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Builder;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::cache::{sample_expired, SharedTable};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Everything a cleaner loop needs, moved into the task.
pub(crate) struct CleanerContext {
    pub table: SharedTable,
    pub config: CacheConfig,
    pub running: Arc<AtomicU64>,
    pub generation: u64,
    pub stop_rx: watch::Receiver<bool>,
}

/// Clears the running generation when the loop ends, unless a newer loop
/// has already claimed it.
struct RunningGuard {
    running: Arc<AtomicU64>,
    generation: u64,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let _ = self.running.compare_exchange(
            self.generation,
            0,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Spawns the cleaner loop for `ctx` on a dedicated thread.
///
/// The thread drives its own current-thread runtime with timers enabled,
/// so the loop never depends on the drivers of whatever runtime the
/// caller happens to be in.
///
/// # Arguments
/// * `ctx` - Shared table, configuration, and the loop's running generation
///   and stop signal; the caller must already have published `ctx.generation`
///
/// # Returns
/// `Ok(())` once the thread is running, or the runtime/thread error.
pub(crate) fn spawn_cleaner(ctx: CleanerContext) -> Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CacheError::Runtime)?;

    thread::Builder::new()
        .name("active-cache-cleaner".to_string())
        .spawn(move || runtime.block_on(run_cleaner(ctx)))
        .map_err(CacheError::CleanerSpawn)?;

    Ok(())
}

/// Runs sweeps on every tick until the stop signal fires or its sender is
/// dropped.
async fn run_cleaner(ctx: CleanerContext) {
    let CleanerContext {
        table,
        config,
        running,
        generation,
        mut stop_rx,
    } = ctx;
    let _running = RunningGuard {
        running,
        generation,
    };

    let mut ticker = tokio::time::interval(config.cleaner_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first immediate tick - wait a full interval before sweeping
    ticker.tick().await;

    info!(
        "Starting cache cleaner with interval of {}ms, sampling {} entries per round",
        config.cleaner_interval_ms, config.sample_size_per_cycle
    );

    loop {
        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let report = {
                    let mut guard = table.lock();
                    sample_expired(&mut *guard, config.sample_size_per_cycle)
                };

                if report.removed > 0 {
                    debug!(
                        "Cache cleaner: removed {} expired entries over {} rounds ({} sampled)",
                        report.removed, report.rounds, report.sampled
                    );
                } else {
                    trace!("Cache cleaner: no expired entries found");
                }
            }
        }
    }

    info!("Cache cleaner stopped");
}
