//! Cache Store Module
//!
//! The public cache facade: a single hash table behind one mutex, read and
//! written by callers and swept by a background cleaner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::cache::{sample_expired, Entry, HashTable, SweepReport, Ttl};
use crate::config::CacheConfig;
use crate::tasks::{spawn_cleaner, CleanerContext};

/// Table shared between the facade and its cleaner.
pub(crate) type SharedTable = Arc<Mutex<HashTable<Entry>>>;

/// Stop signal and generation of the most recently started cleaner loop.
#[derive(Debug, Default)]
struct CleanerSlot {
    stop_tx: Option<watch::Sender<bool>>,
    generation: u64,
}

// == Cache ==
/// In-memory key/value cache with hybrid lazy and active expiration.
///
/// Reads never return an expired value. A background cleaner, started on
/// construction, periodically samples the table and deletes expired
/// entries. The empty key is treated as "no key": it is never stored and
/// always misses.
///
/// Dropping the cache stops its cleaner.
pub struct Cache {
    /// Entry storage, guarded for every access including reads
    table: SharedTable,
    /// Effective (normalized) configuration
    config: CacheConfig,
    /// Generation of the live cleaner loop, 0 when none is running
    running: Arc<AtomicU64>,
    /// Lifecycle state, separate from the table lock
    cleaner: Mutex<CleanerSlot>,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache with the default configuration and starts its cleaner.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with `config` and starts its cleaner.
    ///
    /// Values below their minimums are replaced by the defaults.
    pub fn with_config(config: CacheConfig) -> Self {
        let cache = Self {
            table: Arc::new(Mutex::new(HashTable::new())),
            config: config.normalized(),
            running: Arc::new(AtomicU64::new(0)),
            cleaner: Mutex::new(CleanerSlot::default()),
        };
        cache.start_cleaner();
        cache
    }

    // == Get ==
    /// Returns the value and TTL stored under `key`.
    ///
    /// A zero TTL in the result means the entry never expires. Missing,
    /// expired and empty keys all yield `(None, Duration::ZERO)`.
    pub fn get(&self, key: &[u8]) -> (Option<Bytes>, Duration) {
        if key.is_empty() {
            return (None, Duration::ZERO);
        }

        let table = self.table.lock();
        match table.get(key) {
            Some(entry) => entry.value_and_ttl(),
            None => (None, Duration::ZERO),
        }
    }

    // == Set ==
    /// Stores `value` under `key` with the given TTL.
    ///
    /// `Ttl::Expire` deletes any existing entry instead of storing one. An
    /// existing entry is replaced wholesale, TTL included. Empty keys are
    /// ignored.
    ///
    /// # Arguments
    /// * `key` - The key to store; empty means "no key"
    /// * `value` - The payload to store
    /// * `ttl` - A `Ttl`, or a `Duration` where zero means no expiration
    pub fn set(&self, key: &[u8], value: impl Into<Bytes>, ttl: impl Into<Ttl>) {
        if key.is_empty() {
            return;
        }

        let ttl = ttl.into();
        let mut table = self.table.lock();
        match ttl {
            Ttl::Expire => {
                table.delete(key);
            }
            Ttl::NoExpiration => table.put(key, Entry::new(value.into(), Duration::ZERO)),
            Ttl::After(ttl) => table.put(key, Entry::new(value.into(), ttl)),
        }
    }

    // == Delete ==
    /// Removes `key`. Returns true if an entry was present, expired or not.
    pub fn delete(&self, key: &[u8]) -> bool {
        if key.is_empty() {
            return false;
        }
        self.table.lock().delete(key).is_some()
    }

    // == Clean Now ==
    /// Runs one sampling sweep immediately, outside the cleaner schedule.
    pub fn clean_now(&self) -> SweepReport {
        let mut table = self.table.lock();
        sample_expired(&mut *table, self.config.sample_size_per_cycle)
    }

    // == Cleaner Lifecycle ==
    /// Starts the background cleaner. No-op if it is already running.
    ///
    /// A loop that was asked to stop but has not exited yet does not count
    /// as running: a new loop is started alongside it and the old one winds
    /// down on its own. A cleaner that cannot be started is logged and left
    /// not running.
    pub fn start_cleaner(&self) {
        let mut slot = self.cleaner.lock();
        if slot.stop_tx.is_some() && self.running.load(Ordering::Acquire) == slot.generation {
            return;
        }

        slot.generation += 1;
        let generation = slot.generation;
        let (tx, rx) = watch::channel(false);
        self.running.store(generation, Ordering::Release);

        let ctx = CleanerContext {
            table: Arc::clone(&self.table),
            config: self.config,
            running: Arc::clone(&self.running),
            generation,
            stop_rx: rx,
        };

        match spawn_cleaner(ctx) {
            Ok(()) => slot.stop_tx = Some(tx),
            Err(e) => {
                let _ = self.running.compare_exchange(
                    generation,
                    0,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                slot.stop_tx = None;
                error!("Failed to start cache cleaner: {}", e);
            }
        }
    }

    /// Signals the background cleaner to stop. No-op if it is not running.
    ///
    /// The cleaner observes the signal at its next wakeup; a sweep already
    /// in progress completes first.
    pub fn stop_cleaner(&self) {
        if let Some(tx) = self.cleaner.lock().stop_tx.take() {
            // The loop may already be gone, in which case there is no receiver
            let _ = tx.send(true);
            debug!("Cache cleaner stop requested");
        }
    }

    /// Reports whether a background cleaner loop is alive.
    ///
    /// Reads an atomic only; never waits on the table or lifecycle locks.
    pub fn is_cleaner_running(&self) -> bool {
        self.running.load(Ordering::Acquire) != 0
    }

    // == Accessors ==
    /// Returns the effective configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the number of stored entries, including expired ones not yet
    /// reclaimed.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        self.stop_cleaner();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    /// Cache with its cleaner stopped, so only lazy expiration applies.
    fn idle_cache() -> Cache {
        let cache = Cache::new();
        cache.stop_cleaner();
        cache
    }

    #[test]
    fn test_cache_new() {
        let cache = Cache::new();
        assert!(cache.is_empty());
        assert!(cache.is_cleaner_running());
        assert_eq!(*cache.config(), CacheConfig::default());
    }

    #[test]
    fn test_with_config_normalizes() {
        let cache = Cache::with_config(CacheConfig {
            cleaner_interval_ms: 0,
            sample_size_per_cycle: 1,
        });
        assert_eq!(cache.config().cleaner_interval_ms, 200);
        assert_eq!(cache.config().sample_size_per_cycle, 20);
    }

    #[test]
    fn test_set_and_get_no_expiration() {
        let cache = idle_cache();

        cache.set(b"lorem", &b"ipsum"[..], Ttl::NoExpiration);
        let (value, ttl) = cache.get(b"lorem");

        assert_eq!(value.as_deref(), Some(&b"ipsum"[..]));
        assert_eq!(ttl, Duration::ZERO);
    }

    #[test]
    fn test_get_nonexistent() {
        let cache = idle_cache();
        assert_eq!(cache.get(b"nonexistent key"), (None, Duration::ZERO));
    }

    #[test]
    fn test_set_overwrite_replaces_value_and_ttl() {
        let cache = idle_cache();

        cache.set(b"lorem", &b"ipsum"[..], Ttl::NoExpiration);
        cache.set(b"lorem", &b"dolor"[..], Duration::from_secs(10));

        let (value, ttl) = cache.get(b"lorem");
        assert_eq!(value.as_deref(), Some(&b"dolor"[..]));
        assert_eq!(ttl, Duration::from_secs(10));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_key_is_never_stored() {
        let cache = idle_cache();

        cache.set(b"", &b"doe"[..], Duration::from_secs(1));

        assert!(cache.is_empty());
        assert_eq!(cache.get(b""), (None, Duration::ZERO));
        assert!(!cache.delete(b""));
    }

    #[test]
    fn test_negative_ttl_deletes() {
        let cache = idle_cache();

        cache.set(b"jane", &b"foster"[..], Duration::from_secs(1));
        cache.set(b"jane", &b"thor"[..], Ttl::from_millis(-100));

        assert_eq!(cache.get(b"jane"), (None, Duration::ZERO));
        assert!(cache.is_empty());

        // Never stored in the first place
        cache.set(b"john", &b"doe"[..], Ttl::Expire);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lazy_expiration_without_cleaner() {
        let cache = idle_cache();

        cache.set(b"key", &b"value"[..], Duration::from_millis(50));
        assert_eq!(cache.get(b"key").1, Duration::from_millis(50));

        sleep(Duration::from_millis(80));

        // Still stored, but hidden from readers
        assert_eq!(cache.get(b"key"), (None, Duration::ZERO));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete() {
        let cache = idle_cache();

        cache.set(b"key", &b"value"[..], Ttl::NoExpiration);
        assert!(cache.delete(b"key"));
        assert!(!cache.delete(b"key"));
        assert_eq!(cache.get(b"key"), (None, Duration::ZERO));
    }

    #[test]
    fn test_clean_now_reclaims_expired() {
        let cache = idle_cache();

        for i in 0..10 {
            cache.set(format!("temp:{i}").as_bytes(), &b"gone"[..], Duration::from_millis(10));
        }
        cache.set(b"keep", &b"stay"[..], Ttl::NoExpiration);

        sleep(Duration::from_millis(30));

        // Sample size 20 covers all 11 entries
        let report = cache.clean_now();
        assert_eq!(report.removed, 10);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(b"keep").0.is_some());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let cache = Cache::new();
        cache.stop_cleaner();
        cache.stop_cleaner();

        let cache = idle_cache();
        cache.stop_cleaner();
    }

    #[test]
    fn test_restart_right_after_stop_keeps_cleaner_running() {
        let cache = Cache::with_config(CacheConfig::default().with_cleaner_interval_ms(50));

        for _ in 0..10 {
            sleep(Duration::from_millis(5));
            cache.stop_cleaner();
            cache.start_cleaner();
        }

        // The stopped loops wind down without clearing the new loop's state
        sleep(Duration::from_millis(150));
        assert!(cache.is_cleaner_running());

        cache.set(b"key", &b"value"[..], Duration::from_millis(10));
        sleep(Duration::from_millis(300));
        assert!(cache.is_empty(), "Restarted cleaner should reap expired entries");
    }

    #[test]
    fn test_start_while_running_keeps_generation() {
        let cache = Cache::new();
        let generation = cache.running.load(Ordering::Acquire);

        cache.start_cleaner();

        assert_eq!(cache.running.load(Ordering::Acquire), generation);
        assert_eq!(cache.cleaner.lock().generation, generation);
    }

    #[test]
    fn test_lifecycle_does_not_wait_on_table_lock() {
        let cache = Cache::new();
        let _table = cache.table.lock();

        assert!(cache.is_cleaner_running());
        cache.stop_cleaner();
        cache.start_cleaner();
        assert!(cache.is_cleaner_running());
    }
}
