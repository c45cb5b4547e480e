//! Expiration Sampler Module
//!
//! Active expiration by random sampling. Each round inspects a bounded,
//! uniformly chosen subset of entries and deletes the expired ones. When
//! more than `EXPIRED_TOLERANCE_PERCENT` of a sample was expired, another
//! round runs immediately so bursts of expirations are reclaimed promptly.

use std::hash::BuildHasher;

use rand::seq::index;
use rand::Rng;
use tracing::trace;

use crate::cache::{Entry, HashTable};

/// Expired share of a sample, in percent, above which another round runs
pub const EXPIRED_TOLERANCE_PERCENT: usize = 25;

// == Sweep Report ==
/// Summary of one `sample_expired` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of sampling rounds that inspected at least one entry
    pub rounds: usize,
    /// Total entries inspected across all rounds
    pub sampled: usize,
    /// Total expired entries deleted across all rounds
    pub removed: usize,
}

/// Runs sampling rounds against `table` until one stays within tolerance
/// or the table is empty.
///
/// Each round samples `min(sample_size, table.len())` distinct entries.
/// The caller must hold exclusive access to the table for the whole call.
///
/// # Arguments
/// * `table` - The table to sweep
/// * `sample_size` - Upper bound on entries inspected per round
///
/// # Returns
/// A `SweepReport` totalling every round; all zeros for an empty table.
pub fn sample_expired<S: BuildHasher>(
    table: &mut HashTable<Entry, S>,
    sample_size: usize,
) -> SweepReport {
    let mut rng = rand::rng();
    let mut report = SweepReport::default();

    while let Some((sampled, removed)) = sample_round(table, sample_size, &mut rng) {
        report.rounds += 1;
        report.sampled += sampled;
        report.removed += removed;

        let expired_percentage = removed * 100 / sampled;
        trace!(
            "sampling round {}: {}/{} expired ({}%)",
            report.rounds,
            removed,
            sampled,
            expired_percentage
        );

        if expired_percentage <= EXPIRED_TOLERANCE_PERCENT {
            break;
        }
    }

    report
}

/// Samples once and deletes the expired entries found.
///
/// Returns `(sampled, removed)`, or `None` if there was nothing to sample.
fn sample_round<S, R>(
    table: &mut HashTable<Entry, S>,
    sample_size: usize,
    rng: &mut R,
) -> Option<(usize, usize)>
where
    S: BuildHasher,
    R: Rng + ?Sized,
{
    let (sampled, expired_keys) = {
        let records = table.get_all();
        let sampled = sample_size.min(records.len());
        if sampled == 0 {
            return None;
        }

        let expired_keys: Vec<Vec<u8>> = index::sample(rng, records.len(), sampled)
            .into_iter()
            .map(|i| records[i])
            .filter(|record| record.value().is_expired())
            .map(|record| record.key().to_vec())
            .collect();
        (sampled, expired_keys)
    };

    for key in &expired_keys {
        table.delete(key);
    }

    Some((sampled, expired_keys.len()))
}
