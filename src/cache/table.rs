//! Hash Table Module
//!
//! Fixed-size bucketed table keyed by byte strings. Each bucket is an
//! ordered list scanned linearly; the table never resizes.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

// == Public Constants ==
/// Number of buckets in every table
pub const BUCKET_COUNT: usize = 10;

// == Record ==
/// One stored key/value pair together with the key's hash.
#[derive(Debug, Clone)]
pub struct Record<V> {
    hash: u64,
    key: Box<[u8]>,
    value: V,
}

impl<V> Record<V> {
    /// The hash computed for `key` when the record was inserted.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

// == Hash Table ==
/// Bucketed associative container mapping byte-string keys to `V`.
///
/// A key lives in bucket `hash(key) % BUCKET_COUNT`. Records within a
/// bucket match on both the stored hash and the exact key bytes, so two
/// keys with the same hash never alias.
#[derive(Debug)]
pub struct HashTable<V, S = RandomState> {
    buckets: [Vec<Record<V>>; BUCKET_COUNT],
    hasher: S,
    len: usize,
}

impl<V> HashTable<V> {
    /// Creates an empty table with a randomly seeded hasher.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S: BuildHasher> HashTable<V, S> {
    /// Creates an empty table using `hasher` for every key.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            buckets: std::array::from_fn(|_| Vec::new()),
            hasher,
            len: 0,
        }
    }

    fn hash_key(&self, key: &[u8]) -> u64 {
        self.hasher.hash_one(key)
    }

    fn bucket_index(hash: u64) -> usize {
        (hash % BUCKET_COUNT as u64) as usize
    }

    /// Hashes `key` and finds its bucket and position within the bucket.
    fn locate(&self, key: &[u8]) -> (u64, usize, Option<usize>) {
        let hash = self.hash_key(key);
        let bucket = Self::bucket_index(hash);
        let position = self.buckets[bucket]
            .iter()
            .position(|record| record.hash == hash && *record.key == *key);
        (hash, bucket, position)
    }

    // == Put ==
    /// Stores `value` under `key`, overwriting any existing value in place.
    pub fn put(&mut self, key: &[u8], value: V) {
        let (hash, bucket, position) = self.locate(key);
        match position {
            Some(i) => self.buckets[bucket][i].value = value,
            None => {
                self.buckets[bucket].push(Record {
                    hash,
                    key: key.into(),
                    value,
                });
                self.len += 1;
            }
        }
    }

    // == Get ==
    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let (_, bucket, position) = self.locate(key);
        position.map(|i| &self.buckets[bucket][i].value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes `key`, keeping the remaining records of its bucket in order.
    ///
    /// Returns the removed value, or `None` if the key was absent.
    pub fn delete(&mut self, key: &[u8]) -> Option<V> {
        let (_, bucket, position) = self.locate(key);
        let i = position?;
        self.len -= 1;
        Some(self.buckets[bucket].remove(i).value)
    }

    // == Get All ==
    /// Returns every record, bucket by bucket.
    ///
    /// Order across buckets is unspecified; order within a bucket is
    /// insertion order. An empty table yields an empty vector.
    pub fn get_all(&self) -> Vec<&Record<V>> {
        self.buckets.iter().flatten().collect()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
