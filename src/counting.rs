//! Frequency tables: the mergeable key -> count reducer behind every question.

use crate::topk::top_k;
use ahash::RandomState;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Debug)]
pub struct FrequencyTable<K> {
    counts: HashMap<K, u64, RandomState>,
}

impl<K: Hash + Eq> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self { counts: HashMap::default() }
    }
}

impl<K: Hash + Eq> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Count a borrowed key, allocating an owned copy only the first time it is seen.
    #[inline]
    pub fn add_ref<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        match self.counts.get_mut(key) {
            Some(c) => *c += 1,
            None => {
                self.counts.insert(key.to_owned(), 1);
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Fold `other` into `self`; the larger map absorbs the smaller.
    pub fn merge(&mut self, mut other: Self) {
        if other.counts.len() > self.counts.len() {
            std::mem::swap(&mut self.counts, &mut other.counts);
        }
        for (k, v) in other.counts {
            *self.counts.entry(k).or_insert(0) += v;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> + '_ {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    /// Best `k` entries, count descending then key ascending.
    pub fn top_k(&self, k: usize) -> Vec<(K, u64)>
    where
        K: Ord + Clone,
    {
        top_k(self.iter(), k)
            .into_iter()
            .map(|(key, c)| (key.clone(), c))
            .collect()
    }
}

impl<K: Hash + Eq> IntoIterator for FrequencyTable<K> {
    type Item = (K, u64);
    type IntoIter = std::collections::hash_map::IntoIter<K, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}
