//! Chained hash table mapping case-folded words to their exact-case variants
//!
//! Each bucket holds the word groups whose key hashes to it. A group collects
//! every casing seen for its key, and each casing keeps the ordered list of
//! (file, line) locations where it was found.

use crate::normalize::fold_case;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Bucket count of a freshly created index
pub const INITIAL_BUCKET_COUNT: usize = 100;

/// Items per bucket above which the table doubles
pub const MAX_LOAD_FACTOR: f64 = 0.7;

/// One line of one indexed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub file_index: u32,
    pub line_number: u32,
}

/// One exact-case spelling of a word and where it occurs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordVariant {
    text: String,
    occurrences: Vec<Occurrence>,
}

impl WordVariant {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            occurrences: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Occurrences in ingestion order
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Append unless it repeats the most recent occurrence
    fn record(&mut self, occurrence: Occurrence) {
        if self.occurrences.last() != Some(&occurrence) {
            self.occurrences.push(occurrence);
        }
    }
}

/// All variants sharing one case-folded key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGroup {
    key: String,
    variants: Vec<WordVariant>,
}

impl WordGroup {
    fn new(key: String) -> Self {
        Self {
            key,
            variants: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Variants in first-seen order
    pub fn variants(&self) -> &[WordVariant] {
        &self.variants
    }

    pub fn variant(&self, text: &str) -> Option<&WordVariant> {
        self.variants.iter().find(|v| v.text == text)
    }

    /// Find or create the variant for `text`; the flag is true when it is new
    fn variant_mut(&mut self, text: &str) -> (&mut WordVariant, bool) {
        match self.variants.iter().position(|v| v.text == text) {
            Some(pos) => (&mut self.variants[pos], false),
            None => {
                self.variants.push(WordVariant::new(text));
                let last = self.variants.len() - 1;
                (&mut self.variants[last], true)
            }
        }
    }
}

type Bucket = Vec<WordGroup>;

/// Summary of the table shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    pub bucket_count: usize,
    pub item_count: usize,
    pub group_count: usize,
    pub occurrence_count: usize,
    pub expansions: usize,
    pub load_factor: f64,
}

/// Word index keyed by case-folded word
#[derive(Debug, Clone)]
pub struct WordIndex {
    buckets: Vec<Bucket>,

    /// Distinct exact-case variants stored
    item_count: usize,

    /// Number of times the table has doubled
    expansions: usize,
}

impl Default for WordIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a case-folded key with FxHash
#[inline]
fn hash_key(key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    key.as_bytes().hash(&mut hasher);
    hasher.finish()
}

#[inline]
fn bucket_of(key: &str, bucket_count: usize) -> usize {
    (hash_key(key) % bucket_count as u64) as usize
}

impl WordIndex {
    pub fn new() -> Self {
        Self::with_buckets(INITIAL_BUCKET_COUNT)
    }

    /// Create an index with a chosen initial bucket count (at least one)
    pub fn with_buckets(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            buckets: vec![Vec::new(); bucket_count],
            item_count: 0,
            expansions: 0,
        }
    }

    /// Record that `word` occurs on `line_number` of file `file_index`
    pub fn insert(&mut self, word: &str, file_index: u32, line_number: u32) {
        let key = fold_case(word);
        let slot = bucket_of(&key, self.buckets.len());
        let bucket = &mut self.buckets[slot];

        let group = match bucket.iter().position(|g| g.key == key) {
            Some(pos) => &mut bucket[pos],
            None => {
                bucket.push(WordGroup::new(key));
                let last = bucket.len() - 1;
                &mut bucket[last]
            }
        };

        let (variant, created) = group.variant_mut(word);
        variant.record(Occurrence {
            file_index,
            line_number,
        });

        if created {
            self.item_count += 1;
        }

        if self.load_factor() > MAX_LOAD_FACTOR {
            self.expand();
        }
    }

    /// Find the variant spelled exactly like `word`
    pub fn lookup_exact(&self, word: &str) -> Option<&WordVariant> {
        self.lookup_group(word)?.variant(word)
    }

    /// Find the group holding every casing of `word`
    pub fn lookup_group(&self, word: &str) -> Option<&WordGroup> {
        let key = fold_case(word);
        let slot = bucket_of(&key, self.buckets.len());
        self.buckets[slot].iter().find(|g| g.key == key)
    }

    /// Double the bucket count and rehash every group into a fresh table
    fn expand(&mut self) {
        let new_count = self.buckets.len() * 2;
        let mut new_buckets: Vec<Bucket> = vec![Vec::new(); new_count];

        for group in std::mem::take(&mut self.buckets).into_iter().flatten() {
            let slot = bucket_of(&group.key, new_count);
            new_buckets[slot].push(group);
        }

        self.buckets = new_buckets;
        self.expansions += 1;

        debug!(
            buckets = new_count,
            items = self.item_count,
            "expanded word index"
        );
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn group_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn occurrence_count(&self) -> usize {
        self.groups()
            .flat_map(|g| g.variants.iter())
            .map(|v| v.occurrences.len())
            .sum()
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn load_factor(&self) -> f64 {
        self.item_count as f64 / self.buckets.len() as f64
    }

    /// Iterate over all groups, bucket by bucket
    pub fn groups(&self) -> impl Iterator<Item = &WordGroup> + '_ {
        self.buckets.iter().flatten()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            bucket_count: self.bucket_count(),
            item_count: self.item_count,
            group_count: self.group_count(),
            occurrence_count: self.occurrence_count(),
            expansions: self.expansions,
            load_factor: self.load_factor(),
        }
    }

    #[cfg(test)]
    fn bucket_invariant_holds(&self) -> bool {
        let count = self.buckets.len();
        self.buckets
            .iter()
            .enumerate()
            .all(|(slot, bucket)| bucket.iter().all(|g| bucket_of(&g.key, count) == slot))
    }
}
