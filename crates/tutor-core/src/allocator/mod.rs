//! Non-repeating practice allocation.
//!
//! Each memory key remembers which entries it has already handed out. A key
//! never sees the same entry twice until its whole pool has been shown, after
//! which its history is cleared and the cycle starts again (a soft reset).

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key used when neither subject nor topic is known.
pub const GENERAL_KEY: &str = "General";

/// A practice question and its hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemEntry {
    pub question: String,
    pub hint: String,
}

impl ProblemEntry {
    pub fn new(question: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            hint: hint.into(),
        }
    }
}

/// A non-empty, ordered set of candidate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPool {
    entries: Vec<ProblemEntry>,
}

impl ProblemPool {
    /// Returns `None` for an empty vector.
    pub fn new(entries: Vec<ProblemEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn single(entry: ProblemEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    pub fn entries(&self) -> &[ProblemEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, entry: &ProblemEntry) -> bool {
        self.entries.contains(entry)
    }
}

/// Partition key for non-repeat history.
///
/// `subject|topic` when a subject is known, otherwise the topic, otherwise
/// [`GENERAL_KEY`]. Empty strings count as absent.
pub fn memory_key(subject: Option<&str>, topic: Option<&str>) -> String {
    let subject = subject.filter(|s| !s.is_empty());
    let topic = topic.filter(|t| !t.is_empty());
    match (subject, topic) {
        (Some(subject), topic) => format!("{subject}|{}", topic.unwrap_or("None")),
        (None, Some(topic)) => topic.to_string(),
        (None, None) => GENERAL_KEY.to_string(),
    }
}

/// Entries already dispensed, per memory key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocatorMemory {
    given: BTreeMap<String, Vec<ProblemEntry>>,
}

impl AllocatorMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries already shown under `key`, oldest first.
    pub fn used(&self, key: &str) -> &[ProblemEntry] {
        self.given.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.given.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.given.values().all(Vec::is_empty)
    }

    /// Total number of remembered entries across all keys.
    pub fn total(&self) -> usize {
        self.given.values().map(Vec::len).sum()
    }

    /// Record `entry` under `key` unless it is already there.
    pub fn record(&mut self, key: &str, entry: ProblemEntry) {
        let used = self.given.entry(key.to_string()).or_default();
        if !used.contains(&entry) {
            used.push(entry);
        }
    }

    /// Forget everything recorded under `key`.
    pub fn reset(&mut self, key: &str) {
        if let Some(used) = self.given.get_mut(key) {
            used.clear();
        }
    }

    /// Union `other` into `self`, per key.
    ///
    /// Existing entries keep their order; entries only `other` knows about
    /// are appended in `other`'s order. Nothing already recorded is dropped.
    pub fn merge(&mut self, other: &AllocatorMemory) {
        for (key, incoming) in &other.given {
            let existing = self.given.entry(key.clone()).or_default();
            for entry in incoming {
                if !existing.contains(entry) {
                    existing.push(entry.clone());
                }
            }
        }
    }
}

/// Pick an entry for `key` that has not been shown yet.
///
/// When every pool entry has already been shown the key is reset first, so
/// exhaustion never fails. A single-entry pool therefore returns the same
/// entry on every call.
pub fn allocate<R: Rng + ?Sized>(
    key: &str,
    pool: &ProblemPool,
    mut memory: AllocatorMemory,
    rng: &mut R,
) -> (ProblemEntry, AllocatorMemory) {
    let mut remaining: Vec<&ProblemEntry> = {
        let used = memory.used(key);
        pool.entries().iter().filter(|p| !used.contains(p)).collect()
    };

    if remaining.is_empty() {
        debug!(key, pool_size = pool.len(), "problem pool exhausted, starting a new cycle");
        memory.reset(key);
        remaining = pool.entries().iter().collect();
    }

    // `remaining` is non-empty: pools cannot be constructed empty.
    let chosen = match remaining.choose(rng) {
        Some(entry) => (*entry).clone(),
        None => pool.entries[0].clone(),
    };
    memory.record(key, chosen.clone());
    debug!(key, used = memory.used(key).len(), "allocated practice entry");

    (chosen, memory)
}
