//! Per-user activity tallies and ranking
//!
//! [`ActivityTally`] accumulates two counters per username (comments and
//! replies) and remembers the order in which usernames were first seen.
//! [`rank`] turns the counters into a [`Ranking`] that is sorted by total
//! activity, with ties kept in first-seen order.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Activity counters for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTally {
    /// Username
    pub username: String,
    /// Comments written inside the window
    pub primary_count: u64,
    /// Replies written on those comments
    pub secondary_count: u64,
}

impl UserTally {
    /// Comments plus replies
    pub fn total(&self) -> u64 {
        self.primary_count + self.secondary_count
    }
}

/// Users ordered by descending total, ties in first-seen order
pub type Ranking = Vec<UserTally>;

/// Aggregate counts that head a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Comments seen inside the window
    pub total_primary: u64,
    /// Replies fetched for those comments
    pub total_secondary: u64,
    /// Distinct users with any activity
    pub distinct_users: usize,
}

/// Tally shared between the page loop and reply workers
pub type SharedTally = Arc<Mutex<ActivityTally>>;

/// Running per-user counters for one collection run
#[derive(Debug, Clone, Default)]
pub struct ActivityTally {
    first_seen: Vec<String>,
    primary: HashMap<String, u64>,
    secondary: HashMap<String, u64>,
    total_primary: u64,
    total_secondary: u64,
}

impl ActivityTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tally wrapped for sharing
    pub fn shared() -> SharedTally {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Count one comment by `username`
    pub fn record_primary(&mut self, username: &str) {
        self.note_first_seen(username);
        *self.primary.entry(username.to_string()).or_insert(0) += 1;
        self.total_primary += 1;
    }

    /// Count one reply by `username`
    pub fn record_secondary(&mut self, username: &str) {
        self.note_first_seen(username);
        *self.secondary.entry(username.to_string()).or_insert(0) += 1;
        self.total_secondary += 1;
    }

    fn note_first_seen(&mut self, username: &str) {
        if !self.primary.contains_key(username) && !self.secondary.contains_key(username) {
            self.first_seen.push(username.to_string());
        }
    }

    /// Comment counts per user
    pub fn primary_counts(&self) -> &HashMap<String, u64> {
        &self.primary
    }

    /// Reply counts per user
    pub fn secondary_counts(&self) -> &HashMap<String, u64> {
        &self.secondary
    }

    /// Usernames in the order they were first counted
    pub fn first_seen(&self) -> &[String] {
        &self.first_seen
    }

    /// Comments counted so far
    pub fn total_primary(&self) -> u64 {
        self.total_primary
    }

    /// Replies counted so far
    pub fn total_secondary(&self) -> u64 {
        self.total_secondary
    }

    /// Distinct users counted so far
    pub fn distinct_users(&self) -> usize {
        self.first_seen.len()
    }

    /// Aggregate counts for the report header
    pub fn summary(&self) -> Summary {
        Summary {
            total_primary: self.total_primary,
            total_secondary: self.total_secondary,
            distinct_users: self.distinct_users(),
        }
    }

    /// Rank users by total activity
    pub fn ranking(&self) -> Ranking {
        rank(&self.primary, &self.secondary, &self.first_seen)
    }
}

/// Lock a shared tally, recovering the data if a holder panicked
pub fn lock_tally(tally: &SharedTally) -> MutexGuard<'_, ActivityTally> {
    tally.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Build a ranking from comment and reply counts
///
/// `order` gives the tie-break order. Usernames present in the maps but
/// missing from `order` follow it in lexicographic order so the result stays
/// deterministic. Users with a zero total are left out.
pub fn rank(
    primary: &HashMap<String, u64>,
    secondary: &HashMap<String, u64>,
    order: &[String],
) -> Ranking {
    let mut seen: HashSet<&str> = HashSet::with_capacity(order.len());
    let mut names: Vec<&str> = Vec::with_capacity(order.len());

    for name in order {
        let name = name.as_str();
        if (primary.contains_key(name) || secondary.contains_key(name)) && seen.insert(name) {
            names.push(name);
        }
    }

    let mut stragglers: Vec<&str> = primary
        .keys()
        .chain(secondary.keys())
        .map(String::as_str)
        .filter(|name| !seen.contains(name))
        .collect();
    stragglers.sort_unstable();
    stragglers.dedup();
    names.extend(stragglers);

    let mut ranking: Ranking = names
        .into_iter()
        .map(|name| UserTally {
            username: name.to_string(),
            primary_count: primary.get(name).copied().unwrap_or(0),
            secondary_count: secondary.get(name).copied().unwrap_or(0),
        })
        .filter(|tally| tally.total() > 0)
        .collect();

    // Vec::sort_by is stable, ties keep first-seen order
    ranking.sort_by(|a, b| b.total().cmp(&a.total()));
    ranking
}
