//! Score persistence: local top-5 store, remote boundary, and the adapter
//! that records a finished game to both
//!
//! Local entries live in a string-keyed store under `leaderboard:<mode>`;
//! Classic sorts descending (higher is better), Precision and Endurance
//! ascending. Remote persistence is best-effort: a failed save degrades to
//! "saved locally", a failed fetch to an empty list, and neither ever
//! raises past the adapter.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use tracing::warn;

use crate::types::{Entry, GameMode, RemoteRecord, StoreError};
use crate::LEADERBOARD_CAPACITY;

/// Store key for the endurance cosmetic reward flag
const REWARD_KEY: &str = "theme:purple";

/// String-keyed storage boundary (the localStorage analogue)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// File-backed store: one file per key under a data directory
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // keys use ':' as a namespace separator; keep filenames portable
        self.dir.join(format!("{}.json", key.replace(':', "_")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|_| StoreError::WriteFailed)?;
        fs::write(self.path_for(key), value).map_err(|_| StoreError::WriteFailed)
    }
}

/// In-memory store for tests and the HTTP service
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Local top-5 leaderboard over a string-keyed store
#[derive(Debug)]
pub struct LocalLeaderboard<S> {
    store: S,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(mode: GameMode) -> String {
        format!("leaderboard:{}", mode.storage_key())
    }

    /// Stored top entries for a mode. Legacy bare-number records are
    /// upgraded on read; an unreadable store reads as empty.
    pub fn top(&self, mode: GameMode) -> Vec<Entry> {
        let Some(raw) = self.store.get(&Self::key(mode)) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%mode, %err, "unreadable leaderboard data, starting empty");
                Vec::new()
            }
        }
    }

    /// Append a score, re-sort per mode order, truncate to capacity, persist
    pub fn save(&mut self, mode: GameMode, score: f64, name: &str) -> Result<(), StoreError> {
        let mut entries = self.top(mode);
        entries.push(Entry::new(Entry::normalize_name(name), score));

        entries.sort_by(|a, b| {
            let ord = a
                .score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal);
            if mode.higher_is_better() {
                ord.reverse()
            } else {
                ord
            }
        });
        entries.truncate(LEADERBOARD_CAPACITY);

        let json = serde_json::to_string(&entries).map_err(|_| StoreError::SerializeFailed)?;
        self.store.set(&Self::key(mode), &json)
    }

    /// Has the endurance cosmetic reward been unlocked on this device?
    pub fn reward_unlocked(&self) -> bool {
        self.store.get(REWARD_KEY).as_deref() == Some("true")
    }

    pub fn unlock_reward(&mut self) -> Result<(), StoreError> {
        self.store.set(REWARD_KEY, "true")
    }
}

/// Remote leaderboard boundary (per-mode document collections)
#[allow(async_fn_in_trait)]
pub trait RemoteLeaderboard {
    /// Append a score document. Best-effort: returns false on any failure.
    async fn save(&self, mode: GameMode, score: f64, name: &str) -> bool;

    /// Top entries ordered per mode. Returns an empty list on any failure.
    async fn fetch_top(&self, mode: GameMode, count: usize) -> Vec<Entry>;
}

/// In-process remote store, used by the HTTP service and by tests.
/// `set_failing(true)` simulates an unreachable backend.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    collections: Mutex<HashMap<GameMode, Vec<RemoteRecord>>>,
    failing: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl RemoteLeaderboard for MemoryRemote {
    async fn save(&self, mode: GameMode, score: f64, name: &str) -> bool {
        if self.failing.load(Ordering::SeqCst) {
            return false;
        }
        let mut collections = self.collections.lock().expect("remote store poisoned");
        collections.entry(mode).or_default().push(RemoteRecord {
            name: Entry::normalize_name(name),
            score,
            timestamp: Utc::now(),
        });
        true
    }

    async fn fetch_top(&self, mode: GameMode, count: usize) -> Vec<Entry> {
        if self.failing.load(Ordering::SeqCst) {
            return Vec::new();
        }
        let collections = self.collections.lock().expect("remote store poisoned");
        let mut records: Vec<RemoteRecord> =
            collections.get(&mode).cloned().unwrap_or_default();
        records.sort_by(|a, b| {
            let ord = a
                .score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal);
            if mode.higher_is_better() {
                ord.reverse()
            } else {
                ord
            }
        });
        records.truncate(count);
        records.iter().map(RemoteRecord::entry).collect()
    }
}

/// Translates a finished game's outcome into persisted local and remote
/// leaderboard entries
#[derive(Debug)]
pub struct ScoreAdapter<S, R> {
    local: LocalLeaderboard<S>,
    remote: R,
}

impl<S: KeyValueStore, R: RemoteLeaderboard> ScoreAdapter<S, R> {
    pub fn new(local: LocalLeaderboard<S>, remote: R) -> Self {
        Self { local, remote }
    }

    pub fn record_local(&mut self, mode: GameMode, score: f64, name: &str) -> Result<(), StoreError> {
        self.local.save(mode, score, name)
    }

    pub fn local_top(&self, mode: GameMode) -> Vec<Entry> {
        self.local.top(mode)
    }

    /// Best-effort remote save; callers fall back to "saved locally"
    /// messaging when this returns false
    pub async fn record_remote(&self, mode: GameMode, score: f64, name: &str) -> bool {
        self.remote.save(mode, score, name).await
    }

    pub async fn fetch_remote_top(&self, mode: GameMode, count: usize) -> Vec<Entry> {
        self.remote.fetch_top(mode, count).await
    }

    pub fn local(&self) -> &LocalLeaderboard<S> {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut LocalLeaderboard<S> {
        &mut self.local
    }
}

// =============================================================================
// TESTS
// =============================================================================
