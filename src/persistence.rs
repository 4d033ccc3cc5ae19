//! Best-effort JSON persistence for per-game statistics
//!
//! Storage never blocks play: a missing or corrupt file loads as empty
//! stats, and a failed save is logged and dropped. The in-memory map stays
//! authoritative either way.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::stats::{GameId, GameStats};

pub type StatsMap = BTreeMap<GameId, GameStats>;

pub trait StatsStore: Send {
    fn load(&self) -> StatsMap;
    fn save(&self, stats: &StatsMap);
}

/// Stats persisted as pretty-printed JSON keyed by game id.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> StatsMap {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return StatsMap::new(),
            Err(err) => {
                log::warn!("failed to read {}: {err}", self.path.display());
                return StatsMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(stats) => stats,
            Err(err) => {
                log::warn!("discarding corrupt stats in {}: {err}", self.path.display());
                StatsMap::new()
            }
        }
    }

    fn save(&self, stats: &StatsMap) {
        let json = match serde_json::to_string_pretty(stats) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("failed to encode stats: {err}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::warn!("failed to create {}: {err}", parent.display());
                return;
            }
        }
        if let Err(err) = fs::write(&self.path, json) {
            log::warn!("failed to write {}: {err}", self.path.display());
        }
    }
}

/// In-memory store; clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore(Arc<Mutex<StatsMap>>);

impl StatsStore for MemoryStore {
    fn load(&self) -> StatsMap {
        self.0.lock().map(|map| map.clone()).unwrap_or_default()
    }

    fn save(&self, stats: &StatsMap) {
        if let Ok(mut map) = self.0.lock() {
            *map = stats.clone();
        }
    }
}
