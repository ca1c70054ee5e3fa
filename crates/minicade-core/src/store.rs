//! Persistent favorites, high scores, saved games and settings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::game_trait::GameSnapshot;
use crate::time::unix_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub sound: bool,
    pub music: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sound: true,
            music: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserData {
    pub favorites: Vec<String>,
    pub high_scores: BTreeMap<String, u32>,
    pub settings: UserSettings,
}

/// A snapshot stored on exit, stamped with unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub snapshot: GameSnapshot,
    pub timestamp: u64,
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Corrupt(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
            StoreError::Corrupt(e) => write!(f, "store data is corrupt: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Corrupt(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e)
    }
}

/// Storage keyed by opaque game id strings.
pub trait GameStore: Send {
    fn high_score(&self, game_id: &str) -> u32;

    /// Store `score` only if it beats the current best. Returns whether it did.
    fn update_high_score(&mut self, game_id: &str, score: u32) -> Result<bool, StoreError>;

    fn add_favorite(&mut self, game_id: &str) -> Result<(), StoreError>;

    fn remove_favorite(&mut self, game_id: &str) -> Result<(), StoreError>;

    fn is_favorite(&self, game_id: &str) -> bool;

    fn favorites(&self) -> Vec<String>;

    fn save_game(&mut self, game_id: &str, snapshot: &GameSnapshot) -> Result<(), StoreError>;

    fn load_game(&self, game_id: &str) -> Option<SavedGame>;

    fn settings(&self) -> UserSettings;

    fn set_settings(&mut self, settings: UserSettings) -> Result<(), StoreError>;
}

/// Everything a store holds; the on-disk JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoreData {
    user_data: UserData,
    game_saves: BTreeMap<String, SavedGame>,
}

impl StoreData {
    fn high_score(&self, game_id: &str) -> u32 {
        self.user_data.high_scores.get(game_id).copied().unwrap_or(0)
    }

    fn update_high_score(&mut self, game_id: &str, score: u32) -> bool {
        let best = self.user_data.high_scores.get(game_id).copied();
        if best.is_some_and(|b| score <= b) {
            return false;
        }
        self.user_data.high_scores.insert(game_id.to_string(), score);
        true
    }

    fn add_favorite(&mut self, game_id: &str) -> bool {
        if self.is_favorite(game_id) {
            return false;
        }
        self.user_data.favorites.push(game_id.to_string());
        true
    }

    fn remove_favorite(&mut self, game_id: &str) -> bool {
        let before = self.user_data.favorites.len();
        self.user_data.favorites.retain(|id| id != game_id);
        before != self.user_data.favorites.len()
    }

    fn is_favorite(&self, game_id: &str) -> bool {
        self.user_data.favorites.iter().any(|id| id == game_id)
    }

    fn save_game(&mut self, game_id: &str, snapshot: &GameSnapshot) {
        self.game_saves.insert(
            game_id.to_string(),
            SavedGame {
                snapshot: snapshot.clone(),
                timestamp: unix_millis(),
            },
        );
    }
}

/// In-process store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn high_score(&self, game_id: &str) -> u32 {
        self.data.high_score(game_id)
    }

    fn update_high_score(&mut self, game_id: &str, score: u32) -> Result<bool, StoreError> {
        Ok(self.data.update_high_score(game_id, score))
    }

    fn add_favorite(&mut self, game_id: &str) -> Result<(), StoreError> {
        self.data.add_favorite(game_id);
        Ok(())
    }

    fn remove_favorite(&mut self, game_id: &str) -> Result<(), StoreError> {
        self.data.remove_favorite(game_id);
        Ok(())
    }

    fn is_favorite(&self, game_id: &str) -> bool {
        self.data.is_favorite(game_id)
    }

    fn favorites(&self) -> Vec<String> {
        self.data.user_data.favorites.clone()
    }

    fn save_game(&mut self, game_id: &str, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        self.data.save_game(game_id, snapshot);
        Ok(())
    }

    fn load_game(&self, game_id: &str) -> Option<SavedGame> {
        self.data.game_saves.get(game_id).cloned()
    }

    fn settings(&self) -> UserSettings {
        self.data.user_data.settings
    }

    fn set_settings(&mut self, settings: UserSettings) -> Result<(), StoreError> {
        self.data.user_data.settings = settings;
        Ok(())
    }
}

/// JSON file store. Loaded once on open, written through on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonFileStore {
    /// Open `path`. A missing file starts empty; a corrupt one is logged and replaced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file is corrupt, starting fresh");
                    StoreData::default()
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no store file yet");
                StoreData::default()
            },
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy and write it out. Memory only takes the copy
    /// once it is on disk. `change` returns whether anything changed.
    fn commit(&mut self, change: impl FnOnce(&mut StoreData) -> bool) -> Result<bool, StoreError> {
        let mut next = self.data.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        self.persist(&next)?;
        self.data = next;
        Ok(true)
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl GameStore for JsonFileStore {
    fn high_score(&self, game_id: &str) -> u32 {
        self.data.high_score(game_id)
    }

    fn update_high_score(&mut self, game_id: &str, score: u32) -> Result<bool, StoreError> {
        self.commit(|data| data.update_high_score(game_id, score))
    }

    fn add_favorite(&mut self, game_id: &str) -> Result<(), StoreError> {
        self.commit(|data| data.add_favorite(game_id)).map(drop)
    }

    fn remove_favorite(&mut self, game_id: &str) -> Result<(), StoreError> {
        self.commit(|data| data.remove_favorite(game_id)).map(drop)
    }

    fn is_favorite(&self, game_id: &str) -> bool {
        self.data.is_favorite(game_id)
    }

    fn favorites(&self) -> Vec<String> {
        self.data.user_data.favorites.clone()
    }

    fn save_game(&mut self, game_id: &str, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        self.commit(|data| {
            data.save_game(game_id, snapshot);
            true
        })
        .map(drop)
    }

    fn load_game(&self, game_id: &str) -> Option<SavedGame> {
        self.data.game_saves.get(game_id).cloned()
    }

    fn settings(&self) -> UserSettings {
        self.data.user_data.settings
    }

    fn set_settings(&mut self, settings: UserSettings) -> Result<(), StoreError> {
        self.commit(|data| {
            data.user_data.settings = settings;
            true
        })
        .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("minicade-store-{}-{name}", std::process::id()))
            .join("store.json")
    }

    #[test]
    fn high_score_is_monotonic() {
        let mut store = MemoryStore::new();
        assert_eq!(store.high_score("arcade_001"), 0);
        assert!(store.update_high_score("arcade_001", 50).unwrap());
        assert!(!store.update_high_score("arcade_001", 30).unwrap());
        assert!(!store.update_high_score("arcade_001", 50).unwrap());
        assert_eq!(store.high_score("arcade_001"), 50);
        assert!(store.update_high_score("arcade_001", 51).unwrap());
        assert_eq!(store.high_score("arcade_001"), 51);
    }

    #[test]
    fn first_zero_score_is_recorded() {
        let mut store = MemoryStore::new();
        assert!(store.update_high_score("casual_005", 0).unwrap());
        assert_eq!(store.high_score("casual_005"), 0);
    }

    #[test]
    fn favorites_toggle() {
        let mut store = MemoryStore::new();
        store.add_favorite("chess_007").unwrap();
        store.add_favorite("chess_007").unwrap();
        assert_eq!(store.favorites(), vec!["chess_007".to_string()]);
        assert!(store.is_favorite("chess_007"));
        store.remove_favorite("chess_007").unwrap();
        assert!(!store.is_favorite("chess_007"));
    }

    #[test]
    fn saved_game_is_stamped() {
        let mut store = MemoryStore::new();
        let snap = GameSnapshot::new(12).with("lives", 1);
        store.save_game("arcade_003", &snap).unwrap();
        let saved = store.load_game("arcade_003").unwrap();
        assert_eq!(saved.snapshot, snap);
        assert!(saved.timestamp > 0);
        assert!(store.load_game("arcade_004").is_none());
    }

    #[test]
    fn file_store_round_trips_across_opens() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.update_high_score("puzzle_002", 90).unwrap();
            store.add_favorite("puzzle_002").unwrap();
            store
                .set_settings(UserSettings {
                    sound: false,
                    music: true,
                })
                .unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.high_score("puzzle_002"), 90);
        assert!(store.is_favorite("puzzle_002"));
        assert!(!store.settings().sound);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.high_score("arcade_001"), 0);
        store.update_high_score("arcade_001", 5).unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.high_score("arcade_001"), 5);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let path = temp_path("unwritable");
        let dir = path.parent().unwrap().to_path_buf();
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = JsonFileStore::open(&path).unwrap();
        store.update_high_score("arcade_001", 10).unwrap();

        // A plain file where the store directory should be.
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "blocker").unwrap();

        assert!(store.update_high_score("arcade_001", 99).is_err());
        assert_eq!(store.high_score("arcade_001"), 10);
        assert!(store.add_favorite("arcade_001").is_err());
        assert!(!store.is_favorite("arcade_001"));
        assert!(store.save_game("arcade_001", &GameSnapshot::new(7)).is_err());
        assert!(store.load_game("arcade_001").is_none());
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn on_disk_shape_uses_camel_case() {
        let mut data = StoreData::default();
        data.update_high_score("arcade_001", 3);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["userData"]["highScores"]["arcade_001"], 3);
        assert_eq!(json["userData"]["settings"]["sound"], true);
    }
}
