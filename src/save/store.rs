use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::StoreError;
use crate::model::PlayerId;

use super::{PlayerSave, load_from_json_string, save_to_pretty_json_string};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable home for player records. A `save` replaces the whole record at once;
/// implementations must never leave a half-written player behind.
pub trait PlayerStore: Send + Sync {
    fn save(&self, save: &PlayerSave) -> StoreResult<()>;

    fn load(&self, id: &PlayerId) -> StoreResult<Option<PlayerSave>>;

    fn exists(&self, id: &PlayerId) -> bool;

    fn list_ids(&self) -> StoreResult<Vec<PlayerId>>;
}

/// Map-backed store for tests and throwaway sessions. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlayerStore {
    saves: Arc<RwLock<HashMap<PlayerId, PlayerSave>>>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn save(&self, save: &PlayerSave) -> StoreResult<()> {
        let mut saves = self.saves.write().map_err(|_| StoreError::LockPoisoned)?;
        saves.insert(save.player_id.clone(), save.clone());
        Ok(())
    }

    fn load(&self, id: &PlayerId) -> StoreResult<Option<PlayerSave>> {
        let saves = self.saves.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(saves.get(id).cloned())
    }

    fn exists(&self, id: &PlayerId) -> bool {
        self.saves
            .read()
            .map(|saves| saves.contains_key(id))
            .unwrap_or(false)
    }

    fn list_ids(&self) -> StoreResult<Vec<PlayerId>> {
        let saves = self.saves.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<PlayerId> = saves.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Ids keep `[A-Za-z0-9_-]` in file names; every other byte is percent-encoded.
const FILE_STEM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-');

/// One pretty-printed JSON file per player, `player_<id>.json`. Writes go to a
/// temp file that is renamed over the old record.
#[derive(Debug, Clone)]
pub struct JsonFilePlayerStore {
    base_dir: PathBuf,
}

impl JsonFilePlayerStore {
    pub fn new(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn player_path(&self, id: &PlayerId) -> PathBuf {
        let stem = utf8_percent_encode(id.as_str(), FILE_STEM);
        self.base_dir.join(format!("player_{stem}.json"))
    }
}

impl PlayerStore for JsonFilePlayerStore {
    fn save(&self, save: &PlayerSave) -> StoreResult<()> {
        let path = self.player_path(&save.player_id);
        let temp_path = path.with_extension("json.tmp");

        let json =
            save_to_pretty_json_string(save).map_err(|err| StoreError::Json(format!("{err:#}")))?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(player = %save.player_id, path = %path.display(), "saved player");
        Ok(())
    }

    fn load(&self, id: &PlayerId) -> StoreResult<Option<PlayerSave>> {
        let path = self.player_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let save =
            load_from_json_string(&json).map_err(|err| StoreError::Json(format!("{err:#}")))?;

        tracing::debug!(player = %id, path = %path.display(), "loaded player");
        Ok(Some(save))
    }

    fn exists(&self, id: &PlayerId) -> bool {
        self.player_path(id).exists()
    }

    fn list_ids(&self) -> StoreResult<Vec<PlayerId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|name| name.to_str())
                && let Some(stem) = filename
                    .strip_prefix("player_")
                    .and_then(|rest| rest.strip_suffix(".json"))
                && let Ok(raw) = percent_decode_str(stem).decode_utf8()
            {
                ids.push(PlayerId(raw.into_owned()));
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}
