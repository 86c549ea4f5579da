use std::env;
use std::path::PathBuf;

use bevy::prelude::*;
use idle_engine::{
    ActivityListing, GameService, PlayerId, PlayerStatus, ServiceResult, UpgradeListing,
    definitions_path,
};

#[derive(Resource, Debug, Clone)]
pub struct RuntimeConfig {
    pub definitions_path: PathBuf,
    pub save_dir: PathBuf,
    pub player_id: String,
    pub display_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            definitions_path: definitions_path(),
            save_dir: PathBuf::from("saves"),
            player_id: "local".to_string(),
            display_name: "Wanderer".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `IDLE_DEFINITIONS`, `IDLE_SAVE_DIR`, `IDLE_PLAYER`
    /// and `IDLE_NAME`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = env::var("IDLE_DEFINITIONS") {
            config.definitions_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("IDLE_SAVE_DIR") {
            config.save_dir = PathBuf::from(dir);
        }
        if let Ok(id) = env::var("IDLE_PLAYER") {
            config.player_id = id;
        }
        if let Ok(name) = env::var("IDLE_NAME") {
            config.display_name = name;
        }
        config
    }
}

#[derive(Resource)]
pub struct Session {
    pub service: GameService,
    pub player: PlayerId,
}

impl Session {
    /// Reconciles the player and collects everything the HUD shows.
    pub fn snapshot(&self, now: chrono::DateTime<chrono::Utc>) -> ServiceResult<Snapshot> {
        Ok(Snapshot {
            status: Some(self.service.observe(&self.player, now)?),
            activities: self.service.activity_board(&self.player)?,
            shop: self.service.shop(&self.player)?,
            message: String::new(),
        })
    }
}

#[derive(Resource, Debug, Default)]
pub struct Snapshot {
    pub status: Option<PlayerStatus>,
    pub activities: Vec<ActivityListing>,
    pub shop: Vec<UpgradeListing>,
    pub message: String,
}

/// Cursor into [`Snapshot::shop`].
#[derive(Resource, Debug, Default)]
pub struct SelectionState {
    pub index: usize,
}

impl SelectionState {
    pub fn step(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        let len = len as isize;
        self.index = (self.index as isize + delta).rem_euclid(len) as usize;
    }

    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }
}

#[derive(Resource, Debug, Clone)]
pub struct BootFailure(pub String);

#[derive(Event, Debug, Clone, Copy)]
pub enum PlayerAction {
    /// Zero-based slot on the activity board.
    SelectActivity(usize),
    StopActivity,
    CycleUpgrade(isize),
    BuySelected,
    Refresh,
}

#[derive(Component)]
pub struct HudText;
