use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ActivityId, CurrencyId, OwnedUpgrade, PlayerId, SkillId};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaveSkill {
    pub id: SkillId,
    pub level: u32,
    pub experience: f64,
    pub total_experience: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaveCurrency {
    pub id: CurrencyId,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaveEnergy {
    pub current: f64,
    pub recovering: bool,
}

/// Whole-player record written on every mutation. Energy is optional so that
/// records without it load with a full pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    #[serde(default = "default_version")]
    pub version: u32,
    pub player_id: PlayerId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub title: String,
    pub last_update_time: DateTime<Utc>,
    #[serde(default)]
    pub time_since_last_update: f64,
    #[serde(default)]
    pub current_activity: Option<ActivityId>,
    #[serde(default)]
    pub energy: Option<SaveEnergy>,
    #[serde(default)]
    pub skills: Vec<SaveSkill>,
    #[serde(default)]
    pub currencies: Vec<SaveCurrency>,
    #[serde(default)]
    pub upgrades: Vec<OwnedUpgrade>,
}

const fn default_version() -> u32 {
    SAVE_VERSION
}
