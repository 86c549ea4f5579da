use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::model::{ActivityId, CurrencyDefinition, ModifierKind, SkillDefinition, SkillId, UpgradeId};

/// Raw shape of `definitions.json`. Cross references are still plain strings
/// here; [`crate::DefinitionCatalog`] resolves and validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionsFile {
    #[serde(rename = "_source", default)]
    pub source: String,
    #[serde(default)]
    pub config: EngineConfig,
    pub energy_skill: SkillId,
    #[serde(default)]
    pub skills: Vec<SkillDefinition>,
    #[serde(default)]
    pub currencies: Vec<CurrencyDefinition>,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub output_item: String,
    pub output_amount: f64,
    pub energy_drain_rate: f64,
    #[serde(default)]
    pub unlock_conditions: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub id: UpgradeId,
    pub name: String,
    pub cost_material: String,
    pub cost: f64,
    #[serde(default = "default_max_purchases")]
    pub max_purchases: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<EffectRecord>,
    #[serde(default)]
    pub unlock_conditions: Vec<String>,
    #[serde(default)]
    pub unlocks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub stat: String,
    pub modifier_type: ModifierKind,
    pub modifier_value: f64,
}

const fn default_max_purchases() -> u32 {
    1
}
