use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

use crate::config::EngineConfig;
use crate::data::{ActivityRecord, DefinitionsFile, UpgradeRecord, load_definitions_from_path};
use crate::error::DefinitionError;
use crate::model::{
    ActivityDefinition, ActivityId, CurrencyDefinition, CurrencyId, Effect, SkillDefinition,
    SkillId, StatKey, UnlockCondition, UpgradeDefinition, UpgradeId,
};

/// Validated, read-only definitions shared by every player.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionCatalog {
    config: EngineConfig,
    energy_skill: SkillId,
    skills: BTreeMap<SkillId, SkillDefinition>,
    currencies: BTreeMap<CurrencyId, CurrencyDefinition>,
    activities: BTreeMap<ActivityId, ActivityDefinition>,
    upgrades: BTreeMap<UpgradeId, UpgradeDefinition>,
}

impl DefinitionCatalog {
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = load_definitions_from_path(path)?;
        Ok(Self::from_definitions(file)?)
    }

    pub fn from_definitions(file: DefinitionsFile) -> Result<Self, DefinitionError> {
        validate_config(&file.config)?;

        let skills: BTreeMap<SkillId, SkillDefinition> =
            index_unique(file.skills, "skill", |skill| skill.id.0)?;
        if !skills.contains_key(&file.energy_skill) {
            return Err(DefinitionError::MissingEnergySkill(file.energy_skill));
        }
        for skill in skills.values() {
            let owner = format!("skill `{}`", skill.name);
            positive(&owner, "base_exp_requirement", skill.base_exp_requirement)?;
            positive(&owner, "scaling_factor", skill.scaling_factor)?;
        }

        let currencies: BTreeMap<CurrencyId, CurrencyDefinition> =
            index_unique(file.currencies, "currency", |currency| currency.id.0)?;

        let resolver = Resolver {
            skills: &skills,
            currencies: &currencies,
            grants: file
                .upgrades
                .iter()
                .flat_map(|upgrade| upgrade.unlocks.iter().cloned())
                .collect(),
        };

        let activities = file
            .activities
            .into_iter()
            .map(|record| resolver.activity(record))
            .collect::<Result<Vec<_>, _>>()?;
        let activities: BTreeMap<ActivityId, ActivityDefinition> =
            index_unique(activities, "activity", |activity| activity.id.0)?;

        let upgrades = file
            .upgrades
            .into_iter()
            .map(|record| resolver.upgrade(record))
            .collect::<Result<Vec<_>, _>>()?;
        let upgrades: BTreeMap<UpgradeId, UpgradeDefinition> =
            index_unique(upgrades, "upgrade", |upgrade| upgrade.id.0)?;

        tracing::debug!(
            skills = skills.len(),
            currencies = currencies.len(),
            activities = activities.len(),
            upgrades = upgrades.len(),
            "definition catalog loaded"
        );

        Ok(Self {
            config: file.config,
            energy_skill: file.energy_skill,
            skills,
            currencies,
            activities,
            upgrades,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The skill whose level sets maximum energy and which is fed by spent energy.
    pub fn energy_skill(&self) -> SkillId {
        self.energy_skill
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillDefinition> {
        self.skills.get(&id)
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn currency(&self, id: CurrencyId) -> Option<&CurrencyDefinition> {
        self.currencies.get(&id)
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyDefinition> {
        self.currencies.values()
    }

    pub fn activity(&self, id: ActivityId) -> Option<&ActivityDefinition> {
        self.activities.get(&id)
    }

    pub fn activities(&self) -> impl Iterator<Item = &ActivityDefinition> {
        self.activities.values()
    }

    pub fn upgrade(&self, id: UpgradeId) -> Option<&UpgradeDefinition> {
        self.upgrades.get(&id)
    }

    pub fn upgrades(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.upgrades.values()
    }

    pub fn currency_name(&self, id: CurrencyId) -> &str {
        self.currency(id).map_or("?", |currency| currency.name.as_str())
    }

    /// Human label for a stat, e.g. `coins max capacity`.
    pub fn stat_label(&self, stat: StatKey) -> String {
        match stat {
            StatKey::EnergyRecovery => "energy recovery".to_string(),
            StatKey::Capacity(id) => format!("{} max capacity", self.currency_name(id)),
            StatKey::Gain(id) => format!("{} gain", self.currency_name(id)),
        }
    }
}

struct Resolver<'a> {
    skills: &'a BTreeMap<SkillId, SkillDefinition>,
    currencies: &'a BTreeMap<CurrencyId, CurrencyDefinition>,
    grants: BTreeSet<String>,
}

impl Resolver<'_> {
    fn currency_id(&self, name: &str) -> Option<CurrencyId> {
        self.currencies
            .values()
            .find(|currency| currency.name.eq_ignore_ascii_case(name))
            .map(|currency| currency.id)
    }

    fn currency(&self, owner: &str, name: &str) -> Result<CurrencyId, DefinitionError> {
        self.currency_id(name)
            .ok_or_else(|| DefinitionError::UnknownCurrency {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    fn activity(&self, record: ActivityRecord) -> Result<ActivityDefinition, DefinitionError> {
        let owner = format!("activity `{}`", record.name);
        positive(&owner, "output_amount", record.output_amount)?;
        positive(&owner, "energy_drain_rate", record.energy_drain_rate)?;

        Ok(ActivityDefinition {
            id: record.id,
            output_currency: self.currency(&owner, &record.output_item)?,
            output_amount: record.output_amount,
            energy_drain_rate: record.energy_drain_rate,
            unlock_conditions: self.conditions(&owner, &record.unlock_conditions)?,
            name: record.name,
            icon: record.icon,
            description: record.description,
            status_description: record.status_description,
        })
    }

    fn upgrade(&self, record: UpgradeRecord) -> Result<UpgradeDefinition, DefinitionError> {
        let owner = format!("upgrade `{}`", record.name);
        if record.max_purchases == 0 {
            return Err(DefinitionError::ZeroMaxPurchases { owner });
        }
        if record.cost < 0.0 {
            return Err(DefinitionError::NonPositive {
                owner,
                field: "cost",
                value: record.cost,
            });
        }

        let effects = record
            .effects
            .iter()
            .map(|effect| {
                let stat = StatKey::parse(&effect.stat, |name| self.currency_id(name)).ok_or_else(
                    || DefinitionError::UnknownStat {
                        owner: owner.clone(),
                        key: effect.stat.clone(),
                    },
                )?;
                Ok(Effect {
                    stat,
                    kind: effect.modifier_type,
                    value: effect.modifier_value,
                })
            })
            .collect::<Result<Vec<_>, DefinitionError>>()?;

        Ok(UpgradeDefinition {
            id: record.id,
            cost_currency: self.currency(&owner, &record.cost_material)?,
            cost: record.cost,
            max_purchases: record.max_purchases,
            effects,
            unlock_conditions: self.conditions(&owner, &record.unlock_conditions)?,
            unlocks: record.unlocks,
            name: record.name,
            description: record.description,
        })
    }

    fn conditions(
        &self,
        owner: &str,
        raw: &[String],
    ) -> Result<Vec<UnlockCondition>, DefinitionError> {
        raw.iter()
            .map(|condition| condition.trim())
            .filter(|condition| !condition.is_empty())
            .map(|condition| self.condition(owner, condition))
            .collect()
    }

    fn condition(&self, owner: &str, raw: &str) -> Result<UnlockCondition, DefinitionError> {
        if let Some(rest) = raw.strip_prefix("level.") {
            let malformed = || DefinitionError::MalformedCondition {
                owner: owner.to_string(),
                condition: raw.to_string(),
            };
            let (name, level) = rest.split_once('.').ok_or_else(malformed)?;
            let level = level.parse::<u32>().map_err(|_| malformed())?;
            let skill = self
                .skills
                .values()
                .find(|skill| skill.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| DefinitionError::UnknownSkill {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })?;
            return Ok(UnlockCondition::SkillLevel {
                skill: skill.id,
                skill_name: skill.name.clone(),
                level,
            });
        }

        if self.grants.contains(raw) {
            return Ok(UnlockCondition::Granted(raw.to_string()));
        }

        tracing::warn!(%owner, condition = raw, "unrecognized unlock condition treated as satisfied");
        Ok(UnlockCondition::Placeholder(raw.to_string()))
    }
}

fn index_unique<K, T>(
    items: Vec<T>,
    kind: &'static str,
    raw_id: impl Fn(&T) -> u32,
) -> Result<BTreeMap<K, T>, DefinitionError>
where
    K: Ord + From<u32>,
{
    let mut indexed = BTreeMap::new();
    for item in items {
        let id = raw_id(&item);
        if indexed.insert(K::from(id), item).is_some() {
            return Err(DefinitionError::DuplicateId { kind, id });
        }
    }
    Ok(indexed)
}

fn validate_config(config: &EngineConfig) -> Result<(), DefinitionError> {
    non_negative("config", "min_update_seconds", config.min_update_seconds)?;
    positive("config", "min_step_seconds", config.min_step_seconds)?;
    non_negative("config", "base_recovery_rate", config.base_recovery_rate)?;
    non_negative("config", "energy_per_level", config.energy_per_level)
}

/// Zero is allowed; negatives, NaN and infinities are reported as `NonPositive`.
fn non_negative(owner: &str, field: &'static str, value: f64) -> Result<(), DefinitionError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DefinitionError::NonPositive {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}

fn positive(owner: &str, field: &'static str, value: f64) -> Result<(), DefinitionError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DefinitionError::NonPositive {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DefinitionCatalog;
    use crate::data::{definitions_path, parse_definitions};
    use crate::error::DefinitionError;
    use crate::model::{ActivityId, CurrencyId, StatKey, UnlockCondition, UpgradeId};

    fn catalog_from(json: &str) -> Result<DefinitionCatalog, DefinitionError> {
        DefinitionCatalog::from_definitions(parse_definitions(json).expect("JSON should parse"))
    }

    #[test]
    fn bundled_catalog_validates() {
        let catalog = DefinitionCatalog::load(definitions_path()).expect("catalog should load");

        let scavenging = catalog.activity(ActivityId(2)).expect("scavenging activity");
        assert_eq!(
            scavenging.unlock_conditions,
            vec![UnlockCondition::Granted("scavenging".to_string())]
        );

        let charm = catalog.upgrade(UpgradeId(4)).expect("lucky charm");
        assert_eq!(charm.effects[0].stat, StatKey::Gain(CurrencyId(0)));
        assert!(matches!(
            charm.unlock_conditions[0],
            UnlockCondition::Placeholder(_)
        ));
        assert_eq!(catalog.stat_label(charm.effects[1].stat), "scrap max capacity");
    }

    #[test]
    fn unknown_stat_is_rejected_at_load() {
        let result = catalog_from(
            r#"{
            "energy_skill": 0,
            "skills": [{ "id": 0, "name": "endurance", "base_exp_requirement": 10, "scaling_factor": 1.5 }],
            "currencies": [{ "id": 0, "name": "coins", "base_capacity": 100 }],
            "upgrades": [{
                "id": 0, "name": "Typo", "cost_material": "coins", "cost": 1,
                "effects": [{ "stat": "coin.capacity", "modifier_type": "increase", "modifier_value": 1 }]
            }]
        }"#,
        );

        assert_eq!(
            result,
            Err(DefinitionError::UnknownStat {
                owner: "upgrade `Typo`".to_string(),
                key: "coin.capacity".to_string(),
            })
        );
    }

    #[test]
    fn missing_energy_skill_is_rejected() {
        let result = catalog_from(r#"{ "energy_skill": 7 }"#);
        assert!(matches!(result, Err(DefinitionError::MissingEnergySkill(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = catalog_from(
            r#"{
            "energy_skill": 0,
            "skills": [{ "id": 0, "name": "endurance", "base_exp_requirement": 10, "scaling_factor": 1.5 }],
            "currencies": [
                { "id": 0, "name": "coins", "base_capacity": 100 },
                { "id": 0, "name": "scrap", "base_capacity": 100 }
            ]
        }"#,
        );
        assert_eq!(
            result,
            Err(DefinitionError::DuplicateId {
                kind: "currency",
                id: 0
            })
        );
    }

    #[test]
    fn zero_drain_rate_is_rejected() {
        let result = catalog_from(
            r#"{
            "energy_skill": 0,
            "skills": [{ "id": 0, "name": "endurance", "base_exp_requirement": 10, "scaling_factor": 1.5 }],
            "currencies": [{ "id": 0, "name": "coins", "base_capacity": 100 }],
            "activities": [{ "id": 0, "name": "Nap", "output_item": "coins", "output_amount": 1, "energy_drain_rate": 0 }]
        }"#,
        );
        assert!(matches!(
            result,
            Err(DefinitionError::NonPositive {
                field: "energy_drain_rate",
                ..
            })
        ));
    }

    #[test]
    fn engine_config_is_validated() {
        let with_config = |config: &str| {
            catalog_from(&format!(
                r#"{{
                "energy_skill": 0,
                "skills": [{{ "id": 0, "name": "endurance", "base_exp_requirement": 10, "scaling_factor": 1.5 }}],
                "config": {config}
            }}"#
            ))
        };

        assert!(matches!(
            with_config(r#"{ "min_update_seconds": -1000, "min_step_seconds": -1 }"#),
            Err(DefinitionError::NonPositive {
                field: "min_update_seconds",
                ..
            })
        ));
        assert!(matches!(
            with_config(r#"{ "min_step_seconds": 0 }"#),
            Err(DefinitionError::NonPositive {
                field: "min_step_seconds",
                ..
            })
        ));
        assert!(matches!(
            with_config(r#"{ "base_recovery_rate": -0.2 }"#),
            Err(DefinitionError::NonPositive {
                field: "base_recovery_rate",
                ..
            })
        ));
        assert!(matches!(
            with_config(r#"{ "energy_per_level": -1 }"#),
            Err(DefinitionError::NonPositive {
                field: "energy_per_level",
                ..
            })
        ));

        let relaxed = with_config(r#"{ "min_update_seconds": 0, "base_recovery_rate": 0 }"#)
            .expect("zero window and zero recovery are allowed");
        assert_eq!(relaxed.config().min_update_seconds, 0.0);
    }

    #[test]
    fn level_conditions_must_name_a_skill_and_a_number() {
        let template = |condition: &str| {
            format!(
                r#"{{
                "energy_skill": 0,
                "skills": [{{ "id": 0, "name": "endurance", "base_exp_requirement": 10, "scaling_factor": 1.5 }}],
                "currencies": [{{ "id": 0, "name": "coins", "base_capacity": 100 }}],
                "activities": [{{ "id": 0, "name": "Run", "output_item": "coins", "output_amount": 1,
                                  "energy_drain_rate": 1, "unlock_conditions": ["{condition}"] }}]
            }}"#
            )
        };

        assert!(matches!(
            catalog_from(&template("level.endurance.x")),
            Err(DefinitionError::MalformedCondition { .. })
        ));
        assert!(matches!(
            catalog_from(&template("level.charisma.2")),
            Err(DefinitionError::UnknownSkill { .. })
        ));
        let catalog = catalog_from(&template("level.Endurance.2")).expect("valid condition");
        assert!(matches!(
            catalog.activity(ActivityId(0)).expect("run").unlock_conditions[0],
            UnlockCondition::SkillLevel { level: 2, .. }
        ));
    }
}
