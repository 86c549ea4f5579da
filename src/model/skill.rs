use serde::{Deserialize, Serialize};

use super::ids::SkillId;

/// Static shape of a skill ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_exp_requirement: f64,
    pub scaling_factor: f64,
    #[serde(default = "default_start_level")]
    pub start_level: u32,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

const fn default_start_level() -> u32 {
    1
}

const fn default_max_level() -> u32 {
    50
}

/// A player's progress along one skill ladder.
///
/// `experience` is progress towards the next level and is consumed on each
/// promotion; `total_experience` only ever grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    level: u32,
    experience: f64,
    total_experience: f64,
    base_exp_requirement: f64,
    scaling_factor: f64,
    start_level: u32,
    max_level: u32,
    pub last_gained: f64,
}

impl Skill {
    pub fn new(definition: &SkillDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name.clone(),
            level: definition.start_level,
            experience: 0.0,
            total_experience: 0.0,
            base_exp_requirement: definition.base_exp_requirement,
            scaling_factor: definition.scaling_factor,
            start_level: definition.start_level,
            max_level: definition.max_level.max(definition.start_level),
            last_gained: 0.0,
        }
    }

    /// Rebuilds a skill from persisted progress. The level is clamped into the
    /// definition's range.
    pub fn restored(
        definition: &SkillDefinition,
        level: u32,
        experience: f64,
        total_experience: f64,
    ) -> Self {
        let mut skill = Self::new(definition);
        skill.level = level.clamp(skill.start_level, skill.max_level);
        skill.experience = experience.max(0.0);
        skill.total_experience = total_experience.max(skill.experience);
        skill
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> f64 {
        self.experience
    }

    pub fn total_experience(&self) -> f64 {
        self.total_experience
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    pub fn experience_required_for_next_level(&self) -> f64 {
        if self.is_max_level() {
            return 0.0;
        }
        let steps = (self.level - self.start_level) as i32;
        self.base_exp_requirement * self.scaling_factor.powi(steps)
    }

    /// Grants experience and applies every level-up it pays for. Returns whether
    /// at least one promotion happened.
    pub fn add_experience(&mut self, amount: f64) -> bool {
        if amount <= 0.0 {
            return false;
        }
        self.experience += amount;
        self.total_experience += amount;

        let mut leveled_up = false;
        while !self.is_max_level() {
            let required = self.experience_required_for_next_level();
            if self.experience < required {
                break;
            }
            self.experience -= required;
            self.level += 1;
            leveled_up = true;
        }

        leveled_up
    }
}
