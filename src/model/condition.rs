use std::collections::BTreeSet;
use std::fmt;

use super::ids::SkillId;

/// Parsed unlock predicate gating activities and upgrades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockCondition {
    /// `level.<skill>.<level>`
    SkillLevel {
        skill: SkillId,
        skill_name: String,
        level: u32,
    },
    /// A key some upgrade hands out through its unlock list.
    Granted(String),
    /// Anything the engine has no rule for. Treated as satisfied.
    Placeholder(String),
}

impl UnlockCondition {
    pub fn is_satisfied(
        &self,
        skill_level: impl Fn(SkillId) -> Option<u32>,
        granted: &BTreeSet<String>,
    ) -> bool {
        match self {
            Self::SkillLevel { skill, level, .. } => {
                skill_level(*skill).is_some_and(|current| current >= *level)
            }
            Self::Granted(key) => granted.contains(key),
            Self::Placeholder(_) => true,
        }
    }
}

impl fmt::Display for UnlockCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkillLevel {
                skill_name, level, ..
            } => write!(f, "Requires {} Level {level}", capitalize(skill_name)),
            Self::Granted(key) | Self::Placeholder(key) => write!(f, "Requires {key}"),
        }
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
