use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::CurrencyId;
use super::upgrade::UpgradeDefinition;

/// Every stat an upgrade can touch. Parsed from `energy.recovery`,
/// `<currency>.capacity` and `<currency>.gain` when definitions are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatKey {
    EnergyRecovery,
    Capacity(CurrencyId),
    Gain(CurrencyId),
}

impl StatKey {
    /// Resolves a raw `target.attribute` key. Currency names are resolved through
    /// `currency_by_name`; `None` means the key is not valid.
    pub fn parse(raw: &str, currency_by_name: impl Fn(&str) -> Option<CurrencyId>) -> Option<Self> {
        let (target, attribute) = raw.trim().split_once('.')?;
        match (target, attribute) {
            ("energy", "recovery") => Some(Self::EnergyRecovery),
            (name, "capacity") => currency_by_name(name).map(Self::Capacity),
            (name, "gain") => currency_by_name(name).map(Self::Gain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    Increase,
    Multiplier,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect {
    pub stat: StatKey,
    pub kind: ModifierKind,
    pub value: f64,
}

/// Aggregated adjustment for one stat: `(base + increase) * multiplier`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifier {
    pub increase: f64,
    pub multiplier: f64,
}

impl Default for Modifier {
    fn default() -> Self {
        Self {
            increase: 0.0,
            multiplier: 1.0,
        }
    }
}

impl Modifier {
    pub fn apply(self, base: f64) -> f64 {
        (base + self.increase) * self.multiplier
    }

    fn absorb(&mut self, kind: ModifierKind, value: f64) {
        match kind {
            ModifierKind::Increase => self.increase += value,
            ModifierKind::Multiplier => self.multiplier *= value,
        }
    }
}

/// Derived view of every owned upgrade's effects. Never edited in place; rebuild
/// it with [`ModifierSet::from_owned`] whenever the owned set changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierSet {
    modifiers: HashMap<StatKey, Modifier>,
}

impl ModifierSet {
    pub fn from_owned<'a>(owned: impl IntoIterator<Item = (&'a UpgradeDefinition, u32)>) -> Self {
        let mut modifiers: HashMap<StatKey, Modifier> = HashMap::new();
        for (definition, count) in owned {
            for effect in &definition.effects {
                let entry = modifiers.entry(effect.stat).or_default();
                for _ in 0..count {
                    entry.absorb(effect.kind, effect.value);
                }
            }
        }
        Self { modifiers }
    }

    pub fn get(&self, stat: StatKey) -> Modifier {
        self.modifiers.get(&stat).copied().unwrap_or_default()
    }

    pub fn apply(&self, stat: StatKey, base: f64) -> f64 {
        self.get(stat).apply(base)
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}
