use serde::{Deserialize, Serialize};

use super::condition::UnlockCondition;
use super::ids::{CurrencyId, UpgradeId};
use super::stat::Effect;

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDefinition {
    pub id: UpgradeId,
    pub name: String,
    pub description: String,
    pub cost_currency: CurrencyId,
    pub cost: f64,
    pub max_purchases: u32,
    pub effects: Vec<Effect>,
    pub unlock_conditions: Vec<UnlockCondition>,
    /// Keys granted to the owner, matched by [`UnlockCondition::Granted`].
    pub unlocks: Vec<String>,
}

/// A player's purchase record. Refers to its definition by id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedUpgrade {
    pub id: UpgradeId,
    pub count: u32,
}

/// Result of a purchase attempt. Anything but `Purchased` left the player untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { count: u32 },
    Locked,
    Unaffordable,
    MaxedOut,
    MissingCurrency,
}

impl PurchaseOutcome {
    pub fn is_purchased(self) -> bool {
        matches!(self, Self::Purchased { .. })
    }
}
