use serde::{Deserialize, Serialize};

use super::ids::CurrencyId;
use super::stat::Modifier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDefinition {
    pub id: CurrencyId,
    pub name: String,
    pub base_capacity: f64,
}

/// Capacity-bounded accumulator owned by a single player.
#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub id: CurrencyId,
    pub name: String,
    amount: f64,
    capacity: f64,
    base_capacity: f64,
    pub last_gained: f64,
}

impl Currency {
    pub fn new(definition: &CurrencyDefinition) -> Self {
        let base_capacity = definition.base_capacity.max(0.0);
        Self {
            id: definition.id,
            name: definition.name.clone(),
            amount: 0.0,
            capacity: base_capacity,
            base_capacity,
            last_gained: 0.0,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn base_capacity(&self) -> f64 {
        self.base_capacity
    }

    pub fn add_amount(&mut self, amount: f64) {
        if amount <= 0.0 {
            self.last_gained = 0.0;
            return;
        }
        let previous = self.amount;
        self.amount = (self.amount + amount).min(self.capacity);
        self.last_gained = (self.amount - previous).max(0.0);
    }

    /// All-or-nothing subtraction.
    pub fn spend(&mut self, amount: f64) -> bool {
        if amount < 0.0 || self.amount < amount {
            return false;
        }
        self.amount -= amount;
        true
    }

    /// Sets the amount directly, clamped to capacity. Used when restoring saves.
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount.clamp(0.0, self.capacity);
    }

    pub fn apply_capacity_modifier(&mut self, modifier: Modifier) {
        self.capacity = modifier.apply(self.base_capacity).max(0.0);
        self.amount = self.amount.min(self.capacity);
    }
}
