use super::condition::UnlockCondition;
use super::ids::{ActivityId, CurrencyId};

/// Continuous background action: drains energy at `energy_drain_rate` per second
/// and produces `output_amount` of `output_currency` per second while funded.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDefinition {
    pub id: ActivityId,
    pub name: String,
    pub icon: String,
    pub output_currency: CurrencyId,
    pub output_amount: f64,
    pub energy_drain_rate: f64,
    pub unlock_conditions: Vec<UnlockCondition>,
    pub description: String,
    pub status_description: String,
}
