mod activity;
mod condition;
mod currency;
mod energy;
mod ids;
mod skill;
mod stat;
mod upgrade;

pub use activity::ActivityDefinition;
pub use condition::UnlockCondition;
pub(crate) use condition::capitalize;
pub use currency::{Currency, CurrencyDefinition};
pub use energy::Energy;
pub use ids::{ActivityId, CurrencyId, PlayerId, SkillId, UpgradeId};
pub use skill::{Skill, SkillDefinition};
pub use stat::{Effect, Modifier, ModifierKind, ModifierSet, StatKey};
pub use upgrade::{OwnedUpgrade, PurchaseOutcome, UpgradeDefinition};
