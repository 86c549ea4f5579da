pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod model;
pub mod save;
pub mod view;

pub use config::EngineConfig;
pub use crate::core::{DefinitionCatalog, GameService, Player};
pub use data::{DefinitionsFile, definitions_path, load_definitions, parse_definitions};
pub use error::{DefinitionError, ServiceError, ServiceResult, StoreError};
pub use model::{
    ActivityDefinition, ActivityId, Currency, CurrencyId, Energy, Modifier, ModifierKind,
    ModifierSet, OwnedUpgrade, PlayerId, PurchaseOutcome, Skill, SkillId, StatKey,
    UnlockCondition, UpgradeDefinition, UpgradeId,
};
pub use save::{
    InMemoryPlayerStore, JsonFilePlayerStore, PlayerSave, PlayerStore, export_to_base64,
    import_from_base64, load_from_json_string, save_to_json_string,
};
pub use view::{
    ActivityListing, PlayerStatus, UpgradeListing, format_number, format_time, render_status,
};
