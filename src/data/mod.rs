mod definitions;
mod loader;

pub use definitions::{ActivityRecord, DefinitionsFile, EffectRecord, UpgradeRecord};
pub use loader::{definitions_path, load_definitions, load_definitions_from_path, parse_definitions};
