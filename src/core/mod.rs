mod catalog;
mod player;
mod service;

pub use catalog::DefinitionCatalog;
pub use player::Player;
pub use service::GameService;
