use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum AppPhase {
    #[default]
    Boot,
    InGame,
    /// Definitions or the save directory could not be opened.
    Failed,
}
