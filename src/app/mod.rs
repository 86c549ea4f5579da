mod input;
mod resources;
mod session;
mod setup;
mod state;
mod view;

use bevy::prelude::*;

use resources::{PlayerAction, RuntimeConfig, SelectionState, Snapshot};
use state::AppPhase;

pub struct IdleAppPlugin;

impl Plugin for IdleAppPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppPhase>()
            .insert_resource(RuntimeConfig::from_env())
            .init_resource::<SelectionState>()
            .init_resource::<Snapshot>()
            .add_event::<PlayerAction>()
            .add_systems(Startup, setup::spawn_camera)
            .add_systems(OnEnter(AppPhase::Boot), setup::bootstrap_session)
            .add_systems(OnEnter(AppPhase::InGame), view::spawn_hud)
            .add_systems(OnEnter(AppPhase::Failed), view::spawn_failure)
            .add_systems(
                Update,
                (
                    input::emit_keyboard_actions,
                    session::apply_player_actions,
                    view::refresh_hud,
                )
                    .chain()
                    .run_if(in_state(AppPhase::InGame)),
            );
    }
}
