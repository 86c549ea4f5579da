use std::sync::Arc;

use anyhow::{Context, Result};
use bevy::prelude::*;
use chrono::Utc;
use idle_engine::{DefinitionCatalog, GameService, JsonFilePlayerStore, PlayerId};

use super::resources::{BootFailure, RuntimeConfig, Session, Snapshot};
use super::state::AppPhase;

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("PrimaryCamera"), Camera2d));
}

pub fn bootstrap_session(
    mut commands: Commands,
    config: Res<RuntimeConfig>,
    mut next_phase: ResMut<NextState<AppPhase>>,
) {
    match open_session(&config) {
        Ok((session, snapshot)) => {
            commands.insert_resource(session);
            commands.insert_resource(snapshot);
            next_phase.set(AppPhase::InGame);
        }
        Err(err) => {
            tracing::error!("failed to start session: {err:#}");
            commands.insert_resource(BootFailure(format!("{err:#}")));
            next_phase.set(AppPhase::Failed);
        }
    }
}

fn open_session(config: &RuntimeConfig) -> Result<(Session, Snapshot)> {
    let catalog = DefinitionCatalog::load(&config.definitions_path)?;
    let store = JsonFilePlayerStore::new(&config.save_dir).with_context(|| {
        format!("failed to open save directory {}", config.save_dir.display())
    })?;
    let service = GameService::new(Arc::new(catalog), store);

    let player = PlayerId::new(config.player_id.clone());
    let now = Utc::now();
    if !service.is_registered(&player)? {
        service.register(player.clone(), &config.display_name, now)?;
    }

    let session = Session { service, player };
    let snapshot = session.snapshot(now)?;
    tracing::info!(player = %session.player, "session ready");
    Ok((session, snapshot))
}
