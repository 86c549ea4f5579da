use bevy::prelude::*;
use idle_engine::view::{render_activities, render_shop};
use idle_engine::render_status;

use super::resources::{BootFailure, HudText, SelectionState, Snapshot};

const HELP_LINE: &str = "1-9 start activity, Space stop, Q/E pick upgrade, B buy, R refresh";

fn hud_bundle(text: String, color: Color) -> impl Bundle {
    (
        Name::new("HudText"),
        HudText,
        Text::new(text),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(color),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(12.0),
            ..default()
        },
    )
}

pub fn spawn_hud(mut commands: Commands) {
    commands.spawn(hud_bundle(
        "Loading...".to_string(),
        Color::srgb(0.96, 0.93, 0.86),
    ));
}

pub fn spawn_failure(mut commands: Commands, failure: Res<BootFailure>) {
    commands.spawn(hud_bundle(
        format!("Could not start:\n{}", failure.0),
        Color::srgb(0.95, 0.45, 0.4),
    ));
}

pub fn refresh_hud(
    snapshot: Res<Snapshot>,
    selection: Res<SelectionState>,
    mut hud_query: Query<&mut Text, With<HudText>>,
) {
    if !snapshot.is_changed() && !selection.is_changed() {
        return;
    }
    let Ok(mut hud) = hud_query.get_single_mut() else {
        return;
    };

    let status = snapshot
        .status
        .as_ref()
        .map(render_status)
        .unwrap_or_default();
    let selected = snapshot.shop.get(selection.index).map(|listing| listing.id);

    *hud = Text::new(format!(
        "{status}\nActivities\n{}\nShop\n{}\n{}\n{HELP_LINE}",
        render_activities(&snapshot.activities),
        render_shop(&snapshot.shop, selected),
        snapshot.message,
    ));
}
