mod app;

use bevy::prelude::*;
use bevy::window::{PresentMode, Window};

fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgb(0.05, 0.04, 0.03)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Idle Engine".to_string(),
                resolution: (960.0, 720.0).into(),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(app::IdleAppPlugin)
        .run();
}
