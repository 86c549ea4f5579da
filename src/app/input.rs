use bevy::prelude::*;

use super::resources::PlayerAction;

const ACTIVITY_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

pub fn emit_keyboard_actions(
    keys: Res<ButtonInput<KeyCode>>,
    mut actions: EventWriter<PlayerAction>,
) {
    for (slot, key) in ACTIVITY_KEYS.iter().enumerate() {
        if keys.just_pressed(*key) {
            actions.send(PlayerAction::SelectActivity(slot));
        }
    }

    if keys.just_pressed(KeyCode::Space) {
        actions.send(PlayerAction::StopActivity);
    }
    if keys.just_pressed(KeyCode::KeyQ) {
        actions.send(PlayerAction::CycleUpgrade(-1));
    }
    if keys.just_pressed(KeyCode::KeyE) {
        actions.send(PlayerAction::CycleUpgrade(1));
    }
    if keys.just_pressed(KeyCode::KeyB) || keys.just_pressed(KeyCode::Enter) {
        actions.send(PlayerAction::BuySelected);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        actions.send(PlayerAction::Refresh);
    }
}
