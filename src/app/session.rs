use bevy::prelude::*;
use chrono::Utc;
use idle_engine::{PurchaseOutcome, ServiceResult};

use super::resources::{PlayerAction, SelectionState, Session, Snapshot};

/// Every action settles the player at the current wall-clock time first; there
/// is no background tick.
pub fn apply_player_actions(
    mut actions: EventReader<PlayerAction>,
    session: Res<Session>,
    mut snapshot: ResMut<Snapshot>,
    mut selection: ResMut<SelectionState>,
) {
    let mut message = None;
    let mut touched = false;

    for action in actions.read() {
        let now = Utc::now();
        let result = match *action {
            PlayerAction::SelectActivity(slot) => {
                let Some(listing) = snapshot.activities.get(slot) else {
                    continue;
                };
                let name = listing.name.clone();
                session
                    .service
                    .change_activity(&session.player, Some(listing.id), now)
                    .map(|_| format!("Started {name}"))
            }
            PlayerAction::StopActivity => session
                .service
                .change_activity(&session.player, None, now)
                .map(|_| "Stopped".to_string()),
            PlayerAction::CycleUpgrade(delta) => {
                selection.step(delta, snapshot.shop.len());
                continue;
            }
            PlayerAction::BuySelected => {
                let Some(listing) = snapshot.shop.get(selection.index) else {
                    continue;
                };
                let (name, currency) = (listing.name.clone(), listing.cost_currency.clone());
                session
                    .service
                    .buy_upgrade(&session.player, listing.id, now)
                    .map(|outcome| purchase_message(outcome, &name, &currency))
            }
            PlayerAction::Refresh => Ok(String::new()),
        };

        touched = true;
        message = Some(match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(player = %session.player, "action failed: {err}");
                err.to_string()
            }
        });
    }

    if !touched {
        return;
    }
    if let Err(err) = refresh(&session, &mut snapshot, message.unwrap_or_default()) {
        tracing::warn!(player = %session.player, "refresh failed: {err}");
        snapshot.message = err.to_string();
    }
    selection.clamp(snapshot.shop.len());
}

fn refresh(session: &Session, snapshot: &mut Snapshot, message: String) -> ServiceResult<()> {
    *snapshot = session.snapshot(Utc::now())?;
    snapshot.message = message;
    Ok(())
}

fn purchase_message(outcome: PurchaseOutcome, name: &str, currency: &str) -> String {
    match outcome {
        PurchaseOutcome::Purchased { count } => format!("Bought {name} ({count})"),
        PurchaseOutcome::Locked => format!("{name} is still locked"),
        PurchaseOutcome::Unaffordable => format!("Not enough {currency} for {name}"),
        PurchaseOutcome::MaxedOut => format!("{name} is already maxed out"),
        PurchaseOutcome::MissingCurrency => format!("{name} costs a currency you do not have"),
    }
}
