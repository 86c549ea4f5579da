use std::sync::Arc;

use crate::core::{DefinitionCatalog, Player};

use super::{PlayerSave, SAVE_VERSION, SaveCurrency, SaveEnergy, SaveSkill};

pub fn save_data_from_player(player: &Player) -> PlayerSave {
    PlayerSave {
        version: SAVE_VERSION,
        player_id: player.id.clone(),
        display_name: player.display_name.clone(),
        title: player.title.clone(),
        last_update_time: player.last_update_time(),
        time_since_last_update: player.time_since_last_update(),
        current_activity: player.current_activity_id(),
        energy: Some(SaveEnergy {
            current: player.energy().current(),
            recovering: player.energy().is_recovering(),
        }),
        skills: player
            .skills()
            .map(|skill| SaveSkill {
                id: skill.id,
                level: skill.level(),
                experience: skill.experience(),
                total_experience: skill.total_experience(),
            })
            .collect(),
        currencies: player
            .currencies()
            .map(|currency| SaveCurrency {
                id: currency.id,
                amount: currency.amount(),
            })
            .collect(),
        upgrades: player.upgrades().copied().collect(),
    }
}

/// Rebuilds a player from its record. Ids the catalog no longer defines are
/// skipped; skills and currencies missing from the record start fresh.
pub fn player_from_save_data(save: &PlayerSave, catalog: Arc<DefinitionCatalog>) -> Player {
    let mut player = Player::new(
        save.player_id.clone(),
        save.display_name.clone(),
        Arc::clone(&catalog),
        save.last_update_time,
    );
    if !save.title.is_empty() {
        player.title = save.title.clone();
    }

    for skill in &save.skills {
        if catalog.skill(skill.id).is_none() {
            tracing::warn!(player = %save.player_id, skill = %skill.id, "dropping unknown skill from save");
            continue;
        }
        player.restore_skill(skill.id, skill.level, skill.experience, skill.total_experience);
    }

    for owned in &save.upgrades {
        if catalog.upgrade(owned.id).is_none() {
            tracing::warn!(player = %save.player_id, upgrade = %owned.id, "dropping unknown upgrade from save");
            continue;
        }
        player.restore_upgrade(owned.id, owned.count);
    }

    if let Some(activity) = save.current_activity
        && catalog.activity(activity).is_none()
    {
        tracing::warn!(player = %save.player_id, activity = %activity, "dropping unknown activity from save");
    }
    player.restore_activity(save.current_activity);
    player.restore_timing(save.last_update_time, save.time_since_last_update);

    let amounts = save
        .currencies
        .iter()
        .map(|currency| (currency.id, currency.amount))
        .collect::<Vec<_>>();
    player.finish_restore(
        &amounts,
        save.energy.map(|energy| (energy.current, energy.recovering)),
    );

    player
}
