mod bridge;
mod codec;
mod model;
mod store;

pub use bridge::{player_from_save_data, save_data_from_player};
pub use codec::{
    export_to_base64, import_from_base64, load_from_json_string, save_to_json_string,
    save_to_pretty_json_string,
};
pub use model::{PlayerSave, SAVE_VERSION, SaveCurrency, SaveEnergy, SaveSkill};
pub use store::{InMemoryPlayerStore, JsonFilePlayerStore, PlayerStore, StoreResult};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use super::{
        JsonFilePlayerStore, PlayerSave, PlayerStore, SaveCurrency, SaveEnergy, SaveSkill,
        export_to_base64, import_from_base64, load_from_json_string, player_from_save_data,
        save_data_from_player, save_to_json_string,
    };
    use crate::core::{DefinitionCatalog, Player};
    use crate::data::definitions_path;
    use crate::model::{ActivityId, CurrencyId, OwnedUpgrade, PlayerId, SkillId, UpgradeId};

    fn saved_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn catalog() -> Arc<DefinitionCatalog> {
        Arc::new(DefinitionCatalog::load(definitions_path()).expect("bundled catalog"))
    }

    fn sample_save() -> PlayerSave {
        PlayerSave {
            version: 1,
            player_id: PlayerId::new("1187"),
            display_name: "Rook".to_string(),
            title: "Beggar".to_string(),
            last_update_time: saved_at(),
            time_since_last_update: 12.5,
            current_activity: Some(ActivityId(0)),
            energy: Some(SaveEnergy {
                current: 1.5,
                recovering: true,
            }),
            skills: vec![SaveSkill {
                id: SkillId(0),
                level: 4,
                experience: 3.25,
                total_experience: 72.0,
            }],
            currencies: vec![
                SaveCurrency {
                    id: CurrencyId(0),
                    amount: 130.0,
                },
                SaveCurrency {
                    id: CurrencyId(1),
                    amount: 4.0,
                },
            ],
            upgrades: vec![
                OwnedUpgrade {
                    id: UpgradeId(0),
                    count: 2,
                },
                OwnedUpgrade {
                    id: UpgradeId(1),
                    count: 1,
                },
            ],
        }
    }

    #[test]
    fn save_json_round_trip() {
        let original = sample_save();
        let json = save_to_json_string(&original).expect("save JSON should serialize");
        let restored = load_from_json_string(&json).expect("save JSON should deserialize");

        assert_eq!(restored, original);
    }

    #[test]
    fn save_base64_round_trip() {
        let original = sample_save();
        let encoded = export_to_base64(&original).expect("save should export to base64");
        let restored = import_from_base64(&format!("  {encoded}\n")).expect("should import");

        assert_eq!(restored, original);
    }

    #[test]
    fn newer_save_versions_are_refused() {
        let mut save = sample_save();
        save.version = 99;
        let json = save_to_json_string(&save).expect("serialize");

        assert!(load_from_json_string(&json).is_err());
    }

    #[test]
    fn restore_rebuilds_derived_state() {
        let player = player_from_save_data(&sample_save(), catalog());

        assert_eq!(player.energy_skill().expect("endurance").level(), 4);
        assert_eq!(player.energy().max(), 4.0);
        assert_eq!(player.energy().current(), 1.5);
        assert!(player.energy().is_recovering());
        // Deeper pockets lifts coin capacity to 150, so 130 survives the clamp.
        let coins = player.currency(CurrencyId(0)).expect("coins");
        assert_eq!(coins.capacity(), 150.0);
        assert_eq!(coins.amount(), 130.0);
        assert_eq!(player.upgrade_count(UpgradeId(0)), 2);
        assert_eq!(player.current_activity_id(), Some(ActivityId(0)));
        assert_eq!(player.last_update_time(), saved_at());
    }

    #[test]
    fn player_bridge_round_trip() {
        let save = sample_save();
        let player = player_from_save_data(&save, catalog());

        assert_eq!(save_data_from_player(&player), save);
    }

    #[test]
    fn records_without_energy_start_full() {
        let mut save = sample_save();
        save.energy = None;
        save.upgrades.push(OwnedUpgrade {
            id: UpgradeId(404),
            count: 3,
        });
        save.current_activity = Some(ActivityId(404));

        let player = player_from_save_data(&save, catalog());

        assert!(player.energy().is_full());
        assert_eq!(player.upgrades().count(), 2);
        assert!(player.current_activity().is_none());
    }

    #[test]
    fn file_store_round_trip_and_listing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFilePlayerStore::new(dir.path().join("players")).expect("store");
        let player = Player::new(PlayerId::new("a b/c"), "Slash", catalog(), saved_at());
        let save = save_data_from_player(&player);

        assert!(!store.exists(&player.id));
        store.save(&save).expect("save");
        store.save(&sample_save()).expect("save second");

        assert!(store.exists(&player.id));
        assert_eq!(store.load(&player.id).expect("load"), Some(save));
        assert_eq!(
            store.list_ids().expect("list"),
            vec![PlayerId::new("1187"), PlayerId::new("a b/c")]
        );
        assert_eq!(store.load(&PlayerId::new("ghost")).expect("load"), None);
    }
}
