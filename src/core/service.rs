use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::error::{ServiceError, ServiceResult};
use crate::model::{ActivityId, PlayerId, PurchaseOutcome, UpgradeId};
use crate::save::{PlayerStore, player_from_save_data, save_data_from_player};
use crate::view::{ActivityListing, PlayerStatus, UpgradeListing};

use super::catalog::DefinitionCatalog;
use super::player::Player;

/// Owns the definition catalog and a player store, and keeps live players in
/// memory. Each player sits behind its own mutex: operations on one player run
/// one at a time, different players do not wait on each other. Every mutating
/// call writes the whole player back to the store before returning.
pub struct GameService {
    catalog: Arc<DefinitionCatalog>,
    store: Box<dyn PlayerStore>,
    players: RwLock<HashMap<PlayerId, Arc<Mutex<Player>>>>,
}

impl GameService {
    pub fn new(catalog: Arc<DefinitionCatalog>, store: impl PlayerStore + 'static) -> Self {
        Self {
            catalog,
            store: Box::new(store),
            players: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<DefinitionCatalog> {
        &self.catalog
    }

    pub fn is_registered(&self, id: &PlayerId) -> ServiceResult<bool> {
        let live = self
            .players
            .read()
            .map_err(|_| ServiceError::LockPoisoned)?
            .contains_key(id);
        Ok(live || self.store.exists(id))
    }

    pub fn register(
        &self,
        id: PlayerId,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<PlayerStatus> {
        if self.is_registered(&id)? {
            return Err(ServiceError::AlreadyRegistered(id));
        }

        let player = Player::new(id.clone(), display_name, Arc::clone(&self.catalog), now);
        let status = PlayerStatus::from_player(&player);
        let save = save_data_from_player(&player);
        let handle = Arc::new(Mutex::new(player));
        // Held until the record is on disk, so other callers wait for it.
        let _guard = handle.lock().map_err(|_| ServiceError::LockPoisoned)?;

        {
            let mut players = self.players.write().map_err(|_| ServiceError::LockPoisoned)?;
            if players.contains_key(&id) {
                return Err(ServiceError::AlreadyRegistered(id));
            }
            players.insert(id.clone(), Arc::clone(&handle));
        }

        if let Err(err) = self.store.save(&save) {
            self.players
                .write()
                .map_err(|_| ServiceError::LockPoisoned)?
                .remove(&id);
            return Err(err.into());
        }

        tracing::info!(player = %id, "player registered");
        Ok(status)
    }

    /// Reconciles the player up to `now` and returns the refreshed status.
    pub fn observe(&self, id: &PlayerId, now: DateTime<Utc>) -> ServiceResult<PlayerStatus> {
        self.with_player(id, |player| {
            player.update(now);
            PlayerStatus::from_player(player)
        })
    }

    /// Settles progress, then switches to `activity` (or stops with `None`).
    pub fn change_activity(
        &self,
        id: &PlayerId,
        activity: Option<ActivityId>,
        now: DateTime<Utc>,
    ) -> ServiceResult<PlayerStatus> {
        self.with_player(id, |player| {
            player.update(now);
            if let Some(activity_id) = activity {
                let definition = self
                    .catalog
                    .activity(activity_id)
                    .ok_or(ServiceError::UnknownActivity(activity_id))?;
                if !player.meets(&definition.unlock_conditions) {
                    return Err(ServiceError::ActivityLocked(activity_id));
                }
            }
            player.change_activity(activity, now);
            Ok(PlayerStatus::from_player(player))
        })?
    }

    /// Settles progress, then attempts one purchase.
    pub fn buy_upgrade(
        &self,
        id: &PlayerId,
        upgrade: UpgradeId,
        now: DateTime<Utc>,
    ) -> ServiceResult<PurchaseOutcome> {
        let definition = self
            .catalog
            .upgrade(upgrade)
            .ok_or(ServiceError::UnknownUpgrade(upgrade))?;
        self.with_player(id, |player| {
            player.update(now);
            player.buy_upgrade(definition)
        })
    }

    /// Activities the player can currently pick.
    pub fn activity_board(&self, id: &PlayerId) -> ServiceResult<Vec<ActivityListing>> {
        self.read_player(id, |player| {
            player
                .available_activities()
                .into_iter()
                .map(|activity| ActivityListing::new(player, activity))
                .collect()
        })
    }

    /// Upgrades with purchases left whose unlock conditions the player meets.
    pub fn shop(&self, id: &PlayerId) -> ServiceResult<Vec<UpgradeListing>> {
        self.read_player(id, |player| {
            self.catalog
                .upgrades()
                .filter(|upgrade| player.meets(&upgrade.unlock_conditions))
                .map(|upgrade| UpgradeListing::new(player, upgrade))
                .filter(|listing| listing.remaining > 0)
                .collect()
        })
    }

    /// Drops the in-memory copy once no call is using it. The next call reloads
    /// it from the store.
    pub fn evict(&self, id: &PlayerId) -> ServiceResult<bool> {
        let Some(handle) = self.live_handle(id)? else {
            return Ok(false);
        };
        let _player = handle.lock().map_err(|_| ServiceError::LockPoisoned)?;

        let mut players = self.players.write().map_err(|_| ServiceError::LockPoisoned)?;
        let live = players
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, &handle));
        if live {
            players.remove(id);
        }
        Ok(live)
    }

    /// Runs `apply` on a copy of the player and keeps the copy only once the
    /// store has accepted it.
    fn with_player<T>(&self, id: &PlayerId, apply: impl FnOnce(&mut Player) -> T) -> ServiceResult<T> {
        loop {
            let handle = self.handle(id)?;
            let mut player = handle.lock().map_err(|_| ServiceError::LockPoisoned)?;
            if !self.is_live(id, &handle)? {
                continue;
            }

            let mut next = player.clone();
            let value = apply(&mut next);
            self.store.save(&save_data_from_player(&next))?;
            *player = next;
            return Ok(value);
        }
    }

    fn read_player<T>(&self, id: &PlayerId, read: impl FnOnce(&Player) -> T) -> ServiceResult<T> {
        loop {
            let handle = self.handle(id)?;
            let player = handle.lock().map_err(|_| ServiceError::LockPoisoned)?;
            if self.is_live(id, &handle)? {
                return Ok(read(&player));
            }
        }
    }

    /// Whether `handle` is still the registered instance for `id`. Callers
    /// holding a handle from before an eviction must fetch a fresh one.
    fn is_live(&self, id: &PlayerId, handle: &Arc<Mutex<Player>>) -> ServiceResult<bool> {
        Ok(self
            .live_handle(id)?
            .is_some_and(|current| Arc::ptr_eq(&current, handle)))
    }

    fn live_handle(&self, id: &PlayerId) -> ServiceResult<Option<Arc<Mutex<Player>>>> {
        let players = self.players.read().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(players.get(id).map(Arc::clone))
    }

    fn handle(&self, id: &PlayerId) -> ServiceResult<Arc<Mutex<Player>>> {
        if let Some(handle) = self.live_handle(id)? {
            return Ok(handle);
        }

        let save = self
            .store
            .load(id)?
            .ok_or_else(|| ServiceError::UnknownPlayer(id.clone()))?;
        let player = player_from_save_data(&save, Arc::clone(&self.catalog));
        tracing::debug!(player = %id, "player loaded from store");

        let mut players = self.players.write().map_err(|_| ServiceError::LockPoisoned)?;
        let handle = players
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(player)));
        Ok(Arc::clone(handle))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use chrono::{Duration, TimeZone, Utc};

    use super::GameService;
    use crate::core::DefinitionCatalog;
    use crate::data::definitions_path;
    use crate::error::{ServiceError, StoreError};
    use crate::model::{ActivityId, PlayerId, PurchaseOutcome, UpgradeId};
    use crate::save::{InMemoryPlayerStore, PlayerSave, PlayerStore, StoreResult};

    fn service_with(store: impl PlayerStore + 'static) -> GameService {
        let catalog = DefinitionCatalog::load(definitions_path()).expect("bundled catalog");
        GameService::new(Arc::new(catalog), store)
    }

    /// In-memory store whose writes can be switched to fail.
    #[derive(Clone, Default)]
    struct FailingStore {
        inner: InMemoryPlayerStore,
        failing: Arc<AtomicBool>,
    }

    impl FailingStore {
        fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl PlayerStore for FailingStore {
        fn save(&self, save: &PlayerSave) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Io(io::Error::other("disk full")));
            }
            self.inner.save(save)
        }

        fn load(&self, id: &PlayerId) -> StoreResult<Option<PlayerSave>> {
            self.inner.load(id)
        }

        fn exists(&self, id: &PlayerId) -> bool {
            self.inner.exists(id)
        }

        fn list_ids(&self) -> StoreResult<Vec<PlayerId>> {
            self.inner.list_ids()
        }
    }

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn register_persists_and_rejects_duplicates() {
        let store = InMemoryPlayerStore::new();
        let service = service_with(store.clone());
        let id = PlayerId::new("42");

        let status = service.register(id.clone(), "Ann", t0()).expect("register");
        assert_eq!(status.display_name, "Ann");
        assert!(store.exists(&id));
        assert!(matches!(
            service.register(id.clone(), "Ann", t0()),
            Err(ServiceError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn unknown_player_is_reported() {
        let service = service_with(InMemoryPlayerStore::new());
        assert!(matches!(
            service.observe(&PlayerId::new("nobody"), t0()),
            Err(ServiceError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn observe_persists_progress_and_survives_eviction() {
        let store = InMemoryPlayerStore::new();
        let service = service_with(store.clone());
        let id = PlayerId::new("7");
        service.register(id.clone(), "Bo", t0()).expect("register");

        service
            .change_activity(&id, Some(ActivityId(0)), t0())
            .expect("begging is always available");
        service
            .observe(&id, t0() + Duration::seconds(1))
            .expect("observe");

        let saved = store.load(&id).expect("load").expect("saved");
        assert_eq!(saved.current_activity, Some(ActivityId(0)));
        assert!(saved.currencies[0].amount > 0.0);

        assert!(service.evict(&id).expect("evict"));
        let status = service
            .observe(&id, t0() + Duration::seconds(1))
            .expect("reload from store");
        assert!(status.currencies[0].amount > 0.0);
        assert!(status.activity.contains("Begging"));
    }

    #[test]
    fn locked_activity_is_refused() {
        let service = service_with(InMemoryPlayerStore::new());
        let id = PlayerId::new("8");
        service.register(id.clone(), "Cy", t0()).expect("register");

        let result = service.change_activity(&id, Some(ActivityId(1)), t0());

        assert!(matches!(result, Err(ServiceError::ActivityLocked(_))));
        let board = service.activity_board(&id).expect("board");
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn purchase_without_funds_is_a_noop() {
        let service = service_with(InMemoryPlayerStore::new());
        let id = PlayerId::new("9");
        service.register(id.clone(), "Di", t0()).expect("register");

        let outcome = service.buy_upgrade(&id, UpgradeId(0), t0()).expect("buy");

        assert_eq!(outcome, PurchaseOutcome::Unaffordable);
        assert!(matches!(
            service.buy_upgrade(&id, UpgradeId(99), t0()),
            Err(ServiceError::UnknownUpgrade(_))
        ));
        let shop = service.shop(&id).expect("shop");
        assert!(shop.iter().any(|listing| listing.name == "Tin cup"));
        assert!(shop.iter().all(|listing| listing.name != "Dry doorway"));
    }

    #[test]
    fn failed_save_discards_the_mutation() {
        let store = FailingStore::default();
        let service = service_with(store.clone());
        let id = PlayerId::new("10");
        let later = t0() + Duration::seconds(300);
        service.register(id.clone(), "Eli", t0()).expect("register");
        service
            .change_activity(&id, Some(ActivityId(0)), t0())
            .expect("start begging");
        let coins = service.observe(&id, later).expect("observe").currencies[0].amount;
        assert!(coins >= 10.0);

        store.fail_writes(true);
        assert!(matches!(
            service.buy_upgrade(&id, UpgradeId(0), later),
            Err(ServiceError::Store(_))
        ));
        assert!(service.observe(&id, later + Duration::seconds(60)).is_err());
        store.fail_writes(false);

        let status = service.observe(&id, later).expect("observe");
        assert!(status.upgrades.is_empty());
        assert_eq!(status.currencies[0].amount, coins);
        let saved = store.load(&id).expect("load").expect("saved");
        assert!(saved.upgrades.is_empty());
        assert_eq!(saved.last_update_time, later);
    }

    #[test]
    fn failed_registration_leaves_no_player_behind() {
        let store = FailingStore::default();
        let service = service_with(store.clone());
        let id = PlayerId::new("11");

        store.fail_writes(true);
        assert!(matches!(
            service.register(id.clone(), "Fay", t0()),
            Err(ServiceError::Store(_))
        ));
        assert!(!service.is_registered(&id).expect("registered"));
        assert!(matches!(
            service.observe(&id, t0()),
            Err(ServiceError::UnknownPlayer(_))
        ));

        store.fail_writes(false);
        service.register(id.clone(), "Fay", t0()).expect("register");
        assert!(store.exists(&id));
    }

    #[test]
    fn evict_waits_for_the_player_in_use() {
        let service = service_with(InMemoryPlayerStore::new());
        let id = PlayerId::new("12");
        service.register(id.clone(), "Gus", t0()).expect("register");
        let handle = service.handle(&id).expect("handle");

        let player = handle.lock().expect("player lock");
        thread::scope(|scope| {
            let evicting = scope.spawn(|| service.evict(&id));
            thread::sleep(std::time::Duration::from_millis(50));
            assert!(!evicting.is_finished());
            assert!(service.is_live(&id, &handle).expect("live"));

            drop(player);
            assert!(evicting.join().expect("evict thread").expect("evict"));
        });

        assert!(!service.is_live(&id, &handle).expect("live"));
        let reloaded = service.handle(&id).expect("reload");
        assert!(!Arc::ptr_eq(&reloaded, &handle));
        assert!(!service.evict(&PlayerId::new("nobody")).expect("evict"));
    }
}
