use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{
    ActivityDefinition, ActivityId, Currency, CurrencyId, Energy, ModifierSet, OwnedUpgrade,
    PlayerId, PurchaseOutcome, Skill, SkillId, StatKey, UnlockCondition, UpgradeDefinition,
    UpgradeId,
};

use super::catalog::DefinitionCatalog;

const DEFAULT_TITLE: &str = "Beggar";

/// Aggregate root for one player's idle progress.
///
/// Energy is always present: a player can only be built through [`Player::new`],
/// which sizes the pool from the catalog's energy skill.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub title: String,
    catalog: Arc<DefinitionCatalog>,
    energy: Energy,
    skills: BTreeMap<SkillId, Skill>,
    currencies: BTreeMap<CurrencyId, Currency>,
    upgrades: BTreeMap<UpgradeId, OwnedUpgrade>,
    modifiers: ModifierSet,
    granted_unlocks: BTreeSet<String>,
    current_activity: Option<ActivityId>,
    last_update_time: DateTime<Utc>,
    time_since_last_update: f64,
}

impl Player {
    /// Registers a fresh player: every catalog skill at its start level, every
    /// currency empty, a full energy pool.
    pub fn new(
        id: PlayerId,
        display_name: impl Into<String>,
        catalog: Arc<DefinitionCatalog>,
        now: DateTime<Utc>,
    ) -> Self {
        let skills = catalog
            .skills()
            .map(|definition| (definition.id, Skill::new(definition)))
            .collect();
        let currencies = catalog
            .currencies()
            .map(|definition| (definition.id, Currency::new(definition)))
            .collect();
        let base_recovery_rate = catalog.config().base_recovery_rate;

        let mut player = Self {
            id,
            display_name: display_name.into(),
            title: DEFAULT_TITLE.to_string(),
            catalog,
            energy: Energy::new(0.0, base_recovery_rate),
            skills,
            currencies,
            upgrades: BTreeMap::new(),
            modifiers: ModifierSet::default(),
            granted_unlocks: BTreeSet::new(),
            current_activity: None,
            last_update_time: now,
            time_since_last_update: 0.0,
        };
        player.energy = Energy::new(player.max_energy(), base_recovery_rate);
        player.recalculate_stat_modifiers();
        player
    }

    pub fn catalog(&self) -> &Arc<DefinitionCatalog> {
        &self.catalog
    }

    pub fn energy(&self) -> &Energy {
        &self.energy
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.get(&id)
    }

    pub fn energy_skill(&self) -> Option<&Skill> {
        self.skill(self.catalog.energy_skill())
    }

    pub fn currencies(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }

    pub fn currency(&self, id: CurrencyId) -> Option<&Currency> {
        self.currencies.get(&id)
    }

    pub fn currency_by_name(&self, name: &str) -> Option<&Currency> {
        self.currencies
            .values()
            .find(|currency| currency.name.eq_ignore_ascii_case(name))
    }

    pub fn upgrades(&self) -> impl Iterator<Item = &OwnedUpgrade> {
        self.upgrades.values()
    }

    pub fn upgrade_count(&self, id: UpgradeId) -> u32 {
        self.upgrades.get(&id).map_or(0, |owned| owned.count)
    }

    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    pub fn granted_unlocks(&self) -> &BTreeSet<String> {
        &self.granted_unlocks
    }

    pub fn current_activity(&self) -> Option<&ActivityDefinition> {
        self.current_activity
            .and_then(|id| self.catalog.activity(id))
    }

    pub fn current_activity_id(&self) -> Option<ActivityId> {
        self.current_activity
    }

    pub fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }

    /// Seconds covered by the most recent reconciliation that did any work.
    pub fn time_since_last_update(&self) -> f64 {
        self.time_since_last_update
    }

    pub fn max_energy(&self) -> f64 {
        let level = self.energy_skill().map_or(0, Skill::level);
        f64::from(level) * self.catalog.config().energy_per_level
    }

    /// Output per second of `activity` after this player's gain modifiers.
    pub fn effective_output(&self, activity: &ActivityDefinition) -> f64 {
        self.modifiers
            .apply(StatKey::Gain(activity.output_currency), activity.output_amount)
    }

    pub fn meets(&self, conditions: &[UnlockCondition]) -> bool {
        conditions.iter().all(|condition| {
            condition.is_satisfied(
                |skill| self.skill(skill).map(Skill::level),
                &self.granted_unlocks,
            )
        })
    }

    pub fn available_activities(&self) -> Vec<&ActivityDefinition> {
        self.catalog
            .activities()
            .filter(|activity| self.meets(&activity.unlock_conditions))
            .collect()
    }

    /// Brings the player up to date for `now`, then switches activity. `None`
    /// stops the current one.
    pub fn change_activity(&mut self, activity: Option<ActivityId>, now: DateTime<Utc>) {
        self.update(now);
        self.current_activity = activity;
    }

    pub fn stop_activity(&mut self, now: DateTime<Utc>) {
        self.change_activity(None, now);
    }

    /// Replays the time since the last observation as alternating recovery and
    /// production phases.
    pub fn update(&mut self, now: DateTime<Utc>) {
        let elapsed = seconds_between(self.last_update_time, now);
        if elapsed <= 0.0 || elapsed < self.catalog.config().min_update_seconds {
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        match self.current_activity.and_then(|id| catalog.activity(id)) {
            Some(activity) => self.reconcile_activity(activity, elapsed),
            None => {
                if !self.energy.is_full() {
                    self.energy.recover(elapsed);
                }
                self.clear_last_gained();
            }
        }

        self.time_since_last_update = elapsed;
        self.last_update_time = now;
    }

    fn reconcile_activity(&mut self, activity: &ActivityDefinition, elapsed: f64) {
        let skill_snapshot: BTreeMap<SkillId, f64> = self
            .skills
            .values()
            .map(|skill| (skill.id, skill.total_experience()))
            .collect();
        let currency_snapshot: BTreeMap<CurrencyId, f64> = self
            .currencies
            .values()
            .map(|currency| (currency.id, currency.amount()))
            .collect();

        let min_step = self.catalog.config().min_step_seconds;
        let mut remaining = elapsed;
        let mut steps = 0_u32;

        while remaining >= min_step {
            if !self.energy.is_recovering() && self.energy.current() <= 0.0 {
                // An empty pool that was never flagged (e.g. restored) starts recovering.
                self.energy.deplete(0.0);
            }

            let consumed = if self.energy.is_recovering() {
                self.energy.recover(remaining)
            } else {
                self.produce(activity, remaining)
            };

            if consumed <= 0.0 {
                tracing::debug!(
                    player = %self.id,
                    remaining,
                    "energy cannot recover; remaining time spent idle"
                );
                break;
            }
            remaining -= consumed;
            steps += 1;
        }

        for skill in self.skills.values_mut() {
            skill.last_gained = match skill_snapshot.get(&skill.id) {
                Some(before) => (skill.total_experience() - before).max(0.0),
                None => skill.total_experience(),
            };
        }
        for currency in self.currencies.values_mut() {
            currency.last_gained = match currency_snapshot.get(&currency.id) {
                Some(before) => (currency.amount() - before).max(0.0),
                None => currency.amount(),
            };
        }

        tracing::trace!(player = %self.id, elapsed, steps, "reconciled activity");
    }

    /// One production step. Returns the seconds of activity the spent energy paid for.
    fn produce(&mut self, activity: &ActivityDefinition, remaining: f64) -> f64 {
        let drain_rate = activity.energy_drain_rate;
        let energy_to_use = self.energy.current().min(remaining * drain_rate);
        let activity_count = energy_to_use / drain_rate;

        let amount_to_add = activity_count * self.effective_output(activity);
        if let Some(currency) = self.currencies.get_mut(&activity.output_currency) {
            currency.add_amount(amount_to_add);
        }

        let spent = self.energy.deplete(energy_to_use);
        let energy_skill = self.catalog.energy_skill();
        let leveled_up = self
            .skills
            .get_mut(&energy_skill)
            .is_some_and(|skill| skill.add_experience(spent));
        if leveled_up {
            self.rebuild_energy();
        }

        activity_count
    }

    /// Replaces the pool after the energy skill's level changed.
    fn rebuild_energy(&mut self) {
        self.energy = self.energy.with_max(self.max_energy());
        self.energy
            .apply_recovery_modifier(self.modifiers.get(StatKey::EnergyRecovery));
        tracing::debug!(player = %self.id, max = self.energy.max(), "energy ceiling raised");
    }

    fn clear_last_gained(&mut self) {
        for skill in self.skills.values_mut() {
            skill.last_gained = 0.0;
        }
        for currency in self.currencies.values_mut() {
            currency.last_gained = 0.0;
        }
    }

    /// Buys one more of `upgrade`. All-or-nothing: anything but
    /// [`PurchaseOutcome::Purchased`] leaves the player untouched.
    pub fn buy_upgrade(&mut self, upgrade: &UpgradeDefinition) -> PurchaseOutcome {
        let Some(currency) = self.currencies.get(&upgrade.cost_currency) else {
            return PurchaseOutcome::MissingCurrency;
        };
        if currency.amount() < upgrade.cost {
            return PurchaseOutcome::Unaffordable;
        }
        if !self.meets(&upgrade.unlock_conditions) {
            return PurchaseOutcome::Locked;
        }
        let count = self.upgrade_count(upgrade.id) + 1;
        if count > upgrade.max_purchases {
            return PurchaseOutcome::MaxedOut;
        }

        let paid = self
            .currencies
            .get_mut(&upgrade.cost_currency)
            .is_some_and(|currency| currency.spend(upgrade.cost));
        if !paid {
            return PurchaseOutcome::Unaffordable;
        }

        self.upgrades.insert(
            upgrade.id,
            OwnedUpgrade {
                id: upgrade.id,
                count,
            },
        );
        self.recalculate_stat_modifiers();
        self.update_unlock_conditions();

        tracing::info!(player = %self.id, upgrade = %upgrade.name, count, "upgrade purchased");
        PurchaseOutcome::Purchased { count }
    }

    fn recalculate_stat_modifiers(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        self.modifiers = ModifierSet::from_owned(self.upgrades.values().filter_map(|owned| {
            catalog
                .upgrade(owned.id)
                .map(|definition| (definition, owned.count))
        }));

        self.energy
            .apply_recovery_modifier(self.modifiers.get(StatKey::EnergyRecovery));
        for currency in self.currencies.values_mut() {
            currency.apply_capacity_modifier(self.modifiers.get(StatKey::Capacity(currency.id)));
        }
    }

    fn update_unlock_conditions(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        self.granted_unlocks = self
            .upgrades
            .values()
            .filter_map(|owned| catalog.upgrade(owned.id))
            .flat_map(|definition| definition.unlocks.iter().cloned())
            .collect();
    }

    // Restoration hooks used by the save bridge. Call `finish_restore` last.

    pub(crate) fn restore_skill(&mut self, id: SkillId, level: u32, experience: f64, total: f64) {
        if let Some(definition) = self.catalog.skill(id) {
            self.skills
                .insert(id, Skill::restored(definition, level, experience, total));
        }
    }

    pub(crate) fn restore_upgrade(&mut self, id: UpgradeId, count: u32) {
        let Some(definition) = self.catalog.upgrade(id) else {
            return;
        };
        let count = count.min(definition.max_purchases);
        if count > 0 {
            self.upgrades.insert(id, OwnedUpgrade { id, count });
        }
    }

    pub(crate) fn restore_activity(&mut self, activity: Option<ActivityId>) {
        self.current_activity = activity.filter(|id| self.catalog.activity(*id).is_some());
    }

    pub(crate) fn restore_timing(&mut self, last_update_time: DateTime<Utc>, since_last: f64) {
        self.last_update_time = last_update_time;
        self.time_since_last_update = since_last;
    }

    /// Rebuilds derived state, then applies amounts that depend on it.
    pub(crate) fn finish_restore(
        &mut self,
        currency_amounts: &[(CurrencyId, f64)],
        energy: Option<(f64, bool)>,
    ) {
        let base_recovery_rate = self.catalog.config().base_recovery_rate;
        self.energy = match energy {
            Some((current, recovering)) => {
                Energy::restored(self.max_energy(), base_recovery_rate, current, recovering)
            }
            None => Energy::new(self.max_energy(), base_recovery_rate),
        };
        self.recalculate_stat_modifiers();
        self.update_unlock_conditions();

        for (id, amount) in currency_amounts {
            if let Some(currency) = self.currencies.get_mut(id) {
                currency.set_amount(*amount);
            }
        }
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}
