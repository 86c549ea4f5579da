use std::fmt::Write as _;

use crate::core::Player;
use crate::model::{
    ActivityDefinition, ActivityId, ModifierKind, UpgradeDefinition, UpgradeId, capitalize,
};

use super::format::{format_number, format_time};

const IDLE_TEXT: &str = "Currently doing nothing. Go get an activity!";
const RECOVERING_SUFFIX: &str = " (Recovering energy)";

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyView {
    pub current: f64,
    pub max: f64,
    pub base_recovery_rate: f64,
    pub recovery_rate: f64,
    pub recovering: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillView {
    pub name: String,
    pub level: u32,
    pub experience: f64,
    pub required: f64,
    pub last_gained: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyView {
    pub name: String,
    pub amount: f64,
    pub capacity: f64,
    pub last_gained: f64,
}

/// Read-only snapshot handed to whatever renders a player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub display_name: String,
    pub title: String,
    pub time_since_last_update: f64,
    pub energy: EnergyView,
    pub skills: Vec<SkillView>,
    pub currencies: Vec<CurrencyView>,
    pub activity: String,
    /// `Name` or `Name x3`.
    pub upgrades: Vec<String>,
}

impl PlayerStatus {
    pub fn from_player(player: &Player) -> Self {
        let energy = player.energy();
        let mut activity = player
            .current_activity()
            .map_or_else(|| IDLE_TEXT.to_string(), |current| current.status_description.clone());
        if energy.is_recovering() {
            activity.push_str(RECOVERING_SUFFIX);
        }

        let catalog = player.catalog();
        let upgrades = player
            .upgrades()
            .filter_map(|owned| {
                let name = &catalog.upgrade(owned.id)?.name;
                Some(if owned.count == 1 {
                    name.clone()
                } else {
                    format!("{name} x{}", owned.count)
                })
            })
            .collect();

        Self {
            display_name: player.display_name.clone(),
            title: player.title.clone(),
            time_since_last_update: player.time_since_last_update(),
            energy: EnergyView {
                current: energy.current(),
                max: energy.max(),
                base_recovery_rate: energy.base_recovery_rate(),
                recovery_rate: energy.recovery_rate(),
                recovering: energy.is_recovering(),
            },
            skills: player
                .skills()
                .map(|skill| SkillView {
                    name: skill.name.clone(),
                    level: skill.level(),
                    experience: skill.experience(),
                    required: skill.experience_required_for_next_level(),
                    last_gained: skill.last_gained,
                })
                .collect(),
            currencies: player
                .currencies()
                .map(|currency| CurrencyView {
                    name: currency.name.clone(),
                    amount: currency.amount(),
                    capacity: currency.capacity(),
                    last_gained: currency.last_gained,
                })
                .collect(),
            activity,
            upgrades,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityListing {
    pub id: ActivityId,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub output_currency: String,
    pub base_output: f64,
    pub effective_output: f64,
    pub energy_drain_rate: f64,
    pub requirements: Vec<String>,
    pub current: bool,
}

impl ActivityListing {
    pub fn new(player: &Player, activity: &ActivityDefinition) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            icon: activity.icon.clone(),
            description: activity.description.clone(),
            output_currency: player
                .catalog()
                .currency_name(activity.output_currency)
                .to_string(),
            base_output: activity.output_amount,
            effective_output: player.effective_output(activity),
            energy_drain_rate: activity.energy_drain_rate,
            requirements: activity
                .unlock_conditions
                .iter()
                .map(ToString::to_string)
                .collect(),
            current: player.current_activity_id() == Some(activity.id),
        }
    }

    pub fn bonus_output(&self) -> f64 {
        (self.effective_output - self.base_output).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeListing {
    pub id: UpgradeId,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub cost_currency: String,
    pub owned: u32,
    pub remaining: u32,
    pub affordable: bool,
    pub effects: Vec<String>,
    pub unlocks: Vec<String>,
    pub requirements: Vec<String>,
}

impl UpgradeListing {
    pub fn new(player: &Player, upgrade: &UpgradeDefinition) -> Self {
        let catalog = player.catalog();
        let owned = player.upgrade_count(upgrade.id);
        let affordable = player
            .currency(upgrade.cost_currency)
            .is_some_and(|currency| currency.amount() >= upgrade.cost);

        Self {
            id: upgrade.id,
            name: upgrade.name.clone(),
            description: upgrade.description.clone(),
            cost: upgrade.cost,
            cost_currency: catalog.currency_name(upgrade.cost_currency).to_string(),
            owned,
            remaining: upgrade.max_purchases.saturating_sub(owned),
            affordable,
            effects: upgrade
                .effects
                .iter()
                .map(|effect| {
                    let symbol = match effect.kind {
                        ModifierKind::Increase => '+',
                        ModifierKind::Multiplier => 'x',
                    };
                    format!(
                        "{} by {symbol}{}",
                        capitalize(&catalog.stat_label(effect.stat)),
                        format_number(effect.value)
                    )
                })
                .collect(),
            unlocks: upgrade.unlocks.clone(),
            requirements: upgrade
                .unlock_conditions
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Multi-line status block.
pub fn render_status(status: &PlayerStatus) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}: {}", status.title, status.display_name);
    let _ = writeln!(
        text,
        "Time passed: {}",
        format_time(status.time_since_last_update)
    );

    let energy = &status.energy;
    let _ = write!(
        text,
        "Energy: {}/{} - Recovery Rate: {}",
        format_number(energy.current),
        format_number(energy.max),
        format_number(energy.base_recovery_rate)
    );
    if energy.recovery_rate > energy.base_recovery_rate {
        let _ = write!(
            text,
            " +{}",
            format_number(energy.recovery_rate - energy.base_recovery_rate)
        );
    }
    text.push('\n');

    for skill in &status.skills {
        let _ = write!(
            text,
            "{}: Level {} - Exp: {}/{}",
            capitalize(&skill.name),
            skill.level,
            format_number(skill.experience),
            format_number(skill.required)
        );
        if skill.last_gained > 0.0 {
            let _ = write!(text, " (+{})", format_number(skill.last_gained));
        }
        text.push('\n');
    }

    let _ = writeln!(text, "Activity: {}", status.activity);

    for currency in &status.currencies {
        let _ = write!(
            text,
            "{}: {}/{}",
            capitalize(&currency.name),
            format_number(currency.amount),
            format_number(currency.capacity)
        );
        if currency.last_gained > 0.0 {
            let _ = write!(text, " (+{})", format_number(currency.last_gained));
        }
        text.push('\n');
    }

    if !status.upgrades.is_empty() {
        let _ = writeln!(text, "Upgrades: {}", status.upgrades.join(", "));
    }
    text
}

/// One line per activity, numbered from 1 to match the shell's digit keys.
pub fn render_activities(listings: &[ActivityListing]) -> String {
    let mut text = String::new();
    for (index, listing) in listings.iter().enumerate() {
        let marker = if listing.current { "*" } else { " " };
        let _ = write!(
            text,
            "{marker}{} {}: {:.2} {}/s",
            index + 1,
            listing.name,
            listing.base_output,
            listing.output_currency
        );
        if listing.bonus_output() > 0.0 {
            let _ = write!(text, " (+{:.2})", listing.bonus_output());
        }
        let _ = writeln!(
            text,
            ", drains {} energy/s",
            format_number(listing.energy_drain_rate)
        );
    }
    text
}

/// Shop lines; `selected` is highlighted with `>`.
pub fn render_shop(listings: &[UpgradeListing], selected: Option<UpgradeId>) -> String {
    if listings.is_empty() {
        return "No more available upgrades to buy.\n".to_string();
    }

    let mut text = String::new();
    for listing in listings {
        let marker = if Some(listing.id) == selected { ">" } else { " " };
        let _ = write!(
            text,
            "{marker} {}: {} {} (remaining {})",
            listing.name,
            format_number(listing.cost),
            listing.cost_currency,
            listing.remaining
        );
        if !listing.effects.is_empty() {
            let _ = write!(text, " - {}", listing.effects.join("; "));
        }
        text.push('\n');
    }
    text
}
