mod format;
mod status;

pub use format::{format_number, format_time};
pub use status::{
    ActivityListing, CurrencyView, EnergyView, PlayerStatus, SkillView, UpgradeListing,
    render_activities, render_shop, render_status,
};
