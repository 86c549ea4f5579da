use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::{PlayerSave, SAVE_VERSION};

pub fn save_to_json_string(save_data: &PlayerSave) -> Result<String> {
    serde_json::to_string(save_data).context("failed to serialize player save to JSON")
}

pub fn save_to_pretty_json_string(save_data: &PlayerSave) -> Result<String> {
    serde_json::to_string_pretty(save_data).context("failed to serialize player save to JSON")
}

/// Parses a save, refusing records written by a newer format version.
pub fn load_from_json_string(json: &str) -> Result<PlayerSave> {
    let save: PlayerSave = serde_json::from_str(json).context("failed to parse player save JSON")?;
    if save.version > SAVE_VERSION {
        bail!(
            "player save for {} has version {}, newest supported is {SAVE_VERSION}",
            save.player_id,
            save.version
        );
    }
    Ok(save)
}

/// Portable single-line form for copying a save between machines.
pub fn export_to_base64(save_data: &PlayerSave) -> Result<String> {
    let json = save_to_json_string(save_data)?;
    Ok(STANDARD.encode(json))
}

pub fn import_from_base64(encoded: &str) -> Result<PlayerSave> {
    let raw = STANDARD
        .decode(encoded.trim())
        .context("failed to decode base64 player save")?;
    let json = String::from_utf8(raw).context("decoded player save is not UTF-8")?;
    load_from_json_string(&json)
}
