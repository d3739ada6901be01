use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::ui::settings::Settings;

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("npc_dialogue");
    path.push("settings.json");
    path
}

/// Settings from the config dir, or defaults if missing or unreadable.
pub fn load_settings() -> Settings {
    let path = settings_path();
    match load_settings_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::info!("using default settings ({e:#})");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) {
    if let Err(e) = save_settings_to(&settings_path(), settings) {
        log::warn!("could not save settings: {e:#}");
    }
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::envelope::DialogueMode;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.mode = DialogueMode::Unguided;
        settings.shared_knowledge = "The elevator is out.".into();
        save_settings_to(&path, &settings).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_or_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(load_settings_from(&path).is_err());

        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings_from(&path).is_err());
    }
}
