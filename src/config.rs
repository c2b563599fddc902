use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the application config directory path
pub fn get_app_config_dir() -> Result<PathBuf> {
    // Get directory using XDG Base Directory specification
    let xdg_dirs = xdg::BaseDirectories::with_prefix("m365ctl")
        .map_err(|e| anyhow::anyhow!("Failed to initialize XDG base directories: {}", e))?;

    let app_config_dir = xdg_dirs.get_config_home();

    // Ensure directory exists
    if !app_config_dir.exists() {
        fs::create_dir_all(&app_config_dir)?;
    }

    Ok(app_config_dir)
}

/// Get the path to a configuration file
pub fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    let config_dir = get_app_config_dir()?;
    Ok(config_dir.join(filename))
}

/// Place a config file and ensure its parent directory exists
pub fn place_config_file(filename: &str) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("m365ctl")
        .map_err(|e| anyhow::anyhow!("Failed to initialize XDG base directories: {}", e))?;

    xdg_dirs
        .place_config_file(filename)
        .map_err(|e| anyhow::anyhow!("Failed to determine path for {}: {}", filename, e))
}

/// User settings stored in settings.yaml under the config directory.
///
/// `prompt` controls whether commands may ask interactive questions:
/// disambiguation between multiple lookup matches and confirmation of
/// destructive actions. Scripts and CI turn it off.
#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_prompt")]
    pub prompt: bool,
}

fn default_prompt() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self { prompt: true }
    }
}

impl Settings {
    /// Load settings from disk; a missing or empty file means defaults
    pub fn load() -> Result<Self> {
        let path = get_config_file_path("settings.yaml")?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(&contents)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompting_is_enabled_by_default() {
        assert!(Settings::default().prompt);
    }

    #[test]
    fn test_settings_parse_from_yaml() {
        let settings: Settings = serde_yaml::from_str("prompt: false").unwrap();
        assert!(!settings.prompt);

        // unknown keys and missing keys both fall back cleanly
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert!(settings.prompt);
    }
}
