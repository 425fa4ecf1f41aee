//! Startup settings: environment variables, optionally overridden by a JSON
//! settings file.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Deserialize;
use tracing::info;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_SETTINGS_FILE: &str = "gatekeeper.json";
const SERVER_DATA_FILE: &str = "server_data.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    data_folder: Option<String>,
}

#[derive(Debug)]
pub struct Settings {
    pub token: String,
    pub data_dir: PathBuf,
    pub throttle_enabled: bool,
    pub greeting_enabled: bool,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings_path = env::var("GATEKEEPER_SETTINGS")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_FILE.to_owned());
        let file = read_settings_file(Path::new(&settings_path))?;

        let token = file
            .token
            .filter(|token| !token.trim().is_empty())
            .or_else(|| env::var("DISCORD_TOKEN").ok())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN is not set and {settings_path} has no token"))?;

        let data_dir = file
            .data_folder
            .filter(|folder| !folder.trim().is_empty())
            .or_else(|| env::var("GATEKEEPER_DATA_DIR").ok())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned());

        Ok(Self {
            token,
            data_dir: PathBuf::from(data_dir),
            throttle_enabled: env_bool("GATEKEEPER_THROTTLE_ENABLED", true),
            greeting_enabled: env_bool("GATEKEEPER_GREETING_ENABLED", true),
        })
    }

    pub fn server_data_path(&self) -> PathBuf {
        self.data_dir.join(SERVER_DATA_FILE)
    }
}

fn read_settings_file(path: &Path) -> anyhow::Result<SettingsFile> {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            info!(path = %path.display(), "Reading settings file...");
            parse_settings(&raw).with_context(|| format!("failed to parse {}", path.display()))
        }
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(SettingsFile::default()),
        Err(source) => Err(source).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn parse_settings(raw: &str) -> anyhow::Result<SettingsFile> {
    Ok(serde_json::from_str(raw)?)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_settings;

    #[test]
    fn reads_camel_case_fields() {
        let settings =
            parse_settings(r#"{"token": "abc", "dataFolder": "/srv/data"}"#).expect("parse");

        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.data_folder.as_deref(), Some("/srv/data"));
    }

    #[test]
    fn missing_fields_are_optional() {
        let settings = parse_settings("{}").expect("parse");

        assert!(settings.token.is_none());
        assert!(settings.data_folder.is_none());
    }
}
