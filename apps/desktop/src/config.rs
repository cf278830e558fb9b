use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use code_entry::EntrySettings;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub destination: String,
    pub session_token: Option<String>,
    pub resend_cooldown_secs: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8443".into(),
            destination: String::new(),
            session_token: None,
            resend_cooldown_secs: EntrySettings::default().resend_cooldown_secs,
            request_timeout_secs: 15,
        }
    }
}

impl Settings {
    pub fn entry_settings(&self) -> EntrySettings {
        EntrySettings {
            resend_cooldown_secs: self.resend_cooldown_secs,
            ..EntrySettings::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    destination: Option<String>,
    session_token: Option<String>,
    resend_cooldown_secs: Option<u32>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file at `path` if it exists, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.destination {
        settings.destination = v;
    }
    if let Some(v) = file_cfg.session_token {
        settings.session_token = Some(v);
    }
    if let Some(v) = file_cfg.resend_cooldown_secs {
        settings.resend_cooldown_secs = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }

    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let first = |keys: &[&str]| keys.iter().rev().find_map(|key| lookup(key));

    if let Some(v) = first(&["TWOFACTOR_SERVER_URL", "APP__SERVER_URL"]) {
        settings.server_url = v;
    }
    if let Some(v) = first(&["TWOFACTOR_DESTINATION", "APP__DESTINATION"]) {
        settings.destination = v;
    }
    if let Some(v) = first(&["TWOFACTOR_SESSION_TOKEN", "APP__SESSION_TOKEN"]) {
        settings.session_token = Some(v);
    }

    if let Some(v) = lookup("APP__RESEND_COOLDOWN_SECS") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.resend_cooldown_secs = parsed;
        }
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
