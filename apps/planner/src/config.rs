use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use client_core::PlanClientOptions;
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "planner.toml";
const CONFIG_DIR_NAME: &str = "fln_planner";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub service_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn plan_client_options(&self) -> PlanClientOptions {
        PlanClientOptions {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    export_dir: Option<PathBuf>,
}

/// Defaults, then the user config file, then `./planner.toml`, then env.
pub fn load_settings() -> Settings {
    let mut files = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        files.push(dir.join(CONFIG_DIR_NAME).join(SETTINGS_FILE));
    }
    files.push(PathBuf::from(SETTINGS_FILE));
    load_settings_from(&files, |key| std::env::var(key).ok())
}

pub fn load_settings_from(files: &[PathBuf], env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    for path in files {
        if let Some(file_cfg) = read_settings_file(path) {
            apply_file_settings(&mut settings, file_cfg);
        }
    }

    if let Some(v) = env("PLANNER_SERVICE_URL").or_else(|| env("APP__SERVICE_URL")) {
        settings.service_url = v;
    }

    if let Some(v) = env("PLANNER_REQUEST_TIMEOUT_SECS").or_else(|| env("APP__REQUEST_TIMEOUT_SECS")) {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric request timeout"),
        }
    }

    if let Some(v) = env("PLANNER_EXPORT_DIR").or_else(|| env("APP__EXPORT_DIR")) {
        settings.export_dir = PathBuf::from(v);
    }

    settings.service_url = normalize_service_url(&settings.service_url);
    settings
}

fn read_settings_file(path: &Path) -> Option<FileSettings> {
    let raw = fs::read_to_string(path).ok()?;
    match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => Some(file_cfg),
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
            None
        }
    }
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.service_url {
        settings.service_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.connect_timeout_secs {
        settings.connect_timeout_secs = v;
    }
    if let Some(v) = file_cfg.export_dir {
        settings.export_dir = v;
    }
}

pub fn normalize_service_url(raw_service_url: &str) -> String {
    let raw_service_url = raw_service_url.trim().trim_end_matches('/');

    if raw_service_url.is_empty() {
        return Settings::default().service_url;
    }

    if raw_service_url.contains("://") {
        return raw_service_url.to_string();
    }

    format!("http://{raw_service_url}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
