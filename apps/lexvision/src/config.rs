use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use shared::{domain::DetailLevel, protocol::DEFAULT_LANGUAGE};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "lexvision.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub download_dir: PathBuf,
    pub export_file_name: String,
    pub language: String,
    pub detail_level: DetailLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8001".into(),
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            export_file_name: "legal_analysis.pdf".into(),
            language: DEFAULT_LANGUAGE.into(),
            detail_level: DetailLevel::Concise,
        }
    }
}

/// Defaults, then `config_path` if it exists, then environment overrides.
/// Unreadable or invalid entries are logged and skipped.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => apply_file(&mut settings, &raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("ignoring config file '{}': {err}", config_path.display()),
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("config file is not a flat table of strings: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("download_dir") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("export_file_name") {
        settings.export_file_name = v.clone();
    }
    if let Some(v) = file_cfg.get("language") {
        settings.language = v.clone();
    }
    if let Some(v) = file_cfg.get("detail_level") {
        set_detail_level(settings, v);
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("LEXVISION_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("LEXVISION_DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = var("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    if let Some(v) = var("APP__EXPORT_FILE_NAME") {
        settings.export_file_name = v;
    }
    if let Some(v) = var("APP__LANGUAGE") {
        settings.language = v;
    }
    if let Some(v) = var("APP__DETAIL_LEVEL") {
        set_detail_level(settings, &v);
    }
}

fn set_detail_level(settings: &mut Settings, raw: &str) {
    match raw.parse() {
        Ok(level) => settings.detail_level = level,
        Err(err) => warn!("ignoring detail level: {err}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
