//! Layered settings: defaults, then `adventure.toml`, then environment.
//!
//! Command-line flags are applied on top by `main`.

use std::fs;
use std::path::Path;

use adventure_core::{ChapterLimit, ControllerConfig, RestartMode};
use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "adventure.toml";
pub const CHAPTERS_ENV: &str = "ADVENTURE_CHAPTERS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub service_url: String,
    pub chapters: ChapterLimit,
    pub restart_mode: RestartMode,
    pub release_on_restart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: story_client::DEFAULT_BASE_URL.into(),
            chapters: ChapterLimit::DEFAULT,
            restart_mode: RestartMode::Setup,
            release_on_restart: false,
        }
    }
}

/// Keys accepted in the config file. All optional.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    chapters: Option<ChapterLimit>,
    restart_mode: Option<RestartMode>,
    release_on_restart: Option<bool>,
}

impl Settings {
    /// Load settings from `path` (if it exists) and the process environment.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut settings = Settings::default();

        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            settings
                .apply_file(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file.service_url {
            self.service_url = v;
        }
        if let Some(v) = file.chapters {
            self.chapters = v;
        }
        if let Some(v) = file.restart_mode {
            self.restart_mode = v;
        }
        if let Some(v) = file.release_on_restart {
            self.release_on_restart = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup(story_client::BASE_URL_ENV) {
            self.service_url = v;
        }
        if let Some(v) = lookup(CHAPTERS_ENV) {
            self.chapters = ChapterLimit::parse(&v).with_context(|| format!("invalid {CHAPTERS_ENV}"))?;
        }
        Ok(())
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::new()
            .with_chapter_limit(self.chapters)
            .with_restart_mode(self.restart_mode)
            .with_release_on_restart(self.release_on_restart)
    }
}

/// `clap` value parser for `--restart-mode`.
pub fn parse_restart_mode(value: &str) -> Result<RestartMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "setup" => Ok(RestartMode::Setup),
        "immediate" => Ok(RestartMode::Immediate),
        other => Err(format!("unknown restart mode '{other}' (expected 'setup' or 'immediate')")),
    }
}
