use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::time::secs_to_ms;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: Logging,
    pub editor: EditorCfg,
    pub output: OutputCfg,
}

impl Config {
    pub fn load(path_opt: Option<&Path>) -> Result<Self> {
        let default_path = Path::new("cuedit.toml");
        let path = if let Some(p) = path_opt {
            Some(p)
        } else if default_path.exists() {
            Some(default_path)
        } else {
            None
        };

        let mut cfg = Config::default();

        if let Some(path) = path {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading config file: {}", path.display()))?;
            cfg = toml::from_str(&raw)
                .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let d = self.editor.default_cue_duration;
        if !secs_to_ms(d).is_some_and(|ms| ms > 0) {
            bail!("editor.default_cue_duration must be a positive number of seconds, got {d}");
        }
        Ok(())
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        let s = toml::to_string_pretty(self).context("failed serializing config as TOML")?;
        Ok(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Tunables of the editing model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorCfg {
    /// Quiet period before buffered caption text is committed.
    pub coalesce_delay_ms: u64,
    /// How long auto-scroll stays off after the user scrolls the list.
    pub scroll_cooldown_ms: u64,
    /// Length in seconds of a newly added cue.
    pub default_cue_duration: f64,
}

impl EditorCfg {
    /// Never below 1 ms, even for a config that skipped validation.
    pub fn default_cue_duration_ms(&self) -> i64 {
        secs_to_ms(self.default_cue_duration).unwrap_or(0).max(1)
    }
}

impl Default for EditorCfg {
    fn default() -> Self {
        Self {
            coalesce_delay_ms: 400,
            scroll_cooldown_ms: 1_500,
            default_cue_duration: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputCfg {
    pub pretty: bool,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self { pretty: true }
    }
}

pub fn init_tracing(logging: &Logging, cli_override_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli_override_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let is_json = logging.format.to_lowercase() == "json";

    // stdout carries the replay report, so logs go to stderr.
    if is_json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .event_format(fmt::format().json())
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .pretty()
            .init();
    }

    tracing::info!(
        level = level,
        format = logging.format.as_str(),
        "logging initialized"
    );

    Ok(())
}
