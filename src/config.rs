use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::{
    DriverScript, RenderOptions, DEFAULT_PROBE_TIMEOUT, DEFAULT_PROCESS_TIMEOUT, DEFAULT_RENDERER,
};
use crate::{PhandomError, Result};

/// Environment variable that overrides the configured renderer command.
pub const RENDERER_ENV: &str = "PHANDOM_RENDERER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub renderer: RendererConfig,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Replaces the bundled driver script.
    pub driver: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_RENDERER.to_string(),
            args: Vec::new(),
            driver: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub process: Duration,
    #[serde(with = "humantime_serde")]
    pub probe: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            process: DEFAULT_PROCESS_TIMEOUT,
            probe: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl Config {
    /// Loads a TOML config file, or defaults when `path` is `None`.
    ///
    /// `PHANDOM_RENDERER` overrides the renderer command in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    PhandomError::config(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_overrides(std::env::var(RENDERER_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PhandomError::config(format!("Invalid config: {}", e)))
    }

    fn apply_overrides(&mut self, renderer: Option<String>) {
        if let Some(command) = renderer.filter(|c| !c.trim().is_empty()) {
            self.renderer.command = command;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.renderer.command.trim().is_empty() {
            return Err(PhandomError::config("renderer.command must not be empty"));
        }
        if self.timeouts.process.is_zero() {
            return Err(PhandomError::config("timeouts.process must be greater than zero"));
        }
        if self.timeouts.probe.is_zero() {
            return Err(PhandomError::config("timeouts.probe must be greater than zero"));
        }
        Ok(())
    }

    /// Builds render options, reading the custom driver script if one is set.
    pub fn render_options(&self) -> Result<RenderOptions> {
        let driver = match &self.renderer.driver {
            Some(path) => DriverScript::Custom(fs::read_to_string(path).map_err(|e| {
                PhandomError::config(format!("Failed to read driver {}: {}", path.display(), e))
            })?),
            None => DriverScript::Bundled,
        };
        Ok(RenderOptions {
            command: self.renderer.command.clone(),
            extra_args: self.renderer.args.clone(),
            driver,
            process_timeout: self.timeouts.process,
            probe_timeout: self.timeouts.probe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.renderer.command, "phantomjs");
        assert!(cfg.renderer.args.is_empty());
        assert!(cfg.renderer.driver.is_none());
        assert_eq!(cfg.timeouts.process, Duration::from_secs(45));
        assert_eq!(cfg.timeouts.probe, Duration::from_secs(5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_toml_with_humantime_durations() {
        let cfg = Config::from_toml_str(
            r#"
            [renderer]
            command = "/opt/phantomjs/bin/phantomjs"
            args = ["--ignore-ssl-errors=true"]

            [timeouts]
            process = "1m 30s"
            probe = "500ms"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.renderer.command, "/opt/phantomjs/bin/phantomjs");
        assert_eq!(cfg.renderer.args, vec!["--ignore-ssl-errors=true"]);
        assert_eq!(cfg.timeouts.process, Duration::from_secs(90));
        assert_eq!(cfg.timeouts.probe, Duration::from_millis(500));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str("[timeouts]\nprocess = \"10s\"\n").unwrap();
        assert_eq!(cfg.renderer.command, "phantomjs");
        assert_eq!(cfg.timeouts.process, Duration::from_secs(10));
        assert_eq!(cfg.timeouts.probe, DEFAULT_PROBE_TIMEOUT);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("threshold = 0.9\n").unwrap_err();
        assert!(matches!(err, PhandomError::Config(msg) if msg.contains("Invalid config")));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let cfg = Config::from_toml_str("[timeouts]\nprocess = \"0s\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts.process"));
    }

    #[test]
    fn renderer_override_replaces_command() {
        let mut cfg = Config::default();
        cfg.apply_overrides(Some("/usr/local/bin/phantomjs".to_string()));
        assert_eq!(cfg.renderer.command, "/usr/local/bin/phantomjs");

        cfg.apply_overrides(Some("   ".to_string()));
        assert_eq!(cfg.renderer.command, "/usr/local/bin/phantomjs");

        cfg.apply_overrides(None);
        assert_eq!(cfg.renderer.command, "/usr/local/bin/phantomjs");
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phandom.toml");
        fs::write(&path, "[timeouts]\nprobe = \"2s\"\n").unwrap();
        let cfg = Config::load(Some(&path)).unwrap();
        assert_eq!(cfg.timeouts.probe, Duration::from_secs(2));

        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn render_options_read_custom_driver() {
        let dir = TempDir::new().unwrap();
        let driver = dir.path().join("driver.sh");
        fs::write(&driver, "cat \"${1#file://}\"").unwrap();
        let cfg = Config {
            renderer: RendererConfig {
                command: "sh".to_string(),
                args: vec!["-e".to_string()],
                driver: Some(driver),
            },
            timeouts: Timeouts::default(),
        };

        let opts = cfg.render_options().unwrap();
        assert_eq!(opts.command, "sh");
        assert_eq!(opts.extra_args, vec!["-e"]);
        assert_eq!(
            opts.driver,
            DriverScript::Custom("cat \"${1#file://}\"".to_string())
        );
    }

    #[test]
    fn render_options_report_missing_driver() {
        let cfg = Config {
            renderer: RendererConfig {
                driver: Some(PathBuf::from("/definitely/missing/driver.js")),
                ..RendererConfig::default()
            },
            timeouts: Timeouts::default(),
        };
        assert!(matches!(cfg.render_options(), Err(PhandomError::Config(_))));
    }
}
