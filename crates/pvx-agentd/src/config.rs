use std::{fs, path::Path, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pvx_core::ProvisionerConfig;
use pvx_observe::{LoggerConfig, LoggerFormat, LoggerLevel};

pub const ENV_REDIS_URL: &str = "PVX_REDIS_URL";
pub const ENV_LOG_LEVEL: &str = "PVX_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "PVX_LOG_FORMAT";
pub const ENV_MAX_WORKERS: &str = "PVX_MAX_WORKERS";
pub const ENV_IMAGE: &str = "PVX_IMAGE";

/// Daemon configuration: a TOML file, then environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub docker: DockerConfig,
    /// Shared lease store; without it leases live in process memory.
    pub redis_url: Option<String>,
    /// Value written under lease keys, identifies this replica.
    pub lease_holder: Option<String>,
    /// Pull the worker image before provisioning.
    pub pull_on_start: bool,
    pub logger: LoggerConfig,
    pub provisioner: ProvisionerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Unix socket of the daemon. `DOCKER_HOST` or the platform default when unset.
    pub socket: Option<PathBuf>,
}

impl AgentConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&raw).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `PVX_*` overrides read through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var(ENV_REDIS_URL).filter(|v| !v.trim().is_empty()) {
            self.redis_url = Some(url);
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            self.logger.level = LoggerLevel::new(level).context(ENV_LOG_LEVEL)?;
        }
        if let Some(format) = var(ENV_LOG_FORMAT) {
            self.logger.format = format.parse::<LoggerFormat>().context(ENV_LOG_FORMAT)?;
        }
        if let Some(max) = var(ENV_MAX_WORKERS) {
            self.provisioner.max_workers = max
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_WORKERS}={max:?} is not a count"))?;
        }
        if let Some(image) = var(ENV_IMAGE).filter(|v| !v.trim().is_empty()) {
            self.provisioner.image = image;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
redis_url = "redis://cache:6379/0"
pull_on_start = true

[docker]
socket = "/var/run/docker.sock"

[logger]
format = "json"
level = "pvx_core=debug,info"

[provisioner]
max_workers = 3
log_viewer_path = "/logs"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_toml_with_defaults_for_the_rest() {
        let cfg = AgentConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.redis_url.as_deref(), Some("redis://cache:6379/0"));
        assert!(cfg.pull_on_start);
        assert_eq!(cfg.docker.socket, Some(PathBuf::from("/var/run/docker.sock")));
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.provisioner.max_workers, 3);
        assert_eq!(cfg.provisioner.log_viewer_path, "/logs");
        assert_eq!(cfg.provisioner.proxy_network, "scraper_vpn");
        assert_eq!(cfg.provisioner.concurrency, 2);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = AgentConfig::from_toml("").unwrap();
        assert!(cfg.redis_url.is_none());
        assert_eq!(cfg.provisioner, ProvisionerConfig::default());
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = AgentConfig::from_toml(SAMPLE).unwrap();
        cfg.apply_env(env(&[
            (ENV_MAX_WORKERS, "8"),
            (ENV_IMAGE, "registry.test/scraper:dev"),
            (ENV_LOG_FORMAT, "TEXT"),
            (ENV_REDIS_URL, ""),
        ]))
        .unwrap();

        assert_eq!(cfg.provisioner.max_workers, 8);
        assert_eq!(cfg.provisioner.image, "registry.test/scraper:dev");
        assert_eq!(cfg.logger.format, LoggerFormat::Text);
        assert_eq!(cfg.redis_url.as_deref(), Some("redis://cache:6379/0"));
    }

    #[test]
    fn bad_env_values_are_errors() {
        let mut cfg = AgentConfig::default();
        assert!(cfg.apply_env(env(&[(ENV_MAX_WORKERS, "many")])).is_err());
        assert!(cfg.apply_env(env(&[(ENV_LOG_LEVEL, "pvx=shout")])).is_err());
    }

    #[test]
    fn unknown_log_format_in_file_is_rejected() {
        assert!(AgentConfig::from_toml("[logger]\nformat = \"xml\"\n").is_err());
    }
}
