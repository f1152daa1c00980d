use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{format::LoggerFormat, level::LoggerLevel};

/// Logger settings, usually read from the `[logger]` table of the daemon config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `info` or `pvx_core=debug,info`.
    pub level: LoggerLevel,
    /// Print the module path of each event.
    pub with_targets: bool,
    /// Colour text output. Ignored when stdout is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Whether ANSI colours should be emitted right now.
    pub fn ansi(&self) -> bool {
        self.use_color && self.format == LoggerFormat::Text && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
        assert!(cfg.with_targets);
        assert!(cfg.use_color);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: LoggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
    }

    #[test]
    fn partial_document() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format": "JSON", "level": "pvx_core=debug,warn"}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "pvx_core=debug,warn");
        assert!(cfg.with_targets);
    }

    #[test]
    fn json_never_uses_colour() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Json,
            use_color: true,
            ..Default::default()
        };
        assert!(!cfg.ansi());
    }

    #[test]
    fn bad_level_fails_deserialization() {
        let err = serde_json::from_str::<LoggerConfig>(r#"{"level": "pvx=loud"}"#);
        assert!(err.is_err());
    }
}
