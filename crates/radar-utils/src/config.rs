//! Process-level settings read from the environment

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "stock-radar".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Read `RADAR_ENV` and `RADAR_LOG_FORMAT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unknown values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(env) = lookup("RADAR_ENV").filter(|v| !v.trim().is_empty()) {
            settings.environment = env.trim().to_lowercase();
        }
        if let Some(format) = lookup("RADAR_LOG_FORMAT").and_then(|v| v.parse().ok()) {
            settings.log_format = format;
        }
        settings
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn default_log_directive(&self) -> &'static str {
        if self.is_production() {
            "warn,radar_core=info"
        } else {
            "info,radar_core=debug"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings.app_name, "stock-radar");
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert!(!settings.is_production());
        assert_eq!(settings.default_log_directive(), "info,radar_core=debug");
    }

    #[test]
    fn test_from_lookup() {
        let settings = Settings::from_lookup(lookup(&[
            ("RADAR_ENV", " Production "),
            ("RADAR_LOG_FORMAT", "JSON"),
        ]));
        assert!(settings.is_production());
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.default_log_directive(), "warn,radar_core=info");
    }

    #[test]
    fn test_unknown_format_keeps_default() {
        let settings = Settings::from_lookup(lookup(&[("RADAR_LOG_FORMAT", "xml")]));
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
