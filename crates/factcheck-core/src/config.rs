//! 验证运行的统一配置

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_LAB_SUBNET_PATTERN,
    DEFAULT_MAX_CONCURRENT_TARGETS, ENV_PREFIX,
};
use crate::error::{CoreError, Result};
use crate::matcher::FactPattern;
use crate::telemetry::LogConfig;

/// 从 factcheck.toml 加载的配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub platforms: PlatformsConfig,
}

impl VerifyConfig {
    /// 默认值 → TOML 文件 → FACTCHECK__ 前缀的环境变量（Figment）
    pub fn load_config(path: Option<&str>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(VerifyConfig::default()));

        // 显式路径必须存在，否则尝试工作目录下的默认文件
        if let Some(p) = path {
            let p = Path::new(p);
            if !p.exists() {
                return Err(CoreError::config_error(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Toml::file(p));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let cfg: VerifyConfig = figment.extract().map_err(|e| CoreError::Config {
            message: format!("Failed to load config via Figment: {}", e),
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.telemetry.log_level.to_lowercase().as_str()) {
            return Err(CoreError::config_error(format!(
                "Invalid log level: {}",
                self.telemetry.log_level
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.telemetry.log_format.to_lowercase().as_str()) {
            return Err(CoreError::config_error(format!(
                "Invalid log format: {}",
                self.telemetry.log_format
            )));
        }

        if self.engine.max_concurrent_targets == 0 {
            return Err(CoreError::config_error(
                "max_concurrent_targets must be greater than 0",
            ));
        }

        if self.engine.fetch_timeout_ms == 0 {
            return Err(CoreError::config_error(
                "fetch_timeout_ms must be greater than 0",
            ));
        }

        FactPattern::new(&self.platforms.lab_subnet_pattern).map_err(|e| {
            CoreError::config_error(format!("Invalid lab_subnet_pattern: {}", e))
        })?;

        Ok(())
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default)]
    pub log_no_ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            log_no_ansi: false,
        }
    }
}

impl From<&TelemetryConfig> for LogConfig {
    fn from(cfg: &TelemetryConfig) -> Self {
        LogConfig {
            level: cfg.log_level.clone(),
            format: cfg.log_format.clone(),
            no_ansi: cfg.log_no_ansi,
        }
    }
}

/// Engine scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_max_concurrent_targets")]
    pub max_concurrent_targets: usize,
    /// 单个目标获取事实的超时
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_targets: default_max_concurrent_targets(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl EngineConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlatformsConfig {
    #[serde(default = "default_lab_subnet_pattern")]
    pub lab_subnet_pattern: String,
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            lab_subnet_pattern: default_lab_subnet_pattern(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_concurrent_targets() -> usize {
    DEFAULT_MAX_CONCURRENT_TARGETS
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

fn default_lab_subnet_pattern() -> String {
    DEFAULT_LAB_SUBNET_PATTERN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = VerifyConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.engine.max_concurrent_targets, DEFAULT_MAX_CONCURRENT_TARGETS);
        assert_eq!(cfg.engine.fetch_timeout(), Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS));
        assert_eq!(cfg.platforms.lab_subnet_pattern, DEFAULT_LAB_SUBNET_PATTERN);
    }

    // 加载测试都在 Jail 中运行：隔离工作目录并串行化环境变量修改
    #[test]
    fn test_load_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[telemetry]
log_level = "debug"
log_format = "json"

[engine]
max_concurrent_targets = 2
fetch_timeout_ms = 1500

[platforms]
lab_subnet_pattern = '172\.16\.\d+\.\d+'
"#,
            )?;

            let cfg = VerifyConfig::load_config(Some("custom.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.telemetry.log_level, "debug");
            assert_eq!(cfg.telemetry.log_format, "json");
            assert_eq!(cfg.engine.max_concurrent_targets, 2);
            assert_eq!(cfg.engine.fetch_timeout_ms, 1500);
            assert_eq!(cfg.platforms.lab_subnet_pattern, r"172\.16\.\d+\.\d+");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_default_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                "[engine]\nmax_concurrent_targets = 2\nfetch_timeout_ms = 1500\n",
            )?;
            jail.set_env("FACTCHECK__ENGINE__MAX_CONCURRENT_TARGETS", "7");

            let cfg = VerifyConfig::load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(cfg.engine.max_concurrent_targets, 7);
            assert_eq!(cfg.engine.fetch_timeout_ms, 1500);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_env_key_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("FACTCHECK__ENGINE__BOGUS", "1");

            let err = VerifyConfig::load_config(None).unwrap_err();
            assert!(matches!(err, CoreError::Config { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        Jail::expect_with(|_jail| {
            let err = VerifyConfig::load_config(Some("missing.toml")).unwrap_err();
            assert!(matches!(err, CoreError::Config { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[engine]\nworkers = 3\n")?;
            assert!(VerifyConfig::load_config(Some("bad.toml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = VerifyConfig::default();
        cfg.engine.max_concurrent_targets = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = VerifyConfig::default();
        cfg.engine.fetch_timeout_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = VerifyConfig::default();
        cfg.telemetry.log_level = "verbose".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = VerifyConfig::default();
        cfg.telemetry.log_format = "yaml".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = VerifyConfig::default();
        cfg.platforms.lab_subnet_pattern = "10.(".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_log_config_from_telemetry() {
        let telemetry = TelemetryConfig {
            log_level: "warn".to_string(),
            log_format: "json".to_string(),
            log_no_ansi: true,
        };
        let log: LogConfig = (&telemetry).into();
        assert_eq!(log.level, "warn");
        assert_eq!(log.format, "json");
        assert!(log.no_ansi);
    }
}
