use time::UtcOffset;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,  // trace|debug|info|warn|error
    pub format: String, // text|json
    pub no_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            no_ansi: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl From<&LogConfig> for (LogLevel, LogFormat) {
    fn from(cfg: &LogConfig) -> Self {
        let level = match cfg.level.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        };
        let format = if cfg.format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        };
        (level, format)
    }
}

/// 使用提供的配置初始化 tracing；重复调用时保留已安装的订阅者
pub fn init_tracing_with(cfg: &LogConfig) {
    let (lvl_enum, fmt_enum): (LogLevel, LogFormat) = cfg.into();

    let filter = EnvFilter::new(lvl_enum.as_str());
    let base = fmt::layer().with_target(true).with_ansi(!cfg.no_ansi);
    let fmt_layer = match fmt_enum {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Text => {
            let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
            base.with_timer(fmt::time::OffsetTime::new(
                offset,
                time::format_description::well_known::Rfc3339,
            ))
            .boxed()
        }
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_and_format_parsing() {
        let cfg = LogConfig {
            level: "DEBUG".to_string(),
            format: "Json".to_string(),
            no_ansi: true,
        };
        let (level, format): (LogLevel, LogFormat) = (&cfg).into();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let cfg = LogConfig {
            level: "loud".to_string(),
            format: "xml".to_string(),
            no_ansi: false,
        };
        let (level, format): (LogLevel, LogFormat) = (&cfg).into();
        assert_eq!(level, LogLevel::Info);
        assert_eq!(format, LogFormat::Text);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing_with(&LogConfig::default());
        init_tracing_with(&LogConfig {
            level: "trace".to_string(),
            format: "json".to_string(),
            no_ansi: true,
        });
    }
}
