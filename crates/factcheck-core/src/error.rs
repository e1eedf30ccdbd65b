//! 统一错误处理系统

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 核心错误类型 - 统一的错误处理
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreError {
    // === 平台分类错误 ===
    #[error("Unrecognized platform: {platform}")]
    Classification { platform: String },

    // === 事实获取错误 ===
    #[error("Fact fetch failed: {target} - {message}")]
    FactFetch { target: String, message: String },

    #[error("Fact fetch timed out: {target} after {timeout_ms}ms")]
    FetchTimeout { target: String, timeout_ms: u64 },

    #[error("Verification cancelled: {target}")]
    Cancelled { target: String },

    // === 事实解析错误 ===
    #[error("Fact path not found: {path}")]
    NotFound { path: String },

    #[error("Unresolved dependency: {path} requires {prerequisite}")]
    UnresolvedDependency { path: String, prerequisite: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    // === 配置错误 ===
    #[error("Config error: {message}")]
    Config { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    // === 系统错误 ===
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// 判断错误是否终止当前目标的验证
    pub fn is_target_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::Classification { .. }
                | CoreError::FactFetch { .. }
                | CoreError::FetchTimeout { .. }
                | CoreError::Cancelled { .. }
        )
    }

    pub fn classification(platform: impl Into<String>) -> Self {
        CoreError::Classification {
            platform: platform.into(),
        }
    }

    pub fn fact_fetch(target: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::FactFetch {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        CoreError::NotFound { path: path.into() }
    }

    pub fn unresolved_dependency(
        path: impl Into<String>,
        prerequisite: impl Into<String>,
    ) -> Self {
        CoreError::UnresolvedDependency {
            path: path.into(),
            prerequisite: prerequisite.into(),
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn config_error(message: impl Into<String>) -> Self {
        CoreError::Config {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::Internal {
            message: message.into(),
        }
    }
}

/// Core 操作的 Result 类型别名
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Internal {
            message: err.to_string(),
        }
    }
}
