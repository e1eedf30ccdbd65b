use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Display, From, Into, AsRef, Serialize, Deserialize, Default,
)]
pub struct TargetId(String);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Display, From, Into, AsRef, Serialize, Deserialize, Default,
)]
pub struct RunId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

/// 待验证的目标主机，套件启动时创建，运行期间不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub id: TargetId,
    /// 平台标识，例如 "solaris-10-sparc"
    pub platform: String,
    /// 连接句柄，仅由事实提供者解释
    #[serde(default)]
    pub connection: BTreeMap<String, String>,
}

impl TargetDescriptor {
    pub fn new(id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: TargetId::new(id),
            platform: platform.into(),
            connection: BTreeMap::new(),
        }
    }

    pub fn with_connection(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.connection.insert(key.into(), value.into());
        self
    }
}
