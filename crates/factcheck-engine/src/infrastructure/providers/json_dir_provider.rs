use anyhow::Context;
use async_trait::async_trait;
use factcheck_core::core_types::TargetDescriptor;
use factcheck_core::error::{CoreError, Result};
use factcheck_core::fact_map::FactMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::application::ports::fact_provider::FactProviderPort;

/// 连接句柄中指定事实文件的键
pub const CONNECTION_FACTS_FILE: &str = "facts_file";

/// 从目录读取代理导出的 JSON 事实
///
/// 默认读取 `<dir>/<target-id>.json`；目标连接句柄中的 `facts_file`
/// 可指定其他文件（相对路径基于该目录）。
#[derive(Debug, Clone)]
pub struct JsonDirFactProvider {
    dir: PathBuf,
}

impl JsonDirFactProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, target: &TargetDescriptor) -> PathBuf {
        match target.connection.get(CONNECTION_FACTS_FILE) {
            Some(file) => self.dir.join(file),
            None => self.dir.join(format!("{}.json", target.id)),
        }
    }

    async fn load(path: &Path) -> anyhow::Result<FactMap> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read fact dump {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in fact dump {}", path.display()))?;
        if !value.is_object() {
            anyhow::bail!("fact dump {} is not a JSON object", path.display());
        }
        Ok(FactMap::from_json(&value))
    }
}

#[async_trait]
impl FactProviderPort for JsonDirFactProvider {
    async fn get_facts(&self, target: &TargetDescriptor) -> Result<FactMap> {
        let path = self.path_for(target);
        match Self::load(&path).await {
            Ok(facts) => {
                debug!(
                    target_id = %target.id,
                    path = %path.display(),
                    facts = facts.len(),
                    "Loaded fact dump"
                );
                Ok(facts)
            }
            Err(e) => {
                warn!(target_id = %target.id, error = %e, "Failed to load fact dump");
                Err(CoreError::fact_fetch(target.id.as_str(), format!("{:#}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_and_flattens_dump() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sol11.json"),
            r#"{"os":{"family":"Solaris","release":{"major":"11"}},"processors":{"count":4}}"#,
        )
        .unwrap();

        let provider = JsonDirFactProvider::new(dir.path());
        let facts = provider
            .get_facts(&TargetDescriptor::new("sol11", "solaris-11-i386"))
            .await
            .unwrap();

        assert_eq!(facts.get("os.family"), Some("Solaris"));
        assert_eq!(facts.get("os.release.major"), Some("11"));
        assert_eq!(facts.get("processors.count"), Some("4"));
    }

    #[tokio::test]
    async fn test_connection_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("custom.json"), r#"{"kernel":"SunOS"}"#).unwrap();

        let provider = JsonDirFactProvider::new(dir.path());
        let target = TargetDescriptor::new("sol10", "solaris-10-sparc")
            .with_connection(CONNECTION_FACTS_FILE, "custom.json");

        assert_eq!(provider.path_for(&target), dir.path().join("custom.json"));
        let facts = provider.get_facts(&target).await.unwrap();
        assert_eq!(facts.get("kernel"), Some("SunOS"));
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonDirFactProvider::new(dir.path());

        let err = provider
            .get_facts(&TargetDescriptor::new("absent", "solaris-10-sparc"))
            .await
            .unwrap_err();

        match err {
            CoreError::FactFetch { target, message } => {
                assert_eq!(target, "absent");
                assert!(message.contains("failed to read fact dump"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_object_dump_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "[1,2,3]").unwrap();

        let err = JsonDirFactProvider::new(dir.path())
            .get_facts(&TargetDescriptor::new("bad", "solaris-10-sparc"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }
}
