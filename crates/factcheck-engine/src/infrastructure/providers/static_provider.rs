use async_trait::async_trait;
use factcheck_core::core_types::{TargetDescriptor, TargetId};
use factcheck_core::error::{CoreError, Result};
use factcheck_core::fact_map::FactMap;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::fact_provider::FactProviderPort;

/// 内存中的事实提供者
///
/// 事实按目标预先登记，可为单个目标注入传输失败或延迟。
#[derive(Debug, Clone, Default)]
pub struct StaticFactProvider {
    facts: HashMap<TargetId, FactMap>,
    failures: HashMap<TargetId, String>,
    delays: HashMap<TargetId, Duration>,
}

impl StaticFactProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facts(mut self, target: impl Into<String>, facts: FactMap) -> Self {
        self.facts.insert(TargetId::new(target), facts);
        self
    }

    /// 模拟传输层失败
    pub fn with_failure(mut self, target: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(TargetId::new(target), message.into());
        self
    }

    pub fn with_delay(mut self, target: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(TargetId::new(target), delay);
        self
    }
}

#[async_trait]
impl FactProviderPort for StaticFactProvider {
    async fn get_facts(&self, target: &TargetDescriptor) -> Result<FactMap> {
        if let Some(delay) = self.delays.get(&target.id) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(message) = self.failures.get(&target.id) {
            return Err(CoreError::fact_fetch(target.id.as_str(), message.clone()));
        }

        let facts = self
            .facts
            .get(&target.id)
            .cloned()
            .ok_or_else(|| CoreError::fact_fetch(target.id.as_str(), "no facts recorded for target"))?;

        debug!(target_id = %target.id, facts = facts.len(), "Served static facts");
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_registered_facts() {
        let provider = StaticFactProvider::new()
            .with_facts("a", FactMap::from_pairs([("kernel", "SunOS")]));

        let facts = provider
            .get_facts(&TargetDescriptor::new("a", "solaris-10-sparc"))
            .await
            .unwrap();
        assert_eq!(facts.get("kernel"), Some("SunOS"));
    }

    #[tokio::test]
    async fn test_failure_overrides_facts() {
        let provider = StaticFactProvider::new()
            .with_facts("a", FactMap::new())
            .with_failure("a", "ssh: handshake failed");

        let err = provider
            .get_facts(&TargetDescriptor::new("a", "solaris-10-sparc"))
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::fact_fetch("a", "ssh: handshake failed"));
    }

    #[tokio::test]
    async fn test_unknown_target_is_fetch_error() {
        let err = StaticFactProvider::new()
            .get_facts(&TargetDescriptor::new("ghost", "solaris-11-sparc"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FactFetch { .. }));
    }
}
