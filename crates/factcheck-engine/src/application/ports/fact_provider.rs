use async_trait::async_trait;
use factcheck_core::core_types::TargetDescriptor;
use factcheck_core::error::Result;
use factcheck_core::fact_map::FactMap;

/// 事实提供者接口
///
/// 外部事实采集代理的唯一接入点，返回目标的完整事实映射。
/// 重试策略由实现方决定，引擎不会重试。
#[async_trait]
pub trait FactProviderPort: Send + Sync {
    /// 获取目标的全部事实
    async fn get_facts(&self, target: &TargetDescriptor) -> Result<FactMap>;
}
