pub mod application;
pub mod infrastructure;

// 重新导出错误类型
pub use factcheck_core::error::{CoreError, Result};

pub use application::ports::fact_provider::FactProviderPort;
pub use application::services::evaluator::evaluate_table;
pub use application::services::verification_service::{EngineSettings, VerificationEngine};
pub use infrastructure::providers::{JsonDirFactProvider, StaticFactProvider};
