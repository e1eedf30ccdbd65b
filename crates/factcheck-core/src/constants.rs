// 实验室网络的固定网段
pub const DEFAULT_LAB_SUBNET_PATTERN: &str = r"10\.\d+\.\d+\.\d+";

// 引擎默认值
pub const DEFAULT_MAX_CONCURRENT_TARGETS: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 60_000;

// 配置文件与环境变量前缀
pub const DEFAULT_CONFIG_FILE: &str = "factcheck.toml";
pub const ENV_PREFIX: &str = "FACTCHECK__";

// 依赖占位使用的事实
pub const FACT_NETWORKING_PRIMARY: &str = "networking.primary";

// 诊断信息
pub const DIAG_PATH_NOT_FOUND: &str = "path not found";
pub const DIAG_VALUE_MISMATCH: &str = "value mismatch";
