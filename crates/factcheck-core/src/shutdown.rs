use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 执行错误类型
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Operation was cancelled")]
    Cancelled,
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// 运行级中止管理器
#[derive(Debug, Clone)]
pub struct GracefulShutdown {
    /// 取消令牌，通知引擎停止调度新的目标
    pub token: CancellationToken,
}

impl GracefulShutdown {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// 等待停机信号（SIGINT, SIGTERM）
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            biased;
            _ = ctrl_c => {
                info!("Received Ctrl+C signal");
            }
            _ = terminate => {
                info!("Received SIGTERM signal");
            }
        }

        info!("Aborting verification run...");
        self.token.cancel();
    }

    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn cancel(&self) {
        self.token.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// 带超时和取消的异步操作执行器
pub async fn with_cancellation_and_timeout<T>(
    future: impl Future<Output = T>,
    cancel_token: CancellationToken,
    timeout: Duration,
) -> Result<T, ExecutionError> {
    tokio::select! {
        result = future => Ok(result),
        _ = cancel_token.cancelled() => Err(ExecutionError::Cancelled),
        _ = tokio::time::sleep(timeout) => Err(ExecutionError::Timeout(timeout)),
    }
}
