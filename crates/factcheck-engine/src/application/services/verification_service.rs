use crate::application::ports::fact_provider::FactProviderPort;
use crate::application::services::evaluator::evaluate_table;
use factcheck_core::{
    config::{EngineConfig, VerifyConfig},
    core_types::{RunId, TargetDescriptor},
    error::{CoreError, Result},
    expectation::ExpectationTable,
    fact_map::FactMap,
    platform::PlatformClassifier,
    report::{Report, TargetReport},
    shutdown::{ExecutionError, GracefulShutdown, with_cancellation_and_timeout},
};
use futures::{StreamExt, stream};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 引擎调度参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_concurrent_targets: usize,
    pub fetch_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        (&EngineConfig::default()).into()
    }
}

impl From<&EngineConfig> for EngineSettings {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            max_concurrent_targets: cfg.max_concurrent_targets.max(1),
            fetch_timeout: cfg.fetch_timeout(),
        }
    }
}

/// 验证引擎
///
/// 每个目标独立执行 分类 → 获取事实 → 构建期望表 → 逐条评估；
/// 分类和获取失败只终止该目标，其余目标照常执行。
pub struct VerificationEngine {
    provider: Arc<dyn FactProviderPort>,
    classifier: PlatformClassifier,
    settings: EngineSettings,
}

impl VerificationEngine {
    pub fn new(
        provider: Arc<dyn FactProviderPort>,
        classifier: PlatformClassifier,
        mut settings: EngineSettings,
    ) -> Self {
        // buffer_unordered 把 0 视为不限并发
        settings.max_concurrent_targets = settings.max_concurrent_targets.max(1);
        Self {
            provider,
            classifier,
            settings,
        }
    }

    pub fn from_config(provider: Arc<dyn FactProviderPort>, cfg: &VerifyConfig) -> Result<Self> {
        let classifier = PlatformClassifier::new(cfg.platforms.lab_subnet_pattern.clone())?;
        Ok(Self::new(provider, classifier, (&cfg.engine).into()))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 验证全部目标
    pub async fn run(&self, targets: &[TargetDescriptor]) -> Report {
        self.run_with_cancellation(targets, CancellationToken::new())
            .await
    }

    /// 验证全部目标，收到 SIGINT/SIGTERM 或 `shutdown.cancel()` 时中止
    ///
    /// 中止后仍返回完整报告，未完成的目标记为已取消。
    pub async fn run_until_signal(
        &self,
        targets: &[TargetDescriptor],
        shutdown: &GracefulShutdown,
    ) -> Report {
        let run = self.run_with_cancellation(targets, shutdown.child_token());
        tokio::pin!(run);

        tokio::select! {
            report = &mut run => return report,
            _ = shutdown.wait_for_signal() => {}
        }
        run.await
    }

    /// 验证全部目标；取消后不再调度新目标，进行中的获取被放弃
    pub async fn run_with_cancellation(
        &self,
        targets: &[TargetDescriptor],
        cancel_token: CancellationToken,
    ) -> Report {
        let mut report = Report::new(RunId::generate(), chrono::Utc::now().timestamp());
        info!(
            run_id = %report.run_id,
            targets = targets.len(),
            max_concurrent = self.settings.max_concurrent_targets,
            "Starting verification run"
        );

        let jobs = targets.iter().enumerate().map(|(idx, target)| {
            let token = cancel_token.clone();
            async move { (idx, self.schedule_target(target, token).await) }
        });

        // 目标之间无共享状态，结果在全部完成后按输入顺序合并
        let mut finished: Vec<(usize, TargetReport)> = stream::iter(jobs)
            .buffer_unordered(self.settings.max_concurrent_targets)
            .collect()
            .await;
        finished.sort_by_key(|(idx, _)| *idx);

        report.targets = finished.into_iter().map(|(_, t)| t).collect();
        report.finished_at = chrono::Utc::now().timestamp();

        let summary = report.summarize();
        info!(
            run_id = %report.run_id,
            total_checks = summary.total_checks,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            fatal_targets = summary.fatal_targets,
            "Verification run finished"
        );

        report
    }

    async fn schedule_target(
        &self,
        target: &TargetDescriptor,
        cancel_token: CancellationToken,
    ) -> TargetReport {
        if cancel_token.is_cancelled() {
            warn!(target_id = %target.id, "Run cancelled before target was scheduled");
            return TargetReport::fatal(
                target.id.clone(),
                target.platform.clone(),
                CoreError::Cancelled {
                    target: target.id.to_string(),
                },
            );
        }
        self.verify_target(target, cancel_token).await
    }

    /// 验证单个目标
    pub async fn verify_target(
        &self,
        target: &TargetDescriptor,
        cancel_token: CancellationToken,
    ) -> TargetReport {
        let started = Instant::now();
        let mut report = match self.evaluate_target(target, cancel_token).await {
            Ok(report) => report,
            Err(err) => {
                warn!(
                    target_id = %target.id,
                    platform = %target.platform,
                    error = %err,
                    "Target verification aborted"
                );
                TargetReport::fatal(target.id.clone(), target.platform.clone(), err)
            }
        };
        report.duration_ms = started.elapsed().as_millis() as u64;

        if !report.is_fatal() {
            info!(
                target_id = %target.id,
                platform = %target.platform,
                passed = report.passed_count(),
                failed = report.failed_count(),
                skipped = report.skipped_count(),
                duration_ms = report.duration_ms,
                "Target verification finished"
            );
        }
        report
    }

    async fn evaluate_target(
        &self,
        target: &TargetDescriptor,
        cancel_token: CancellationToken,
    ) -> Result<TargetReport> {
        let params = self.classifier.classify(&target.platform)?;
        let facts = self.fetch_facts(target, cancel_token).await?;
        debug!(target_id = %target.id, facts = facts.len(), "Fetched facts");

        let table = ExpectationTable::build(&params)?;
        let results = evaluate_table(&target.id, &table, &facts);

        let mut report = TargetReport::new(target.id.clone(), target.platform.clone());
        report.params = Some(params);
        report.results = results;
        Ok(report)
    }

    async fn fetch_facts(
        &self,
        target: &TargetDescriptor,
        cancel_token: CancellationToken,
    ) -> Result<FactMap> {
        let fetch = self.provider.get_facts(target);
        match with_cancellation_and_timeout(fetch, cancel_token, self.settings.fetch_timeout).await
        {
            Ok(Ok(facts)) => Ok(facts),
            Ok(Err(err @ CoreError::FactFetch { .. })) => Err(err),
            Ok(Err(err)) => Err(CoreError::fact_fetch(target.id.as_str(), err.to_string())),
            Err(ExecutionError::Timeout(timeout)) => Err(CoreError::FetchTimeout {
                target: target.id.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Err(ExecutionError::Cancelled) => Err(CoreError::Cancelled {
                target: target.id.to_string(),
            }),
        }
    }
}
