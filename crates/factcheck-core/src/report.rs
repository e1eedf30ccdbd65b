//! 验证结果与运行报告

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DIAG_PATH_NOT_FOUND, DIAG_VALUE_MISMATCH};
use crate::core_types::{RunId, TargetId};
use crate::error::{CoreError, Result};
use crate::expectation::Section;
use crate::platform::PlatformParams;

/// 单条检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    /// 前置事实未解析，未执行
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// 单个事实的评估结果，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub target_id: TargetId,
    pub section: Section,
    pub fact_path: String,
    pub expected: String,
    pub actual: Option<String>,
    pub outcome: Outcome,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl EvaluationResult {
    /// 由匹配结果构造通过或不匹配
    pub fn matched(
        target_id: TargetId,
        section: Section,
        fact_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        passed: bool,
    ) -> Self {
        Self {
            target_id,
            section,
            fact_path: fact_path.into(),
            expected: expected.into(),
            actual: Some(actual.into()),
            outcome: if passed {
                Outcome::Passed
            } else {
                Outcome::Failed
            },
            passed,
            diagnostic: (!passed).then(|| DIAG_VALUE_MISMATCH.to_string()),
        }
    }

    pub fn not_found(
        target_id: TargetId,
        section: Section,
        fact_path: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            target_id,
            section,
            fact_path: fact_path.into(),
            expected: expected.into(),
            actual: None,
            outcome: Outcome::Failed,
            passed: false,
            diagnostic: Some(DIAG_PATH_NOT_FOUND.to_string()),
        }
    }

    pub fn skipped(
        target_id: TargetId,
        section: Section,
        fact_path: impl Into<String>,
        expected: impl Into<String>,
        reason: &CoreError,
    ) -> Self {
        Self {
            target_id,
            section,
            fact_path: fact_path.into(),
            expected: expected.into(),
            actual: None,
            outcome: Outcome::Skipped,
            passed: false,
            diagnostic: Some(reason.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome == Outcome::Skipped
    }
}

/// 单个目标的验证报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target_id: TargetId,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<PlatformParams>,
    /// 分类或获取事实失败时设置，此时 results 为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal: Option<CoreError>,
    pub results: Vec<EvaluationResult>,
    pub duration_ms: u64,
}

impl TargetReport {
    pub fn new(target_id: TargetId, platform: impl Into<String>) -> Self {
        Self {
            target_id,
            platform: platform.into(),
            params: None,
            fatal: None,
            results: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn fatal(target_id: TargetId, platform: impl Into<String>, error: CoreError) -> Self {
        let mut report = Self::new(target_id, platform);
        report.fatal = Some(error);
        report
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn result(&self, fact_path: &str) -> Option<&EvaluationResult> {
        self.results.iter().find(|r| r.fact_path == fact_path)
    }

    pub fn failures(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| r.is_failed())
    }
}

/// 一次运行的完整报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: RunId,
    pub started_at: i64,
    pub finished_at: i64,
    pub targets: Vec<TargetReport>,
}

impl Report {
    pub fn new(run_id: RunId, started_at: i64) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: started_at,
            targets: Vec::new(),
        }
    }

    pub fn target(&self, target_id: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.target_id.as_str() == target_id)
    }

    /// 没有致命目标且没有失败或跳过的检查
    pub fn is_success(&self) -> bool {
        self.targets
            .iter()
            .all(|t| !t.is_fatal() && t.results.iter().all(|r| r.passed))
    }

    pub fn summarize(&self) -> Summary {
        summarize(self)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 单个目标的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub target_id: TargetId,
    pub platform: String,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
}

/// 运行统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub fatal_targets: usize,
    pub per_target: Vec<TargetSummary>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "targets={} checks={} passed={} failed={} skipped={} fatal_targets={}",
            self.per_target.len(),
            self.total_checks,
            self.passed,
            self.failed,
            self.skipped,
            self.fatal_targets
        )
    }
}

/// 只读汇总，不修改任何结果
pub fn summarize(report: &Report) -> Summary {
    let per_target: Vec<TargetSummary> = report
        .targets
        .iter()
        .map(|t| TargetSummary {
            target_id: t.target_id.clone(),
            platform: t.platform.clone(),
            total_checks: t.results.len(),
            passed: t.passed_count(),
            failed: t.failed_count(),
            skipped: t.skipped_count(),
            fatal: t.fatal.as_ref().map(|e| e.to_string()),
        })
        .collect();

    Summary {
        total_checks: per_target.iter().map(|t| t.total_checks).sum(),
        passed: per_target.iter().map(|t| t.passed).sum(),
        failed: per_target.iter().map(|t| t.failed).sum(),
        skipped: per_target.iter().map(|t| t.skipped).sum(),
        fatal_targets: per_target.iter().filter(|t| t.fatal.is_some()).count(),
        per_target,
    }
}
