//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! job instances and their steps, the records produced while executing them,
//! and the aggregated run summary.
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 作业实例及其步骤、执行过程中产生的记录，以及汇总的运行摘要。

use crate::infra::t;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One concrete execution of the step list for one matrix value.
/// 针对一个矩阵值的步骤列表的一次具体执行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInstance {
    /// Position of the value in the matrix axis; used for reporting order.
    /// 该值在矩阵轴中的位置；用于报告顺序。
    pub index: usize,
    /// The matrix value (an interpreter version).
    /// 矩阵值（解释器版本）。
    pub version: String,
}

impl JobInstance {
    pub fn new(index: usize, version: impl Into<String>) -> Self {
        Self {
            index,
            version: version.into(),
        }
    }

    /// Display name, e.g. `lint (3.11)`.
    pub fn name(&self) -> String {
        format!("lint ({})", self.version)
    }
}

/// What a step does when it runs.
/// 步骤运行时执行的操作。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepAction {
    /// Copy the source tree into the instance workspace.
    Checkout,
    /// Resolve the interpreter for the matrix value and, if configured, create a virtualenv.
    SetupInterpreter,
    /// Install the fixed baseline packages.
    Install {
        upgrade_pip: bool,
        packages: Vec<String>,
    },
    /// Install from the manifest, only if it exists in the workspace.
    InstallManifest { manifest: String },
    /// Run the analysis tool over tracked files ending in `suffix`.
    Lint {
        tool: String,
        suffix: String,
        disable: Vec<String>,
    },
    /// An arbitrary shell-style command.
    Shell { run: String },
}

/// An ordered, named unit of work within a job instance.
/// 作业实例中一个有序的、具名的工作单元。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub action: StepAction,
}

impl Step {
    pub fn new(name: impl Into<String>, action: StepAction) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }

    /// The failure category reported when this step fails.
    pub fn failure_reason(&self) -> FailureReason {
        match self.action {
            StepAction::Checkout => FailureReason::Checkout,
            StepAction::SetupInterpreter => FailureReason::Provision,
            StepAction::Install { .. } | StepAction::InstallManifest { .. } => {
                FailureReason::Install
            }
            StepAction::Lint { .. } => FailureReason::Lint,
            StepAction::Shell { .. } => FailureReason::Command,
        }
    }
}

/// Enumerates the possible reasons for a job instance failure.
/// Every reason is reported as "failed"; the category only selects the log header.
///
/// 枚举作业实例失败的可能原因。
/// 所有原因都报告为"失败"；类别仅用于选择日志标题。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum FailureReason {
    /// The source tree could not be copied into the workspace.
    /// 无法将源代码树复制到工作区。
    Checkout,
    /// The interpreter could not be found or the virtualenv could not be created.
    /// 找不到解释器或无法创建虚拟环境。
    Provision,
    /// Baseline or manifest installation failed.
    /// 基础包或清单安装失败。
    Install,
    /// The analysis tool exited non-zero.
    /// 分析工具以非零状态退出。
    Lint,
    /// A user-declared extra step failed.
    /// 用户声明的额外步骤失败。
    Command,
    /// A step or the whole instance exceeded its configured time limit.
    /// 步骤或整个实例超出了配置的时间限制。
    Timeout,
}

impl FailureReason {
    /// Localized header for the failure log.
    pub fn log_header(&self, locale: &str) -> String {
        match self {
            FailureReason::Checkout => t!("report.log_checkout", locale = locale),
            FailureReason::Provision => t!("report.log_provision", locale = locale),
            FailureReason::Install => t!("report.log_install", locale = locale),
            FailureReason::Lint => t!("report.log_lint", locale = locale),
            FailureReason::Command => t!("report.log_command", locale = locale),
            FailureReason::Timeout => t!("report.log_timeout", locale = locale),
        }
        .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// The step's precondition did not hold (e.g. no manifest); not an error.
    /// 步骤的前提条件不成立（例如没有清单文件）；这不是错误。
    Skipped,
    /// An earlier step failed or the instance was cancelled.
    /// 先前的步骤失败或实例被取消。
    NotRun,
}

/// The captured outcome of a single step.
/// 单个步骤的捕获结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub output: String,
    pub duration: Duration,
}

impl StepRecord {
    pub fn not_run(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: StepStatus::NotRun,
            output: String::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Terminal state of a job instance.
/// 作业实例的终止状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Succeeded,
    Failed(FailureReason),
    /// Stopped before completion by Ctrl-C or by fail-fast.
    /// 在完成前因 Ctrl-C 或快速失败而停止。
    Cancelled,
}

/// Represents the final result of a single job instance.
/// 表示单个作业实例的最终结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub instance: JobInstance,
    pub status: JobStatus,
    /// One record per step in the step list, in order.
    /// 步骤列表中每个步骤对应一条记录，按顺序排列。
    pub steps: Vec<StepRecord>,
    pub duration: Duration,
}

impl JobResult {
    /// A result for an instance that never ran any step.
    pub fn cancelled(instance: JobInstance, steps: &[Step]) -> Self {
        Self {
            instance,
            status: JobStatus::Cancelled,
            steps: steps.iter().map(|s| StepRecord::not_run(&s.name)).collect(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.status {
            JobStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// The record of the step that failed, if any.
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    /// Concatenated output of every step that produced any, with step headers.
    /// 所有产生输出的步骤的合并输出，带有步骤标题。
    pub fn combined_output(&self) -> String {
        self.steps
            .iter()
            .filter(|s| !s.output.trim().is_empty())
            .map(|s| format!("## {}\n{}", s.name, s.output.trim_end()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Gets the status of the job result as a localized string for display.
    /// 以本地化字符串形式获取作业结果的状态以供显示。
    pub fn get_status_str(&self, locale: &str) -> String {
        match self.status {
            JobStatus::Succeeded => t!("report.status_passed", locale = locale).to_string(),
            JobStatus::Failed(FailureReason::Timeout) => {
                t!("report.status_timeout", locale = locale).to_string()
            }
            JobStatus::Failed(_) => t!("report.status_failed", locale = locale).to_string(),
            JobStatus::Cancelled => t!("report.status_cancelled", locale = locale).to_string(),
        }
    }

    /// Gets the CSS class used by the HTML report for this status.
    pub fn get_status_class(&self) -> &'static str {
        match self.status {
            JobStatus::Succeeded => "status-passed",
            JobStatus::Failed(FailureReason::Timeout) => "status-timeout",
            JobStatus::Failed(_) => "status-failed",
            JobStatus::Cancelled => "status-cancelled",
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.instance.name(), self.status)
    }
}

/// The aggregated outcome of a run.
/// 一次运行的汇总结果。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Results ordered by matrix axis position.
    pub results: Vec<JobResult>,
}

impl RunSummary {
    /// Sorts results into axis order, independent of completion order.
    pub fn new(mut results: Vec<JobResult>) -> Self {
        results.sort_by_key(|r| r.instance.index);
        Self { results }
    }

    /// Logical AND of every instance outcome. Trivially true with no instances.
    /// 所有实例结果的逻辑与。没有实例时恒为真。
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(JobResult::is_success)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, JobStatus::Failed(_)))
            .count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == JobStatus::Cancelled)
            .count()
    }

    pub fn failures(&self) -> Vec<&JobResult> {
        self.results.iter().filter(|r| r.is_failure()).collect()
    }
}
