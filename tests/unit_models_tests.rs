//! # Models Module Unit Tests / Models 模块单元测试
//!
//! Result aggregation and the helpers reporting relies on.
//!
//! 结果汇总以及报告所依赖的辅助函数。

use lint_matrix::models::{
    FailureReason, JobInstance, JobResult, JobStatus, RunSummary, Step, StepAction, StepRecord,
    StepStatus,
};
use std::time::Duration;

/// Helper function to create a job result / 创建作业结果的辅助函数
fn result(index: usize, version: &str, status: JobStatus) -> JobResult {
    JobResult {
        instance: JobInstance::new(index, version),
        status,
        steps: vec![StepRecord {
            name: "lint".to_string(),
            status: match status {
                JobStatus::Succeeded => StepStatus::Succeeded,
                JobStatus::Failed(_) => StepStatus::Failed,
                JobStatus::Cancelled => StepStatus::NotRun,
            },
            output: "lint output".to_string(),
            duration: Duration::from_millis(10),
        }],
        duration: Duration::from_secs(1),
    }
}

#[cfg(test)]
mod summary_tests {
    use super::*;

    #[test]
    fn test_all_successes_succeed() {
        let summary = RunSummary::new(vec![
            result(0, "3.10", JobStatus::Succeeded),
            result(1, "3.11", JobStatus::Succeeded),
        ]);
        assert!(summary.succeeded());
        assert_eq!(summary.passed_count(), 2);
        assert!(summary.failures().is_empty());
    }

    #[test]
    fn test_single_failure_fails_the_run() {
        let summary = RunSummary::new(vec![
            result(0, "3.10", JobStatus::Succeeded),
            result(1, "3.11", JobStatus::Failed(FailureReason::Lint)),
            result(2, "3.12", JobStatus::Succeeded),
            result(3, "3.13", JobStatus::Succeeded),
        ]);
        assert!(!summary.succeeded());
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.failures()[0].instance.version, "3.11");
    }

    #[test]
    fn test_cancelled_instance_is_not_a_success() {
        let summary = RunSummary::new(vec![
            result(0, "3.10", JobStatus::Succeeded),
            result(1, "3.11", JobStatus::Cancelled),
        ]);
        assert!(!summary.succeeded());
        assert_eq!(summary.cancelled_count(), 1);
        assert_eq!(summary.failed_count(), 0);
    }

    #[test]
    fn test_empty_run_trivially_succeeds() {
        let summary = RunSummary::new(Vec::new());
        assert!(summary.succeeded());
        assert_eq!(summary.passed_count(), 0);
    }

    #[test]
    fn test_results_are_sorted_into_axis_order() {
        let summary = RunSummary::new(vec![
            result(2, "3.12", JobStatus::Succeeded),
            result(0, "3.10", JobStatus::Succeeded),
            result(1, "3.11", JobStatus::Succeeded),
        ]);
        let order: Vec<_> = summary.results.iter().map(|r| r.instance.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }
}

#[cfg(test)]
mod job_result_tests {
    use super::*;

    #[test]
    fn test_cancelled_result_marks_every_step_not_run() {
        let steps = vec![
            Step::new("checkout", StepAction::Checkout),
            Step::new("lint", StepAction::Shell { run: "true".to_string() }),
        ];
        let result = JobResult::cancelled(JobInstance::new(0, "3.12"), &steps);

        assert_eq!(result.status, JobStatus::Cancelled);
        assert_eq!(result.steps.len(), 2);
        assert!(result.steps.iter().all(|s| s.status == StepStatus::NotRun));
    }

    #[test]
    fn test_failure_reason_and_failed_step() {
        let failed = result(0, "3.11", JobStatus::Failed(FailureReason::Install));
        assert_eq!(failed.failure_reason(), Some(FailureReason::Install));
        assert_eq!(failed.failed_step().unwrap().name, "lint");

        let passed = result(0, "3.11", JobStatus::Succeeded);
        assert_eq!(passed.failure_reason(), None);
        assert!(passed.failed_step().is_none());
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(result(0, "a", JobStatus::Succeeded).get_status_class(), "status-passed");
        assert_eq!(
            result(0, "a", JobStatus::Failed(FailureReason::Lint)).get_status_class(),
            "status-failed"
        );
        assert_eq!(
            result(0, "a", JobStatus::Failed(FailureReason::Timeout)).get_status_class(),
            "status-timeout"
        );
        assert_eq!(result(0, "a", JobStatus::Cancelled).get_status_class(), "status-cancelled");
    }

    #[test]
    fn test_combined_output_has_step_headers() {
        let output = result(0, "3.10", JobStatus::Succeeded).combined_output();
        assert_eq!(output, "## lint\nlint output");
    }

    #[test]
    fn test_step_failure_reasons() {
        let cases = [
            (StepAction::Checkout, FailureReason::Checkout),
            (StepAction::SetupInterpreter, FailureReason::Provision),
            (
                StepAction::Install {
                    upgrade_pip: true,
                    packages: vec![],
                },
                FailureReason::Install,
            ),
            (
                StepAction::InstallManifest {
                    manifest: "requirements.txt".to_string(),
                },
                FailureReason::Install,
            ),
            (
                StepAction::Lint {
                    tool: "pylint".to_string(),
                    suffix: ".py".to_string(),
                    disable: vec![],
                },
                FailureReason::Lint,
            ),
            (StepAction::Shell { run: "true".to_string() }, FailureReason::Command),
        ];
        for (action, reason) in cases {
            assert_eq!(Step::new("s", action).failure_reason(), reason);
        }
    }
}
