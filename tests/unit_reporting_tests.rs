//! # Reporting Unit Tests / 报告单元测试
//!
//! Renders HTML and JSON reports from hand-built summaries.
//!
//! 根据手工构建的摘要渲染 HTML 和 JSON 报告。

use lint_matrix::models::{
    FailureReason, JobInstance, JobResult, JobStatus, RunSummary, StepRecord, StepStatus,
};
use lint_matrix::reporting::html::render_html_report;
use lint_matrix::reporting::json::JsonReport;
use lint_matrix::reporting::write_json_report;
use std::time::Duration;

fn record(name: &str, status: StepStatus, output: &str) -> StepRecord {
    StepRecord {
        name: name.to_string(),
        status,
        output: output.to_string(),
        duration: Duration::from_millis(250),
    }
}

fn passed(index: usize, version: &str) -> JobResult {
    JobResult {
        instance: JobInstance::new(index, version),
        status: JobStatus::Succeeded,
        steps: vec![
            record("checkout", StepStatus::Succeeded, ""),
            record("install-manifest", StepStatus::Skipped, "requirements.txt not found"),
            record("lint", StepStatus::Succeeded, "$ python -m pylint app.py\n"),
        ],
        duration: Duration::from_secs(3),
    }
}

fn lint_failed(index: usize, version: &str) -> JobResult {
    JobResult {
        instance: JobInstance::new(index, version),
        status: JobStatus::Failed(FailureReason::Lint),
        steps: vec![
            record("checkout", StepStatus::Succeeded, ""),
            record("lint", StepStatus::Failed, "app.py:1:0: W0611 <unused-import>"),
            record("extra", StepStatus::NotRun, "never shown"),
        ],
        duration: Duration::from_secs(4),
    }
}

fn mixed_summary() -> RunSummary {
    RunSummary::new(vec![lint_failed(1, "3.11"), passed(0, "3.10")])
}

#[cfg(test)]
mod html_tests {
    use super::*;

    #[test]
    fn test_html_lists_every_instance() {
        let html = render_html_report(&mixed_summary(), "en");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("lint (3.10)"));
        assert!(html.contains("lint (3.11)"));
        assert!(html.contains("status-passed"));
        assert!(html.contains("status-failed"));
    }

    #[test]
    fn test_html_shows_logs_of_failures_only() {
        let html = render_html_report(&mixed_summary(), "en");
        assert!(html.contains("W0611"));
        assert!(!html.contains("never shown"));
        // The passing instance's lint log is not expanded.
        assert!(!html.contains("python -m pylint app.py"));
    }

    #[test]
    fn test_html_escapes_tool_output() {
        let html = render_html_report(&mixed_summary(), "en");
        assert!(html.contains("&lt;unused-import&gt;"));
    }

    #[test]
    fn test_html_localized() {
        let html = render_html_report(&mixed_summary(), "zh-CN");
        assert!(!html.contains("Lint Matrix Report"));
    }
}

#[cfg(test)]
mod json_tests {
    use super::*;

    #[test]
    fn test_json_mirrors_summary() {
        let summary = mixed_summary();
        let value = serde_json::to_value(JsonReport::from_summary(&summary)).unwrap();

        assert_eq!(value["success"], false);
        let jobs = value["jobs"].as_array().unwrap();
        assert_eq!(jobs[0]["name"], "lint (3.10)");
        assert_eq!(jobs[0]["status"], "succeeded");
        assert_eq!(jobs[1]["status"], "failed");
        assert_eq!(jobs[1]["steps"][1]["status"], "Failed");
        assert_eq!(jobs[1]["steps"][2]["status"], "NotRun");
        assert_eq!(jobs[0]["steps"][1]["status"], "Skipped");
    }

    #[test]
    fn test_json_for_empty_run_is_success() {
        let summary = RunSummary::new(Vec::new());
        let value = serde_json::to_value(JsonReport::from_summary(&summary)).unwrap();
        assert_eq!(value["success"], true);
        assert!(value["jobs"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_report(&mixed_summary(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["jobs"].as_array().unwrap().len(), 2);
        assert!(value["generated_at"].is_string());
    }
}
