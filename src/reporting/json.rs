//! # JSON Reporting Module / JSON 报告模块
//!
//! A machine-readable report for consumption by other tools.
//!
//! 供其他工具使用的机器可读报告。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::models::{JobStatus, RunSummary, StepStatus};

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub success: bool,
    pub jobs: Vec<JsonJob<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonJob<'a> {
    pub name: String,
    pub version: &'a str,
    /// `succeeded`, `failed` or `cancelled`.
    pub status: &'static str,
    pub duration_secs: f64,
    pub steps: Vec<JsonStep<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonStep<'a> {
    pub name: &'a str,
    pub status: StepStatus,
    pub duration_secs: f64,
    pub output: &'a str,
}

impl<'a> JsonReport<'a> {
    pub fn from_summary(summary: &'a RunSummary) -> Self {
        let jobs = summary
            .results
            .iter()
            .map(|result| JsonJob {
                name: result.instance.name(),
                version: &result.instance.version,
                status: match result.status {
                    JobStatus::Succeeded => "succeeded",
                    JobStatus::Failed(_) => "failed",
                    JobStatus::Cancelled => "cancelled",
                },
                duration_secs: result.duration.as_secs_f64(),
                steps: result
                    .steps
                    .iter()
                    .map(|step| JsonStep {
                        name: &step.name,
                        status: step.status,
                        duration_secs: step.duration.as_secs_f64(),
                        output: &step.output,
                    })
                    .collect(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            success: summary.succeeded(),
            jobs,
        }
    }
}

/// Writes the JSON report to `output_path`.
/// 将 JSON 报告写入 `output_path`。
pub fn write_json_report(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let report = JsonReport::from_summary(summary);
    let content = serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")?;
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))
}
