//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the run summary and the logs of failed instances to the
//! console, with colours and internationalization support.
//!
//! 此模块将运行摘要和失败实例的日志打印到控制台，支持颜色和国际化。

use colored::*;

use crate::core::models::{JobResult, JobStatus, RunSummary, StepStatus};
use crate::infra::t;

/// Prints a formatted summary of job results to the console.
///
/// 在控制台打印格式化的作业结果摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Lint Matrix Summary ---
///   - Passed     | lint (3.10)                    |      12.31s
///   - Failed     | lint (3.11)                    |       9.02s  lint
///   - Cancelled  | lint (3.12)                    |       0.00s
/// ```
pub fn print_summary(summary: &RunSummary, locale: &str) {
    println!("\n{}", t!("summary_banner", locale = locale).bold());

    for result in &summary.results {
        let status_str = result.get_status_str(locale);
        let status_colored = match result.status {
            JobStatus::Succeeded => status_str.green(),
            JobStatus::Failed(_) => status_str.red(),
            JobStatus::Cancelled => status_str.dimmed(),
        };
        let failed_step = result
            .failed_step()
            .map(|s| s.name.as_str())
            .unwrap_or_default();

        println!(
            "  - {:<12} | {:<30} | {:>10.2?}  {}",
            status_colored,
            result.instance.name(),
            result.duration,
            failed_step.yellow()
        );
    }

    println!(
        "\n{}",
        t!(
            "summary_counts",
            locale = locale,
            total = summary.results.len(),
            passed = summary.passed_count(),
            failed = summary.failed_count(),
            cancelled = summary.cancelled_count()
        )
    );
}

/// Prints the step logs of every failed instance. Steps that did not run are
/// listed by name only.
///
/// 打印每个失败实例的步骤日志。未运行的步骤仅列出名称。
pub fn print_failure_details(failures: &[&JobResult], locale: &str) {
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            t!("report_header_failure", locale = locale).red(),
            result.instance.name().cyan()
        );

        if let Some(reason) = result.failure_reason() {
            println!("\n--- {} ---\n", reason.log_header(locale).yellow());
        }

        for step in &result.steps {
            match step.status {
                StepStatus::NotRun => {
                    println!("{} {}", "·".dimmed(), step.name.dimmed());
                }
                _ => {
                    println!("{} {}", "##".cyan(), step.name.bold());
                    if !step.output.trim().is_empty() {
                        println!("{}", step.output.trim_end());
                    }
                }
            }
        }
        println!("\n{}", "-".repeat(80));
    }
}
