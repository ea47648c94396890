//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders a self-contained HTML page with run statistics, one row per job
//! instance, and collapsible per-step logs for failed instances.
//!
//! 渲染一个独立的 HTML 页面，包含运行统计、每个作业实例一行，
//! 以及失败实例可折叠的每步日志。

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::core::models::{JobResult, RunSummary, StepStatus};
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Renders the report as a string.
/// 将报告渲染为字符串。
pub fn render_html_report(summary: &RunSummary, locale: &str) -> String {
    let title = t!("html_report.title", locale = locale);

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                div class="summary-container" {
                    (summary_item(summary.results.len(), "", &t!("html_report.summary.total", locale = locale)))
                    (summary_item(summary.passed_count(), "passed-text", &t!("html_report.summary.passed", locale = locale)))
                    (summary_item(summary.failed_count(), "failed-text", &t!("html_report.summary.failed", locale = locale)))
                    (summary_item(summary.cancelled_count(), "cancelled-text", &t!("html_report.summary.cancelled", locale = locale)))
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.header.name", locale = locale)) }
                            th class="status-col" { (t!("html_report.table.header.status", locale = locale)) }
                            th class="duration-cell" { (t!("html_report.table.header.duration", locale = locale)) }
                        }
                    }
                    tbody {
                        @for result in &summary.results {
                            (result_row(result, locale))
                        }
                    }
                }
            }
        }
    };

    markup.into_string()
}

/// Writes the HTML report to `output_path`.
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
/// 如果无法写入文件则返回错误。
pub fn generate_html_report(summary: &RunSummary, output_path: &Path, locale: &str) -> Result<()> {
    fs::write(output_path, render_html_report(summary, locale))
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))
}

fn summary_item(count: usize, class: &str, label: &str) -> Markup {
    html! {
        div class="summary-item" {
            span class={ "count " (class) } { (count) }
            span class="label" { (label) }
        }
    }
}

fn result_row(result: &JobResult, locale: &str) -> Markup {
    html! {
        tr {
            td { (result.instance.name()) }
            td class="status-col" {
                div class={ "status-cell " (result.get_status_class()) } {
                    (result.get_status_str(locale))
                }
            }
            td class="duration-cell" { (format!("{:.2}s", result.duration.as_secs_f64())) }
        }
        @if result.is_failure() {
            tr class="output-row" {
                td colspan="3" {
                    details {
                        summary { (t!("html_report.toggle_output", locale = locale)) }
                        @for step in result.steps.iter().filter(|s| s.status != StepStatus::NotRun) {
                            h4 { (step.name) }
                            pre class="output-content" { (step.output) }
                        }
                    }
                }
            }
        }
    }
}
