//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which expands the matrix,
//! executes every job instance and reports the aggregated outcome.
//!
//! 此模块实现 `run` 命令，展开矩阵、执行每个作业实例并报告汇总结果。

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::LintMatrix,
        execution::{run_matrix, JobSettings},
        planner,
    },
    infra::{fs, t},
    reporting::{generate_html_report, print_failure_details, print_summary, write_json_report},
};

/// Options collected from the command line for `run`.
/// 从命令行为 `run` 收集的选项。
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: PathBuf,
    pub project_dir: PathBuf,
    pub jobs: Option<usize>,
    pub only: Vec<String>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub fail_fast: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Locale from `--lang`; overrides the config file's `language`.
    pub language: Option<String>,
}

/// Executes the run command with the provided options.
///
/// Succeeds only when every executed job instance succeeded. An empty plan
/// (no matrix values, or none selected for this runner) succeeds.
///
/// 使用提供的选项执行运行命令。
/// 仅当每个执行的作业实例都成功时才成功。空计划（没有矩阵值或没有为此运行器选择任何值）视为成功。
pub async fn execute(options: RunOptions) -> Result<()> {
    let (matrix, config_path) = load_config(&options.config)?;
    let locale = match &options.language {
        Some(lang) => lang.clone(),
        None => crate::resolve_locale(&matrix.language),
    };
    rust_i18n::set_locale(&locale);

    let project_root = fs::absolute_path(&options.project_dir).with_context(|| {
        t!("project_dir_not_found", locale = &locale, path = options.project_dir.display())
            .to_string()
    })?;

    println!(
        "{}",
        t!("project_root_detected", locale = &locale, path = project_root.display())
    );
    println!(
        "{}",
        t!("loading_matrix", locale = &locale, path = config_path.display())
    );

    let plan = planner::plan_execution(
        &matrix,
        &options.only,
        options.total_runners,
        options.runner_index,
    )?;

    if plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "filtered_versions",
                locale = &locale,
                filtered = plan.filtered_count,
                total = plan.selected_count
            )
            .cyan()
        );
    }

    if let (Some(total), Some(index)) = (options.total_runners, options.runner_index) {
        println!(
            "{}",
            t!(
                "running_as_split_runner",
                locale = &locale,
                index = index + 1,
                total = total,
                count = plan.instances.len()
            )
            .bold()
        );
    } else {
        println!("{}", t!("running_as_single_runner", locale = &locale).bold());
    }

    if plan.instances.is_empty() {
        println!("{}", t!("no_jobs_to_run", locale = &locale).green());
        return Ok(());
    }

    let stop_token = setup_signal_handler(&locale);
    let jobs = options.jobs.unwrap_or_else(num_cpus::get);
    let fail_fast = options.fail_fast || matrix.fail_fast;
    let settings = JobSettings::from_config(&matrix, project_root);

    let summary = run_matrix(plan.instances, plan.steps, settings, jobs, fail_fast, stop_token).await;

    print_summary(&summary, &locale);

    if let Some(report_path) = &options.html {
        println!(
            "\n{}",
            t!("html_report_generating", locale = &locale, path = report_path.display())
        );
        if let Err(e) = generate_html_report(&summary, report_path, &locale) {
            eprintln!("{} {:#}", t!("html_report_failed", locale = &locale).red(), e);
        }
    }

    if let Some(report_path) = &options.json {
        if let Err(e) = write_json_report(&summary, report_path) {
            eprintln!("{} {:#}", t!("json_report_failed", locale = &locale).red(), e);
        }
    }

    if summary.succeeded() {
        println!("\n{}", t!("all_jobs_passed", locale = &locale).green().bold());
        Ok(())
    } else {
        print_failure_details(&summary.failures(), &locale);
        anyhow::bail!(t!("matrix_failed", locale = &locale, count = summary.failures().len()).to_string());
    }
}

fn load_config(config_path_arg: &Path) -> Result<(LintMatrix, PathBuf)> {
    // The config's own locale is not known yet.
    let config_path = fs::absolute_path(config_path_arg).with_context(|| {
        t!("config_read_failed_path", path = config_path_arg.display()).to_string()
    })?;

    let matrix = LintMatrix::load(&config_path)
        .with_context(|| t!("config_parse_failed", path = config_path.display()).to_string())?;

    Ok((matrix, config_path))
}

fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
