//! # Plan Command Module / 计划命令模块
//!
//! Prints the expanded job instances and their step list without running anything.
//!
//! 打印展开后的作业实例及其步骤列表，不执行任何操作。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::core::{config::LintMatrix, planner, steps};
use crate::infra::t;

pub fn execute(config: &Path, only: &[String], locale: &str) -> Result<()> {
    let matrix = LintMatrix::load(config)
        .with_context(|| t!("config_parse_failed", locale = locale, path = config.display()).to_string())?;
    let plan = planner::plan_execution(&matrix, only, None, None)?;

    println!(
        "{}",
        t!("plan_header", locale = locale, count = plan.instances.len()).bold()
    );
    for instance in &plan.instances {
        println!("  - {}", instance.name().cyan());
    }

    println!("\n{}", t!("plan_steps_header", locale = locale).bold());
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {:<22} {}", i + 1, step.name.yellow(), steps::describe(step, locale));
    }

    if plan.instances.is_empty() {
        println!("\n{}", t!("no_jobs_to_run", locale = locale).green());
    }
    Ok(())
}
