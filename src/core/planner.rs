//! # Execution Planner Module / 执行计划模块
//!
//! This module expands the matrix axis into job instances, narrows them to
//! the values requested on the command line, and optionally splits them
//! across several runners.
//!
//! 此模块将矩阵轴展开为作业实例，将其限定为命令行中请求的值，
//! 并可选择在多个运行器之间拆分。

use crate::core::config::LintMatrix;
use crate::core::models::{JobInstance, Step};
use crate::core::steps;
use anyhow::{bail, Result};

/// Represents a complete execution plan for a lint matrix.
/// 表示 lint 矩阵的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Instances to execute, in axis order.
    /// 要执行的实例，按轴顺序排列。
    pub instances: Vec<JobInstance>,
    /// The step list shared by every instance.
    /// 所有实例共享的步骤列表。
    pub steps: Vec<Step>,
    /// Number of instances left out by `--only`.
    pub filtered_count: usize,
    /// Instances kept by `--only`, before sharding across runners.
    pub selected_count: usize,
    /// Whether instances are split across multiple runners.
    /// 实例是否分布在多个运行器上。
    pub is_distributed: bool,
}

/// Produces one job instance per axis value, in axis order.
/// An empty axis yields no instances.
///
/// 为每个轴值生成一个作业实例，按轴顺序排列。
/// 空轴不产生任何实例。
pub fn expand_matrix(versions: &[String]) -> Vec<JobInstance> {
    versions
        .iter()
        .enumerate()
        .map(|(index, version)| JobInstance::new(index, version.clone()))
        .collect()
}

/// Creates an execution plan for the given configuration.
///
/// # Arguments
/// * `matrix` - The loaded configuration
/// * `only` - Axis values to keep; empty keeps all
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
pub fn plan_execution(
    matrix: &LintMatrix,
    only: &[String],
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let versions = &matrix.matrix.versions;

    if let Some(unknown) = only.iter().find(|v| !versions.contains(v)) {
        bail!(
            "Matrix value '{}' is not part of the configured axis ({}).",
            unknown,
            versions.join(", ")
        );
    }

    let expanded = expand_matrix(versions);
    let total = expanded.len();
    let selected: Vec<_> = expanded
        .into_iter()
        .filter(|instance| only.is_empty() || only.contains(&instance.version))
        .collect();
    let selected_count = selected.len();
    let filtered_count = total - selected_count;

    let (instances, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("Runner index must be less than total runners.");
            }
            let distributed = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, instance)| instance)
                .collect();
            (distributed, true)
        }
        (None, None) => (selected, false),
        _ => bail!("Both --total-runners and --runner-index must be provided."),
    };

    Ok(ExecutionPlan {
        instances,
        steps: steps::build_steps(matrix),
        filtered_count,
        selected_count,
        is_distributed,
    })
}
