//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the runner:
//! configuration, data models, matrix expansion, the shared step list
//! and job execution.
//!
//! 此模块包含运行器的核心功能：
//! 配置、数据模型、矩阵展开、共享步骤列表和作业执行。

pub mod config;
pub mod execution;
pub mod models;
pub mod planner;
pub mod steps;

// Re-exports
pub use config::LintMatrix;
pub use execution::{run_job, run_matrix};
pub use models::{JobResult, RunSummary};
