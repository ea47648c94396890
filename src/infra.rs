//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the runner,
//! including command execution, workspace management, version-control
//! queries and i18n support.
//!
//! 此模块为运行器提供基础设施服务，
//! 包括命令执行、工作区管理、版本控制查询和国际化支持。

pub mod command;
pub mod fs;
pub mod vcs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
