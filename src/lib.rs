//! # Lint Matrix Library / Lint Matrix 库
//!
//! This library provides the core functionality for the `lint-matrix` tool,
//! a configuration-driven runner that lints a Python project once per
//! interpreter version, each in its own isolated environment.
//!
//! 此库为 `lint-matrix` 工具提供核心功能，
//! 这是一个配置驱动的运行器，针对每个解释器版本在独立环境中对 Python 项目执行 lint。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, data models, matrix expansion and job execution
//! - `infra` - Process spawning, workspaces and version-control queries
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、数据模型、矩阵展开和作业执行
//! - `infra` - 进程派生、工作区和版本控制查询
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

pub use core::config;
pub use core::execution;
pub use core::models;

/// Picks the best available locale for `requested`.
///
/// Tries the full locale first (e.g. "zh-CN"), then its language part
/// (e.g. "en" from "en-US"), and finally falls back to "en".
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&requested) {
        return requested.to_string();
    }
    requested
        .split(['-', '_'])
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

/// Initializes i18n from the system locale and returns the locale in use.
pub fn init() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let lang = resolve_locale(&locale);
    rust_i18n::set_locale(&lang);
    lang
}

rust_i18n::i18n!("locales", fallback = "en");
