//! # Configuration Module / 配置模块
//!
//! Schema of the `LintMatrix.toml` file. Every section has defaults, so an
//! empty file describes the stock pipeline: lint with pylint on Python 3.10
//! through 3.13.
//!
//! `LintMatrix.toml` 文件的结构。每个部分都有默认值，
//! 因此空文件即描述默认流水线：在 Python 3.10 到 3.13 上使用 pylint 进行检查。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default file name looked up by `run`, `plan` and written by `init`.
pub const DEFAULT_CONFIG_FILE: &str = "LintMatrix.toml";

/// Placeholder replaced by the matrix value in interpreter templates.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Rule identifiers suppressed by default.
pub const DEFAULT_DISABLED_RULES: [&str; 12] = [
    "C0114", "C0115", "C0116", "C0103", "C0301", "R0903", "R0913", "R0902", "W0718", "W0212",
    "W0613", "E0401",
];

/// Errors raised while loading or validating a configuration file.
/// 加载或验证配置文件时产生的错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("matrix value '{0}' is listed more than once")]
    DuplicateVersion(String),
    #[error("matrix values must not be empty strings")]
    EmptyVersion,
    #[error("interpreter template '{0}' does not contain {{version}}")]
    InterpreterTemplate(String),
    #[error("lint suffix must not be empty")]
    EmptySuffix,
    #[error("extra step '{0}' has an empty command")]
    EmptyExtraStep(String),
}

/// How each job instance isolates its Python packages.
/// 每个作业实例如何隔离其 Python 包。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Isolation {
    /// Create a virtualenv inside the instance workspace.
    /// 在实例工作区内创建虚拟环境。
    #[default]
    Venv,
    /// Use the resolved interpreter directly.
    /// 直接使用解析出的解释器。
    None,
}

/// The matrix axis.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatrixAxis {
    /// Interpreter versions, one job instance per value, in reporting order.
    /// 解释器版本，每个值对应一个作业实例，按报告顺序排列。
    #[serde(default = "default_versions")]
    pub versions: Vec<String>,
}

impl Default for MatrixAxis {
    fn default() -> Self {
        Self {
            versions: default_versions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    /// Command template used to find the interpreter for a matrix value.
    /// 用于为矩阵值定位解释器的命令模板。
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default)]
    pub isolation: Isolation,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            isolation: Isolation::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Renders the interpreter command for `version`.
    pub fn interpreter_for(&self, version: &str) -> String {
        self.interpreter.replace(VERSION_PLACEHOLDER, version)
    }
}

/// Dependency installation: a fixed baseline, then an optional manifest.
/// 依赖安装：先安装固定的基础包，然后是可选的清单文件。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InstallConfig {
    /// Upgrade the package installer itself before anything else.
    #[serde(default = "default_true")]
    pub upgrade_pip: bool,
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Project-declared manifest, relative to the project root. Installed only if present.
    /// 项目声明的清单文件（相对于项目根目录）。仅在存在时安装。
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            upgrade_pip: true,
            packages: default_packages(),
            manifest: default_manifest(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LintConfig {
    /// Module name passed to `python -m`.
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Only tracked files ending with this suffix are linted.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Suppressed rule identifiers, joined with commas on the command line.
    /// 被抑制的规则标识符，在命令行中以逗号连接。
    #[serde(default = "default_disabled_rules")]
    pub disable: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            suffix: default_suffix(),
            disable: default_disabled_rules(),
        }
    }
}

/// Optional time limits. Unset means unbounded.
/// 可选的时间限制。未设置表示不限制。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Timeouts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_secs: Option<u64>,
}

impl Timeouts {
    pub fn step(&self) -> Option<Duration> {
        self.step_secs.map(Duration::from_secs)
    }

    pub fn job(&self) -> Option<Duration> {
        self.job_secs.map(Duration::from_secs)
    }
}

/// A user-declared command appended after the lint step.
/// 用户声明的命令，追加在 lint 步骤之后。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExtraStep {
    pub name: String,
    pub run: String,
}

/// Represents the entire configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个配置。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LintMatrix {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,
    /// Cancel unfinished instances as soon as one fails.
    /// 一旦有实例失败，立即取消未完成的实例。
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub matrix: MatrixAxis,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub lint: LintConfig,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_steps: Vec<ExtraStep>,
}

impl Default for LintMatrix {
    fn default() -> Self {
        Self {
            language: default_language(),
            fail_fast: false,
            matrix: MatrixAxis::default(),
            environment: EnvironmentConfig::default(),
            install: InstallConfig::default(),
            lint: LintConfig::default(),
            timeouts: Timeouts::default(),
            extra_steps: Vec::new(),
        }
    }
}

impl LintMatrix {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let matrix: LintMatrix = toml::from_str(content)?;
        matrix.validate()?;
        Ok(matrix)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for version in &self.matrix.versions {
            if version.trim().is_empty() {
                return Err(ConfigError::EmptyVersion);
            }
            if !seen.insert(version.as_str()) {
                return Err(ConfigError::DuplicateVersion(version.clone()));
            }
        }
        if !self.environment.interpreter.contains(VERSION_PLACEHOLDER) {
            return Err(ConfigError::InterpreterTemplate(
                self.environment.interpreter.clone(),
            ));
        }
        if self.lint.suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        if let Some(step) = self.extra_steps.iter().find(|s| s.run.trim().is_empty()) {
            return Err(ConfigError::EmptyExtraStep(step.name.clone()));
        }
        Ok(())
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_versions() -> Vec<String> {
    ["3.10", "3.11", "3.12", "3.13"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_interpreter() -> String {
    format!("python{VERSION_PLACEHOLDER}")
}

fn default_true() -> bool {
    true
}

fn default_packages() -> Vec<String> {
    ["pylint", "pandas", "numpy"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_manifest() -> String {
    "requirements.txt".to_string()
}

fn default_tool() -> String {
    "pylint".to_string()
}

fn default_suffix() -> String {
    ".py".to_string()
}

fn default_disabled_rules() -> Vec<String> {
    DEFAULT_DISABLED_RULES.iter().map(|s| s.to_string()).collect()
}
