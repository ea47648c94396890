//! # Step List Module / 步骤列表模块
//!
//! Builds the step list every job instance executes. The list is the same for
//! all instances; the matrix value is bound only when a step runs.
//!
//! 构建每个作业实例执行的步骤列表。该列表对所有实例都相同；
//! 矩阵值仅在步骤运行时绑定。

use crate::core::config::LintMatrix;
use crate::core::models::{Step, StepAction};
use crate::infra::t;

pub const CHECKOUT_STEP: &str = "checkout";
pub const SETUP_STEP: &str = "setup-python";
pub const INSTALL_STEP: &str = "install-dependencies";
pub const MANIFEST_STEP: &str = "install-manifest";
pub const LINT_STEP: &str = "lint";

/// checkout, setup, baseline install, manifest install, lint, then any extra steps.
pub fn build_steps(matrix: &LintMatrix) -> Vec<Step> {
    let mut steps = vec![
        Step::new(CHECKOUT_STEP, StepAction::Checkout),
        Step::new(SETUP_STEP, StepAction::SetupInterpreter),
        Step::new(
            INSTALL_STEP,
            StepAction::Install {
                upgrade_pip: matrix.install.upgrade_pip,
                packages: matrix.install.packages.clone(),
            },
        ),
        Step::new(
            MANIFEST_STEP,
            StepAction::InstallManifest {
                manifest: matrix.install.manifest.clone(),
            },
        ),
        Step::new(
            LINT_STEP,
            StepAction::Lint {
                tool: matrix.lint.tool.clone(),
                suffix: matrix.lint.suffix.clone(),
                disable: matrix.lint.disable.clone(),
            },
        ),
    ];

    steps.extend(
        matrix
            .extra_steps
            .iter()
            .map(|extra| Step::new(extra.name.clone(), StepAction::Shell {
                run: extra.run.clone(),
            })),
    );

    steps
}

/// Human-readable one-line description of a step, used by `plan`. Command
/// lines are shown verbatim; prose is localized.
/// 步骤的单行可读描述，由 `plan` 使用。命令行原样显示；说明文字会本地化。
pub fn describe(step: &Step, locale: &str) -> String {
    match &step.action {
        StepAction::Checkout => t!("plan.checkout", locale = locale).to_string(),
        StepAction::SetupInterpreter => t!("plan.setup_interpreter", locale = locale).to_string(),
        StepAction::Install {
            upgrade_pip,
            packages,
        } => {
            let mut parts = Vec::new();
            if *upgrade_pip {
                parts.push("pip install --upgrade pip".to_string());
            }
            if !packages.is_empty() {
                parts.push(format!("pip install {}", packages.join(" ")));
            }
            if parts.is_empty() {
                t!("plan.nothing_to_install", locale = locale).to_string()
            } else {
                parts.join(" && ")
            }
        }
        StepAction::InstallManifest { manifest } => {
            t!("plan.install_manifest", locale = locale, manifest = manifest).to_string()
        }
        StepAction::Lint {
            tool,
            suffix,
            disable,
        } => format!(
            "{tool} --disable={} $(git ls-files '*{suffix}')",
            disable.join(",")
        ),
        StepAction::Shell { run } => run.clone(),
    }
}
