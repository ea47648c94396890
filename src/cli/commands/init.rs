//! # Init Command Module / 初始化命令模块
//!
//! Creates a `LintMatrix.toml` in the current directory, either with the
//! defaults or through an interactive wizard, and optionally installs a git
//! `pre-push` hook so the matrix runs on every push.
//!
//! 在当前目录中创建 `LintMatrix.toml`，使用默认值或通过交互式向导，
//! 并可选择安装 git `pre-push` 钩子，使矩阵在每次推送时运行。

use anyhow::{bail, Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{LintMatrix, DEFAULT_CONFIG_FILE};
use crate::infra::t;

/// Interpreter versions offered by the wizard.
const KNOWN_VERSIONS: [&str; 7] = ["3.8", "3.9", "3.10", "3.11", "3.12", "3.13", "3.14"];

const CONFIG_HEADER: &str = "# Lint matrix configuration / Lint 矩阵配置\n\
# One job instance runs per value of matrix.versions.\n\
# 每个 matrix.versions 值运行一个作业实例。\n\n";

const HOOK_MARKER: &str = "# installed by lint-matrix";

pub fn execute(locale: &str, non_interactive: bool, hook: bool, force: bool) -> Result<()> {
    let root = std::env::current_dir().context("Failed to read the current directory")?;
    write_config_file(&root, locale, non_interactive, force)?;
    if hook {
        let hook_path = install_pre_push_hook(&root, force)?;
        println!(
            "{}",
            t!("init_hook_installed", locale = locale, path = hook_path.display()).green()
        );
    }
    Ok(())
}

fn write_config_file(root: &Path, locale: &str, non_interactive: bool, force: bool) -> Result<()> {
    let config_path = root.join(DEFAULT_CONFIG_FILE);
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init_wizard_welcome", locale = locale).cyan().bold());
        println!("{}", t!("init_wizard_description", locale = locale));
    }

    if config_path.exists() && !force {
        if non_interactive {
            println!(
                "{}",
                t!("init_file_exists", locale = locale, path = config_path.display()).yellow()
            );
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init_overwrite_prompt", locale = locale, path = config_path.display()))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = locale).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = locale));
            return Ok(());
        }
    }

    let matrix = if non_interactive {
        LintMatrix {
            language: locale.to_string(),
            ..LintMatrix::default()
        }
    } else {
        run_wizard(&theme, locale)?
    };

    fs::write(&config_path, render_config(&matrix)?).with_context(|| {
        t!("init_write_failed", locale = locale, path = config_path.display()).to_string()
    })?;

    println!(
        "{}",
        t!("init_success", locale = locale, path = config_path.display()).green()
    );
    println!("{}", t!("init_next_steps", locale = locale));
    Ok(())
}

fn run_wizard(theme: &ColorfulTheme, locale: &str) -> Result<LintMatrix> {
    let defaults = LintMatrix::default();
    let checked: Vec<bool> = KNOWN_VERSIONS
        .iter()
        .map(|v| defaults.matrix.versions.iter().any(|d| d == v))
        .collect();

    let selections = MultiSelect::with_theme(theme)
        .with_prompt(t!("init_versions_prompt", locale = locale))
        .items(&KNOWN_VERSIONS)
        .defaults(&checked)
        .interact()
        .context(t!("init_user_confirmation_failed", locale = locale).to_string())?;

    if selections.is_empty() {
        println!("{}", t!("init_no_versions_selected", locale = locale).yellow());
    }

    let packages: String = Input::with_theme(theme)
        .with_prompt(t!("init_packages_prompt", locale = locale))
        .default(defaults.install.packages.join(" "))
        .interact_text()?;

    let fail_fast = Confirm::with_theme(theme)
        .with_prompt(t!("init_fail_fast_prompt", locale = locale))
        .default(false)
        .interact()?;

    let mut matrix = LintMatrix {
        language: locale.to_string(),
        fail_fast,
        ..defaults
    };
    matrix.matrix.versions = selections
        .into_iter()
        .map(|i| KNOWN_VERSIONS[i].to_string())
        .collect();
    matrix.install.packages = packages.split_whitespace().map(String::from).collect();
    Ok(matrix)
}

/// Serializes a configuration with an explanatory header.
pub fn render_config(matrix: &LintMatrix) -> Result<String> {
    let body = toml::to_string_pretty(matrix).context("Failed to serialize configuration")?;
    Ok(format!("{CONFIG_HEADER}{body}"))
}

/// Writes `.git/hooks/pre-push` running `lint-matrix run`. An existing hook
/// not written by this tool is only replaced with `force`.
///
/// 写入运行 `lint-matrix run` 的 `.git/hooks/pre-push`。
/// 非本工具写入的现有钩子仅在使用 `force` 时才会被替换。
pub fn install_pre_push_hook(root: &Path, force: bool) -> Result<PathBuf> {
    let git_dir = root.join(".git");
    if !git_dir.is_dir() {
        bail!("{} is not the root of a git repository", root.display());
    }

    let hooks_dir = git_dir.join("hooks");
    fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("Failed to create {}", hooks_dir.display()))?;
    let hook_path = hooks_dir.join("pre-push");

    if hook_path.exists() && !force {
        let existing = fs::read_to_string(&hook_path).unwrap_or_default();
        if !existing.contains(HOOK_MARKER) {
            bail!(
                "{} already exists; rerun with --force to replace it",
                hook_path.display()
            );
        }
    }

    let script = format!("#!/bin/sh\n{HOOK_MARKER}\nexec lint-matrix run --config {DEFAULT_CONFIG_FILE}\n");
    fs::write(&hook_path, script)
        .with_context(|| format!("Failed to write {}", hook_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&hook_path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to make {} executable", hook_path.display()))?;
    }

    Ok(hook_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_default_config_round_trips() {
        let rendered = render_config(&LintMatrix::default()).unwrap();
        assert!(rendered.starts_with("# Lint matrix configuration"));
        let parsed = LintMatrix::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, LintMatrix::default());
    }

    #[test]
    fn hook_requires_git_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(install_pre_push_hook(dir.path(), false).is_err());
    }

    #[test]
    fn hook_is_written_and_rewritable() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();

        let path = install_pre_push_hook(dir.path(), false).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("lint-matrix run"));

        // Our own hook can be refreshed without --force.
        assert!(install_pre_push_hook(dir.path(), false).is_ok());
    }

    #[test]
    fn foreign_hook_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();
        fs::write(dir.path().join(".git/hooks/pre-push"), "#!/bin/sh\nmake check\n").unwrap();

        assert!(install_pre_push_hook(dir.path(), false).is_err());
        assert!(install_pre_push_hook(dir.path(), true).is_ok());
    }
}
