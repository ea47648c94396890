//! # Version Control Module / 版本控制模块
//!
//! Lists the files git tracks in a working tree.
//!
//! 列出 git 在工作树中跟踪的文件。

use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::process::Command;

/// Returns every tracked path (relative to `root`) that ends with `suffix`,
/// in the order git reports them.
///
/// 返回以 `suffix` 结尾的每个被跟踪路径（相对于 `root`），按 git 报告的顺序排列。
pub async fn tracked_files(root: &Path, suffix: &str) -> Result<Vec<String>> {
    let output = Command::new("git")
        .arg("ls-files")
        .arg("-z")
        .current_dir(root)
        .kill_on_drop(true)
        .output()
        .await
        .context("Failed to execute 'git ls-files'")?;

    if !output.status.success() {
        bail!(
            "'git ls-files' failed in {}: {}",
            root.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(filter_by_suffix(&output.stdout, suffix))
}

/// Splits NUL-separated `git ls-files -z` output and keeps paths ending in `suffix`.
pub fn filter_by_suffix(raw: &[u8], suffix: &str) -> Vec<String> {
    raw.split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| String::from_utf8_lossy(entry).into_owned())
        .filter(|path| path.ends_with(suffix))
        .collect()
}
