//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the isolated workspace each job instance runs in, and
//! the copy of the project tree that the checkout step places into it.
//!
//! 此模块提供每个作业实例运行所在的隔离工作区，
//! 以及检出步骤放入其中的项目树副本。

use anyhow::{Context, Result};
use fs_extra::dir::CopyOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Top-level entries never copied into a workspace: local environments and caches.
/// 永远不会复制到工作区的顶层条目：本地环境和缓存。
pub const CHECKOUT_EXCLUDES: [&str; 6] = [
    ".venv",
    "venv",
    ".tox",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
];

/// An isolated directory owned by one job instance.
/// The directory on disk is deleted when this struct is dropped.
///
/// 由一个作业实例拥有的隔离目录。
/// 当此结构体被丢弃时，磁盘上的目录将被删除。
pub struct Workspace {
    _temp_root: TempDir,
    root: PathBuf,
}

impl Workspace {
    /// Creates a fresh, uniquely named workspace for `instance_name`.
    pub fn create(instance_name: &str) -> Result<Self> {
        let sanitized_name = instance_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect::<String>();

        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("lint_matrix_{}_", sanitized_name))
            .tempdir()
            .context("Failed to create temporary workspace directory")?;
        let root = temp_dir.path().to_path_buf();

        Ok(Self {
            _temp_root: temp_dir,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the checkout step places the project tree.
    /// 检出步骤放置项目树的位置。
    pub fn source_dir(&self) -> PathBuf {
        self.root.join("source")
    }

    /// Where the setup step creates the virtualenv.
    pub fn venv_dir(&self) -> PathBuf {
        self.root.join("venv")
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Copies the contents of `from` into `to` (created if missing), skipping
/// [`CHECKOUT_EXCLUDES`] at the top level. Returns the number of entries copied.
///
/// 将 `from` 的内容复制到 `to`（如不存在则创建），跳过顶层的 [`CHECKOUT_EXCLUDES`]。
/// 返回复制的条目数。
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    if !is_directory(from) {
        anyhow::bail!("Source tree not found: {}", from.display());
    }
    fs::create_dir_all(to)
        .with_context(|| format!("Failed to create directory: {}", to.display()))?;

    let mut items = Vec::new();
    for entry in fs::read_dir(from)
        .with_context(|| format!("Failed to read directory: {}", from.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if CHECKOUT_EXCLUDES.iter().any(|excluded| name == *excluded) {
            continue;
        }
        items.push(entry.path());
    }

    let mut options = CopyOptions::new();
    options.overwrite = true;
    fs_extra::copy_items(&items, to, &options).with_context(|| {
        format!(
            "Failed to copy {} into {}",
            from.display(),
            to.display()
        )
    })?;

    Ok(items.len())
}

/// Checks if a path exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Gets the absolute path from a potentially relative path.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
