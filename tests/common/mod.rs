// Shared test helpers for integration tests
#![allow(dead_code)]

use lint_matrix::config::{Isolation, LintMatrix};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

pub const VERSIONS: [&str; 4] = ["3.10", "3.11", "3.12", "3.13"];

/// A fake interpreter per matrix value. Each call's arguments are appended to
/// `calls-<version>.log` and the invoked program plus arguments to
/// `programs-<version>.log`. `--version` always succeeds, and `-m venv <dir>`
/// copies the stub to `<dir>/bin/python`.
pub struct StubInterpreters {
    pub dir: TempDir,
}

impl StubInterpreters {
    /// Every call succeeds.
    pub fn passing() -> Self {
        Self::failing_on("", "")
    }

    /// `-m <module>` fails for `version`; everything else succeeds.
    pub fn failing_on(version: &str, module: &str) -> Self {
        let dir = tempdir().expect("Failed to create stub directory");
        for v in VERSIONS {
            let log = dir.path().join(format!("calls-{v}.log"));
            let programs = dir.path().join(format!("programs-{v}.log"));
            let script = format!(
                r#"#!/bin/sh
echo "$*" >> "{log}"
echo "$0 $*" >> "{programs}"
if [ "$1" = "--version" ]; then
  echo "Python {v}"
  exit 0
fi
if [ "{v}" = "{version}" ] && [ "$1" = "-m" ] && [ "$2" = "{module}" ]; then
  echo "simulated {module} failure" >&2
  exit 1
fi
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin" && cp "$0" "$3/bin/python" && exit 0
  exit 1
fi
echo "ok: $*"
exit 0
"#,
                log = log.display(),
                programs = programs.display(),
            );
            let path = dir.path().join(format!("fakepy{v}"));
            fs::write(&path, script).expect("Failed to write stub interpreter");
            make_executable(&path);
        }
        Self { dir }
    }

    pub fn template(&self) -> String {
        format!("{}/fakepy{{version}}", self.dir.path().display())
    }

    /// Calls recorded for `version`, one line per invocation.
    pub fn calls(&self, version: &str) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(format!("calls-{version}.log")))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }

    /// Program path and arguments of each call for `version`.
    pub fn programs(&self, version: &str) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(format!("programs-{version}.log")))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}

fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make stub executable");
}

/// A git working tree with the given files added to the index.
pub fn python_project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().expect("Failed to create project directory");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["add", "-A"]);
    dir
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git must be installed to run these tests");
    assert!(status.success(), "git {:?} failed", args);
}

/// The stock configuration wired to the stub interpreters, with the default
/// virtualenv isolation.
pub fn stub_venv_config(stubs: &StubInterpreters) -> LintMatrix {
    let mut matrix = LintMatrix::default();
    matrix.environment.interpreter = stubs.template();
    matrix
}

/// The stock configuration wired to the stub interpreters, without venvs.
pub fn stub_config(stubs: &StubInterpreters) -> LintMatrix {
    let mut matrix = LintMatrix::default();
    matrix.environment.interpreter = stubs.template();
    matrix.environment.isolation = Isolation::None;
    matrix
}

/// Writes `matrix` as `LintMatrix.toml` into `dir`.
pub fn write_config(dir: &Path, matrix: &LintMatrix) -> PathBuf {
    let path = dir.join("LintMatrix.toml");
    fs::write(&path, toml::to_string(matrix).unwrap()).unwrap();
    path
}
