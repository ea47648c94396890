//! # Job Execution Engine Module / 作业执行引擎模块
//!
//! This module executes job instances. Within one instance steps run strictly
//! in order and the first failing step stops the instance; instances
//! themselves run concurrently and never share state.
//!
//! 此模块执行作业实例。在一个实例内，步骤严格按顺序运行，
//! 第一个失败的步骤会终止该实例；实例之间并发运行且从不共享状态。

use anyhow::{anyhow, Context, Result};
use colored::*;
use futures::{stream, StreamExt};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{EnvironmentConfig, Isolation, LintMatrix, Timeouts},
        models::{
            FailureReason, JobInstance, JobResult, JobStatus, RunSummary, Step, StepAction,
            StepRecord, StepStatus,
        },
    },
    infra::{
        command::{self, CommandOutput},
        fs::{self, Workspace},
        t, vcs,
    },
};

/// Everything a job instance needs besides its step list.
/// 作业实例除步骤列表外所需的一切。
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// The externally supplied source tree that every instance checks out.
    /// 每个实例检出的外部提供的源代码树。
    pub project_root: PathBuf,
    pub environment: EnvironmentConfig,
    pub timeouts: Timeouts,
}

impl JobSettings {
    pub fn from_config(matrix: &LintMatrix, project_root: PathBuf) -> Self {
        Self {
            project_root,
            environment: matrix.environment.clone(),
            timeouts: matrix.timeouts.clone(),
        }
    }
}

/// How a Python entry point is invoked: a program plus leading arguments.
#[derive(Debug, Clone)]
struct Interpreter {
    program: String,
    prefix: Vec<String>,
}

impl Interpreter {
    /// `<program> <prefix...> -m <module> <args...>`
    fn module_args(&self, module: &str, args: &[String]) -> Vec<String> {
        let mut all = self.prefix.clone();
        all.push("-m".to_string());
        all.push(module.to_string());
        all.extend(args.iter().cloned());
        all
    }
}

/// Mutable state threaded through the steps of one instance.
struct JobState {
    version: String,
    workspace: Workspace,
    interpreter: Option<Interpreter>,
    venv: Option<PathBuf>,
}

impl JobState {
    fn source_dir(&self) -> PathBuf {
        self.workspace.source_dir()
    }

    fn interpreter(&self) -> Result<&Interpreter> {
        self.interpreter
            .as_ref()
            .ok_or_else(|| anyhow!("No interpreter has been provisioned for {}", self.version))
    }

    /// Environment exported to every process a step spawns.
    /// 导出到步骤派生的每个进程的环境变量。
    fn envs(&self) -> Vec<(String, String)> {
        let mut envs = vec![
            ("MATRIX_VERSION".to_string(), self.version.clone()),
            (
                "MATRIX_WORKSPACE".to_string(),
                self.workspace.root().display().to_string(),
            ),
        ];
        if let Some(interpreter) = &self.interpreter {
            envs.push(("MATRIX_PYTHON".to_string(), interpreter.program.clone()));
        }
        if let Some(venv) = &self.venv {
            envs.push(("VIRTUAL_ENV".to_string(), venv.display().to_string()));
            let mut paths = vec![venv_bin_dir(venv)];
            if let Some(existing) = std::env::var_os("PATH") {
                paths.extend(std::env::split_paths(&existing));
            }
            if let Ok(joined) = std::env::join_paths(paths) {
                envs.push(("PATH".to_string(), joined.to_string_lossy().into_owned()));
            }
        }
        envs
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        command::run_program(program, args, &self.source_dir(), &self.envs()).await
    }

    async fn run_module(&self, module: &str, args: &[String]) -> Result<CommandOutput> {
        let interpreter = self.interpreter()?;
        let args = interpreter.module_args(module, args);
        self.run(&interpreter.program, &args).await
    }
}

/// What a step produced when it ran to completion.
/// 步骤运行完成时产生的结果。
#[derive(Debug)]
struct StepOutcome {
    status: StepStatus,
    log: String,
}

impl StepOutcome {
    fn from_command(output: CommandOutput) -> Self {
        Self {
            status: if output.success {
                StepStatus::Succeeded
            } else {
                StepStatus::Failed
            },
            log: output.log,
        }
    }
}

enum StepRun {
    Finished(Result<StepOutcome>),
    TimedOut(Duration),
    Cancelled,
}

/// Runs every job instance, at most `jobs` at a time, and aggregates the results.
///
/// Instances are independent: a failure in one never affects the others,
/// unless `fail_fast` is set, in which case the first failure cancels every
/// instance that has not finished. Cancelling `stop` (e.g. on Ctrl-C) cancels
/// all outstanding instances.
///
/// 运行每个作业实例（最多同时运行 `jobs` 个）并汇总结果。
/// 实例之间相互独立：一个实例的失败不会影响其他实例，
/// 除非设置了 `fail_fast`，此时第一个失败会取消所有尚未完成的实例。
/// 取消 `stop`（例如 Ctrl-C）会取消所有未完成的实例。
pub async fn run_matrix(
    instances: Vec<JobInstance>,
    steps: Vec<Step>,
    settings: JobSettings,
    jobs: usize,
    fail_fast: bool,
    stop: CancellationToken,
) -> RunSummary {
    let steps: Arc<[Step]> = steps.into();
    let settings = Arc::new(settings);
    let cancel = stop.child_token();

    let results: Vec<JobResult> = stream::iter(instances.into_iter().map(|instance| {
        let steps = Arc::clone(&steps);
        let settings = Arc::clone(&settings);
        let cancel = cancel.clone();
        let fallback = instance.clone();

        async move {
            let handle = tokio::spawn({
                let steps = Arc::clone(&steps);
                let cancel = cancel.clone();
                async move { run_job(instance, &steps, &settings, &cancel).await }
            });

            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let mut result = JobResult::cancelled(fallback, &steps);
                    result.status = JobStatus::Failed(FailureReason::Command);
                    if let Some(first) = result.steps.first_mut() {
                        first.status = StepStatus::Failed;
                        first.output = format!("job task aborted: {e}");
                    }
                    result
                }
            };

            if triggers_fail_fast(fail_fast, result.status) {
                cancel.cancel();
            }
            result
        }
    }))
    .buffer_unordered(jobs.max(1))
    .collect()
    .await;

    RunSummary::new(results)
}

/// Executes the steps of one job instance sequentially in a fresh workspace.
///
/// The first failing step marks the instance failed; the steps after it are
/// recorded as not run. Never returns an error: every problem becomes part of
/// the returned `JobResult`.
///
/// 在新的工作区中按顺序执行一个作业实例的步骤。
/// 第一个失败的步骤将实例标记为失败；之后的步骤记录为未运行。
/// 从不返回错误：所有问题都成为返回的 `JobResult` 的一部分。
pub async fn run_job(
    instance: JobInstance,
    steps: &[Step],
    settings: &JobSettings,
    cancel: &CancellationToken,
) -> JobResult {
    let name = instance.name();
    let start = Instant::now();
    let deadline = settings.timeouts.job().map(|limit| start + limit);

    let instance = match admit_job(instance, steps, cancel.is_cancelled()) {
        Ok(instance) => instance,
        Err(cancelled) => return cancelled,
    };

    println!("{}", t!("run.job_started", name = &name).blue());

    let workspace = match Workspace::create(&name) {
        Ok(workspace) => workspace,
        Err(e) => {
            let mut result = JobResult::cancelled(instance, steps);
            result.status = JobStatus::Failed(FailureReason::Provision);
            if let Some(first) = result.steps.first_mut() {
                first.status = StepStatus::Failed;
                first.output = format!("{e:#}");
            }
            result.duration = start.elapsed();
            report_job_finished(&result);
            return result;
        }
    };

    let mut state = JobState {
        version: instance.version.clone(),
        workspace,
        interpreter: None,
        venv: None,
    };
    let mut records = Vec::with_capacity(steps.len());
    let mut status = JobStatus::Succeeded;

    for step in steps {
        if status != JobStatus::Succeeded {
            records.push(StepRecord::not_run(&step.name));
            continue;
        }

        let (limit, job_bound) = effective_limit(settings.timeouts.step(), deadline);
        let step_start = Instant::now();

        let run = tokio::select! {
            biased;
            _ = cancel.cancelled() => StepRun::Cancelled,
            run = with_limit(limit, execute_step(step, &mut state, settings)) => run,
        };
        let duration = step_start.elapsed();

        let record = match run {
            StepRun::Finished(Ok(outcome)) => {
                if outcome.status == StepStatus::Failed {
                    status = JobStatus::Failed(step.failure_reason());
                }
                StepRecord {
                    name: step.name.clone(),
                    status: outcome.status,
                    output: outcome.log,
                    duration,
                }
            }
            StepRun::Finished(Err(e)) => {
                status = JobStatus::Failed(step.failure_reason());
                StepRecord {
                    name: step.name.clone(),
                    status: StepStatus::Failed,
                    output: format!("{e:#}"),
                    duration,
                }
            }
            StepRun::TimedOut(limit) => {
                status = JobStatus::Failed(FailureReason::Timeout);
                let output = if job_bound {
                    t!("run.job_timeout_message", secs = limit.as_secs())
                } else {
                    t!("run.step_timeout_message", secs = limit.as_secs())
                };
                StepRecord {
                    name: step.name.clone(),
                    status: StepStatus::Failed,
                    output: output.to_string(),
                    duration,
                }
            }
            StepRun::Cancelled => {
                status = JobStatus::Cancelled;
                StepRecord {
                    output: t!("run.step_cancelled").to_string(),
                    ..StepRecord::not_run(&step.name)
                }
            }
        };

        report_step_finished(&name, &record);
        records.push(record);
    }

    let result = JobResult {
        instance,
        status,
        steps: records,
        duration: start.elapsed(),
    };
    report_job_finished(&result);
    result
}

/// Whether a finished instance with `status` should cancel its siblings.
/// Only failures do, and only under fail-fast; cancellations never cascade.
///
/// 状态为 `status` 的已完成实例是否应取消其同级实例。
/// 仅在快速失败模式下的失败会触发；取消不会级联。
pub fn triggers_fail_fast(fail_fast: bool, status: JobStatus) -> bool {
    fail_fast && matches!(status, JobStatus::Failed(_))
}

/// The check made before an instance starts: a cancelled run turns the
/// instance straight into a `Cancelled` result with every step not run.
pub fn admit_job(
    instance: JobInstance,
    steps: &[Step],
    cancelled: bool,
) -> std::result::Result<JobInstance, JobResult> {
    if cancelled {
        Err(JobResult::cancelled(instance, steps))
    } else {
        Ok(instance)
    }
}

/// The tighter of the per-step limit and the time left before the job deadline.
/// The flag is `true` when the job deadline is the binding one.
///
/// 每步限制与距作业截止时间剩余时间中较紧的一个。
/// 当作业截止时间起约束作用时，标志为 `true`。
fn effective_limit(step: Option<Duration>, deadline: Option<Instant>) -> (Option<Duration>, bool) {
    let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
    match (step, remaining) {
        (Some(step), Some(remaining)) if remaining < step => (Some(remaining), true),
        (Some(step), _) => (Some(step), false),
        (None, Some(remaining)) => (Some(remaining), true),
        (None, None) => (None, false),
    }
}

async fn with_limit<F>(limit: Option<Duration>, fut: F) -> StepRun
where
    F: Future<Output = Result<StepOutcome>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(res) => StepRun::Finished(res),
            Err(_) => StepRun::TimedOut(limit),
        },
        None => StepRun::Finished(fut.await),
    }
}

async fn execute_step(
    step: &Step,
    state: &mut JobState,
    settings: &JobSettings,
) -> Result<StepOutcome> {
    match &step.action {
        StepAction::Checkout => checkout(state, &settings.project_root).await,
        StepAction::SetupInterpreter => setup_interpreter(state, &settings.environment).await,
        StepAction::Install {
            upgrade_pip,
            packages,
        } => install_baseline(state, *upgrade_pip, packages).await,
        StepAction::InstallManifest { manifest } => install_manifest(state, manifest).await,
        StepAction::Lint {
            tool,
            suffix,
            disable,
        } => lint(state, &settings.project_root, tool, suffix, disable).await,
        StepAction::Shell { run } => {
            let (program, args) = command::parse_command_line(run, &state.envs())?;
            Ok(StepOutcome::from_command(state.run(&program, &args).await?))
        }
    }
}

async fn checkout(state: &JobState, project_root: &Path) -> Result<StepOutcome> {
    let from = project_root.to_path_buf();
    let to = state.source_dir();
    let log = format!("{} -> {}\n", from.display(), to.display());

    let copied = tokio::task::spawn_blocking(move || fs::copy_tree(&from, &to))
        .await
        .context("Checkout task panicked")??;

    Ok(StepOutcome {
        status: StepStatus::Succeeded,
        log: format!("{log}{}\n", t!("run.checkout_copied", count = copied)),
    })
}

/// Resolves the interpreter for the instance's matrix value and, with venv
/// isolation, creates a virtualenv whose python every later step uses.
///
/// 解析实例矩阵值对应的解释器，并在 venv 隔离模式下创建虚拟环境，
/// 之后的每个步骤都使用该虚拟环境中的 python。
async fn setup_interpreter(
    state: &mut JobState,
    environment: &EnvironmentConfig,
) -> Result<StepOutcome> {
    let command_line = environment.interpreter_for(&state.version);
    let (program, prefix) = command::parse_command_line(&command_line, &state.envs())?;
    let base = Interpreter { program, prefix };

    let mut version_args = base.prefix.clone();
    version_args.push("--version".to_string());
    let probe = state.run(&base.program, &version_args).await?;
    let mut log = probe.log.clone();
    if !probe.success {
        return Ok(StepOutcome::from_command(probe));
    }

    match environment.isolation {
        Isolation::None => {
            state.interpreter = Some(base);
        }
        Isolation::Venv => {
            let venv = state.workspace.venv_dir();
            let args = base.module_args("venv", &[venv.display().to_string()]);
            let created = state.run(&base.program, &args).await?;
            log.push_str(&created.log);
            if !created.success {
                return Ok(StepOutcome {
                    status: StepStatus::Failed,
                    log,
                });
            }
            state.interpreter = Some(Interpreter {
                program: venv_python(&venv).display().to_string(),
                prefix: Vec::new(),
            });
            state.venv = Some(venv);
        }
    }

    Ok(StepOutcome {
        status: StepStatus::Succeeded,
        log,
    })
}

/// Installs the fixed baseline: the installer upgrade first, then the packages.
/// 安装固定的基础包：先升级安装器，然后安装这些包。
async fn install_baseline(
    state: &JobState,
    upgrade_pip: bool,
    packages: &[String],
) -> Result<StepOutcome> {
    let mut log = String::new();

    if upgrade_pip {
        let args = vec!["install".to_string(), "--upgrade".to_string(), "pip".to_string()];
        let output = state.run_module("pip", &args).await?;
        log.push_str(&output.log);
        if !output.success {
            return Ok(StepOutcome {
                status: StepStatus::Failed,
                log,
            });
        }
    }

    if !packages.is_empty() {
        let mut args = vec!["install".to_string()];
        args.extend(packages.iter().cloned());
        let output = state.run_module("pip", &args).await?;
        log.push_str(&output.log);
        if !output.success {
            return Ok(StepOutcome {
                status: StepStatus::Failed,
                log,
            });
        }
    }

    Ok(StepOutcome {
        status: StepStatus::Succeeded,
        log,
    })
}

/// Installs the manifest if it exists in the checked-out tree. Absence is a
/// skip, not an error, and spawns nothing.
///
/// 如果检出的树中存在清单文件则安装它。不存在时跳过，不报错，也不派生任何进程。
async fn install_manifest(state: &JobState, manifest: &str) -> Result<StepOutcome> {
    if !state.source_dir().join(manifest).is_file() {
        return Ok(StepOutcome {
            status: StepStatus::Skipped,
            log: format!("{}\n", t!("run.manifest_absent", path = manifest)),
        });
    }

    let args = vec!["install".to_string(), "-r".to_string(), manifest.to_string()];
    Ok(StepOutcome::from_command(
        state.run_module("pip", &args).await?,
    ))
}

/// Lints every tracked file ending in `suffix`. With no such file the tool
/// is not started and the step succeeds.
///
/// The tracked set is read from `project_root` itself, so a project directory
/// below the repository top level or inside a submodule works; paths come back
/// relative to it and therefore to the checkout. Tracked files the checkout
/// skipped are dropped.
///
/// 检查每个以 `suffix` 结尾的被跟踪文件。没有这样的文件时不启动工具，步骤成功。
/// 被跟踪文件集合直接从 `project_root` 读取，因此仓库子目录或子模块中的项目目录同样适用；
/// 返回的路径相对于它，也即相对于检出目录。检出时跳过的被跟踪文件会被丢弃。
async fn lint(
    state: &JobState,
    project_root: &Path,
    tool: &str,
    suffix: &str,
    disable: &[String],
) -> Result<StepOutcome> {
    let source_dir = state.source_dir();
    let files: Vec<String> = vcs::tracked_files(project_root, suffix)
        .await?
        .into_iter()
        .filter(|file| source_dir.join(file).is_file())
        .collect();
    if files.is_empty() {
        return Ok(StepOutcome {
            status: StepStatus::Succeeded,
            log: format!("{}\n", t!("run.lint_no_files", suffix = suffix)),
        });
    }

    let mut args = Vec::with_capacity(files.len() + 1);
    if !disable.is_empty() {
        args.push(format!("--disable={}", disable.join(",")));
    }
    args.extend(files);

    Ok(StepOutcome::from_command(
        state.run_module(tool, &args).await?,
    ))
}

fn venv_bin_dir(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts")
    } else {
        venv.join("bin")
    }
}

fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_bin_dir(venv).join("python.exe")
    } else {
        venv_bin_dir(venv).join("python")
    }
}

fn report_step_finished(job_name: &str, record: &StepRecord) {
    let secs = format!("{:.2}", record.duration.as_secs_f64());
    let line = match record.status {
        StepStatus::Succeeded => {
            t!("run.step_passed", job = job_name, step = &record.name, duration = &secs).green()
        }
        StepStatus::Failed => {
            t!("run.step_failed", job = job_name, step = &record.name, duration = &secs).red()
        }
        StepStatus::Skipped => {
            t!("run.step_skipped", job = job_name, step = &record.name).yellow()
        }
        StepStatus::NotRun => {
            t!("run.step_not_run", job = job_name, step = &record.name).dimmed()
        }
    };
    println!("{line}");
}

fn report_job_finished(result: &JobResult) {
    let name = result.instance.name();
    let secs = format!("{:.2}", result.duration.as_secs_f64());
    let line = match result.status {
        JobStatus::Succeeded => t!("run.job_passed", name = &name, duration = &secs).green(),
        JobStatus::Failed(_) => t!("run.job_failed", name = &name, duration = &secs).red(),
        JobStatus::Cancelled => t!("run.job_cancelled", name = &name).yellow(),
    };
    println!("{line}");
}
