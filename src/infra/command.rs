//! # Command Execution Module / 命令执行模块
//!
//! Spawning child processes and capturing their interleaved output.
//!
//! 派生子进程并捕获其交错输出。

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::pin::Pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_stream::{Stream, StreamExt};

/// Spawns a command, captures its stdout and stderr.
/// Both streams are read concurrently to EOF and merged line by line in
/// arrival order. Lines are decoded lossily, so non-UTF-8 output never stops
/// the capture.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 两个流被并发读取直到 EOF，并按到达顺序逐行合并。
/// 行以有损方式解码，因此非 UTF-8 输出不会中断捕获。
pub async fn spawn_and_capture(mut cmd: Command) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other("failed to capture child output")),
            String::new(),
        );
    };

    let mut output = String::new();
    {
        let mut merged =
            lossy_lines(BufReader::new(stdout)).merge(lossy_lines(BufReader::new(stderr)));
        while let Some(line) = merged.next().await {
            match line {
                Ok(line) => {
                    output.push_str(&line);
                    output.push('\n');
                }
                // A read error ends that stream only; the other keeps draining.
                Err(e) => output.push_str(&format!("[output capture error: {e}]\n")),
            }
        }
    }

    (child.wait().await, output)
}

/// Reads `reader` to EOF as newline-terminated byte lines, decoding each lossily.
/// The stream ends after the first read error.
fn lossy_lines<R>(reader: R) -> Pin<Box<dyn Stream<Item = std::io::Result<String>> + Send>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    Box::pin(futures::stream::unfold(Some(reader), |reader| async move {
        let mut reader = reader?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some((Ok(String::from_utf8_lossy(&buf).into_owned()), Some(reader)))
            }
            Err(e) => Some((Err(e), None)),
        }
    }))
}

/// The result of running one program to completion.
/// 运行一个程序直至完成的结果。
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    /// The echoed command line followed by the captured output.
    /// 回显的命令行，后跟捕获的输出。
    pub log: String,
}

/// Runs `program` with `args` in `cwd`, with extra environment variables.
///
/// A program that cannot be spawned (e.g. not installed) is an `Err`; a program
/// that runs and exits non-zero is an `Ok` with `success == false`.
///
/// 在 `cwd` 中使用 `args` 和额外的环境变量运行 `program`。
/// 无法派生的程序（例如未安装）返回 `Err`；运行后以非零状态退出的程序返回 `success == false` 的 `Ok`。
pub async fn run_program(
    program: &str,
    args: &[String],
    cwd: &Path,
    envs: &[(String, String)],
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd);
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let (status, output) = spawn_and_capture(cmd).await;
    let status = status.with_context(|| format!("Failed to run '{}'", program))?;

    Ok(CommandOutput {
        success: status.success(),
        code: status.code(),
        log: format!("$ {}\n{}", render_command_line(program, args), output),
    })
}

/// Splits a shell-style command line into a program and its arguments,
/// expanding `~` and `$VARS` first. `lookup` resolves variables before the
/// process environment.
///
/// 将 shell 风格的命令行拆分为程序及其参数，先展开 `~` 和 `$VARS`。
/// `lookup` 在进程环境之前解析变量。
pub fn parse_command_line(
    command_line: &str,
    lookup: &[(String, String)],
) -> Result<(String, Vec<String>)> {
    let expanded = shellexpand::full_with_context_no_errors(
        command_line,
        || std::env::var("HOME").ok(),
        |name| {
            lookup
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .or_else(|| std::env::var(name).ok())
        },
    )
    .to_string();

    let parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse command: {}", expanded))?;

    let mut parts = parts.into_iter();
    let program = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty command after parsing."))?;
    Ok((program, parts.collect()))
}

/// Renders a program and its arguments as a copy-pasteable command line.
pub fn render_command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|part| shlex::try_quote(part).map_or_else(|_| part.to_string(), |q| q.into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_arguments() {
        let (program, args) = parse_command_line("echo 'hello world' two", &[]).unwrap();
        assert_eq!(program, "echo");
        assert_eq!(args, vec!["hello world", "two"]);
    }

    #[test]
    fn expands_lookup_variables_first() {
        let vars = vec![("MATRIX_VERSION".to_string(), "3.12".to_string())];
        let (_, args) = parse_command_line("echo $MATRIX_VERSION", &vars).unwrap();
        assert_eq!(args, vec!["3.12"]);
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(parse_command_line("   ", &[]).is_err());
    }

    #[test]
    fn renders_arguments_with_spaces_quoted() {
        let line = render_command_line("python", &["-c".to_string(), "print(1)".to_string(), "a b".to_string()]);
        assert_eq!(line, "python -c 'print(1)' 'a b'");
    }

    /// Runs `script` under `sh -c` and returns the exit code with the captured
    /// output, minus the echoed command line.
    #[cfg(unix)]
    async fn run_shell(script: &str) -> (Option<i32>, String) {
        let args = vec!["-c".to_string(), script.to_string()];
        let cwd = std::env::temp_dir();
        let output = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            run_program("sh", &args, &cwd, &[]),
        )
        .await
        .expect("run_program must return once the child exits")
        .unwrap();
        let captured = output.log.split_once('\n').map(|(_, rest)| rest).unwrap_or_default();
        (output.code, captured.to_string())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_line_keeps_later_output() {
        let (code, captured) =
            run_shell(r"printf 'bad \377 byte\n'; printf 'E06%s undefined-variable\n' 02; exit 2").await;
        assert_eq!(code, Some(2));
        assert!(captured.contains("bad \u{FFFD} byte"));
        assert!(captured.contains("E0602 undefined-variable"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_beyond_pipe_buffer_after_non_utf8_is_drained() {
        let (code, captured) = run_shell(
            r"printf 'bad \377 byte\n'; head -c 300000 /dev/zero | tr '\0' a; echo; echo tail-marker; exit 3",
        )
        .await;
        assert_eq!(code, Some(3));
        assert!(captured.ends_with("tail-marker\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn crlf_and_unterminated_lines() {
        let (code, captured) = run_shell(r"printf 'one\r\ntwo'").await;
        assert_eq!(code, Some(0));
        assert_eq!(captured, "one\ntwo\n");
    }
}
