//! Monitored external command execution

use crate::command::{AbortedBy, CommandError, CommandResult, ExecutionResult};
use crate::config::Settings;
use crate::core::abort::AbortToken;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Executes substituted command templates as monitored child processes
///
/// Output is captured via a stream reader rather than buffered at exit, so
/// long-running or infinite-output tools can be interrupted mid-flight
/// without losing what they produced so far.
pub struct CommandRunner {
    settings: Arc<Settings>,
}

impl CommandRunner {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Substitute known placeholders into a command template
    ///
    /// `{OUTPUT_DIR}` and every configured token are replaced in a single
    /// left-to-right scan. Inserted values are never re-scanned, so a
    /// placeholder inside a token value stays literal and substituting an
    /// already substituted command is a no-op.
    pub fn substitute(&self, template: &str, output_dir: &Path) -> String {
        let output_dir = output_dir.to_string_lossy();
        token_pattern()
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let key = &caps[1];
                if key == "OUTPUT_DIR" {
                    output_dir.to_string()
                } else if let Some(value) = self.settings.tokens.get(key) {
                    value.clone()
                } else {
                    // Unknown tokens pass through for the shell to see
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Execute a command template, monitoring for external aborts
    ///
    /// Stdout and stderr are merged line-wise into one accumulated string.
    /// On abort the child is killed and the result carries the partial
    /// output with `aborted_by` set; the caller never loses captured lines.
    pub async fn execute(
        &self,
        template: &str,
        output_dir: &Path,
        token: &mut AbortToken,
    ) -> CommandResult<ExecutionResult> {
        let command = self.substitute(template, output_dir);
        let start = Instant::now();
        log::debug!("Executing: {}", command);

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut out_lines = child.stdout.take().map(|s| BufReader::new(s).lines());
        let mut err_lines = child.stderr.take().map(|s| BufReader::new(s).lines());
        let mut raw_output = String::new();

        loop {
            tokio::select! {
                line = next_line(&mut out_lines), if out_lines.is_some() => {
                    match line {
                        Some(l) => append_line(&mut raw_output, &l),
                        None => out_lines = None,
                    }
                }
                line = next_line(&mut err_lines), if err_lines.is_some() => {
                    match line {
                        Some(l) => append_line(&mut raw_output, &l),
                        None => err_lines = None,
                    }
                }
                kind = token.triggered() => {
                    log::info!("Command aborted ({:?} scope): {}", kind, command);
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    return Ok(ExecutionResult {
                        modified_command: command,
                        raw_output,
                        elapsed: start.elapsed(),
                        aborted_by: AbortedBy::from(kind),
                        exit_status: None,
                    });
                }
            }
            if out_lines.is_none() && err_lines.is_none() {
                break;
            }
        }

        let status = child.wait().await.map_err(|source| CommandError::Wait {
            command: command.clone(),
            source,
        })?;

        if !status.success() {
            // Non-zero exit is content for the report, not a runner error
            log::debug!("Command exited with {:?}: {}", status.code(), command);
        }

        Ok(ExecutionResult {
            modified_command: command,
            raw_output,
            elapsed: start.elapsed(),
            aborted_by: AbortedBy::None,
            exit_status: status.code(),
        })
    }
}

fn token_pattern() -> &'static regex::Regex {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("token pattern is valid")
    })
}

async fn next_line<R>(lines: &mut Option<Lines<BufReader<R>>>) -> Option<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    match lines {
        Some(reader) => reader.next_line().await.ok().flatten(),
        None => None,
    }
}

fn append_line(buf: &mut String, line: &str) {
    if !buf.is_empty() {
        buf.push('\n');
    }
    buf.push_str(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abort::AbortController;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn runner_with_tokens(tokens: &[(&str, &str)]) -> CommandRunner {
        let mut settings = Settings::default();
        settings.tokens = tokens
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        CommandRunner::new(Arc::new(settings))
    }

    #[test]
    fn test_substitute_known_tokens() {
        let runner = runner_with_tokens(&[("PORT", "80"), ("HOST", "x.test")]);
        let cmd = runner.substitute("nmap -p {PORT} {HOST}", Path::new("out"));
        assert_eq!(cmd, "nmap -p 80 x.test");
    }

    #[test]
    fn test_substitute_output_dir() {
        let runner = runner_with_tokens(&[]);
        let cmd = runner.substitute("tee {OUTPUT_DIR}/log.txt", Path::new("out/Scan/active"));
        assert_eq!(cmd, "tee out/Scan/active/log.txt");
    }

    #[test]
    fn test_substitute_is_idempotent() {
        let runner = runner_with_tokens(&[("PORT", "80"), ("HOST", "x.test")]);
        let once = runner.substitute("nmap -p {PORT} {HOST}", Path::new("out"));
        let twice = runner.substitute(&once, Path::new("out"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        // A placeholder inside a token value must come out literal
        let runner = runner_with_tokens(&[("PORT", "80"), ("HOST", "{PORT}")]);
        let cmd = runner.substitute("curl {HOST}", Path::new("out"));
        assert_eq!(cmd, "curl {PORT}");
    }

    #[test]
    fn test_unknown_tokens_left_in_place() {
        let runner = runner_with_tokens(&[]);
        let cmd = runner.substitute("echo {NOT_CONFIGURED}", Path::new("out"));
        assert_eq!(cmd, "echo {NOT_CONFIGURED}");
    }

    #[tokio::test]
    async fn test_execute_captures_combined_output() {
        let runner = runner_with_tokens(&[]);
        let mut token = AbortController::new().token();
        let result = runner
            .execute("echo visible; echo hidden 1>&2", Path::new("."), &mut token)
            .await
            .unwrap();

        assert!(result.raw_output.contains("visible"));
        assert!(result.raw_output.contains("hidden"));
        assert_eq!(result.aborted_by, AbortedBy::None);
        assert_eq!(result.exit_status, Some(0));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let runner = runner_with_tokens(&[]);
        let mut token = AbortController::new().token();
        let result = runner
            .execute("echo before; exit 3", Path::new("."), &mut token)
            .await
            .unwrap();

        assert_eq!(result.exit_status, Some(3));
        assert!(result.raw_output.contains("before"));
    }

    #[tokio::test]
    async fn test_abort_preserves_partial_output() {
        let runner = runner_with_tokens(&[]);
        let controller = AbortController::new();
        let mut token = controller.token();

        let aborter = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            aborter.abort_plugin();
        });

        let result = runner
            .execute(
                "echo line1; echo line2; sleep 30; echo line3",
                Path::new("."),
                &mut token,
            )
            .await
            .unwrap();

        assert_eq!(result.aborted_by, AbortedBy::Plugin);
        assert!(result.raw_output.contains("line1\nline2"), "got: {}", result.raw_output);
        assert!(!result.raw_output.contains("line3"));
        assert_eq!(result.exit_status, None);
    }

    #[tokio::test]
    async fn test_framework_abort_tagged_distinctly() {
        let runner = runner_with_tokens(&[]);
        let controller = AbortController::new();
        let mut token = controller.token();

        let aborter = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            aborter.abort_framework();
        });

        let result = runner
            .execute("sleep 30", Path::new("."), &mut token)
            .await
            .unwrap();
        assert_eq!(result.aborted_by, AbortedBy::Framework);
    }
}
