//! Stage execution.
//!
//! rcodesign inherits stdio so its progress and notarization logs stream
//! straight to the console. There is no retry here: the remote services
//! rcodesign talks to already retry on their own.
use crate::args::StageInvocation;
use crate::error::WorkflowError;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::Instant;

/// Capability that runs one stage invocation to completion.
pub trait ProcessRunner {
    fn run(&mut self, program: &Path, invocation: &StageInvocation) -> Result<(), WorkflowError>;
}

/// Runs rcodesign as a child process and waits for it.
pub struct CommandRunner;

impl ProcessRunner for CommandRunner {
    fn run(&mut self, program: &Path, invocation: &StageInvocation) -> Result<(), WorkflowError> {
        let stage = invocation.stage().as_str();
        tracing::info!(
            stage,
            command = %format_command_line(program, invocation),
            "running stage"
        );
        let start = Instant::now();
        let status = Command::new(program)
            .args(invocation.argv())
            .status()
            .map_err(|err| process_error(program, invocation, format!("failed to start: {err}")))?;
        let elapsed_ms = start.elapsed().as_millis();
        if !status.success() {
            return Err(process_error(
                program,
                invocation,
                format!("failed with {}", exit_status_string(&status)),
            ));
        }
        tracing::info!(stage, elapsed_ms, "stage complete");
        Ok(())
    }
}

/// Shell-quoted, redacted command line for logs and plans.
pub fn format_command_line(program: &Path, invocation: &StageInvocation) -> String {
    let program = program.display().to_string();
    let redacted = invocation.redacted_argv();
    let words = std::iter::once(program.as_str()).chain(redacted.iter().map(String::as_str));
    shell_words::join(words)
}

fn process_error(program: &Path, invocation: &StageInvocation, reason: String) -> WorkflowError {
    WorkflowError::Process {
        stage: invocation.stage().as_str().to_string(),
        program: program.display().to_string(),
        reason,
    }
}

fn exit_status_string(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("exit code {code}")
    } else {
        "termination by signal".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::build_staple_args;
    use crate::options::WorkflowOptions;
    use std::path::PathBuf;

    fn staple_invocation() -> StageInvocation {
        let options = WorkflowOptions {
            input_path: "a.bin".to_string(),
            ..WorkflowOptions::default()
        };
        build_staple_args(&options, "my app.dmg")
    }

    fn find_in_path(name: &str) -> Option<PathBuf> {
        let path_var = std::env::var_os("PATH")?;
        for dir in std::env::split_paths(&path_var) {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    #[test]
    fn command_line_is_quoted() {
        let line = format_command_line(Path::new("/opt/rcodesign"), &staple_invocation());
        assert_eq!(line, "/opt/rcodesign staple 'my app.dmg'");
    }

    #[test]
    fn successful_exit_is_ok_if_available() {
        let Some(binary) = find_in_path("true") else {
            return;
        };
        CommandRunner
            .run(&binary, &staple_invocation())
            .expect("true exits zero");
    }

    #[test]
    fn nonzero_exit_is_a_process_error_if_available() {
        let Some(binary) = find_in_path("false") else {
            return;
        };
        let err = CommandRunner
            .run(&binary, &staple_invocation())
            .expect_err("false exits non-zero");
        assert!(matches!(err, WorkflowError::Process { .. }));
        assert!(err.to_string().contains("exit code 1"), "{err}");
    }

    #[test]
    fn missing_program_is_a_process_error() {
        let err = CommandRunner
            .run(
                Path::new("/nonexistent/rcodesign-action-test/rcodesign"),
                &staple_invocation(),
            )
            .expect_err("missing program");
        assert!(err.to_string().contains("failed to start"), "{err}");
    }
}
