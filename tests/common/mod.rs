//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch area holding a stub rcodesign, its call log, and an output file.
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// File that `GITHUB_OUTPUT` points at.
    pub fn output_file(&self) -> PathBuf {
        self.path("github_output")
    }

    /// File the stub appends each invocation to, one line per call.
    pub fn call_log(&self) -> PathBuf {
        self.path("calls.log")
    }

    /// Install a shell script that logs its argv and exits with `exit_code`.
    #[cfg(unix)]
    pub fn install_stub(&self, exit_code: i32) -> anyhow::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let stub = self.path("rcodesign");
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\nexit {exit_code}\n",
            self.call_log().display()
        );
        std::fs::write(&stub, script)?;
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755))?;
        Ok(stub)
    }

    /// Lines recorded by the stub, or empty when it never ran.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.call_log())
            .map(|content| content.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    pub fn recorded_outputs(&self) -> String {
        std::fs::read_to_string(self.output_file()).unwrap_or_default()
    }

    /// Run the binary with action-runner inputs stripped from the environment.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<Output> {
        let mut command = Command::new(binary());
        command
            .args(args)
            .env("GITHUB_OUTPUT", self.output_file())
            .env("RUNNER_TEMP", self.temp_dir.path())
            .env_remove("RUST_LOG");
        for (key, _) in std::env::vars_os() {
            if key.to_string_lossy().starts_with("INPUT_") {
                command.env_remove(key);
            }
        }
        Ok(command.output()?)
    }
}

pub fn binary() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_rcodesign-action"))
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
