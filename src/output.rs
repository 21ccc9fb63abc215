//! Workflow outputs and failure reporting for action runners.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT`; failures are surfaced as
//! an `::error::` workflow command so the runner annotates the step.
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Record `name=value` for later steps, if the runner provided an output file.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|value| !value.is_empty()) else {
        tracing::debug!(name, "GITHUB_OUTPUT not set; output not recorded");
        return Ok(());
    };
    append_output(Path::new(&path), name, value)
}

/// Append one output entry, using the heredoc form for multi-line values.
pub fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let entry = if value.contains('\n') || value.contains('\r') {
        let delimiter = format!("ghadelimiter_{}", std::process::id());
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Print the failure as an error annotation.
pub fn report_failure(err: &anyhow::Error) {
    println!("::error::{}", escape_command_data(&format!("{err:#}")));
}

fn escape_command_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
