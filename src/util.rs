use crate::error::WorkflowError;
use std::env;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "rcodesign-action";

/// Root directory for downloaded rcodesign releases.
///
/// Prefers the runner's scratch area, then the user cache, then the system
/// temp dir.
pub fn tool_cache_root() -> PathBuf {
    if let Some(runner_temp) = env::var_os("RUNNER_TEMP").filter(|value| !value.is_empty()) {
        return PathBuf::from(runner_temp).join(CACHE_DIR_NAME);
    }
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join(CACHE_DIR_NAME)
}

/// Resolve a user-supplied program: paths are taken as is, bare names are
/// searched on `PATH`.
pub fn resolve_program(input: &str) -> Result<PathBuf, WorkflowError> {
    let path = Path::new(input);
    if path.components().count() > 1 || path.is_absolute() {
        if !path.is_file() {
            return Err(WorkflowError::Configuration(format!(
                "rcodesign_path {input} does not exist"
            )));
        }
        return Ok(path.to_path_buf());
    }
    which::which(input).map_err(|err| {
        WorkflowError::Configuration(format!("rcodesign_path {input} not found on PATH: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_path_is_a_configuration_error() {
        let err = resolve_program("/nonexistent/rcodesign-action/rcodesign").expect_err("missing");
        assert!(matches!(err, WorkflowError::Configuration(_)));
    }

    #[test]
    fn existing_file_path_is_returned_unchanged() {
        let temp = tempfile::tempdir().expect("temp dir");
        let exe = temp.path().join("rcodesign");
        std::fs::write(&exe, b"").expect("write");

        let resolved = resolve_program(exe.to_str().expect("utf-8 path")).expect("resolve");
        assert_eq!(resolved, exe);
    }

    #[test]
    fn unknown_bare_name_is_not_found() {
        let err = resolve_program("rcodesign-action-no-such-tool").expect_err("missing");
        assert!(err.to_string().contains("not found on PATH"), "{err}");
    }
}
