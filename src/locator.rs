//! rcodesign acquisition.
//!
//! Resolution is platform lookup first, then fetch; an unsupported platform
//! fails before any network access.
use crate::error::WorkflowError;
use crate::platform::{release_target, PlatformTarget, ReleaseLocation};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Capability that turns an archive URL into a local extraction directory.
///
/// The directory is removed when the returned handle is dropped.
pub trait ArchiveFetcher {
    fn fetch(&self, url: &str) -> Result<TempDir, WorkflowError>;
}

/// A resolved rcodesign executable, fixed for the rest of the run.
///
/// A downloaded release owns its extraction directory and deletes it on drop.
#[derive(Debug)]
pub struct ToolRelease {
    pub version: String,
    pub executable: PathBuf,
    extract_dir: Option<TempDir>,
}

impl ToolRelease {
    /// Wrap an executable that was installed outside this workflow.
    pub fn preinstalled(version: &str, executable: &Path) -> Self {
        Self {
            version: version.to_string(),
            executable: executable.to_path_buf(),
            extract_dir: None,
        }
    }
}

/// Compute the download location without touching the network.
pub fn locate_release(
    version: &str,
    platform: &PlatformTarget,
) -> Result<ReleaseLocation, WorkflowError> {
    Ok(release_target(platform)?.locate(version))
}

/// Download and extract the rcodesign release for `platform`.
pub fn resolve_tool(
    fetcher: &dyn ArchiveFetcher,
    version: &str,
    platform: &PlatformTarget,
) -> Result<ToolRelease, WorkflowError> {
    let location = locate_release(version, platform)?;
    tracing::info!(%platform, "Downloading rcodesign from {}", location.url);
    let extract_dir = fetcher.fetch(&location.url)?;
    let executable = location.executable_in(extract_dir.path());
    tracing::debug!(executable = %executable.display(), "resolved rcodesign");
    Ok(ToolRelease {
        version: version.to_string(),
        executable,
        extract_dir: Some(extract_dir),
    })
}
