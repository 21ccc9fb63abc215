//! HTTP download and archive extraction for rcodesign releases.
//!
//! Each fetch lands in a fresh directory under the tool cache root, removed
//! again once the caller drops it. Nothing is reused between runs.
use crate::error::WorkflowError;
use crate::locator::ArchiveFetcher;
use crate::platform::ArchiveFormat;
use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const USER_AGENT: &str = concat!("rcodesign-action/", env!("CARGO_PKG_VERSION"));

/// Downloads release archives over HTTPS and unpacks them under `cache_root`.
pub struct HttpArchiveFetcher {
    cache_root: PathBuf,
}

impl HttpArchiveFetcher {
    pub fn new(cache_root: PathBuf) -> Self {
        Self { cache_root }
    }

    fn fetch_into_cache(&self, url: &str) -> Result<TempDir> {
        let format =
            ArchiveFormat::from_url(url).ok_or_else(|| anyhow!("unrecognized archive format"))?;
        fs::create_dir_all(&self.cache_root)
            .with_context(|| format!("create tool cache {}", self.cache_root.display()))?;

        let mut download = tempfile::Builder::new()
            .prefix("rcodesign-download-")
            .suffix(format.extension())
            .tempfile_in(&self.cache_root)
            .context("create download file")?;
        let bytes = download_to(url, download.as_file_mut())?;
        tracing::debug!(bytes, path = %download.path().display(), "download complete");

        let extract_dir = tempfile::Builder::new()
            .prefix("rcodesign-")
            .tempdir_in(&self.cache_root)
            .context("create extraction dir")?;
        extract_archive(format, download.path(), extract_dir.path())?;
        tracing::info!(dir = %extract_dir.path().display(), "extracted rcodesign");
        Ok(extract_dir)
    }
}

impl ArchiveFetcher for HttpArchiveFetcher {
    fn fetch(&self, url: &str) -> Result<TempDir, WorkflowError> {
        self.fetch_into_cache(url)
            .map_err(|err| WorkflowError::download(url, format!("{err:#}")))
    }
}

fn download_to(url: &str, dest: &mut File) -> Result<u64> {
    let response = ureq::get(url)
        .header("user-agent", USER_AGENT)
        .call()
        .with_context(|| format!("request {url}"))?;
    let mut reader = response.into_body().into_reader();
    io::copy(&mut reader, dest).context("write archive to disk")
}

/// Unpack `archive` into `dest` according to `format`.
pub fn extract_archive(format: ArchiveFormat, archive: &Path, dest: &Path) -> Result<()> {
    let file =
        File::open(archive).with_context(|| format!("open archive {}", archive.display()))?;
    match format {
        ArchiveFormat::TarGz => {
            let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
            tar.unpack(dest).context("extract tar.gz archive")?;
        }
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file).context("read zip archive")?;
            zip.extract(dest).context("extract zip archive")?;
        }
    }
    Ok(())
}
