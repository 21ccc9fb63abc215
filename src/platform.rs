//! Mapping from host platform to a published rcodesign release archive.
//!
//! The supported set is a closed table; anything it does not list is an
//! unsupported platform rather than a best-effort guess.
use crate::error::WorkflowError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Release host prefix; the tag is `apple-codesign/<version>` with the slash escaped.
pub const RELEASE_URL_PREFIX: &str =
    "https://github.com/indygreg/apple-platform-rs/releases/download/apple-codesign%2F";

/// Name of the executable shipped inside every release archive.
pub const EXECUTABLE_NAME: &str = "rcodesign";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatingSystem {
    MacOs,
    Linux,
    Windows,
}

impl OperatingSystem {
    /// Accepts both Rust (`macos`, `windows`) and Node-style (`darwin`, `win32`) names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "macos" | "darwin" => Some(OperatingSystem::MacOs),
            "linux" => Some(OperatingSystem::Linux),
            "windows" | "win32" => Some(OperatingSystem::Windows),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            OperatingSystem::MacOs => "macOS",
            OperatingSystem::Linux => "Linux",
            OperatingSystem::Windows => "Windows",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Architecture {
    Aarch64,
    X64,
}

impl Architecture {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "aarch64" | "arm64" => Some(Architecture::Aarch64),
            "x64" | "x86_64" | "amd64" => Some(Architecture::X64),
            _ => None,
        }
    }
}

/// Raw platform identifiers as reported by the host or supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: String,
    pub arch: String,
}

impl PlatformTarget {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process is running on.
    pub fn host() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => ".tar.gz",
            ArchiveFormat::Zip => ".zip",
        }
    }

    /// Infer the archive format from a download URL's suffix.
    pub fn from_url(url: &str) -> Option<Self> {
        [ArchiveFormat::TarGz, ArchiveFormat::Zip]
            .into_iter()
            .find(|format| url.ends_with(format.extension()))
    }
}

/// One row of the supported-platform table.
#[derive(Debug)]
pub struct ReleaseTarget {
    pub os: OperatingSystem,
    /// `None` matches every architecture (universal binaries).
    pub arch: Option<Architecture>,
    pub suffix: &'static str,
    pub format: ArchiveFormat,
}

const RELEASE_TARGETS: &[ReleaseTarget] = &[
    ReleaseTarget {
        os: OperatingSystem::MacOs,
        arch: None,
        suffix: "macos-universal",
        format: ArchiveFormat::TarGz,
    },
    ReleaseTarget {
        os: OperatingSystem::Linux,
        arch: Some(Architecture::Aarch64),
        suffix: "aarch64-unknown-linux-musl",
        format: ArchiveFormat::TarGz,
    },
    ReleaseTarget {
        os: OperatingSystem::Linux,
        arch: Some(Architecture::X64),
        suffix: "x86_64-unknown-linux-musl",
        format: ArchiveFormat::TarGz,
    },
    ReleaseTarget {
        os: OperatingSystem::Windows,
        arch: Some(Architecture::X64),
        suffix: "x86_64-pc-windows-msvc",
        format: ArchiveFormat::Zip,
    },
];

/// Look up the release archive published for `platform`.
pub fn release_target(platform: &PlatformTarget) -> Result<&'static ReleaseTarget, WorkflowError> {
    let os = OperatingSystem::from_name(&platform.os);
    let arch = Architecture::from_name(&platform.arch);
    RELEASE_TARGETS
        .iter()
        .find(|target| Some(target.os) == os && (target.arch.is_none() || target.arch == arch))
        .ok_or_else(|| {
            let message = match os {
                Some(os) => format!("unsupported {} architecture: {}", os.label(), platform.arch),
                None => format!("unsupported operating system: {}", platform.os),
            };
            WorkflowError::UnsupportedPlatform(message)
        })
}

/// Where a given rcodesign version lives and how its archive is laid out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReleaseLocation {
    pub version: String,
    pub url: String,
    pub archive_dir: String,
    pub format: ArchiveFormat,
    pub executable_suffix: &'static str,
}

impl ReleaseTarget {
    pub fn locate(&self, version: &str) -> ReleaseLocation {
        let encoded = urlencoding::encode(version);
        let url = format!(
            "{RELEASE_URL_PREFIX}{encoded}/apple-codesign-{encoded}-{}{}",
            self.suffix,
            self.format.extension()
        );
        let executable_suffix = match self.os {
            OperatingSystem::Windows => ".exe",
            OperatingSystem::MacOs | OperatingSystem::Linux => "",
        };
        ReleaseLocation {
            version: version.to_string(),
            url,
            archive_dir: format!("apple-codesign-{version}-{}", self.suffix),
            format: self.format,
            executable_suffix,
        }
    }
}

impl ReleaseLocation {
    /// Path of the executable once the archive is extracted under `extract_dir`.
    pub fn executable_in(&self, extract_dir: &Path) -> PathBuf {
        extract_dir
            .join(&self.archive_dir)
            .join(format!("{EXECUTABLE_NAME}{}", self.executable_suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(os: &str, arch: &str, version: &str) -> ReleaseLocation {
        release_target(&PlatformTarget::new(os, arch))
            .expect("supported platform")
            .locate(version)
    }

    #[test]
    fn macos_ignores_architecture() {
        for arch in ["aarch64", "x86_64", "riscv64"] {
            let location = locate("macos", arch, "0.22.0");
            assert_eq!(
                location.url,
                "https://github.com/indygreg/apple-platform-rs/releases/download/apple-codesign%2F0.22.0/apple-codesign-0.22.0-macos-universal.tar.gz"
            );
            assert_eq!(location.archive_dir, "apple-codesign-0.22.0-macos-universal");
            assert_eq!(location.format, ArchiveFormat::TarGz);
        }
    }

    #[test]
    fn linux_architectures_map_to_musl_archives() {
        let arm = locate("linux", "aarch64", "0.22.0");
        assert!(arm
            .url
            .ends_with("/apple-codesign-0.22.0-aarch64-unknown-linux-musl.tar.gz"));
        assert_eq!(arm.archive_dir, "apple-codesign-0.22.0-aarch64-unknown-linux-musl");

        let x64 = locate("linux", "x64", "0.22.0");
        assert!(x64
            .url
            .ends_with("/apple-codesign-0.22.0-x86_64-unknown-linux-musl.tar.gz"));
        assert_eq!(locate("linux", "x86_64", "0.22.0"), x64);
    }

    #[test]
    fn windows_uses_zip_and_exe_suffix() {
        let location = locate("windows", "x86_64", "0.22.0");
        assert!(location
            .url
            .ends_with("/apple-codesign-0.22.0-x86_64-pc-windows-msvc.zip"));
        assert_eq!(location.format, ArchiveFormat::Zip);
        let exe = location.executable_in(Path::new("cache"));
        assert_eq!(
            exe,
            Path::new("cache")
                .join("apple-codesign-0.22.0-x86_64-pc-windows-msvc")
                .join("rcodesign.exe")
        );
    }

    #[test]
    fn unix_executables_have_no_suffix() {
        let exe = locate("linux", "aarch64", "0.22.0").executable_in(Path::new("x"));
        assert_eq!(
            exe,
            Path::new("x")
                .join("apple-codesign-0.22.0-aarch64-unknown-linux-musl")
                .join("rcodesign")
        );
    }

    #[test]
    fn unsupported_pairs_are_rejected() {
        let cases = [
            ("linux", "riscv64", "unsupported Linux architecture: riscv64"),
            ("linux", "x86", "unsupported Linux architecture: x86"),
            ("windows", "aarch64", "unsupported Windows architecture: aarch64"),
            ("freebsd", "x86_64", "unsupported operating system: freebsd"),
        ];
        for (os, arch, expected) in cases {
            let err = release_target(&PlatformTarget::new(os, arch)).expect_err("unsupported");
            assert!(matches!(err, WorkflowError::UnsupportedPlatform(_)));
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn version_is_escaped_in_url_but_not_directory() {
        let location = locate("linux", "x64", "1.0.0 beta");
        assert!(location.url.contains("apple-codesign%2F1.0.0%20beta/"));
        assert_eq!(
            location.archive_dir,
            "apple-codesign-1.0.0 beta-x86_64-unknown-linux-musl"
        );
    }

    #[test]
    fn archive_format_follows_url_suffix() {
        assert_eq!(ArchiveFormat::from_url("a/b.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_url("a/b.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_url("a/b.tar.xz"), None);
    }
}
