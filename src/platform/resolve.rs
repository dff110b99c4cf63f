use serde::Serialize;
use std::fmt;

use super::detection::{Arch, HostInfo, OsType};

/// Errors raised while mapping a host onto a release platform.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unsupported platform: {os_type} {arch}")]
    UnsupportedPlatform { os_type: String, arch: String },
}

/// Platform identifiers that prebuilt release archives exist for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Win64,
    Win32,
    Linux,
    Macos,
}

impl PlatformId {
    /// Map a host onto a platform identifier.
    ///
    /// Windows on x64 is `win64`; Windows on any other architecture falls back
    /// to `win32`. Linux and macOS are only published for x64.
    pub fn resolve(host: &HostInfo) -> Result<Self, ResolveError> {
        match (&host.os_type, &host.arch) {
            (OsType::Windows, Arch::X64) => Ok(PlatformId::Win64),
            (OsType::Windows, _) => Ok(PlatformId::Win32),
            (OsType::Linux, Arch::X64) => Ok(PlatformId::Linux),
            (OsType::Darwin, Arch::X64) => Ok(PlatformId::Macos),
            _ => Err(ResolveError::UnsupportedPlatform {
                os_type: host.reported_os_type().to_string(),
                arch: host.reported_arch().to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Win64 => "win64",
            PlatformId::Win32 => "win32",
            PlatformId::Linux => "linux",
            PlatformId::Macos => "macos",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(os_type: &str, arch: &str) -> Result<PlatformId, ResolveError> {
        PlatformId::resolve(&HostInfo::new(os_type, arch))
    }

    #[test]
    fn test_supported_pairs() {
        assert_eq!(resolve("Windows_NT", "x64"), Ok(PlatformId::Win64));
        assert_eq!(resolve("Windows_NT", "ia32"), Ok(PlatformId::Win32));
        assert_eq!(resolve("Linux", "x64"), Ok(PlatformId::Linux));
        assert_eq!(resolve("Darwin", "x64"), Ok(PlatformId::Macos));
    }

    #[test]
    fn test_windows_falls_back_to_win32_for_any_other_arch() {
        assert_eq!(resolve("Windows_NT", "arm64"), Ok(PlatformId::Win32));
        assert_eq!(resolve("Windows_NT", "mips"), Ok(PlatformId::Win32));
    }

    #[test]
    fn test_unsupported_pairs() {
        for (os_type, arch) in [
            ("Linux", "ia32"),
            ("Linux", "arm64"),
            ("Darwin", "arm64"),
            ("FreeBSD", "x64"),
            ("SunOS", "sparc"),
        ] {
            let err = resolve(os_type, arch).unwrap_err();
            assert!(
                matches!(err, ResolveError::UnsupportedPlatform { .. }),
                "expected {} {} to be unsupported",
                os_type,
                arch
            );
        }
    }

    #[test]
    fn test_unsupported_error_names_the_pair() {
        let err = resolve("FreeBSD", "x64").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: FreeBSD x64");

        let err = resolve("linux", "aarch64").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: linux aarch64");
    }

    #[test]
    fn test_identifier_strings() {
        assert_eq!(PlatformId::Win64.to_string(), "win64");
        assert_eq!(PlatformId::Win32.to_string(), "win32");
        assert_eq!(PlatformId::Linux.to_string(), "linux");
        assert_eq!(PlatformId::Macos.to_string(), "macos");
        assert_eq!(
            serde_json::to_string(&PlatformId::Macos).unwrap(),
            r#""macos""#
        );
    }
}
