use log::debug;
use serde::Serialize;

use super::ReleaseSource;
use crate::manifest::PackageManifest;
use crate::platform::{HostInfo, PlatformId, ResolveError};

/// Everything known about the release selected for this host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDescriptor {
    pub name: String,
    pub version: String,
    pub platform: PlatformId,
    pub url: String,
}

impl ReleaseDescriptor {
    /// The handle passed to a [`BinaryInstaller`](crate::install::BinaryInstaller).
    pub fn binary(&self) -> Binary {
        Binary::new(&self.name, &self.url)
    }
}

/// Name and download URL of a prebuilt binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binary {
    pub name: String,
    pub url: String,
}

impl Binary {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Resolve the release archive matching `host` for the manifest's version.
///
/// Pure: no network or filesystem access happens here.
pub fn resolve_binary(
    host: &HostInfo,
    manifest: &PackageManifest,
    source: &ReleaseSource,
) -> Result<ReleaseDescriptor, ResolveError> {
    let platform = PlatformId::resolve(host)?;
    let url = source.download_url(&manifest.version, platform);
    debug!("Resolved {} ({}) to {}", host, platform, url);

    Ok(ReleaseDescriptor {
        name: source.project().to_string(),
        version: manifest.version.clone(),
        platform,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(version: &str) -> PackageManifest {
        PackageManifest {
            name: Some("nrush".to_string()),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_resolve_windows_x64() {
        let descriptor = resolve_binary(
            &HostInfo::new("Windows_NT", "x64"),
            &manifest("0.4.0"),
            &ReleaseSource::default(),
        )
        .unwrap();

        assert_eq!(descriptor.name, "nrush");
        assert_eq!(descriptor.version, "0.4.0");
        assert_eq!(descriptor.platform, PlatformId::Win64);
        assert_eq!(
            descriptor.url,
            "https://github.com/omznc/nrush/releases/download/0.4.0/nrush-win64.tar.gz"
        );
    }

    #[test]
    fn test_resolve_each_supported_platform() {
        for (os_type, arch, expected) in [
            ("Windows_NT", "x64", "win64"),
            ("Windows_NT", "ia32", "win32"),
            ("Linux", "x64", "linux"),
            ("Darwin", "x64", "macos"),
        ] {
            let descriptor = resolve_binary(
                &HostInfo::new(os_type, arch),
                &manifest("1.2.3"),
                &ReleaseSource::default(),
            )
            .unwrap();
            assert_eq!(descriptor.platform.as_str(), expected);
            assert!(
                descriptor
                    .url
                    .ends_with(&format!("/1.2.3/nrush-{}.tar.gz", expected))
            );
        }
    }

    #[test]
    fn test_resolve_unsupported_platform() {
        let err = resolve_binary(
            &HostInfo::new("Linux", "ia32"),
            &manifest("1.2.3"),
            &ReleaseSource::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ResolveError::UnsupportedPlatform {
                os_type: "Linux".to_string(),
                arch: "ia32".to_string(),
            }
        );
    }

    #[test]
    fn test_binary_handle() {
        let descriptor = resolve_binary(
            &HostInfo::new("Linux", "x64"),
            &manifest("1.2.3"),
            &ReleaseSource::default(),
        )
        .unwrap();

        assert_eq!(
            descriptor.binary(),
            Binary::new(
                "nrush",
                "https://github.com/omznc/nrush/releases/download/1.2.3/nrush-linux.tar.gz"
            )
        );
    }

    #[test]
    fn test_descriptor_serializes_to_json() {
        let descriptor = resolve_binary(
            &HostInfo::new("Darwin", "x64"),
            &manifest("1.0.0"),
            &ReleaseSource::default(),
        )
        .unwrap();

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["name"], "nrush");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["platform"], "macos");
        assert_eq!(
            json["url"],
            "https://github.com/omznc/nrush/releases/download/1.0.0/nrush-macos.tar.gz"
        );
    }
}
