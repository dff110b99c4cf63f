//! Application layer - use cases behind the CLI commands.
//!
//! Each use case resolves the release for the host first, the same way the
//! package's install hook does, then hands the binary to a
//! [`BinaryInstaller`].

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::install::BinaryInstaller;
use crate::manifest::{MANIFEST_FILE, PackageManifest};
use crate::platform::PlatformDetector;
use crate::release::{ReleaseDescriptor, ReleaseSource, resolve_binary};
use crate::runtime::Runtime;

/// Install root relative to the package directory
pub const DEFAULT_INSTALL_DIR: &str = "node_modules/.binaries";

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Path to package.json (defaults to ./package.json)
    pub manifest: Option<PathBuf>,
    /// Directory binaries are installed under
    pub install_root: Option<PathBuf>,
    /// Host serving release downloads
    pub base_url: Option<String>,
    /// Override for the detected OS type
    pub os_type: Option<String>,
    /// Override for the detected architecture
    pub arch: Option<String>,
}

pub struct BinaryUseCase<'a, R: Runtime, D: PlatformDetector + ?Sized> {
    runtime: &'a R,
    detector: &'a D,
    options: &'a AppOptions,
}

impl<'a, R: Runtime, D: PlatformDetector + ?Sized> BinaryUseCase<'a, R, D> {
    pub fn new(runtime: &'a R, detector: &'a D, options: &'a AppOptions) -> Self {
        Self {
            runtime,
            detector,
            options,
        }
    }

    pub fn manifest_path(&self) -> Result<PathBuf> {
        match &self.options.manifest {
            Some(path) => Ok(path.clone()),
            None => Ok(self.runtime.current_dir()?.join(MANIFEST_FILE)),
        }
    }

    /// Explicit root, or `node_modules/.binaries` next to the manifest
    pub fn install_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.options.install_root {
            return Ok(root.clone());
        }
        let manifest_path = self.manifest_path()?;
        let package_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(package_dir.join(DEFAULT_INSTALL_DIR))
    }

    fn source(&self) -> ReleaseSource {
        match &self.options.base_url {
            Some(base_url) => ReleaseSource::default().with_base_url(base_url),
            None => ReleaseSource::default(),
        }
    }

    /// Resolve the release archive for this host
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self) -> Result<ReleaseDescriptor> {
        let host = self
            .detector
            .detect()
            .with_overrides(self.options.os_type.as_deref(), self.options.arch.as_deref());
        debug!("Host platform: {}", host);

        let manifest_path = self.manifest_path()?;
        let manifest = PackageManifest::load(self.runtime, &manifest_path)?;

        let descriptor = resolve_binary(&host, &manifest, &self.source())?;
        Ok(descriptor)
    }

    pub async fn install<I: BinaryInstaller + ?Sized>(
        &self,
        installer: &I,
    ) -> Result<(ReleaseDescriptor, PathBuf)> {
        let descriptor = self.resolve()?;
        info!(
            "Installing {} {} for {}",
            descriptor.name, descriptor.version, descriptor.platform
        );

        let executable = installer
            .install(&descriptor.binary())
            .await
            .with_context(|| {
                format!(
                    "Failed to install {} {}",
                    descriptor.name, descriptor.version
                )
            })?;

        Ok((descriptor, executable))
    }

    pub fn uninstall<I: BinaryInstaller + ?Sized>(&self, installer: &I) -> Result<bool> {
        let descriptor = self.resolve()?;
        installer.uninstall(&descriptor.binary())
    }

    pub fn run<I: BinaryInstaller + ?Sized>(&self, installer: &I, args: &[String]) -> Result<i32> {
        let descriptor = self.resolve()?;
        installer.run(&descriptor.binary(), args)
    }
}
