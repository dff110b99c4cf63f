//! Fetching, placing, removing and running prebuilt binaries.
//!
//! [`BinaryInstaller`] is the seam between binary resolution and the side
//! effects of installing. [`HttpInstaller`] is the default implementation: it
//! downloads the release archive, unpacks it into `<root>/<name>` and marks the
//! executable runnable. Nothing is cached; every install starts from an empty
//! directory.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::TarGzExtractor;
use crate::cleanup::{self, CleanupGuard, SharedCleanupContext};
use crate::download::download_file;
use crate::http::HttpClient;
use crate::release::Binary;
use crate::runtime::Runtime;

/// Mode applied to the installed executable on Unix
const EXECUTABLE_MODE: u32 = 0o755;

/// Exit code used when interrupted with Ctrl-C
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BinaryInstaller: Send + Sync {
    /// Download and place the binary, returning the path of the executable.
    async fn install(&self, binary: &Binary) -> Result<PathBuf>;

    /// Remove an installed binary. Returns false if nothing was installed.
    fn uninstall(&self, binary: &Binary) -> Result<bool>;

    /// Run the installed binary and return its exit code.
    fn run(&self, binary: &Binary, args: &[String]) -> Result<i32>;
}

pub struct HttpInstaller<R: Runtime> {
    runtime: R,
    http_client: HttpClient,
    extractor: TarGzExtractor,
    root: PathBuf,
    cleanup_ctx: SharedCleanupContext,
}

impl<R: Runtime + 'static> HttpInstaller<R> {
    pub fn new(runtime: R, http_client: HttpClient, root: PathBuf) -> Self {
        Self {
            runtime,
            http_client,
            extractor: TarGzExtractor,
            root,
            cleanup_ctx: cleanup::new_shared(),
        }
    }

    /// Share `cleanup_ctx` with the installer instead of a private one.
    pub fn with_cleanup_context(mut self, cleanup_ctx: SharedCleanupContext) -> Self {
        self.cleanup_ctx = cleanup_ctx;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding everything unpacked for `binary`
    pub fn install_dir(&self, binary: &Binary) -> PathBuf {
        self.root.join(&binary.name)
    }

    /// Locate the executable inside an install directory.
    ///
    /// Archives either hold the executable at the top level or under `bin/`,
    /// with an `.exe` suffix on Windows.
    fn find_executable(&self, install_dir: &Path, name: &str) -> Option<PathBuf> {
        let exe = format!("{}.exe", name);
        [
            install_dir.join(name),
            install_dir.join(&exe),
            install_dir.join("bin").join(name),
            install_dir.join("bin").join(&exe),
        ]
        .into_iter()
        .find(|candidate| self.runtime.is_file(candidate))
    }

    async fn install_into(&self, binary: &Binary, install_dir: &Path) -> Result<PathBuf> {
        let archive_path = install_dir.join(format!("{}.tar.gz", binary.name));

        download_file(&self.runtime, &binary.url, &archive_path, &self.http_client)
            .await
            .with_context(|| format!("Failed to download {}", binary.url))?;

        self.extractor
            .extract(&self.runtime, &archive_path, install_dir)
            .with_context(|| format!("Failed to extract {:?}", archive_path))?;

        if self.runtime.exists(&archive_path) {
            self.runtime.remove_file(&archive_path)?;
        }

        let executable = self
            .find_executable(install_dir, &binary.name)
            .ok_or_else(|| {
                anyhow!(
                    "Archive {} did not contain an executable named {}",
                    binary.url,
                    binary.name
                )
            })?;

        self.runtime
            .set_permissions(&executable, EXECUTABLE_MODE)
            .with_context(|| format!("Failed to make {:?} executable", executable))?;

        Ok(executable)
    }
}

/// Remove every path still registered for cleanup after Ctrl-C.
fn clean_up_after_interrupt(cleanup_ctx: &SharedCleanupContext) {
    eprintln!("\nInterrupted, cleaning up...");
    cleanup::lock(cleanup_ctx).cleanup();
}

#[async_trait]
impl<R: Runtime + 'static> BinaryInstaller for HttpInstaller<R> {
    #[tracing::instrument(skip(self))]
    async fn install(&self, binary: &Binary) -> Result<PathBuf> {
        let install_dir = self.install_dir(binary);

        if self.runtime.exists(&install_dir) {
            debug!("Removing previous install at {:?}", install_dir);
            self.runtime
                .remove_dir_all(&install_dir)
                .with_context(|| format!("Failed to remove previous install {:?}", install_dir))?;
        }
        self.runtime
            .create_dir_all(&install_dir)
            .with_context(|| format!("Failed to create install directory {:?}", install_dir))?;

        let guard = CleanupGuard::new(Arc::clone(&self.cleanup_ctx), install_dir.clone());

        let cleanup_ctx = Arc::clone(&self.cleanup_ctx);
        let ctrl_c_handler = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                clean_up_after_interrupt(&cleanup_ctx);
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });

        let result = self.install_into(binary, &install_dir).await;

        ctrl_c_handler.abort();

        match result {
            Ok(executable) => {
                guard.success();
                info!("Installed {} to {:?}", binary.name, executable);
                Ok(executable)
            }
            Err(e) => {
                if let Err(cleanup_err) = self.runtime.remove_dir_all(&install_dir) {
                    warn!(
                        "Failed to clean up {:?} after failed install: {}",
                        install_dir, cleanup_err
                    );
                }
                guard.success();
                Err(e)
            }
        }
    }

    #[tracing::instrument(skip(self))]
    fn uninstall(&self, binary: &Binary) -> Result<bool> {
        let install_dir = self.install_dir(binary);
        if !self.runtime.exists(&install_dir) {
            debug!("Nothing installed at {:?}", install_dir);
            return Ok(false);
        }

        self.runtime
            .remove_dir_all(&install_dir)
            .with_context(|| format!("Failed to remove {:?}", install_dir))?;
        info!("Removed {:?}", install_dir);
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    fn run(&self, binary: &Binary, args: &[String]) -> Result<i32> {
        let install_dir = self.install_dir(binary);
        let executable = self
            .find_executable(&install_dir, &binary.name)
            .ok_or_else(|| {
                anyhow!(
                    "{} is not installed in {:?}. Run `nrush-install install` to reinstall it.",
                    binary.name,
                    install_dir
                )
            })?;

        debug!("Running {:?} with {:?}", executable, args);
        self.runtime.run_command(&executable, args)
    }
}
