//! Running installed executables.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::{Command, ExitStatus};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_command_impl(&self, program: &Path, args: &[String]) -> Result<i32> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to run {:?}", program))?;

        debug!("{:?} exited with {}", program, status);

        Ok(exit_code(status))
    }
}

/// A child killed by a signal reports `128 + signal`, as shells do.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
