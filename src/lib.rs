//! Post-install helper for the `nrush` CLI.
//!
//! Resolves the prebuilt release archive matching the host OS and
//! architecture, then downloads, unpacks and runs it.

pub mod application;
pub mod archive;
pub mod cleanup;
pub mod download;
pub mod http;
pub mod install;
pub mod manifest;
pub mod platform;
pub mod release;
pub mod runtime;

pub use platform::{HostInfo, PlatformId, ResolveError};
pub use release::{Binary, ReleaseDescriptor, ReleaseSource, resolve_binary};
