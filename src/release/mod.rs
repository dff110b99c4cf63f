//! Release URL construction and binary resolution.
//!
//! Turns a package version and a platform identifier into the download URL
//! of the matching prebuilt archive, and bundles the result into the handle
//! the installer consumes.

mod descriptor;
mod source;

pub use descriptor::{Binary, ReleaseDescriptor, resolve_binary};
pub use source::{DEFAULT_BASE_URL, ReleaseSource};
