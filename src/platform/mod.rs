//! Host platform detection and platform identifier resolution
//!
//! This module reads the host OS type and CPU architecture and maps the pair
//! onto one of the fixed platform identifiers that prebuilt release archives
//! are published for.

mod detection;
mod resolve;

pub use detection::{Arch, DefaultPlatformDetector, HostInfo, OsType, PlatformDetector};
pub use resolve::{PlatformId, ResolveError};

#[cfg(test)]
pub use detection::MockPlatformDetector;
