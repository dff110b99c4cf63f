use std::fmt;

/// Operating system family as reported by the host.
///
/// Uses the same vocabulary as Node's `os.type()` (`Windows_NT`, `Linux`,
/// `Darwin`), since that is what npm install hooks report. Unknown values are
/// kept verbatim so error messages can name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsType {
    Windows,
    Linux,
    Darwin,
    Other(String),
}

impl OsType {
    /// Parse an OS type string. Accepts both Node (`Windows_NT`, `Darwin`)
    /// and Rust (`windows`, `macos`) spellings, case-insensitively.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "windows_nt" | "windows" | "win32" => OsType::Windows,
            "linux" => OsType::Linux,
            "darwin" | "macos" => OsType::Darwin,
            _ => OsType::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OsType::Windows => "Windows_NT",
            OsType::Linux => "Linux",
            OsType::Darwin => "Darwin",
            OsType::Other(s) => s,
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture as reported by the host, in Node's `os.arch()` vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    X64,
    Ia32,
    Arm64,
    Other(String),
}

impl Arch {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Arch::X64,
            "ia32" | "x86" | "i386" | "i686" => Arch::Ia32,
            "arm64" | "aarch64" => Arch::Arm64,
            _ => Arch::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Arch::X64 => "x64",
            Arch::Ia32 => "ia32",
            Arch::Arm64 => "arm64",
            Arch::Other(s) => s,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (OS type, architecture) pair of the machine doing the install.
///
/// The strings exactly as reported are kept next to the parsed values, so an
/// unsupported host is named the way the caller spelled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os_type: OsType,
    pub arch: Arch,
    reported_os_type: String,
    reported_arch: String,
}

impl HostInfo {
    pub fn new(os_type: &str, arch: &str) -> Self {
        Self {
            os_type: OsType::parse(os_type),
            arch: Arch::parse(arch),
            reported_os_type: os_type.trim().to_string(),
            reported_arch: arch.trim().to_string(),
        }
    }

    /// Detect the current host from compile-time target information
    pub fn detect() -> Self {
        let os_type = Self::detect_os_type();
        let arch = Self::detect_arch();
        Self {
            reported_os_type: os_type.to_string(),
            reported_arch: arch.to_string(),
            os_type,
            arch,
        }
    }

    /// Replace the detected values with explicit ones where given.
    pub fn with_overrides(mut self, os_type: Option<&str>, arch: Option<&str>) -> Self {
        if let Some(os_type) = os_type {
            self.os_type = OsType::parse(os_type);
            self.reported_os_type = os_type.trim().to_string();
        }
        if let Some(arch) = arch {
            self.arch = Arch::parse(arch);
            self.reported_arch = arch.trim().to_string();
        }
        self
    }

    pub fn reported_os_type(&self) -> &str {
        &self.reported_os_type
    }

    pub fn reported_arch(&self) -> &str {
        &self.reported_arch
    }

    fn detect_os_type() -> OsType {
        #[cfg(target_os = "windows")]
        {
            OsType::Windows
        }
        #[cfg(target_os = "linux")]
        {
            OsType::Linux
        }
        #[cfg(target_os = "macos")]
        {
            OsType::Darwin
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            OsType::parse(std::env::consts::OS)
        }
    }

    fn detect_arch() -> Arch {
        #[cfg(target_arch = "x86_64")]
        {
            Arch::X64
        }
        #[cfg(target_arch = "x86")]
        {
            Arch::Ia32
        }
        #[cfg(target_arch = "aarch64")]
        {
            Arch::Arm64
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "x86")))]
        {
            Arch::parse(std::env::consts::ARCH)
        }
    }
}

impl fmt::Display for HostInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os_type, self.arch)
    }
}

/// Trait for host detection (useful for testing)
#[cfg_attr(test, mockall::automock)]
pub trait PlatformDetector: Send + Sync {
    fn detect(&self) -> HostInfo;
}

/// Default detector using compile-time target information
pub struct DefaultPlatformDetector;

impl PlatformDetector for DefaultPlatformDetector {
    fn detect(&self) -> HostInfo {
        HostInfo::detect()
    }
}
