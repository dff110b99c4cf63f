use crate::platform::PlatformId;

/// Host serving release downloads
pub const DEFAULT_BASE_URL: &str = "https://github.com";

const DEFAULT_ORG: &str = "omznc";
const DEFAULT_PROJECT: &str = "nrush";

/// Where prebuilt release archives are published.
///
/// Archives live at
/// `<base>/<org>/<project>/releases/download/<version>/<project>-<platform>.tar.gz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    base_url: String,
    org: String,
    project: String,
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self::new(DEFAULT_ORG, DEFAULT_PROJECT)
    }
}

impl ReleaseSource {
    pub fn new(org: &str, project: &str) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            org: org.to_string(),
            project: project.to_string(),
        }
    }

    /// Point downloads at another host, e.g. a mirror or a test server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Download URL of the archive for `version` on `platform`.
    ///
    /// The version is used verbatim; a malformed version gives a URL that
    /// fails at download time.
    pub fn download_url(&self, version: &str, platform: PlatformId) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}-{}.tar.gz",
            self.base_url, self.org, self.project, version, self.project, platform
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_linux() {
        let url = ReleaseSource::default().download_url("1.2.3", PlatformId::Linux);
        assert_eq!(
            url,
            "https://github.com/omznc/nrush/releases/download/1.2.3/nrush-linux.tar.gz"
        );
    }

    #[test]
    fn test_download_url_win64() {
        let url = ReleaseSource::default().download_url("0.4.0", PlatformId::Win64);
        assert_eq!(
            url,
            "https://github.com/omznc/nrush/releases/download/0.4.0/nrush-win64.tar.gz"
        );
    }

    #[test]
    fn test_download_url_is_idempotent() {
        let source = ReleaseSource::default();
        let first = source.download_url("1.2.3", PlatformId::Macos);
        let second = source.download_url("1.2.3", PlatformId::Macos);
        assert_eq!(first, second);
        assert_eq!(source, ReleaseSource::default());
    }

    #[test]
    fn test_version_is_not_validated() {
        let url = ReleaseSource::default().download_url("v1 beta", PlatformId::Win32);
        assert_eq!(
            url,
            "https://github.com/omznc/nrush/releases/download/v1 beta/nrush-win32.tar.gz"
        );
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let source = ReleaseSource::default().with_base_url("http://127.0.0.1:1234/");
        assert_eq!(
            source.download_url("1.0.0", PlatformId::Linux),
            "http://127.0.0.1:1234/omznc/nrush/releases/download/1.0.0/nrush-linux.tar.gz"
        );
    }

    #[test]
    fn test_custom_project() {
        let source = ReleaseSource::new("acme", "tool");
        assert_eq!(source.project(), "tool");
        assert_eq!(
            source.download_url("2.0.0", PlatformId::Macos),
            "https://github.com/acme/tool/releases/download/2.0.0/tool-macos.tar.gz"
        );
    }
}
