use log::debug;
use serde::Deserialize;
use std::path::Path;

use crate::runtime::Runtime;

/// Default manifest file name, relative to the package directory
pub const MANIFEST_FILE: &str = "package.json";

/// Errors raised while reading release metadata from the package manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("Manifest {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Manifest {path} has no version")]
    MissingVersion { path: String },
}

/// The fields of `package.json` this helper cares about
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: String,
}

impl PackageManifest {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self, ManifestError> {
        let display = path.display().to_string();
        let content = runtime
            .read_to_string(path)
            .map_err(|e| ManifestError::Read {
                path: display.clone(),
                reason: format!("{:#}", e),
            })?;
        Self::parse(&content, &display)
    }

    fn parse(content: &str, path: &str) -> Result<Self, ManifestError> {
        let mut manifest: PackageManifest =
            serde_json::from_str(content).map_err(|source| ManifestError::Parse {
                path: path.to_string(),
                source,
            })?;

        manifest.version = manifest.version.trim().to_string();
        if manifest.version.is_empty() {
            return Err(ManifestError::MissingVersion {
                path: path.to_string(),
            });
        }

        debug!("Read version {} from {}", manifest.version, path);
        Ok(manifest)
    }
}
