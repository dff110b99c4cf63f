use crate::runtime::Runtime;
use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

const TEMP_EXTRACT_DIR: &str = ".extract";

/// Extractor for .tar.gz archives
pub struct TarGzExtractor;

impl TarGzExtractor {
    pub fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    /// Extract `archive_path` into `extract_to`.
    ///
    /// If the archive holds a single top-level directory, its contents are
    /// placed directly in `extract_to`.
    #[tracing::instrument(skip(self, runtime))]
    pub fn extract<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        if !self.can_handle(archive_path) {
            return Err(anyhow!(
                "Unsupported archive format: {}",
                archive_path.display()
            ));
        }

        debug!("Extracting {:?} to {:?}...", archive_path, extract_to);
        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let temp_extract_dir = extract_to.join(TEMP_EXTRACT_DIR);
        if runtime.exists(&temp_extract_dir) {
            runtime.remove_dir_all(&temp_extract_dir)?;
        }
        runtime.create_dir_all(&temp_extract_dir)?;

        debug!("Unpacking to temp dir: {:?}", temp_extract_dir);

        let entries = archive
            .entries()
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;

        for entry in entries {
            let mut entry = entry.context("Failed to read archive entry")?;
            let raw_path = entry
                .path()
                .context("Archive entry has an invalid path")?
                .into_owned();

            let Some(entry_path) = enclosed_path(&raw_path) else {
                debug!("Skipping entry with unsafe path {:?}", raw_path);
                continue;
            };
            let full_path = temp_extract_dir.join(&entry_path);
            let entry_type = entry.header().entry_type();

            match entry_type {
                EntryType::Directory => runtime.create_dir_all(&full_path)?,
                EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => {
                    if let Some(parent) = full_path.parent() {
                        runtime.create_dir_all(parent)?;
                    }
                    let mut dest_file = runtime.create_file(&full_path)?;
                    std::io::copy(&mut entry, &mut dest_file)
                        .with_context(|| format!("Failed to extract file {:?}", full_path))?;
                    drop(dest_file);

                    if let Ok(mode) = entry.header().mode()
                        && let Err(e) = runtime.set_permissions(&full_path, mode)
                    {
                        debug!("Failed to set permissions on {:?}: {}", full_path, e);
                    }
                }
                other => debug!("Skipping {:?} entry {:?}", other, entry_path),
            }
        }

        let entries = runtime
            .read_dir(&temp_extract_dir)
            .context("Failed to read temp extraction directory")?;

        let Some(first) = entries.first() else {
            runtime.remove_dir_all(&temp_extract_dir)?;
            return Err(anyhow!("Archive appears to be empty."));
        };

        let source_dir = if entries.len() == 1 && runtime.is_dir(first) {
            first.clone()
        } else {
            temp_extract_dir.clone()
        };

        debug!("Moving contents from {:?} to {:?}", source_dir, extract_to);
        for item in runtime.read_dir(&source_dir)? {
            let Some(file_name) = item.file_name() else {
                continue;
            };
            let dest_path = extract_to.join(file_name);
            if runtime.exists(&dest_path) {
                if runtime.is_dir(&dest_path) {
                    runtime.remove_dir_all(&dest_path)?;
                } else {
                    runtime.remove_file(&dest_path)?;
                }
            }
            debug!("Installing {:?}", dest_path);
            runtime.rename(&item, &dest_path)?;
        }

        runtime.remove_dir_all(&temp_extract_dir)?;

        info!("Extraction complete.");
        Ok(())
    }
}

/// Strip `.` components and reject paths escaping the extraction root.
fn enclosed_path(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs::{self, File};
    use tar::Builder;
    use tempfile::tempdir;

    fn create_test_archive(path: &Path, files: &[(&str, &str, u32)]) -> Result<()> {
        let file = File::create(path)?;
        let enc = GzEncoder::new(file, Compression::default());
        let mut tar = Builder::new(enc);

        for (name, content, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(name)?;
            header.set_size(content.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            tar.append(&header, content.as_bytes())?;
        }

        tar.into_inner()?.finish()?;
        Ok(())
    }

    #[test]
    fn test_can_handle() {
        let extractor = TarGzExtractor;
        assert!(extractor.can_handle(Path::new("nrush-linux.tar.gz")));
        assert!(extractor.can_handle(Path::new("NRUSH.TGZ")));
        assert!(!extractor.can_handle(Path::new("nrush.zip")));
        assert!(!extractor.can_handle(Path::new("nrush")));
    }

    #[test]
    fn test_extract_single_file() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("nrush.tar.gz");
        let extract_path = dir.path().join("out");
        fs::create_dir(&extract_path)?;

        create_test_archive(&archive_path, &[("nrush", "#!/bin/sh\necho hi\n", 0o755)])?;

        TarGzExtractor.extract(&RealRuntime, &archive_path, &extract_path)?;

        let binary = extract_path.join("nrush");
        assert_eq!(fs::read_to_string(&binary)?, "#!/bin/sh\necho hi\n");
        assert!(!extract_path.join(TEMP_EXTRACT_DIR).exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&binary)?.permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        Ok(())
    }

    #[test]
    fn test_extract_strips_single_toplevel_dir() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("nrush.tar.gz");
        let extract_path = dir.path().join("out");
        fs::create_dir(&extract_path)?;

        create_test_archive(
            &archive_path,
            &[
                ("nrush-linux/nrush", "binary", 0o755),
                ("nrush-linux/README.md", "readme", 0o644),
            ],
        )?;

        TarGzExtractor.extract(&RealRuntime, &archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("nrush"))?, "binary");
        assert_eq!(fs::read_to_string(extract_path.join("README.md"))?, "readme");
        assert!(!extract_path.join("nrush-linux").exists());

        Ok(())
    }

    #[test]
    fn test_extract_keeps_multiple_toplevel_entries() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("nrush.tar.gz");
        let extract_path = dir.path().join("out");
        fs::create_dir(&extract_path)?;

        create_test_archive(
            &archive_path,
            &[("bin/nrush", "binary", 0o755), ("LICENSE", "MIT", 0o644)],
        )?;

        TarGzExtractor.extract(&RealRuntime, &archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("bin/nrush"))?, "binary");
        assert_eq!(fs::read_to_string(extract_path.join("LICENSE"))?, "MIT");

        Ok(())
    }

    #[test]
    fn test_extract_empty_archive() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("empty.tar.gz");
        let extract_path = dir.path().join("out");
        fs::create_dir(&extract_path)?;

        create_test_archive(&archive_path, &[])?;

        let err = TarGzExtractor
            .extract(&RealRuntime, &archive_path, &extract_path)
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(!extract_path.join(TEMP_EXTRACT_DIR).exists());

        Ok(())
    }

    #[test]
    fn test_extract_unsupported_format() {
        let result = TarGzExtractor.extract(
            &RealRuntime,
            Path::new("/tmp/file.zip"),
            Path::new("/tmp/out"),
        );
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unsupported archive format")
        );
    }

    #[test]
    fn test_extract_corrupt_archive() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("bad.tar.gz");
        let extract_path = dir.path().join("out");
        fs::create_dir(&extract_path)?;
        fs::write(&archive_path, b"this is not gzip")?;

        let result = TarGzExtractor.extract(&RealRuntime, &archive_path, &extract_path);
        assert!(result.is_err());

        Ok(())
    }

    #[test]
    fn test_enclosed_path() {
        assert_eq!(
            enclosed_path(Path::new("./a/b")),
            Some(PathBuf::from("a/b"))
        );
        assert_eq!(enclosed_path(Path::new("../evil")), None);
        assert_eq!(enclosed_path(Path::new("a/../../evil")), None);
        assert_eq!(enclosed_path(Path::new("/etc/passwd")), None);
        assert_eq!(enclosed_path(Path::new(".")), None);
    }
}
