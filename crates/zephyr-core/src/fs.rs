//! Abstract file system used by the export pipeline
//!
//! The exporter treats these operations as primitive and
//! always-available; a failure is surfaced as an error, never retried.
//! Paths are forward-slash strings: include identifiers double as load
//! order entries in generated bootstraps, so they stay in their wire
//! form and only `DiskFileSystem` converts to OS paths.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ZephyrResult;

pub trait FileSystem {
    /// Create a directory, including missing parents
    fn mk_dir(&self, path: &str) -> ZephyrResult<()>;

    fn dir_exists(&self, path: &str) -> bool;

    /// Remove every entry of a directory, keeping the directory itself
    fn clear_dir(&self, path: &str) -> ZephyrResult<()>;

    fn file_exists(&self, path: &str) -> bool;

    fn read_file(&self, path: &str) -> ZephyrResult<String>;

    fn write_file(&self, path: &str, content: &str) -> ZephyrResult<()>;

    fn copy_file(&self, source: &str, destination: &str) -> ZephyrResult<()>;

    /// File names directly inside `path` whose name ends with `extension`
    /// (case-insensitive), as paths relative to `path`
    fn read_dir(&self, path: &str, extension: &str) -> ZephyrResult<Vec<String>>;

    fn is_absolute(&self, path: &str) -> bool;

    /// Resolve `path` against `base` unless it is already absolute
    fn make_absolute(&self, path: &str, base: &str) -> String;

    /// Express `path` relative to `base`, or `None` when it does not
    /// live under `base`
    fn make_relative(&self, path: &str, base: &str) -> Option<String>;

    /// Directory component of a path ("" when there is none)
    fn dir_name_from(&self, path: &str) -> String;

    /// Final component of a path
    fn file_name_from(&self, path: &str) -> String;
}

/// `FileSystem` backed by `std::fs`
#[derive(Debug, Default)]
pub struct DiskFileSystem;

impl DiskFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl FileSystem for DiskFileSystem {
    fn mk_dir(&self, path: &str) -> ZephyrResult<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn dir_exists(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn clear_dir(&self, path: &str) -> ZephyrResult<()> {
        if !Path::new(path).is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn read_file(&self, path: &str) -> ZephyrResult<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_file(&self, path: &str, content: &str) -> ZephyrResult<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn copy_file(&self, source: &str, destination: &str) -> ZephyrResult<()> {
        if let Some(parent) = Path::new(destination).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(source, destination)?;
        Ok(())
    }

    fn read_dir(&self, path: &str, extension: &str) -> ZephyrResult<Vec<String>> {
        let extension = extension.to_ascii_lowercase();
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.to_ascii_lowercase().ends_with(&extension) {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    fn is_absolute(&self, path: &str) -> bool {
        Path::new(path).is_absolute()
    }

    fn make_absolute(&self, path: &str, base: &str) -> String {
        if self.is_absolute(path) {
            path.to_string()
        } else {
            to_forward_slashes(&PathBuf::from(base).join(path))
        }
    }

    fn make_relative(&self, path: &str, base: &str) -> Option<String> {
        Path::new(path)
            .strip_prefix(Path::new(base.trim_end_matches('/')))
            .ok()
            .map(to_forward_slashes)
    }

    fn dir_name_from(&self, path: &str) -> String {
        Path::new(path)
            .parent()
            .map(to_forward_slashes)
            .unwrap_or_default()
    }

    fn file_name_from(&self, path: &str) -> String {
        Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
