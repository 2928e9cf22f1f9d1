//! Filesystem abstraction for the relocator.
//!
//! The relocator only needs a handful of operations. Routing them through a
//! trait lets tests simulate conditions that are hard to produce on a single
//! volume, such as a rename that fails because source and destination live on
//! different devices.
//!
//! ```ignore
//! let fs = RealFileSystem;
//! fs.rename(Path::new("a.txt"), Path::new("quarantine/a.txt"))?;
//! ```

use std::io;
use std::path::Path;

/// Filesystem operations used while moving files into quarantine.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Check if a path exists. Broken symlinks count as existing.
    fn exists(&self, path: &Path) -> bool;

    /// Rename within one volume.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy file contents and permissions; returns bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Returns true when a rename failed only because it crossed a volume
/// boundary, so a copy and delete can stand in for it.
pub fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_real_fs_exists() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("exists.txt");
        fs::write(&file_path, "content").unwrap();

        let fs = RealFileSystem;
        assert!(fs.exists(&file_path));
        assert!(!fs.exists(&temp.path().join("missing.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_broken_symlink_exists() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("dangling.txt");
        std::os::unix::fs::symlink(temp.path().join("nowhere"), &link).unwrap();

        assert!(RealFileSystem.exists(&link));
    }

    #[test]
    fn test_real_fs_rename_and_remove() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a.txt");
        let to = temp.path().join("b.txt");
        fs::write(&from, "moved").unwrap();

        let fs = RealFileSystem;
        fs.rename(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "moved");

        fs.remove_file(&to).unwrap();
        assert!(!to.exists());
    }

    #[test]
    fn test_cross_device_detection() {
        assert!(is_cross_device(&io::Error::from(io::ErrorKind::CrossesDevices)));
        assert!(!is_cross_device(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
