//! Conflict-safe relocation into the quarantine directory.
//!
//! A single [`Relocator`] is shared by every worker of a scan. The
//! "destination exists?" check, the move itself and the record append all run
//! inside one critical section, so two files with the same basename can never
//! both pass the check. The loser gets a collision outcome and stays where it
//! is; nothing is ever overwritten.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::classifier::ValidationVerdict;
use crate::diagnostics::{CoreError, CoreResult};
use crate::fs::{FileSystem, RealFileSystem, is_cross_device};

/// Prefix of the hidden staging file used for cross-volume moves.
const STAGING_PREFIX: &str = ".sieve-partial-";

/// One file moved into quarantine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub original: PathBuf,
    pub destination: PathBuf,
    pub verdict: ValidationVerdict,
}

/// Result of a relocation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    Moved(QuarantineRecord),
    /// A file with the same name is already quarantined; the source was left in place.
    Collision { destination: PathBuf },
}

/// Serializing relocation service for one quarantine directory.
#[derive(Debug)]
pub struct Relocator {
    quarantine_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
    records: Mutex<Vec<QuarantineRecord>>,
}

impl Relocator {
    /// Create a relocator over the real filesystem.
    ///
    /// The quarantine directory is created if missing.
    pub fn new(quarantine_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::with_fs(quarantine_dir, Arc::new(RealFileSystem))
    }

    /// Create a relocator over a custom filesystem implementation.
    pub fn with_fs(quarantine_dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> CoreResult<Self> {
        let quarantine_dir = quarantine_dir.into();
        fs.create_dir_all(&quarantine_dir)
            .map_err(|source| CoreError::CreateDir {
                path: quarantine_dir.clone(),
                source,
            })?;
        Ok(Self {
            quarantine_dir,
            fs,
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn quarantine_dir(&self) -> &Path {
        &self.quarantine_dir
    }

    /// `quarantine_dir/basename(source)`
    pub fn destination_for(&self, source: &Path) -> CoreResult<PathBuf> {
        let name = source.file_name().ok_or_else(|| CoreError::NoFileName {
            path: source.to_path_buf(),
        })?;
        Ok(self.quarantine_dir.join(name))
    }

    /// Move `source` into quarantine unless its name is already taken there.
    pub fn relocate(&self, source: &Path, verdict: ValidationVerdict) -> CoreResult<RelocationOutcome> {
        let destination = self.destination_for(source)?;

        let mut records = self.lock_records();
        if self.fs.exists(&destination) {
            tracing::warn!(
                path = %source.display(),
                destination = %destination.display(),
                "File already exists in destination; left in place"
            );
            return Ok(RelocationOutcome::Collision { destination });
        }

        self.move_file(source, &destination)?;

        let record = QuarantineRecord {
            original: source.to_path_buf(),
            destination,
            verdict,
        };
        tracing::info!(
            path = %record.original.display(),
            destination = %record.destination.display(),
            verdict = %record.verdict,
            "Quarantined"
        );
        records.push(record.clone());
        Ok(RelocationOutcome::Moved(record))
    }

    /// Snapshot of every record so far, in append order.
    pub fn records(&self) -> Vec<QuarantineRecord> {
        self.lock_records().clone()
    }

    pub fn into_records(self) -> Vec<QuarantineRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<QuarantineRecord>> {
        // A worker that panicked mid-move leaves no half-pushed record behind.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn move_file(&self, source: &Path, destination: &Path) -> CoreResult<()> {
        match self.fs.rename(source, destination) {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => self.copy_then_remove(source, destination),
            Err(source_err) => Err(relocate_error(source, destination, source_err)),
        }
    }

    /// Cross-volume move: copy into a hidden staging file inside the
    /// quarantine, rename it into place, then delete the source. The final
    /// name only ever appears with complete contents.
    fn copy_then_remove(&self, source: &Path, destination: &Path) -> CoreResult<()> {
        let staging = self.staging_path(destination);

        if let Err(e) = self.fs.copy(source, &staging) {
            let _ = self.fs.remove_file(&staging);
            return Err(relocate_error(source, destination, e));
        }
        if let Err(e) = self.fs.rename(&staging, destination) {
            let _ = self.fs.remove_file(&staging);
            return Err(relocate_error(source, destination, e));
        }
        if let Err(e) = self.fs.remove_file(source) {
            // Roll back so the file is not present in both places.
            let _ = self.fs.remove_file(destination);
            return Err(relocate_error(source, destination, e));
        }
        Ok(())
    }

    fn staging_path(&self, destination: &Path) -> PathBuf {
        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.quarantine_dir.join(format!("{}{}", STAGING_PREFIX, name))
    }
}

fn relocate_error(from: &Path, to: &Path, source: std::io::Error) -> CoreError {
    CoreError::Relocate {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    /// Real filesystem that refuses renames across directories, the way a
    /// rename across mount points fails.
    #[derive(Debug)]
    struct CrossDeviceFs {
        stubborn_source_dir: Option<PathBuf>,
    }

    impl FileSystem for CrossDeviceFs {
        fn exists(&self, path: &Path) -> bool {
            RealFileSystem.exists(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if from.parent() != to.parent() {
                return Err(io::Error::from(io::ErrorKind::CrossesDevices));
            }
            RealFileSystem.rename(from, to)
        }

        fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
            RealFileSystem.copy(from, to)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            if let Some(dir) = &self.stubborn_source_dir {
                if path.starts_with(dir) {
                    return Err(io::Error::from(io::ErrorKind::PermissionDenied));
                }
            }
            RealFileSystem.remove_file(path)
        }

        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            RealFileSystem.create_dir_all(path)
        }
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let scan = temp.path().join("scan");
        let quarantine = temp.path().join("Mismatched Files");
        std::fs::create_dir_all(&scan).unwrap();
        (temp, scan, quarantine)
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_creates_quarantine_idempotently() {
        let (_temp, _scan, quarantine) = setup();
        Relocator::new(&quarantine).unwrap();
        assert!(quarantine.is_dir());
        Relocator::new(&quarantine).unwrap();
    }

    #[test]
    fn test_relocate_moves_and_keeps_basename() {
        let (_temp, scan, quarantine) = setup();
        let source = scan.join("broken.png");
        std::fs::write(&source, b"junk").unwrap();

        let relocator = Relocator::new(&quarantine).unwrap();
        let outcome = relocator.relocate(&source, ValidationVerdict::Corrupted).unwrap();

        let expected = quarantine.join("broken.png");
        assert_eq!(
            outcome,
            RelocationOutcome::Moved(QuarantineRecord {
                original: source.clone(),
                destination: expected.clone(),
                verdict: ValidationVerdict::Corrupted,
            })
        );
        assert!(!source.exists());
        assert_eq!(std::fs::read(&expected).unwrap(), b"junk");
        assert_eq!(relocator.records().len(), 1);
    }

    #[test]
    fn test_collision_leaves_both_files_untouched() {
        let (_temp, scan, quarantine) = setup();
        std::fs::create_dir_all(&quarantine).unwrap();
        std::fs::write(quarantine.join("notes.txt"), b"already here").unwrap();
        let source = scan.join("notes.txt");
        std::fs::write(&source, b"newcomer").unwrap();

        let relocator = Relocator::new(&quarantine).unwrap();
        let outcome = relocator
            .relocate(&source, ValidationVerdict::EncodingMismatch)
            .unwrap();

        assert_eq!(
            outcome,
            RelocationOutcome::Collision {
                destination: quarantine.join("notes.txt")
            }
        );
        assert_eq!(std::fs::read(&source).unwrap(), b"newcomer");
        assert_eq!(std::fs::read(quarantine.join("notes.txt")).unwrap(), b"already here");
        assert!(relocator.records().is_empty());
    }

    #[test]
    fn test_concurrent_same_basename_moves_exactly_once() {
        let (_temp, scan, quarantine) = setup();
        const WORKERS: usize = 8;

        let sources: Vec<PathBuf> = (0..WORKERS)
            .map(|i| {
                let dir = scan.join(format!("dir{}", i));
                std::fs::create_dir_all(&dir).unwrap();
                let path = dir.join("same.pdf");
                std::fs::write(&path, format!("payload-{}", i).repeat(1000)).unwrap();
                path
            })
            .collect();

        let relocator = Relocator::new(&quarantine).unwrap();
        let outcomes: Vec<RelocationOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = sources
                .iter()
                .map(|source| {
                    let relocator = &relocator;
                    s.spawn(move || relocator.relocate(source, ValidationVerdict::Corrupted).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let moved: Vec<&QuarantineRecord> = outcomes
            .iter()
            .filter_map(|o| match o {
                RelocationOutcome::Moved(r) => Some(r),
                RelocationOutcome::Collision { .. } => None,
            })
            .collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(outcomes.len() - moved.len(), WORKERS - 1);

        let winner = moved[0];
        let index = sources.iter().position(|s| *s == winner.original).unwrap();
        assert_eq!(
            std::fs::read_to_string(quarantine.join("same.pdf")).unwrap(),
            format!("payload-{}", index).repeat(1000)
        );
        let remaining = sources.iter().filter(|s| s.exists()).count();
        assert_eq!(remaining, WORKERS - 1);
    }

    #[test]
    fn test_cross_device_falls_back_to_copy() {
        let (_temp, scan, quarantine) = setup();
        let source = scan.join("report.docx");
        std::fs::write(&source, b"zip-ish bytes").unwrap();

        let fs = Arc::new(CrossDeviceFs {
            stubborn_source_dir: None,
        });
        let relocator = Relocator::with_fs(&quarantine, fs).unwrap();
        let outcome = relocator.relocate(&source, ValidationVerdict::Corrupted).unwrap();

        assert!(matches!(outcome, RelocationOutcome::Moved(_)));
        assert!(!source.exists());
        assert_eq!(dir_entries(&quarantine), vec!["report.docx".to_string()]);
        assert_eq!(std::fs::read(quarantine.join("report.docx")).unwrap(), b"zip-ish bytes");
    }

    #[test]
    fn test_cross_device_rolls_back_when_source_cannot_be_removed() {
        let (_temp, scan, quarantine) = setup();
        let source = scan.join("photo.jpg");
        std::fs::write(&source, b"not really a jpeg").unwrap();

        let fs = Arc::new(CrossDeviceFs {
            stubborn_source_dir: Some(scan.clone()),
        });
        let relocator = Relocator::with_fs(&quarantine, fs).unwrap();
        let err = relocator
            .relocate(&source, ValidationVerdict::Corrupted)
            .unwrap_err();

        assert!(matches!(err, CoreError::Relocate { .. }));
        assert!(source.exists());
        assert!(dir_entries(&quarantine).is_empty());
        assert!(relocator.records().is_empty());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let (_temp, scan, quarantine) = setup();
        let relocator = Relocator::new(&quarantine).unwrap();
        let err = relocator
            .relocate(&scan.join("vanished.txt"), ValidationVerdict::EncodingMismatch)
            .unwrap_err();
        assert!(matches!(err, CoreError::Relocate { .. }));
    }

    #[test]
    fn test_destination_for_rejects_root() {
        let (_temp, _scan, quarantine) = setup();
        let relocator = Relocator::new(&quarantine).unwrap();
        assert!(matches!(
            relocator.destination_for(Path::new("/")),
            Err(CoreError::NoFileName { .. })
        ));
    }
}
