use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use crate::constants::{MISSING_EXPORT_FILE, READY_EXPORT_FILE};
use crate::error::{IntakeError, Result};
use crate::types::{CandidateField, CandidateRecord};

/// Write records as CSV in the fixed export column order
pub fn write_csv<W: Write>(writer: W, records: &[CandidateRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CandidateField::EXPORT_ORDER.iter().map(|f| f.header()))?;
    for record in records {
        csv_writer.write_record(CandidateField::EXPORT_ORDER.iter().map(|&f| record.get(f)))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Locations of the two artifacts produced by the last successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub ready: PathBuf,
    pub missing: PathBuf,
}

/// Writes the ready/missing artifacts into one output directory.
/// Each upload replaces the previous pair; there is no history.
#[derive(Debug, Clone)]
pub struct ExportWriter {
    output_dir: PathBuf,
}

/// Both artifacts written to temporary files, not yet visible under their final names.
/// Dropping without `publish` discards them.
pub struct StagedExport {
    ready: NamedTempFile,
    missing: NamedTempFile,
    paths: ExportPaths,
}

impl ExportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn paths(&self) -> ExportPaths {
        ExportPaths {
            ready: self.output_dir.join(READY_EXPORT_FILE),
            missing: self.output_dir.join(MISSING_EXPORT_FILE),
        }
    }

    /// Write both artifacts to temporary files inside the output directory
    pub fn stage(&self, valid: &[CandidateRecord], missing: &[CandidateRecord]) -> Result<StagedExport> {
        std::fs::create_dir_all(&self.output_dir)?;
        let ready_file = self.stage_one(valid)?;
        let missing_file = self.stage_one(missing)?;
        debug!(
            "Staged exports: {} ready, {} missing",
            valid.len(),
            missing.len()
        );
        Ok(StagedExport {
            ready: ready_file,
            missing: missing_file,
            paths: self.paths(),
        })
    }

    fn stage_one(&self, records: &[CandidateRecord]) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new_in(&self.output_dir)?;
        write_csv(file.as_file_mut(), records)?;
        file.as_file().sync_all()?;
        Ok(file)
    }
}

impl StagedExport {
    /// Move both artifacts into place. The previous pair is kept aside until the
    /// returned [`PublishedExport`] is finished or rolled back.
    ///
    /// Either both files are replaced or neither is.
    pub fn publish(self) -> Result<PublishedExport> {
        let StagedExport { ready, missing, paths } = self;

        for target in [&paths.ready, &paths.missing] {
            if target.is_dir() {
                return Err(IntakeError::Export(format!(
                    "{}: export target is a directory",
                    target.display()
                )));
            }
        }

        let mut published = PublishedExport {
            paths: paths.clone(),
            replaced: Vec::with_capacity(2),
        };
        for (file, target) in [(ready, &paths.ready), (missing, &paths.missing)] {
            if let Err(e) = published.place(file, target) {
                published.rollback();
                return Err(e);
            }
        }
        Ok(published)
    }
}

struct Replaced {
    target: PathBuf,
    backup: Option<PathBuf>,
}

/// Artifacts visible under their final names, with the previous pair still recoverable
pub struct PublishedExport {
    paths: ExportPaths,
    replaced: Vec<Replaced>,
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.prev", name))
}

fn export_error(target: &Path, e: std::io::Error) -> IntakeError {
    IntakeError::Export(format!("{}: {}", target.display(), e))
}

impl PublishedExport {
    fn place(&mut self, file: NamedTempFile, target: &Path) -> Result<()> {
        let backup = if target.exists() {
            let backup = backup_path(target);
            fs::rename(target, &backup).map_err(|e| export_error(target, e))?;
            Some(backup)
        } else {
            None
        };
        self.replaced.push(Replaced {
            target: target.to_path_buf(),
            backup,
        });
        file.persist(target).map_err(|e| export_error(target, e.error))?;
        Ok(())
    }

    pub fn paths(&self) -> &ExportPaths {
        &self.paths
    }

    /// Drop the previous pair; the new artifacts stay
    pub fn finish(self) -> ExportPaths {
        for replaced in &self.replaced {
            if let Some(backup) = &replaced.backup {
                if let Err(e) = fs::remove_file(backup) {
                    warn!("Could not remove previous export {}: {}", backup.display(), e);
                }
            }
        }
        self.paths
    }

    /// Put the previous pair back in place, removing anything published since
    pub fn rollback(self) {
        for replaced in self.replaced.iter().rev() {
            match fs::remove_file(&replaced.target) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove {}: {}", replaced.target.display(), e),
            }
            if let Some(backup) = &replaced.backup {
                if let Err(e) = fs::rename(backup, &replaced.target) {
                    error!(
                        "Could not restore previous export {}: {}",
                        replaced.target.display(),
                        e
                    );
                }
            }
        }
        debug!("Rolled back published exports");
    }
}
