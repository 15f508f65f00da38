//! File-backed save slot
//!
//! Writes go to `<save>.tmp` first, the previous save is rotated to
//! `<save>.bak`, then the temp file is renamed over the save. A crash at any
//! point leaves either the old save, the backup, or the new save intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::envelope::{SaveRecord, decode, encode};
use super::{CorruptReason, PersistError};

const SAVE_FILE_NAME: &str = "player_info.json";
const APP_DIR_NAME: &str = "star-defender";

/// Which file a loaded record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveSource {
    Primary,
    /// Primary was missing
    BackupOnly,
    /// Primary was corrupt and has been moved aside
    Recovered(CorruptReason),
}

/// A single save slot in a directory
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user data directory, if the platform has one
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE_NAME)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{SAVE_FILE_NAME}.{suffix}"))
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling("bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling("tmp")
    }

    fn quarantine_path(&self) -> PathBuf {
        self.sibling("corrupt")
    }

    pub fn exists(&self) -> bool {
        self.save_path().exists() || self.backup_path().exists()
    }

    /// Atomically replace the save with `record`
    pub fn save(&self, record: &SaveRecord) -> Result<(), PersistError> {
        let save_path = self.save_path();
        let bytes = encode(record).map_err(|reason| PersistError::Corrupt {
            path: save_path.clone(),
            reason,
        })?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| PersistError::io(&self.dir, "create directory", e))?;

        let tmp_path = self.temp_path();
        if let Err(err) = write_synced(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        // Only a readable save may replace the backup
        if save_path.exists() {
            if read_record(&save_path).is_ok() {
                fs::rename(&save_path, self.backup_path())
                    .map_err(|e| PersistError::io(&save_path, "rotate", e))?;
            } else {
                self.quarantine_primary()?;
            }
        }
        fs::rename(&tmp_path, &save_path).map_err(|e| PersistError::io(&tmp_path, "rename", e))?;

        log::info!(
            "Saved progress to {:?} (score {}, {} levels)",
            save_path,
            record.score,
            record.level_names.len()
        );
        Ok(())
    }

    /// Load the save, falling back to the backup when the primary is unusable
    ///
    /// A backup that gets used is copied back over the primary, so the next
    /// save rotates a good file into `.bak`.
    pub fn load(&self) -> Result<(SaveRecord, SaveSource), PersistError> {
        let save_path = self.save_path();
        let backup_path = self.backup_path();

        if !save_path.exists() {
            if backup_path.exists() {
                log::warn!("Save missing, restoring from backup {:?}", backup_path);
                let record = read_record(&backup_path)?;
                self.promote_backup()?;
                return Ok((record, SaveSource::BackupOnly));
            }
            return Err(PersistError::NotFound { path: save_path });
        }

        match read_record(&save_path) {
            Ok(record) => {
                log::info!("Loaded progress from {:?}", save_path);
                Ok((record, SaveSource::Primary))
            }
            Err(PersistError::Corrupt { path, reason }) if backup_path.exists() => {
                log::warn!("Corrupt save at {:?} ({reason}); trying backup", path);
                match read_record(&backup_path) {
                    Ok(record) => {
                        log::info!("Recovered progress from backup {:?}", backup_path);
                        self.quarantine_primary()?;
                        self.promote_backup()?;
                        Ok((record, SaveSource::Recovered(reason)))
                    }
                    Err(backup_err) => {
                        log::warn!("Backup unusable too: {backup_err}");
                        Err(PersistError::Corrupt { path, reason })
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Move unusable save files aside so the next save starts clean
    pub fn quarantine(&self) -> Result<(), PersistError> {
        self.quarantine_primary()?;
        let backup_path = self.backup_path();
        if backup_path.exists() {
            fs::remove_file(&backup_path)
                .map_err(|e| PersistError::io(&backup_path, "remove", e))?;
        }
        Ok(())
    }

    fn quarantine_primary(&self) -> Result<(), PersistError> {
        let save_path = self.save_path();
        if save_path.exists() {
            let target = self.quarantine_path();
            fs::rename(&save_path, &target)
                .map_err(|e| PersistError::io(&save_path, "quarantine", e))?;
            log::warn!("Moved corrupt save to {:?}", target);
        }
        Ok(())
    }

    /// Copy the backup over the primary slot, keeping the backup itself
    fn promote_backup(&self) -> Result<(), PersistError> {
        let backup_path = self.backup_path();
        let tmp_path = self.temp_path();
        fs::copy(&backup_path, &tmp_path)
            .map_err(|e| PersistError::io(&backup_path, "copy", e))?;
        fs::rename(&tmp_path, self.save_path())
            .map_err(|e| PersistError::io(&tmp_path, "rename", e))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let mut file = File::create(path).map_err(|e| PersistError::io(path, "create", e))?;
    file.write_all(bytes)
        .map_err(|e| PersistError::io(path, "write", e))?;
    file.sync_all().map_err(|e| PersistError::io(path, "sync", e))
}

fn read_record(path: &Path) -> Result<SaveRecord, PersistError> {
    let bytes = fs::read(path).map_err(|e| PersistError::io(path, "read", e))?;
    decode(&bytes).map_err(|reason: CorruptReason| PersistError::Corrupt {
        path: path.to_path_buf(),
        reason,
    })
}
