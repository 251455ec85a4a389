//! Cross-process storage medium for the mirror.
//!
//! # Responsibility
//! - Hold exactly one `MirrorRecord` readable by the companion process.
//!
//! # Invariants
//! - Readers never observe a partially written record: every write goes to
//!   its own temp sibling that is renamed over the target.
//! - The medium is a single-slot mailbox; each store replaces the slot.

use crate::mirror::snapshot::MirrorRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MIRROR_FILE_NAME: &str = "widget.json";

pub type MirrorResult<T> = Result<T, MirrorError>;

#[derive(Debug)]
pub enum MirrorError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "mirror io at `{}`: {source}", path.display()),
            Self::Json(err) => write!(f, "mirror record is not valid json: {err}"),
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Named key-value region shared with the companion process.
pub trait MirrorMedium: Send + Sync {
    /// Returns `None` when the region has never been written.
    fn load(&self) -> MirrorResult<Option<MirrorRecord>>;
    fn store(&self, record: &MirrorRecord) -> MirrorResult<()>;
}

/// Medium backed by one JSON file inside a shared group directory.
#[derive(Debug, Clone)]
pub struct FileMirrorMedium {
    path: PathBuf,
}

impl FileMirrorMedium {
    /// Opens (creating if needed) the region named `group` under `root`.
    pub fn open(root: impl AsRef<Path>, group: &str) -> MirrorResult<Self> {
        let dir = root.as_ref().join(group);
        std::fs::create_dir_all(&dir).map_err(|source| MirrorError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            path: dir.join(MIRROR_FILE_NAME),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MirrorMedium for FileMirrorMedium {
    fn load(&self) -> MirrorResult<Option<MirrorRecord>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MirrorError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn store(&self, record: &MirrorRecord) -> MirrorResult<()> {
        let json = serde_json::to_vec_pretty(record)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        // Each writer gets its own temp sibling so overlapping stores never
        // share an inode; the rename keeps whichever lands last.
        let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        file.write_all(&json).map_err(io_error(file.path()))?;
        file.as_file().sync_all().map_err(io_error(file.path()))?;
        file.persist(&self.path)
            .map_err(|err| io_error(&self.path)(err.error))?;
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MirrorError {
    let path = path.to_path_buf();
    move |source| MirrorError::Io { path, source }
}
