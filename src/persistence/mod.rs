//! Save/load persistence with integrity verification
//!
//! Features:
//! - Versioned JSON envelope
//! - BLAKE3 integrity digest
//! - Backup rotation (tmp → save, old save → backup)
//! - Corruption detection and recovery

pub mod envelope;
pub mod store;

use std::fmt;
use std::io;
use std::path::PathBuf;

pub use envelope::{SAVE_FORMAT_TAG, SAVE_FORMAT_VERSION, SaveRecord, decode, encode};
pub use store::{SaveSource, SaveStore};

/// Why a save file was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    /// Not parseable as a save envelope
    Malformed(String),
    /// Envelope belongs to some other file format
    WrongFormat { found: String },
    /// Written by a newer build
    UnsupportedVersion { found: u32 },
    /// Record contents do not match the stored digest
    DigestMismatch { stored: String, computed: String },
    /// Level names and completion flags are not aligned
    LengthMismatch { names: usize, flags: usize },
}

impl fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(detail) => write!(f, "malformed save: {detail}"),
            Self::WrongFormat { found } => write!(f, "not a save file (format tag {found:?})"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported save version {found} (max {SAVE_FORMAT_VERSION})")
            }
            Self::DigestMismatch { stored, computed } => {
                write!(f, "digest mismatch: stored={stored}, computed={computed}")
            }
            Self::LengthMismatch { names, flags } => {
                write!(f, "{names} level names but {flags} completion flags")
            }
        }
    }
}

/// Persistence failures, classified by how the caller should recover
#[derive(Debug)]
pub enum PersistError {
    /// No save present - start fresh
    NotFound { path: PathBuf },
    /// Save present but unusable - discard and start fresh
    Corrupt { path: PathBuf, reason: CorruptReason },
    /// Storage failure (permissions, disk full, ...)
    Io {
        path: PathBuf,
        op: &'static str,
        source: io::Error,
    },
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, op: &'static str, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            op,
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "no save at {}", path.display()),
            Self::Corrupt { path, reason } => {
                write!(f, "corrupt save at {}: {reason}", path.display())
            }
            Self::Io { path, op, source } => {
                write!(f, "failed to {op} {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
