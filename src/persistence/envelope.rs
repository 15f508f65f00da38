//! Save envelope encoding
//!
//! On-disk layout (JSON object, fields in this order):
//! 1. `format`  - always [`SAVE_FORMAT_TAG`]
//! 2. `version` - [`SAVE_FORMAT_VERSION`]
//! 3. `digest`  - BLAKE3 hex digest of the canonical record bytes
//! 4. `record`  - `{ score, level_names, level_completed }`
//!
//! The canonical record bytes are the compact `serde_json` encoding of
//! [`SaveRecord`], so the digest can be recomputed after parsing.

use serde::{Deserialize, Serialize};

use super::CorruptReason;

pub const SAVE_FORMAT_TAG: &str = "star-defender-save";
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Persisted progress: score plus positionally aligned level data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub score: u64,
    pub level_names: Vec<String>,
    pub level_completed: Vec<bool>,
}

impl SaveRecord {
    pub fn validate(&self) -> Result<(), CorruptReason> {
        if self.level_names.len() != self.level_completed.len() {
            return Err(CorruptReason::LengthMismatch {
                names: self.level_names.len(),
                flags: self.level_completed.len(),
            });
        }
        Ok(())
    }

    fn digest(&self) -> Result<String, CorruptReason> {
        let canonical =
            serde_json::to_vec(self).map_err(|e| CorruptReason::Malformed(e.to_string()))?;
        Ok(blake3::hash(&canonical).to_hex().to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    digest: String,
    record: SaveRecord,
}

/// Encode a record into envelope bytes
pub fn encode(record: &SaveRecord) -> Result<Vec<u8>, CorruptReason> {
    record.validate()?;
    let envelope = Envelope {
        format: SAVE_FORMAT_TAG.to_string(),
        version: SAVE_FORMAT_VERSION,
        digest: record.digest()?,
        record: record.clone(),
    };
    serde_json::to_vec_pretty(&envelope).map_err(|e| CorruptReason::Malformed(e.to_string()))
}

/// Decode and verify envelope bytes
pub fn decode(bytes: &[u8]) -> Result<SaveRecord, CorruptReason> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| CorruptReason::Malformed(e.to_string()))?;

    if envelope.format != SAVE_FORMAT_TAG {
        return Err(CorruptReason::WrongFormat {
            found: envelope.format,
        });
    }
    if envelope.version == 0 || envelope.version > SAVE_FORMAT_VERSION {
        return Err(CorruptReason::UnsupportedVersion {
            found: envelope.version,
        });
    }

    let computed = envelope.record.digest()?;
    if computed != envelope.digest {
        return Err(CorruptReason::DigestMismatch {
            stored: envelope.digest,
            computed,
        });
    }

    envelope.record.validate()?;
    Ok(envelope.record)
}
