//! Stable per-profile identifiers for the vector index.

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::AlumniRecord;

/// Hex SHA-256 of the profile URL, exactly as stored in the metadata.
///
/// Profiles without a URL would all hash to the same id and overwrite each
/// other in the index, so those are keyed on name and raw entries instead,
/// under a separate prefix that cannot collide with a URL hash input.
pub fn record_id(record: &AlumniRecord) -> String {
    let url = record.linkedin_url();
    let mut hasher = Sha256::new();

    if url.trim().is_empty() {
        warn!(name = record.name(), "Record has no LinkedIn URL, deriving id from name and entries");
        hasher.update(b"nourl:");
        hasher.update(record.name().as_bytes());
        for entry in record.past_companies() {
            hasher.update([0x1f_u8]);
            hasher.update(entry.as_bytes());
        }
    } else {
        hasher.update(url.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}
