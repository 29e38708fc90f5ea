//! Entity metadata, produced by the store and carried by entity wrappers
//! between load and save (spec §3 "Entity metadata").

use serde::{Deserialize, Serialize};

/// Read-only metadata attached to a stored object: opaque version tag, size
/// in bytes, and last-modified timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub etag: String,
    pub size: u64,
    #[serde(rename = "lastModified")]
    pub last_modified: String,
}

impl EntityMetadata {
    pub fn new(etag: impl Into<String>, size: u64, last_modified: impl Into<String>) -> Self {
        Self { etag: etag.into(), size, last_modified: last_modified.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_last_modified() {
        let m = EntityMetadata::new("\"abc\"", 42, "2024-01-01T00:00:00Z");
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["etag"], "\"abc\"");
        assert_eq!(v["size"], 42);
        assert_eq!(v["lastModified"], "2024-01-01T00:00:00Z");
    }
}
