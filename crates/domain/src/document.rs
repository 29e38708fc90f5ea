//! `Document`: a generic JSON blob identified by an `Identifier` (spec §3
//! "Document").

use apiv2_core::Identifier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Identifier,
    pub data: serde_json::Value,
}

impl Document {
    pub fn new(id: Identifier, data: serde_json::Value) -> Self {
        Self { id, data }
    }

    pub fn with_data(&self, data: serde_json::Value) -> Self {
        Self { id: self.id.clone(), data }
    }

    /// Shallow JSON merge: object keys present in `patch` overwrite the
    /// current value; everything else is preserved.
    pub fn merged(&self, patch: serde_json::Value) -> Self {
        let mut data = self.data.clone();
        match (&mut data, patch) {
            (serde_json::Value::Object(current), serde_json::Value::Object(patch)) => {
                for (k, v) in patch {
                    current.insert(k, v);
                }
            }
            (_, patch) => data = patch,
        }
        Self { id: self.id.clone(), data }
    }
}
