use apiv2_core::{DomainResult, EntityMetadata, Identifier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub id: String,
    pub data: serde_json::Value,
}

impl CreateDocumentRequest {
    pub fn into_parts(self) -> DomainResult<(Identifier, serde_json::Value)> {
        Ok((Identifier::parse(self.id)?, self.data))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplaceDocumentRequest {
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct MergeDocumentRequest {
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub data: serde_json::Value,
    pub etag: String,
}

impl DocumentResponse {
    pub fn new(id: &Identifier, data: serde_json::Value, metadata: &EntityMetadata) -> Self {
        Self { id: id.to_string(), data, etag: metadata.etag.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_id() {
        let req = CreateDocumentRequest { id: "doc1".to_string(), data: serde_json::json!({"a": 1}) };
        let (id, data) = req.into_parts().unwrap();
        assert_eq!(id.as_str(), "doc1");
        assert_eq!(data, serde_json::json!({"a": 1}));
    }

    #[test]
    fn rejects_invalid_id() {
        let req = CreateDocumentRequest { id: "has space".to_string(), data: serde_json::json!({}) };
        assert!(req.into_parts().is_err());
    }
}
