//! File metadata value object.

use serde::{Deserialize, Serialize};

/// Caller-supplied descriptive data attached to a file at initialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Arbitrary tags for categorization.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Key-value custom properties.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

impl FileMetadata {
    /// Create empty metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tags as a JSON array for storage.
    pub fn tags_value(&self) -> serde_json::Value {
        serde_json::Value::from(self.tags.clone())
    }

    /// Custom properties as a JSON object for storage.
    pub fn custom_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.custom.clone())
    }
}
