use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    #[default]
    Draft,
    Published,
}

/// One ordered, typed unit of content.
///
/// The payload is opaque apart from the structural checks run by the block
/// catalog's schema for `block_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    /// Wire field "type".
    #[serde(rename = "type")]
    pub block_type: String,
    /// Position in the document; unique within it.
    pub order: u32,
    #[serde(default)]
    pub status: BlockStatus,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub styling: Option<serde_json::Value>,
}

/// A candidate document submitted for publishing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    /// Document-level styling.
    #[serde(default)]
    pub styling: Option<serde_json::Value>,
}
