//! Comment tree wire types and lenient list decoding.

use serde::Deserialize;

use kiosk_core::types::Timestamp;

/// One comment node as served by the board backend.
///
/// Replies arrive fully nested under `commentsTree`; the field is absent
/// on leaf comments.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Server-assigned identifier, opaque to the client.
    pub id: String,
    /// Comment body.
    pub text: String,
    /// Creation time (UTC).
    pub date: Timestamp,
    /// Nested replies, each a full comment record.
    #[serde(rename = "commentsTree", default)]
    pub children: Vec<Comment>,
}

impl Comment {
    /// Number of comments in this subtree, the node itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Comment::subtree_len).sum::<usize>()
    }
}

/// Extract the `comments` sequence from a list response payload.
///
/// The backend wraps the page as `{"comments": [...]}` but omits or
/// nulls the field on empty results. A missing or non-array field
/// decodes as an empty page; an array with a malformed entry is a
/// decode error rather than silent data loss.
pub fn comments_from_value(
    mut payload: serde_json::Value,
) -> Result<Vec<Comment>, serde_json::Error> {
    match payload.get_mut("comments").map(serde_json::Value::take) {
        Some(value @ serde_json::Value::Array(_)) => serde_json::from_value(value),
        _ => Ok(Vec::new()),
    }
}

// ---------- Tests ----------
