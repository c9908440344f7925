//! Types for the files endpoint.

use serde::{Deserialize, Serialize};

/// Payload for a file upload.
///
/// Text content goes up as a small JSON envelope; arbitrary bytes go up
/// as a multipart form (the transport leaves the content-type to the HTTP
/// client so the multipart boundary is generated correctly).
#[derive(Debug, Clone)]
pub enum FileUpload {
    /// JSON envelope `{filename, content}` for text content.
    Inline {
        /// Name to store the file under.
        filename: String,
        /// The file's text content.
        content: String,
    },
    /// Multipart form upload for binary content.
    Multipart {
        /// Name to store the file under.
        filename: String,
        /// The file's raw bytes.
        bytes: Vec<u8>,
    },
}

impl FileUpload {
    /// Text upload via the JSON envelope.
    pub fn inline(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Inline {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Binary upload via multipart form data.
    pub fn multipart(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Multipart {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Metadata for a stored file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileObject {
    /// The file's identifier.
    pub id: String,

    /// The stored filename.
    pub filename: String,

    /// Size in bytes, when reported.
    #[serde(default)]
    pub bytes: Option<u64>,

    /// Creation time (unix seconds), when reported.
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Response of the file-list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    /// The stored files.
    #[serde(default)]
    pub data: Vec<FileObject>,
}

/// Response of the file-delete endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeletedFile {
    /// The deleted file's identifier.
    pub id: String,

    /// Whether the deletion took effect.
    #[serde(default)]
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_object_deserialization() {
        let file: FileObject = serde_json::from_value(json!({
            "id": "file_abc",
            "filename": "batch-input.jsonl",
            "bytes": 2048,
            "created_at": 1714000000
        }))
        .unwrap();
        assert_eq!(file.id, "file_abc");
        assert_eq!(file.bytes, Some(2048));
    }

    #[test]
    fn file_object_minimal() {
        let file: FileObject =
            serde_json::from_value(json!({"id": "file_x", "filename": "a.txt"})).unwrap();
        assert!(file.bytes.is_none());
        assert!(file.created_at.is_none());
    }

    #[test]
    fn file_list_defaults_to_empty() {
        let list: FileList = serde_json::from_value(json!({})).unwrap();
        assert!(list.data.is_empty());
    }

    #[test]
    fn upload_constructors() {
        let inline = FileUpload::inline("a.txt", "hello");
        assert!(matches!(inline, FileUpload::Inline { .. }));
        let multi = FileUpload::multipart("b.bin", vec![0, 1, 2]);
        assert!(matches!(multi, FileUpload::Multipart { .. }));
    }
}
