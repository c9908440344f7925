//! Types for the batch endpoints.
//!
//! Each chat surface has a parallel batch endpoint; the operations are
//! identical and are parameterized by [`Surface`](crate::Surface) on the
//! client rather than duplicated per surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to create a batch job.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBatchRequest {
    /// ID of a previously uploaded input file (JSONL of requests).
    pub input_file_id: String,

    /// The endpoint each batched request targets (e.g. "/chat/completions").
    pub endpoint: String,

    /// Completion window requested for the batch (e.g. "24h").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_window: Option<String>,

    /// Caller-supplied metadata echoed back on the batch object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl CreateBatchRequest {
    /// Create a batch request with the default completion window.
    pub fn new(input_file_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            input_file_id: input_file_id.into(),
            endpoint: endpoint.into(),
            completion_window: None,
            metadata: None,
        }
    }
}

/// A batch job as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchObject {
    /// The batch's identifier.
    pub id: String,

    /// Current status ("validating", "in_progress", "completed", ...).
    pub status: String,

    /// ID of the input file.
    #[serde(default)]
    pub input_file_id: Option<String>,

    /// ID of the output file, once the batch completes.
    #[serde(default)]
    pub output_file_id: Option<String>,

    /// Per-state request counts.
    #[serde(default)]
    pub request_counts: Option<BatchRequestCounts>,

    /// Creation time (unix seconds), when reported.
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Request counts within a batch.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BatchRequestCounts {
    /// Total requests in the batch.
    #[serde(default)]
    pub total: u64,

    /// Requests completed so far.
    #[serde(default)]
    pub completed: u64,

    /// Requests that failed.
    #[serde(default)]
    pub failed: u64,
}

/// Response of the batch-list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchList {
    /// The account's batch jobs.
    #[serde(default)]
    pub data: Vec<BatchObject>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_serialization() {
        let req = CreateBatchRequest::new("file_abc", "/chat/completions");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["input_file_id"], "file_abc");
        assert_eq!(json["endpoint"], "/chat/completions");
        assert!(json.get("completion_window").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn batch_object_deserialization() {
        let batch: BatchObject = serde_json::from_value(json!({
            "id": "batch_01",
            "status": "in_progress",
            "input_file_id": "file_abc",
            "request_counts": {"total": 100, "completed": 40, "failed": 1}
        }))
        .unwrap();
        assert_eq!(batch.status, "in_progress");
        assert_eq!(batch.request_counts.unwrap().completed, 40);
        assert!(batch.output_file_id.is_none());
    }

    #[test]
    fn batch_list_defaults_to_empty() {
        let list: BatchList = serde_json::from_value(json!({})).unwrap();
        assert!(list.data.is_empty());
    }
}
