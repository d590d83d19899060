use crate::{RequestId, SelectableFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the capability catalog. Emitted at most once per session.
    FetchCatalog,
    SubmitBatch(BatchRequest),
    CancelUpload { request_id: RequestId },
}

/// Snapshot of both selections taken when the upload was triggered.
/// Later selection changes do not affect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub request_id: RequestId,
    pub action_ids: Vec<String>,
    pub files: Vec<SelectableFile>,
}
