#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session opened; triggers the one-time catalog fetch.
    SessionStarted,
    /// Catalog fetch succeeded.
    CatalogLoaded(Vec<crate::Operation>),
    /// Catalog fetch failed (transport, status or decode).
    CatalogFailed { reason: String },
    /// User supplied files (drop or picker).
    FilesAdded(Vec<crate::SelectableFile>),
    /// User removed one file.
    FileRemoved(crate::FileId),
    /// User clicked an operation.
    ActionToggled(crate::OperationKey),
    /// User clicked upload.
    SubmitClicked,
    /// User asked to abort the outstanding upload.
    CancelClicked,
    /// Engine progress while receiving the processed response.
    UploadProgress {
        request_id: crate::RequestId,
        received_bytes: u64,
    },
    /// Engine completion for an upload.
    UploadFinished {
        request_id: crate::RequestId,
        result: crate::UploadResult,
    },
    NoOp,
}
