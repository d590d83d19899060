use crate::{AddFilesReport, FileId, OperationKey, RequestId, UploadResult};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub catalog: CatalogView,
    pub operations: Vec<OperationRowView>,
    pub files: Vec<FileRowView>,
    /// Titles of the selected operations, in selection order.
    pub selected_actions: Vec<String>,
    pub can_submit: bool,
    pub upload: UploadStatusView,
    pub last_add: Option<AddFilesReport>,
    pub last_result: Option<UploadResult>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogView {
    #[default]
    NotRequested,
    Loading,
    Loaded {
        count: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRowView {
    pub key: OperationKey,
    pub id: String,
    pub title: String,
    pub description: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub id: FileId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatusView {
    #[default]
    Idle,
    InFlight {
        request_id: RequestId,
        received_bytes: u64,
    },
}
