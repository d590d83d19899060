//! Courier core: pure selection-and-upload state machine and view-model helpers.
mod catalog;
mod effect;
mod msg;
mod selection;
mod state;
mod update;
mod view_model;

pub use catalog::{CapabilityCatalog, CatalogStatus, Operation, OperationKey};
pub use effect::{BatchRequest, Effect};
pub use msg::Msg;
pub use selection::{
    ActionSelection, AddFilesReport, FileId, FileSelection, FileSource, SelectableFile,
    SelectedFile,
};
pub use state::{AppState, RequestId, SelectionPolicy, UploadResult, UploadState};
pub use update::update;
pub use view_model::{
    AppViewModel, CatalogView, FileRowView, OperationRowView, UploadStatusView,
};
