//! Courier engine: backend requests, response decoding and download delivery.
mod api;
mod disposition;
mod download;
mod engine;
mod types;

pub use api::{
    mime_for, ApiSettings, ChannelProgressSink, ProcessingApi, ProgressSink,
    ReqwestProcessingApi, CATALOG_PATH, PROCESS_PATH,
};
pub use disposition::{
    decode_header_bytes, download_filename, filename_from_content_disposition,
    DEFAULT_DOWNLOAD_NAME,
};
pub use download::{
    ensure_output_dir, sanitize_download_name, DirectoryDownloads, DownloadTarget, PersistError,
};
pub use engine::{upload_and_deliver, EngineError, EngineHandle};
pub use types::{
    BatchUpload, Delivery, EngineEvent, FailureKind, FetchError, OperationSpec, ProcessedOutput,
    RequestId, UploadFile, UploadProgress, UploadSource,
};
