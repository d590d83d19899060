use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

pub type RequestId = u64;

/// One entry of `GET /api/get-available-actions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperationSpec {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub source: UploadSource,
}

/// Everything sent in one `POST /api/process-files`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchUpload {
    pub actions: Vec<String>,
    pub files: Vec<UploadFile>,
}

/// Processed response body, fully received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedOutput {
    pub bytes: Vec<u8>,
    /// Derived download name; `processed_file` when the header gave none.
    pub filename: String,
    pub filename_from_header: bool,
    pub content_type: Option<String>,
}

/// Result of saving a processed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub filename: String,
    pub path: PathBuf,
    pub byte_len: u64,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub request_id: RequestId,
    pub received_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CatalogLoaded(Result<Vec<OperationSpec>, FetchError>),
    Progress(UploadProgress),
    UploadCompleted {
        request_id: RequestId,
        result: Result<Delivery, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Catalog body was not the expected JSON.
    Decode,
    /// An input file could not be read; nothing was sent.
    ReadInput { name: String },
    /// The processed response could not be saved.
    Delivery,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::ReadInput { name } => write!(f, "cannot read input file {name}"),
            FailureKind::Delivery => write!(f, "download could not be saved"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
