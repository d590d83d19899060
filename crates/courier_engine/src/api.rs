use std::time::Duration;

use courier_logging::{courier_debug, courier_info};
use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::disposition::{decode_header_bytes, download_filename, filename_from_content_disposition};
use crate::{
    BatchUpload, EngineEvent, FailureKind, FetchError, OperationSpec, ProcessedOutput, RequestId,
    UploadFile, UploadProgress, UploadSource,
};

pub const CATALOG_PATH: &str = "api/get-available-actions";
pub const PROCESS_PATH: &str = "api/process-files";

const ACTIONS_FIELD: &str = "actions";
const FILES_FIELD: &str = "files";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    base_url: Url,
    pub connect_timeout: Duration,
    /// Bound on the whole catalog request.
    pub catalog_timeout: Option<Duration>,
    /// Bound on the whole upload request; `None` waits indefinitely.
    pub upload_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl ApiSettings {
    /// `base_url` is the server root; endpoint paths are resolved against it.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            connect_timeout: Duration::from_secs(10),
            catalog_timeout: Some(Duration::from_secs(30)),
            upload_timeout: None,
            max_response_bytes: 512 * 1024 * 1024,
        }
    }

    pub fn parse(base_url: &str) -> Result<Self, FetchError> {
        let url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        Ok(Self::new(url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The two backend endpoints.
#[async_trait::async_trait]
pub trait ProcessingApi: Send + Sync {
    async fn fetch_operations(&self) -> Result<Vec<OperationSpec>, FetchError>;

    async fn process_files(
        &self,
        request_id: RequestId,
        batch: &BatchUpload,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessedOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestProcessingApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestProcessingApi {
    pub fn new(settings: ApiSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    async fn build_form(&self, batch: &BatchUpload) -> Result<Form, FetchError> {
        let mut form = Form::new();
        for action in &batch.actions {
            form = form.text(ACTIONS_FIELD, action.clone());
        }
        for file in &batch.files {
            let data = read_source(file).await?;
            let part = Part::bytes(data)
                .file_name(file.name.clone())
                .mime_str(mime_for(&file.name))
                .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
            form = form.part(FILES_FIELD, part);
        }
        Ok(form)
    }

    fn check_declared_length(&self, response: &reqwest::Response) -> Result<(), FetchError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_response_bytes {
                return Err(too_large(self.settings.max_response_bytes, content_len));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProcessingApi for ReqwestProcessingApi {
    async fn fetch_operations(&self) -> Result<Vec<OperationSpec>, FetchError> {
        let url = self.settings.endpoint(CATALOG_PATH)?;
        courier_debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = self.settings.catalog_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        self.check_declared_length(&response)?;

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let operations: Vec<OperationSpec> = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        courier_info!("catalog lists {} operations", operations.len());
        Ok(operations)
    }

    async fn process_files(
        &self,
        request_id: RequestId,
        batch: &BatchUpload,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessedOutput, FetchError> {
        let url = self.settings.endpoint(PROCESS_PATH)?;
        let form = self.build_form(batch).await?;
        courier_info!(
            "request {} POST {} actions={:?} files={}",
            request_id,
            url,
            batch.actions,
            batch.files.len()
        );

        let mut request = self.client.post(url).multipart(form);
        if let Some(timeout) = self.settings.upload_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        self.check_declared_length(&response)?;

        let disposition = header_text(&response, CONTENT_DISPOSITION);
        let content_type = header_text(&response, CONTENT_TYPE);
        let filename_from_header = disposition
            .as_deref()
            .and_then(filename_from_content_disposition)
            .is_some();
        let filename = download_filename(disposition.as_deref());

        sink.emit(EngineEvent::Progress(UploadProgress {
            request_id,
            received_bytes: 0,
        }));

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_response_bytes {
                return Err(too_large(self.settings.max_response_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::Progress(UploadProgress {
                request_id,
                received_bytes: bytes.len() as u64,
            }));
        }

        Ok(ProcessedOutput {
            bytes,
            filename,
            filename_from_header,
            content_type,
        })
    }
}

async fn read_source(file: &UploadFile) -> Result<Vec<u8>, FetchError> {
    match &file.source {
        UploadSource::Memory(bytes) => Ok(bytes.to_vec()),
        UploadSource::Path(path) => tokio::fs::read(path).await.map_err(|err| {
            FetchError::new(
                FailureKind::ReadInput {
                    name: file.name.clone(),
                },
                err.to_string(),
            )
        }),
    }
}

/// MIME type for an upload part, from the file extension.
pub fn mime_for(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    if ext.eq_ignore_ascii_case("pdf") {
        "application/pdf"
    } else if ext.eq_ignore_ascii_case("zip") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}

fn header_text(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|value| decode_header_bytes(value.as_bytes()))
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
