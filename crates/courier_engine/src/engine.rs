use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use courier_logging::{courier_debug, courier_info};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiSettings, ChannelProgressSink, ProcessingApi, ProgressSink, ReqwestProcessingApi};
use crate::download::{DirectoryDownloads, DownloadTarget};
use crate::{
    BatchUpload, Delivery, EngineEvent, FailureKind, FetchError, ProcessedOutput, RequestId,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Client(FetchError),
}

enum EngineCommand {
    LoadCatalog,
    Submit { request_id: RequestId, batch: BatchUpload },
    Cancel { request_id: RequestId },
}

type CancelTokens = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs backend requests on a background tokio runtime. Commands are
/// fire-and-forget; results arrive as [`EngineEvent`]s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(
        api: Arc<dyn ProcessingApi>,
        downloads: Arc<dyn DownloadTarget>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("courier-engine-worker")
            .enable_all()
            .build()?;
        let tokens: CancelTokens = Arc::new(Mutex::new(HashMap::new()));

        thread::Builder::new()
            .name("courier-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    dispatch(&runtime, &api, &downloads, &tokens, command, &event_tx);
                }
                courier_debug!("engine command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    /// Engine backed by reqwest and a download directory.
    pub fn with_settings(
        settings: ApiSettings,
        downloads: DirectoryDownloads,
    ) -> Result<Self, EngineError> {
        let api = ReqwestProcessingApi::new(settings).map_err(EngineError::Client)?;
        Self::new(Arc::new(api), Arc::new(downloads))
    }

    pub fn load_catalog(&self) {
        let _ = self.cmd_tx.send(EngineCommand::LoadCatalog);
    }

    pub fn submit(&self, request_id: RequestId, batch: BatchUpload) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Submit { request_id, batch });
    }

    /// Abort an outstanding upload. Unknown or finished ids are ignored.
    pub fn cancel(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { request_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    api: &Arc<dyn ProcessingApi>,
    downloads: &Arc<dyn DownloadTarget>,
    tokens: &CancelTokens,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::LoadCatalog => {
            let api = api.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = api.fetch_operations().await;
                let _ = event_tx.send(EngineEvent::CatalogLoaded(result));
            });
        }
        EngineCommand::Submit { request_id, batch } => {
            let token = CancellationToken::new();
            if let Ok(mut map) = tokens.lock() {
                map.insert(request_id, token.clone());
            }
            let api = api.clone();
            let downloads = downloads.clone();
            let tokens = tokens.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let sink = ChannelProgressSink::new(event_tx.clone());
                let result = tokio::select! {
                    _ = token.cancelled() => Err(FetchError::new(
                        FailureKind::Cancelled,
                        "upload cancelled by user",
                    )),
                    result = upload_and_deliver(
                        api.as_ref(),
                        downloads,
                        request_id,
                        &batch,
                        &sink,
                    ) => result,
                };
                if let Ok(mut map) = tokens.lock() {
                    map.remove(&request_id);
                }
                let _ = event_tx.send(EngineEvent::UploadCompleted { request_id, result });
            });
        }
        EngineCommand::Cancel { request_id } => {
            if let Ok(map) = tokens.lock() {
                if let Some(token) = map.get(&request_id) {
                    courier_info!("cancelling request {}", request_id);
                    token.cancel();
                }
            }
        }
    }
}

/// Upload one batch and save the processed response. The save runs on the
/// blocking pool and owns the response buffer until it is written.
pub async fn upload_and_deliver(
    api: &dyn ProcessingApi,
    downloads: Arc<dyn DownloadTarget>,
    request_id: RequestId,
    batch: &BatchUpload,
    sink: &dyn ProgressSink,
) -> Result<Delivery, FetchError> {
    let ProcessedOutput {
        bytes,
        filename,
        content_type,
        ..
    } = api.process_files(request_id, batch, sink).await?;
    let byte_len = bytes.len() as u64;

    let name = filename.clone();
    let path = tokio::task::spawn_blocking(move || downloads.deliver(&name, &bytes))
        .await
        .map_err(|err| FetchError::new(FailureKind::Delivery, err.to_string()))?
        .map_err(|err| FetchError::new(FailureKind::Delivery, err.to_string()))?;

    Ok(Delivery {
        filename,
        path,
        byte_len,
        content_type,
    })
}
