use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use courier_core::{
    BatchRequest, CapabilityCatalog, Effect, FileSource, Msg, Operation, RequestId,
    SelectableFile, UploadResult,
};
use courier_engine::{
    BatchUpload, Delivery, EngineEvent, EngineHandle, FailureKind, FetchError, OperationSpec,
    UploadFile, UploadSource,
};
use courier_logging::{courier_info, courier_warn};

const EVENT_POLL: Duration = Duration::from_millis(50);

/// Executes core effects on the engine and feeds engine events back as
/// messages. The bridge thread stops when the runner is dropped.
pub struct EffectRunner {
    engine: EngineHandle,
    running: Arc<AtomicBool>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self {
            engine,
            running: Arc::new(AtomicBool::new(true)),
        };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchCatalog => {
                    courier_info!("loading operation catalog");
                    self.engine.load_catalog();
                }
                Effect::SubmitBatch(batch) => {
                    courier_info!(
                        "submitting request {} actions={:?} files={}",
                        batch.request_id,
                        batch.action_ids,
                        batch.files.len()
                    );
                    let request_id = batch.request_id;
                    self.engine.submit(request_id, to_upload(batch));
                }
                Effect::CancelUpload { request_id } => {
                    self.engine.cancel(request_id);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        let running = self.running.clone();
        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                let Some(event) = engine.recv_timeout(EVENT_POLL) else {
                    continue;
                };
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::CatalogLoaded(result) => map_catalog(result),
        EngineEvent::Progress(progress) => Msg::UploadProgress {
            request_id: progress.request_id,
            received_bytes: progress.received_bytes,
        },
        EngineEvent::UploadCompleted { request_id, result } => Msg::UploadFinished {
            request_id,
            result: map_completion(request_id, result),
        },
    }
}

fn map_catalog(result: Result<Vec<OperationSpec>, FetchError>) -> Msg {
    match result {
        Ok(specs) => {
            let operations: Vec<Operation> = specs
                .into_iter()
                .map(|spec| Operation::new(spec.id, spec.title, spec.description))
                .collect();
            let (_, dropped) = CapabilityCatalog::from_operations(operations.clone());
            for id in &dropped {
                courier_warn!("catalog lists operation {:?} more than once; keeping the first", id);
            }
            Msg::CatalogLoaded(operations)
        }
        Err(err) => {
            courier_warn!("catalog load failed: {}", err);
            Msg::CatalogFailed {
                reason: err.to_string(),
            }
        }
    }
}

fn map_completion(request_id: RequestId, result: Result<Delivery, FetchError>) -> UploadResult {
    match result {
        Ok(delivery) => {
            courier_info!(
                "request {} saved {} bytes as {:?} ({})",
                request_id,
                delivery.byte_len,
                delivery.path,
                delivery.content_type.as_deref().unwrap_or("unknown type")
            );
            UploadResult::Delivered {
                filename: delivery.filename,
                byte_len: delivery.byte_len,
                location: delivery.path.display().to_string(),
            }
        }
        Err(err) if err.kind == FailureKind::Cancelled => {
            courier_info!("request {} cancelled", request_id);
            UploadResult::Cancelled
        }
        Err(err) => {
            courier_warn!("request {} failed: {}", request_id, err);
            UploadResult::Failed {
                reason: err.to_string(),
            }
        }
    }
}

fn to_upload(batch: BatchRequest) -> BatchUpload {
    BatchUpload {
        actions: batch.action_ids,
        files: batch.files.into_iter().map(to_upload_file).collect(),
    }
}

fn to_upload_file(file: SelectableFile) -> UploadFile {
    let source = match file.source {
        FileSource::Path(path) => UploadSource::Path(path),
        FileSource::Memory(bytes) => UploadSource::Memory(bytes),
    };
    UploadFile {
        name: file.name,
        source,
    }
}
