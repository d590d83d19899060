use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted => {
            if state.begin_catalog_load() {
                vec![Effect::FetchCatalog]
            } else {
                Vec::new()
            }
        }
        Msg::CatalogLoaded(operations) => {
            state.apply_catalog(operations);
            Vec::new()
        }
        Msg::CatalogFailed { reason } => {
            state.fail_catalog(reason);
            Vec::new()
        }
        Msg::FilesAdded(files) => {
            state.add_files(files);
            Vec::new()
        }
        Msg::FileRemoved(id) => {
            state.remove_file(id);
            Vec::new()
        }
        Msg::ActionToggled(key) => {
            state.toggle_action(key);
            Vec::new()
        }
        Msg::SubmitClicked => match state.begin_upload() {
            Some(batch) => vec![Effect::SubmitBatch(batch)],
            // Empty selection or a request already outstanding.
            None => Vec::new(),
        },
        Msg::CancelClicked => match state.in_flight_request() {
            Some(request_id) => vec![Effect::CancelUpload { request_id }],
            None => Vec::new(),
        },
        Msg::UploadProgress {
            request_id,
            received_bytes,
        } => {
            state.apply_upload_progress(request_id, received_bytes);
            Vec::new()
        }
        Msg::UploadFinished { request_id, result } => {
            state.finish_upload(request_id, result);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
