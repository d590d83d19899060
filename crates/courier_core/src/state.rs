use crate::view_model::{
    AppViewModel, CatalogView, FileRowView, OperationRowView, UploadStatusView,
};
use crate::{
    ActionSelection, AddFilesReport, BatchRequest, CapabilityCatalog, CatalogStatus, FileId,
    FileSelection, Operation, OperationKey, SelectableFile,
};

pub type RequestId = u64;

/// What happens to both selections after a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    #[default]
    KeepSelections,
    ClearSelections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    InFlight {
        request_id: RequestId,
        received_bytes: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Delivered {
        /// Name derived from the response, before any filesystem sanitizing.
        filename: String,
        byte_len: u64,
        /// Where the download was saved.
        location: String,
    },
    Failed {
        reason: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    catalog: CapabilityCatalog,
    catalog_status: CatalogStatus,
    files: FileSelection,
    actions: ActionSelection,
    upload: UploadState,
    next_request_id: RequestId,
    policy: SelectionPolicy,
    last_add: Option<AddFilesReport>,
    last_result: Option<UploadResult>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            catalog: CapabilityCatalog::default(),
            catalog_status: CatalogStatus::default(),
            files: FileSelection::new(),
            actions: ActionSelection::new(),
            upload: UploadState::Idle,
            next_request_id: 1,
            policy: SelectionPolicy::default(),
            last_add: None,
            last_result: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn catalog_status(&self) -> &CatalogStatus {
        &self.catalog_status
    }

    pub fn files(&self) -> &FileSelection {
        &self.files
    }

    pub fn actions(&self) -> &ActionSelection {
        &self.actions
    }

    pub fn upload(&self) -> UploadState {
        self.upload
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn last_result(&self) -> Option<&UploadResult> {
        self.last_result.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.upload, UploadState::InFlight { .. })
    }

    /// True when a submit would issue a request.
    pub fn can_submit(&self) -> bool {
        !self.is_in_flight() && !self.files.is_empty() && !self.actions.is_empty()
    }

    pub fn view(&self) -> AppViewModel {
        let catalog = match &self.catalog_status {
            CatalogStatus::NotRequested => CatalogView::NotRequested,
            CatalogStatus::Loading => CatalogView::Loading,
            CatalogStatus::Loaded => CatalogView::Loaded {
                count: self.catalog.len(),
            },
            CatalogStatus::Failed { reason } => CatalogView::Failed {
                reason: reason.clone(),
            },
        };
        let operations = self
            .catalog
            .iter()
            .map(|(key, op)| OperationRowView {
                key,
                id: op.id.clone(),
                title: op.title.clone(),
                description: op.description.clone(),
                selected: self.actions.contains(key),
            })
            .collect();
        let files = self
            .files
            .files()
            .iter()
            .map(|entry| FileRowView {
                id: entry.id,
                name: entry.file.name.clone(),
            })
            .collect();
        let selected_actions = self
            .actions
            .keys()
            .iter()
            .filter_map(|key| self.catalog.get(*key))
            .map(|op| op.title.clone())
            .collect();
        let upload = match self.upload {
            UploadState::Idle => UploadStatusView::Idle,
            UploadState::InFlight {
                request_id,
                received_bytes,
            } => UploadStatusView::InFlight {
                request_id,
                received_bytes,
            },
        };

        AppViewModel {
            catalog,
            operations,
            files,
            selected_actions,
            can_submit: self.can_submit(),
            upload,
            last_add: self.last_add.clone(),
            last_result: self.last_result.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns the dirty flag and clears it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_catalog_load(&mut self) -> bool {
        if self.catalog_status != CatalogStatus::NotRequested {
            return false;
        }
        self.catalog_status = CatalogStatus::Loading;
        self.mark_dirty();
        true
    }

    /// Replace the catalog in one step. Ignored once the catalog has settled.
    pub(crate) fn apply_catalog(&mut self, operations: Vec<Operation>) -> bool {
        if self.catalog_status.is_settled() {
            return false;
        }
        let (catalog, _dropped) = CapabilityCatalog::from_operations(operations);
        self.catalog = catalog;
        self.actions.clear();
        self.catalog_status = CatalogStatus::Loaded;
        self.mark_dirty();
        true
    }

    pub(crate) fn fail_catalog(&mut self, reason: String) -> bool {
        if self.catalog_status.is_settled() {
            return false;
        }
        self.catalog = CapabilityCatalog::default();
        self.actions.clear();
        self.catalog_status = CatalogStatus::Failed { reason };
        self.mark_dirty();
        true
    }

    pub(crate) fn add_files(&mut self, candidates: Vec<SelectableFile>) {
        let report = self.files.add_files(candidates);
        self.last_add = Some(report);
        self.mark_dirty();
    }

    pub(crate) fn remove_file(&mut self, id: FileId) -> bool {
        let removed = self.files.remove_file(id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn toggle_action(&mut self, key: OperationKey) -> bool {
        if self.catalog.get(key).is_none() {
            return false;
        }
        self.actions.toggle(key);
        self.mark_dirty();
        true
    }

    /// Move to `InFlight` and snapshot both selections, or refuse when a
    /// request is outstanding or either selection is empty.
    pub(crate) fn begin_upload(&mut self) -> Option<BatchRequest> {
        if !self.can_submit() {
            return None;
        }
        let action_ids: Vec<String> = self
            .actions
            .keys()
            .iter()
            .filter_map(|key| self.catalog.get(*key))
            .map(|op| op.id.clone())
            .collect();
        let files = self
            .files
            .files()
            .iter()
            .map(|entry| entry.file.clone())
            .collect();

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.upload = UploadState::InFlight {
            request_id,
            received_bytes: 0,
        };
        self.mark_dirty();

        Some(BatchRequest {
            request_id,
            action_ids,
            files,
        })
    }

    pub(crate) fn in_flight_request(&self) -> Option<RequestId> {
        match self.upload {
            UploadState::InFlight { request_id, .. } => Some(request_id),
            UploadState::Idle => None,
        }
    }

    pub(crate) fn apply_upload_progress(&mut self, id: RequestId, bytes: u64) {
        if let UploadState::InFlight {
            request_id,
            received_bytes,
        } = &mut self.upload
        {
            if *request_id == id {
                *received_bytes = bytes;
                self.dirty = true;
            }
        }
    }

    /// Return to `Idle` for the matching request. Stale ids are ignored.
    pub(crate) fn finish_upload(&mut self, id: RequestId, result: UploadResult) -> bool {
        if self.in_flight_request() != Some(id) {
            return false;
        }
        self.upload = UploadState::Idle;
        if matches!(result, UploadResult::Delivered { .. })
            && self.policy == SelectionPolicy::ClearSelections
        {
            self.files.clear();
            self.actions.clear();
        }
        self.last_result = Some(result);
        self.mark_dirty();
        true
    }
}
