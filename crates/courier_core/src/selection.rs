use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::OperationKey;

/// Identity of a file inside a [`FileSelection`], allocated on insert.
pub type FileId = u64;

/// Where the bytes of a selected file come from. The core never reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableFile {
    pub name: String,
    pub source: FileSource,
}

impl SelectableFile {
    pub fn new(name: impl Into<String>, source: FileSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Name the file after the last path component. Returns `None` for paths
    /// without one (e.g. `/` or `..`).
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self::new(name, FileSource::Path(path)))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(name, FileSource::Memory(bytes.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub id: FileId,
    pub file: SelectableFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddFilesReport {
    pub added: Vec<FileId>,
    /// Names dropped because an entry with the same name already existed.
    pub skipped: Vec<String>,
}

/// Ordered, name-deduplicated set of input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    entries: Vec<SelectedFile>,
    next_id: FileId,
}

impl Default for FileSelection {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append candidates in order. First name wins, both against the current
    /// entries and within `candidates`.
    pub fn add_files(&mut self, candidates: Vec<SelectableFile>) -> AddFilesReport {
        let mut names: HashSet<String> =
            self.entries.iter().map(|e| e.file.name.clone()).collect();
        let mut report = AddFilesReport::default();
        for file in candidates {
            if !names.insert(file.name.clone()) {
                report.skipped.push(file.name);
                continue;
            }
            let id = self.next_id;
            self.next_id += 1;
            self.entries.push(SelectedFile { id, file });
            report.added.push(id);
        }
        report
    }

    /// Remove the entry with `id`. Absent ids are a no-op.
    pub fn remove_file(&mut self, id: FileId) -> Option<SelectableFile> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).file)
    }

    pub fn find_by_name(&self, name: &str) -> Option<FileId> {
        self.entries
            .iter()
            .find(|e| e.file.name == name)
            .map(|e| e.id)
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Ordered, duplicate-free set of catalog keys. Only `toggle` mutates it
/// from outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionSelection {
    selected: Vec<OperationKey>,
}

impl ActionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `key` if present, append it otherwise. Returns whether the key
    /// is selected afterwards.
    pub fn toggle(&mut self, key: OperationKey) -> bool {
        if let Some(idx) = self.selected.iter().position(|k| *k == key) {
            self.selected.remove(idx);
            false
        } else {
            self.selected.push(key);
            true
        }
    }

    pub fn contains(&self, key: OperationKey) -> bool {
        self.selected.contains(&key)
    }

    pub fn keys(&self) -> &[OperationKey] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.selected.clear();
    }
}
