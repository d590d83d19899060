//! Turns command-line paths into selectable files.
//!
//! Explicit files are taken as given. Directories contribute their `*.pdf`
//! files in name order, descending into subdirectories only when asked.

use std::fs;
use std::path::{Path, PathBuf};

use courier_core::SelectableFile;
use courier_logging::courier_warn;

const PICKED_EXTENSION: &str = "pdf";

#[derive(Debug, Default)]
pub struct PickedFiles {
    pub files: Vec<SelectableFile>,
    /// Paths that could not be used, with the reason.
    pub rejected: Vec<(PathBuf, String)>,
}

pub fn collect_files(paths: &[PathBuf], recursive: bool) -> PickedFiles {
    let mut picked = PickedFiles::default();
    for path in paths {
        if path.is_dir() {
            collect_dir(path, recursive, &mut picked);
        } else if path.is_file() {
            push_file(path, &mut picked);
        } else {
            reject(&mut picked, path, "no such file or directory".to_string());
        }
    }
    picked
}

fn collect_dir(dir: &Path, recursive: bool, picked: &mut PickedFiles) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            reject(picked, dir, err.to_string());
            return;
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if recursive {
                collect_dir(&path, recursive, picked);
            }
        } else if has_picked_extension(&path) {
            push_file(&path, picked);
        }
    }
}

fn push_file(path: &Path, picked: &mut PickedFiles) {
    match SelectableFile::from_path(path) {
        Some(file) => picked.files.push(file),
        None => reject(picked, path, "path has no file name".to_string()),
    }
}

fn reject(picked: &mut PickedFiles, path: &Path, reason: String) {
    courier_warn!("skipping {:?}: {}", path, reason);
    picked.rejected.push((path.to_path_buf(), reason));
}

fn has_picked_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PICKED_EXTENSION))
}
