use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use courier_logging::courier_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free file name for {0}")]
    NameExhausted(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Receives the processed response under its derived name.
pub trait DownloadTarget: Send + Sync {
    /// Save `bytes` as `filename`; returns where it ended up.
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError>;
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Saves downloads into one directory through a temp file that is renamed
/// into place, so a failed save never leaves a partial file behind.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
    overwrite: bool,
}

const MAX_NAME_ATTEMPTS: u32 = 1000;

impl DirectoryDownloads {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            overwrite: false,
        }
    }

    /// Replace an existing file of the same name instead of picking `name (n).ext`.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn persist(&self, tmp: NamedTempFile, safe_name: &str) -> Result<PathBuf, PersistError> {
        if self.overwrite {
            let target = self.dir.join(safe_name);
            tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
            return Ok(target);
        }

        let mut tmp = tmp;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = self.dir.join(numbered_name(safe_name, attempt));
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = err.file;
                }
                Err(err) => return Err(PersistError::Io(err.error)),
            }
        }
        Err(PersistError::NameExhausted(safe_name.to_string()))
    }
}

impl DownloadTarget for DirectoryDownloads {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let safe_name = sanitize_download_name(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        let target = self.persist(tmp, &safe_name)?;
        courier_debug!("saved {} bytes to {:?}", bytes.len(), target);
        Ok(target)
    }
}

/// `name.ext`, `name (1).ext`, `name (2).ext`, ...
fn numbered_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({n}){}", &name[..dot], &name[dot..]),
        _ => format!("{name} ({n})"),
    }
}

/// Make a server-supplied name safe to use as a single path component.
pub fn sanitize_download_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = crate::DEFAULT_DOWNLOAD_NAME.to_string();
    }
    if cleaned.len() > 200 {
        let mut end = 200;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    let stem_len = cleaned.find('.').unwrap_or(cleaned.len());
    if is_reserved_windows_name(&cleaned[..stem_len]) {
        cleaned.insert(stem_len, '_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
