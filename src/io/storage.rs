use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::model::TaskDocument;

/// Error type for task file I/O
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("task file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("could not serialize tasks: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Durable home of the task collection.
pub trait TaskStorage {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<TaskDocument>, StorageError>;

    /// Replace the stored document. Readers see either the old or the new
    /// content, never a mix.
    fn write(&self, doc: &TaskDocument) -> Result<(), StorageError>;

    /// Create whatever directory the document lives in.
    fn ensure_location(&self) -> Result<(), StorageError>;
}

/// Pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the task file and its side files (backup, recovery log)
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Keep a copy of an unparseable file before an empty list overwrites it.
    /// Content already sitting in the backup was preserved by an earlier read
    /// and is not logged again.
    fn preserve_corrupt(&self, content: &[u8], error: &serde_json::Error) {
        let backup = self.backup_path();
        if fs::read(&backup).is_ok_and(|saved| saved == content) {
            tracing::debug!("{} already backed up", self.path.display());
            return;
        }
        if let Err(e) = fs::write(&backup, content) {
            tracing::warn!("could not back up {}: {}", self.path.display(), e);
        }
        log_recovery(
            self.dir(),
            RecoveryEntry::new(RecoveryCategory::Corrupt, "unreadable task file")
                .field("File", self.path.display().to_string())
                .field("Backup", backup.display().to_string())
                .field("Error", error.to_string())
                .body(String::from_utf8_lossy(content)),
        );
    }
}

impl TaskStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<TaskDocument>, StorageError> {
        // bytes, not a String: invalid UTF-8 is corrupt content, not an I/O error
        let content = match fs::read(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        match serde_json::from_slice(&content) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                self.preserve_corrupt(&content, &e);
                Err(StorageError::Corrupt {
                    path: self.path.clone(),
                    source: e,
                })
            }
        }
    }

    fn write(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        let mut content = serde_json::to_string_pretty(doc).map_err(StorageError::Serialize)?;
        content.push('\n');
        if let Err(e) = atomic_write(&self.path, content.as_bytes()) {
            log_recovery(
                self.dir(),
                RecoveryEntry::new(RecoveryCategory::Write, "save failed")
                    .field("File", self.path.display().to_string())
                    .field("Error", e.to_string())
                    .body(content),
            );
            return Err(StorageError::Write {
                path: self.path.clone(),
                source: e,
            });
        }
        Ok(())
    }

    fn ensure_location(&self) -> Result<(), StorageError> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| StorageError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })
    }
}

/// Keeps the serialized document in memory. Used when embedding the store
/// without a file and in tests; counts writes and can be told to fail them.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    content: RefCell<Option<String>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Start with raw file content, parseable or not
    pub fn with_content(content: impl Into<String>) -> Self {
        let storage = MemoryStorage::default();
        storage.content.replace(Some(content.into()));
        storage
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TaskStorage for MemoryStorage {
    fn read(&self) -> Result<Option<TaskDocument>, StorageError> {
        let content = self.content.borrow();
        let Some(text) = content.as_deref() else {
            return Ok(None);
        };
        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                path: PathBuf::from("<memory>"),
                source: e,
            })
    }

    fn write(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write {
                path: PathBuf::from("<memory>"),
                source: io::Error::new(io::ErrorKind::StorageFull, "no space left"),
            });
        }
        let text = serde_json::to_string_pretty(doc).map_err(StorageError::Serialize)?;
        self.content.replace(Some(text));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn ensure_location(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

impl<T: TaskStorage + ?Sized> TaskStorage for &T {
    fn read(&self) -> Result<Option<TaskDocument>, StorageError> {
        (**self).read()
    }

    fn write(&self, doc: &TaskDocument) -> Result<(), StorageError> {
        (**self).write(doc)
    }

    fn ensure_location(&self) -> Result<(), StorageError> {
        (**self).ensure_location()
    }
}

/// Write `content` to `path` through a temp file in the same directory and
/// an atomic rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
