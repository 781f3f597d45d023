//! In-memory source editor for testing.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use mend_core::{
    application::{ApplicationError, ports::SourceEditor},
    domain::TextBuffer,
    error::MendResult,
};

/// In-memory source tree. Clones share the same files.
///
/// Writes can be made to fail on demand to exercise rollback paths.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceEditor {
    inner: Arc<RwLock<MemorySourceInner>>,
}

#[derive(Debug, Default)]
struct MemorySourceInner {
    files: HashMap<PathBuf, String>,
    failing_writes: usize,
}

impl MemorySourceEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.insert(path.into(), content.into());
        }
    }

    /// Current content of `path` (testing helper).
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// Make the next `count` writes fail.
    pub fn fail_next_writes(&self, count: usize) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing_writes = count;
        }
    }
}

impl SourceEditor for MemorySourceEditor {
    fn read(&self, path: &Path) -> MendResult<TextBuffer> {
        let inner = self.inner.read().map_err(|_| ApplicationError::StoreLockError {
            during: "reading a source file",
        })?;
        inner
            .files
            .get(path)
            .map(|content| TextBuffer::from(content.as_str()))
            .ok_or_else(|| {
                ApplicationError::SourceIo {
                    path: path.to_path_buf(),
                    reason: "File does not exist".into(),
                }
                .into()
            })
    }

    fn write(&self, path: &Path, text: &TextBuffer) -> MendResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::StoreLockError {
            during: "writing a source file",
        })?;
        if inner.failing_writes > 0 {
            inner.failing_writes -= 1;
            return Err(ApplicationError::SourceIo {
                path: path.to_path_buf(),
                reason: "Simulated write failure".into(),
            }
            .into());
        }
        inner
            .files
            .insert(path.to_path_buf(), text.as_str().to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path))
            .unwrap_or(false)
    }
}
