//! JSON-file knowledge store.
//!
//! The whole knowledge base lives in one JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": [
//!     { "signature": "TS2304:IMPORT_ERROR", "observedResolutions": 3, ... }
//!   ]
//! }
//! ```
//!
//! The file is shared with other processes. Reads reload it; every write
//! takes an exclusive OS lock on a `.lock` sibling, re-reads the document,
//! merges the entry into it and replaces the file through a temporary
//! sibling and a rename. A write that would not advance an entry past what
//! is already on disk is rejected as stale.

use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use fd_lock::RwLock as FileLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use mend_core::{
    application::{ApplicationError, ports::KnowledgeStore},
    domain::{KnowledgeBaseEntry, Signature},
    error::MendResult,
};

use crate::io::{persistence_error, replace_file};

/// Version of the on-disk document layout.
pub const FORMAT_VERSION: u32 = 1;

type Entries = BTreeMap<Signature, KnowledgeBaseEntry>;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u32,
    #[serde(default)]
    entries: Vec<KnowledgeBaseEntry>,
}

/// Durable knowledge store backed by a single JSON file.
pub struct JsonFileKnowledgeStore {
    path: PathBuf,
    lock_path: PathBuf,
    /// Last document seen on disk. Guards in-process writers too.
    entries: RwLock<Entries>,
}

impl JsonFileKnowledgeStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Persistence` if the file exists but cannot
    /// be read, is not a knowledge-base document, or was written by an
    /// incompatible version.
    #[instrument(fields(path = %path.as_ref().display()), skip(path))]
    pub fn open(path: impl AsRef<Path>) -> MendResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = load(&path)?;
        info!(entries = entries.len(), "Knowledge base opened");
        Ok(Self {
            lock_path: lock_sibling(&path),
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn refresh(&self, during: &'static str) -> MendResult<Entries> {
        let fresh = load(&self.path)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ApplicationError::StoreLockError { during })?;
        *entries = fresh.clone();
        Ok(fresh)
    }

    /// Run `merge` against the current on-disk document while holding the
    /// file lock, then write the result back.
    fn write_locked(
        &self,
        during: &'static str,
        merge: impl FnOnce(&mut Entries) -> MendResult<()>,
    ) -> MendResult<()> {
        let mut cached = self
            .entries
            .write()
            .map_err(|_| ApplicationError::StoreLockError { during })?;
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| persistence_error(&self.lock_path, format!("Failed to open lock: {}", e)))?;
        let mut lock = FileLock::new(file);
        let _held = lock
            .write()
            .map_err(|e| persistence_error(&self.lock_path, format!("Failed to lock: {}", e)))?;

        let mut on_disk = load(&self.path)?;
        merge(&mut on_disk)?;
        self.persist(&on_disk)?;
        *cached = on_disk;
        Ok(())
    }

    fn ensure_parent(&self) -> MendResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    persistence_error(&self.path, format!("Failed to create directory: {}", e))
                })?;
            }
        }
        Ok(())
    }

    fn persist(&self, entries: &Entries) -> MendResult<()> {
        let document = DocumentRef {
            version: FORMAT_VERSION,
            entries: entries.values().collect(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| persistence_error(&self.path, format!("Failed to encode: {}", e)))?;
        replace_file(&self.path, &json)
            .map_err(|e| persistence_error(&self.path, format!("Failed to write: {}", e)))?;
        debug!(entries = entries.len(), "Knowledge base persisted");
        Ok(())
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    entries: Vec<&'a KnowledgeBaseEntry>,
}

/// `kb.json` locks through `kb.json.lock` in the same directory.
fn lock_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

fn load(path: &Path) -> MendResult<Entries> {
    match fs::read_to_string(path) {
        Ok(raw) => parse(path, &raw),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No knowledge base yet, starting empty");
            Ok(BTreeMap::new())
        }
        Err(e) => Err(persistence_error(path, format!("Failed to read: {}", e))),
    }
}

fn parse(path: &Path, raw: &str) -> MendResult<Entries> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let document: Document = serde_json::from_str(raw)
        .map_err(|e| persistence_error(path, format!("Not a knowledge-base document: {}", e)))?;
    if document.version != FORMAT_VERSION {
        return Err(persistence_error(
            path,
            format!(
                "Unsupported format version {} (expected {})",
                document.version, FORMAT_VERSION
            ),
        ));
    }
    Ok(document
        .entries
        .into_iter()
        .map(|entry| (entry.signature, entry))
        .collect())
}

impl KnowledgeStore for JsonFileKnowledgeStore {
    fn get(&self, signature: &Signature) -> MendResult<Option<KnowledgeBaseEntry>> {
        Ok(self
            .refresh("reading the knowledge base")?
            .remove(signature))
    }

    fn put(&self, entry: KnowledgeBaseEntry) -> MendResult<()> {
        self.write_locked("writing the knowledge base", |on_disk| {
            if let Some(current) = on_disk.get(&entry.signature) {
                if current != &entry
                    && current.observed_resolutions >= entry.observed_resolutions
                {
                    warn!(
                        signature = %entry.signature,
                        on_disk = current.observed_resolutions,
                        written = entry.observed_resolutions,
                        "Rejected stale knowledge-base write"
                    );
                    return Err(ApplicationError::StoreConflict {
                        signature: entry.signature.to_string(),
                    }
                    .into());
                }
            }
            on_disk.insert(entry.signature, entry);
            Ok(())
        })
    }

    fn entries(&self) -> MendResult<Vec<KnowledgeBaseEntry>> {
        Ok(self
            .refresh("reading the knowledge base")?
            .into_values()
            .collect())
    }

    /// Merge anything this handle has seen that is newer than the file, and
    /// rewrite it.
    fn flush(&self) -> MendResult<()> {
        let seen = self
            .entries
            .read()
            .map_err(|_| ApplicationError::StoreLockError {
                during: "flushing the knowledge base",
            })?
            .clone();
        self.write_locked("flushing the knowledge base", move |on_disk| {
            for (signature, entry) in seen {
                let newer = on_disk
                    .get(&signature)
                    .is_none_or(|current| current.observed_resolutions < entry.observed_resolutions);
                if newer {
                    on_disk.insert(signature, entry);
                }
            }
            Ok(())
        })
    }
}
