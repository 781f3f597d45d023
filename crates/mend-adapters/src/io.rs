//! I/O error mapping shared by the file-backed adapters.

use std::io;
use std::path::{Path, PathBuf};

use mend_core::{application::ApplicationError, error::MendError};

pub(crate) fn source_error(path: &Path, e: io::Error, operation: &str) -> MendError {
    ApplicationError::SourceIo {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

pub(crate) fn persistence_error(path: &Path, reason: impl Into<String>) -> MendError {
    ApplicationError::Persistence {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

/// Sibling path used for write-then-rename replacement of `path`.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
}

/// Replace `path` with `content` atomically: write a sibling, then rename.
pub(crate) fn replace_file(path: &Path, content: &str) -> io::Result<()> {
    let tmp = temp_sibling(path);
    if let Err(e) = std::fs::write(&tmp, content) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&tmp);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_sibling_stays_in_the_same_directory() {
        let tmp = temp_sibling(Path::new("/data/kb.json"));
        assert_eq!(tmp.parent(), Some(Path::new("/data")));
        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".kb.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn replace_file_overwrites_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "old").unwrap();
        replace_file(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
