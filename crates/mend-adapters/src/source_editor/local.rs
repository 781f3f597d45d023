//! Local source editor using std::fs.

use std::path::Path;

use mend_core::{application::ports::SourceEditor, domain::TextBuffer, error::MendResult};

use crate::io::{replace_file, source_error};

/// Production source editor.
///
/// Writes replace the whole file through a temporary sibling and a rename,
/// so a crash mid-write never leaves a half-edited source file.
#[derive(Debug, Clone, Copy)]
pub struct LocalSourceEditor;

impl LocalSourceEditor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalSourceEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceEditor for LocalSourceEditor {
    fn read(&self, path: &Path) -> MendResult<TextBuffer> {
        std::fs::read_to_string(path)
            .map(TextBuffer::from)
            .map_err(|e| source_error(path, e, "read file"))
    }

    fn write(&self, path: &Path, text: &TextBuffer) -> MendResult<()> {
        replace_file(path, text.as_str()).map_err(|e| source_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_whole_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "let a = 1\n").unwrap();

        let editor = LocalSourceEditor::new();
        assert!(editor.exists(&path));
        let text = editor.read(&path).unwrap();
        assert_eq!(text.as_str(), "let a = 1\n");

        editor.write(&path, &TextBuffer::from("let a = 2;\n")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "let a = 2;\n");
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let editor = LocalSourceEditor::new();
        let path = dir.path().join("missing.ts");
        assert!(!editor.exists(&path));
        let err = editor.read(&path).unwrap_err();
        assert!(err.to_string().contains("read file"));
    }
}
