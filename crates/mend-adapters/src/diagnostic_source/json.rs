//! JSON diagnostic source.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use mend_core::{application::ports::DiagnosticSource, domain::Diagnostic, error::MendResult};

use super::SourceError;

/// Accepted document shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped { diagnostics: Vec<Diagnostic> },
    Many(Vec<Diagnostic>),
    One(Box<Diagnostic>),
}

impl Document {
    fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            Self::Wrapped { diagnostics } | Self::Many(diagnostics) => diagnostics,
            Self::One(diagnostic) => vec![*diagnostic],
        }
    }
}

/// Reads diagnostics from a JSON file, or from every `*.json` file under a
/// directory (sorted by path).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDiagnosticSource;

impl JsonDiagnosticSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse one JSON document.
    pub fn parse_str(&self, raw: &str, origin: &Path) -> Result<Vec<Diagnostic>, SourceError> {
        let document: Document =
            serde_json::from_str(raw).map_err(|e| SourceError::Malformed {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(document.into_diagnostics())
    }

    fn load_file(&self, path: &Path) -> Result<Vec<Diagnostic>, SourceError> {
        let raw = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&raw, path)
    }

    fn load_dir(&self, dir: &Path) -> Result<Vec<Diagnostic>, SourceError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1) {
            let entry = entry.map_err(|e| SourceError::Walk {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            let is_json = entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if entry.file_type().is_file() && is_json {
                files.push(entry.into_path());
            }
        }
        files.sort();

        let mut diagnostics = Vec::new();
        for file in &files {
            let loaded = self.load_file(file)?;
            debug!(file = %file.display(), count = loaded.len(), "loaded diagnostics");
            diagnostics.extend(loaded);
        }
        Ok(diagnostics)
    }
}

impl DiagnosticSource for JsonDiagnosticSource {
    #[instrument(skip(self), fields(input = %input.display()))]
    fn diagnostics(&self, input: &Path) -> MendResult<Vec<Diagnostic>> {
        let diagnostics = if input.is_dir() {
            self.load_dir(input)?
        } else {
            self.load_file(input)?
        };
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mend_core::domain::{ErrorCategory, Severity};

    const ONE: &str = r#"{
        "file": "src/App.tsx",
        "line": 3,
        "column": 10,
        "message": "Cannot find name 'useState'.",
        "code": 2304,
        "category": "IMPORT_ERROR"
    }"#;

    #[test]
    fn accepts_a_single_record() {
        let got = JsonDiagnosticSource::new()
            .parse_str(ONE, Path::new("one.json"))
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].code, 2304);
        assert_eq!(got[0].category, ErrorCategory::ImportError);
        assert_eq!(got[0].severity, Severity::Error);
    }

    #[test]
    fn accepts_arrays_and_wrapped_documents() {
        let source = JsonDiagnosticSource::new();
        let many = format!("[{ONE}, {ONE}]");
        assert_eq!(source.parse_str(&many, Path::new("m.json")).unwrap().len(), 2);
        let wrapped = format!(r#"{{ "diagnostics": [{ONE}] }}"#);
        assert_eq!(source.parse_str(&wrapped, Path::new("w.json")).unwrap().len(), 1);
    }

    #[test]
    fn missing_category_defaults_to_generic() {
        let raw = r#"{ "file": "a.ts", "line": 1, "column": 1, "message": "m", "code": 9999 }"#;
        let got = JsonDiagnosticSource::new()
            .parse_str(raw, Path::new("a.json"))
            .unwrap();
        assert_eq!(got[0].category, ErrorCategory::GenericError);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let result = JsonDiagnosticSource::new().parse_str(r#"{ "file": 1 }"#, Path::new("x.json"));
        assert!(matches!(result, Err(SourceError::Malformed { .. })));
    }

    #[test]
    fn directories_are_walked_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("b.json"),
            ONE.replace("2304", "2322").replace("IMPORT_ERROR", "TYPE_ERROR"),
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), ONE).unwrap();
        fs::write(nested.join("ignored.txt"), "not json").unwrap();

        let got = JsonDiagnosticSource::new().diagnostics(dir.path()).unwrap();
        let codes: Vec<u32> = got.iter().map(|d| d.code).collect();
        assert_eq!(codes, [2304, 2322]);
    }
}
