//! Diagnostic source adapters.
//!
//! Two input formats are understood:
//! - JSON records (one diagnostic, an array, or `{ "diagnostics": [...] }`)
//! - TypeScript compiler text output (`tsc --pretty false`, or the pretty
//!   format with colours stripped)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use mend_core::{
    application::{ApplicationError, ports::DiagnosticSource},
    error::MendError,
};

mod json;
mod tsc;

pub use json::JsonDiagnosticSource;
pub use tsc::TscDiagnosticSource;

/// Failures while loading diagnostics.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed diagnostics in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },
}

impl From<SourceError> for MendError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Read { path, source } => ApplicationError::SourceIo {
                path,
                reason: source.to_string(),
            }
            .into(),
            SourceError::Walk { path, reason } => {
                ApplicationError::SourceIo { path, reason }.into()
            }
            malformed @ SourceError::Malformed { .. } => {
                ApplicationError::ValidationFailed(malformed.to_string()).into()
            }
        }
    }
}

/// Input format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticFormat {
    Json,
    Tsc,
    #[default]
    Auto,
}

impl FromStr for DiagnosticFormat {
    type Err = MendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "tsc" | "text" => Ok(Self::Tsc),
            "auto" => Ok(Self::Auto),
            other => Err(MendError::Configuration {
                message: format!("unknown diagnostic format '{}' (expected json, tsc or auto)", other),
            }),
        }
    }
}

/// Resolve [`DiagnosticFormat::Auto`] for `input`.
///
/// Directories and `*.json` files are JSON; anything else is sniffed: a
/// document starting with `{` or `[` is JSON, otherwise compiler text.
pub fn detect_format(input: &Path) -> DiagnosticFormat {
    if input.is_dir() {
        return DiagnosticFormat::Json;
    }
    if input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        return DiagnosticFormat::Json;
    }
    match std::fs::read_to_string(input) {
        Ok(raw) if raw.trim_start().starts_with(['{', '[']) => DiagnosticFormat::Json,
        _ => DiagnosticFormat::Tsc,
    }
}

/// Concrete source for `format`, resolving `Auto` against `input`.
pub fn source_for(format: DiagnosticFormat, input: &Path) -> Box<dyn DiagnosticSource> {
    match format {
        DiagnosticFormat::Json => Box::new(JsonDiagnosticSource::new()),
        DiagnosticFormat::Tsc => Box::new(TscDiagnosticSource::new()),
        DiagnosticFormat::Auto => source_for(detect_format(input), input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<DiagnosticFormat>().unwrap(), DiagnosticFormat::Json);
        assert_eq!("tsc".parse::<DiagnosticFormat>().unwrap(), DiagnosticFormat::Tsc);
        assert!("xml".parse::<DiagnosticFormat>().is_err());
    }

    #[test]
    fn detection_sniffs_content() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("out.txt");
        std::fs::write(&text, "src/a.ts(1,1): error TS1005: ';' expected.\n").unwrap();
        let json = dir.path().join("out.log");
        std::fs::write(&json, "  [ ]").unwrap();

        assert_eq!(detect_format(&text), DiagnosticFormat::Tsc);
        assert_eq!(detect_format(&json), DiagnosticFormat::Json);
        assert_eq!(detect_format(dir.path()), DiagnosticFormat::Json);
    }

    #[test]
    fn malformed_input_maps_to_validation() {
        let err: MendError = SourceError::Malformed {
            path: "a.json".into(),
            reason: "bad".into(),
        }
        .into();
        assert!(matches!(
            err,
            MendError::Application(ApplicationError::ValidationFailed(_))
        ));
    }
}
