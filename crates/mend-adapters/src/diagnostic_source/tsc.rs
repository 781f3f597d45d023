//! TypeScript compiler text output.
//!
//! Understands both `tsc --pretty false` lines:
//!
//! ```text
//! src/App.tsx(3,10): error TS2304: Cannot find name 'useState'.
//! ```
//!
//! and the headline of pretty output, once colours are stripped:
//!
//! ```text
//! src/App.tsx:3:10 - error TS2304: Cannot find name 'useState'.
//! ```
//!
//! Indented lines that follow a diagnostic (elaborations such as
//! `Type 'A' is missing the following properties...`) are appended to its
//! message. The category is left generic for the classifier to derive.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, instrument, trace};

use mend_core::{
    application::ports::DiagnosticSource,
    domain::{Diagnostic, Severity},
    error::MendResult,
};

use super::SourceError;

static PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): (?P<sev>error|warning|message|info) TS(?P<code>\d+): (?P<msg>.*)$",
    )
    .expect("valid regex")
});

static PRETTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+) - (?P<sev>error|warning|message|info) TS(?P<code>\d+): (?P<msg>.*)$",
    )
    .expect("valid regex")
});

static ANSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"));

/// Parses compiler text output from a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TscDiagnosticSource;

impl TscDiagnosticSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse compiler output. Lines that are neither a diagnostic nor a
    /// continuation (summaries, code frames) are skipped.
    pub fn parse_str(&self, output: &str) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut continuing = false;

        for raw in output.lines() {
            let line = ANSI.replace_all(raw, "");
            let line = line.trim_end();

            if let Some(caps) = PLAIN.captures(line).or_else(|| PRETTY.captures(line)) {
                match from_captures(&caps) {
                    Some(diagnostic) => {
                        diagnostics.push(diagnostic);
                        continuing = true;
                    }
                    None => {
                        trace!(line, "Unparseable diagnostic headline");
                        continuing = false;
                    }
                }
                continue;
            }

            let indented = line.starts_with([' ', '\t']);
            let text = line.trim();
            if continuing && indented && !text.is_empty() && !is_code_frame(text) {
                if let Some(last) = diagnostics.last_mut() {
                    last.message.push(' ');
                    last.message.push_str(text);
                }
            } else if text.is_empty() || !indented {
                continuing = false;
            }
        }
        diagnostics
    }
}

/// Pretty output prints the offending source with a gutter (`3 const x`)
/// and underline markers (`~~~`).
fn is_code_frame(text: &str) -> bool {
    text.starts_with('~')
        || text
            .split_once(' ')
            .is_some_and(|(gutter, _)| gutter.chars().all(|c| c.is_ascii_digit()))
}

fn from_captures(caps: &Captures<'_>) -> Option<Diagnostic> {
    let line = caps["line"].parse().ok()?;
    let column = caps["col"].parse().ok()?;
    let code = caps["code"].parse().ok()?;
    let severity = caps["sev"].parse().unwrap_or(Severity::Error);
    Some(
        Diagnostic::new(
            PathBuf::from(&caps["file"]),
            line,
            column,
            code,
            caps["msg"].trim(),
        )
        .with_severity(severity),
    )
}

impl DiagnosticSource for TscDiagnosticSource {
    #[instrument(skip(self), fields(input = %input.display()))]
    fn diagnostics(&self, input: &Path) -> MendResult<Vec<Diagnostic>> {
        let output = fs::read_to_string(input).map_err(|source| SourceError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        let diagnostics = self.parse_str(&output);
        debug!(count = diagnostics.len(), "Parsed compiler output");
        Ok(diagnostics)
    }
}
