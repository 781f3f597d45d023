//! Command handlers.
//!
//! Every handler receives already-parsed arguments, the loaded
//! configuration, and an [`OutputManager`]; the engine is built here so
//! handlers stay free of adapter wiring.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use mend_adapters::{
    DiagnosticFormat, JsonFileKnowledgeStore, LocalSourceEditor, RulePackLoader, source_for,
};
use mend_core::prelude::*;

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod analyze;
pub mod apply;
pub mod completions;
pub mod config;
pub mod init;
pub mod kb;
pub mod learn;
pub mod suggest;

/// Wire the engine over the configured knowledge base, rule packs, and the
/// local filesystem.
#[instrument(skip_all)]
pub fn build_engine(config: &AppConfig) -> CliResult<RecoveryEngine> {
    let knowledge = config.knowledge_path();
    let store = JsonFileKnowledgeStore::open(&knowledge)?;

    let mut rules = RuleBook::builtin().map_err(MendError::from)?;
    let loaded = RulePackLoader::new(config.rules.paths.iter().cloned()).extend(&mut rules)?;

    debug!(
        knowledge = %knowledge.display(),
        rules = rules.len(),
        from_packs = loaded,
        "Engine ready"
    );

    Ok(
        RecoveryEngine::new(Arc::new(store), rules, config.engine_settings())
            .with_editor(Arc::new(LocalSourceEditor::new())),
    )
}

/// Read and validate every diagnostic in `input`.
///
/// An input that parses to nothing is an error: every command needs at
/// least one diagnostic to work on.
#[instrument(skip(engine))]
pub fn load_diagnostics(
    engine: &RecoveryEngine,
    input: &Path,
    format: DiagnosticFormat,
) -> CliResult<Vec<Diagnostic>> {
    if !input.exists() {
        return Err(CliError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let source = source_for(format, input);
    let diagnostics = engine.ingest(&*source, input)?;
    if diagnostics.is_empty() {
        return Err(CliError::NoDiagnostics {
            path: input.to_path_buf(),
        });
    }
    Ok(diagnostics)
}

/// `0.83` → `83%`.
pub(crate) fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0.834), "83%");
        assert_eq!(percent(1.0), "100%");
    }

    #[test]
    fn missing_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.knowledge.path = Some(dir.path().join("kb.json"));
        let engine = build_engine(&config).unwrap();

        let result = load_diagnostics(&engine, &dir.path().join("nope.txt"), DiagnosticFormat::Auto);
        assert!(matches!(result, Err(CliError::InputNotFound { .. })));
    }

    #[test]
    fn empty_input_has_no_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tsc.txt");
        std::fs::write(&input, "Found 0 errors.\n").unwrap();
        let mut config = AppConfig::default();
        config.knowledge.path = Some(dir.path().join("kb.json"));
        let engine = build_engine(&config).unwrap();

        let result = load_diagnostics(&engine, &input, DiagnosticFormat::Tsc);
        assert!(matches!(result, Err(CliError::NoDiagnostics { .. })));
    }
}
