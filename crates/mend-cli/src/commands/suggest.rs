//! `mend suggest`: ranked fixes per diagnostic.

use serde::Serialize;
use tracing::instrument;

use mend_core::prelude::*;

use crate::{
    cli::SuggestArgs,
    commands::{build_engine, load_diagnostics, percent},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// One diagnostic with its ranked fixes, as emitted in JSON mode.
#[derive(Debug, Serialize)]
struct Suggestions<'a> {
    diagnostic: &'a Diagnostic,
    fixes: Vec<Fix>,
}

#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn execute(args: SuggestArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = build_engine(&config)?;
    let diagnostics = load_diagnostics(&engine, &args.input.input, args.input.format.into())?;
    let limit = args.limit.unwrap_or(usize::MAX);

    let mut all = Vec::with_capacity(diagnostics.len());
    for diagnostic in &diagnostics {
        let mut fixes = engine.suggest_fixes(diagnostic)?;
        fixes.truncate(limit);
        all.push(Suggestions { diagnostic, fixes });
    }

    if output.is_json() {
        output.json(&all)?;
        return Ok(());
    }

    for entry in &all {
        output.header(&entry.diagnostic.to_string())?;
        for (rank, fix) in entry.fixes.iter().enumerate() {
            output.print(&format!(
                "  {}. [{}] {}",
                rank + 1,
                fix.id,
                fix.description
            ))?;
            output.detail(&format!(
                "{} · confidence {} · {} change(s){}",
                fix.fix_type,
                percent(fix.confidence),
                fix.changes.len(),
                if fix.validation.test_required {
                    " · run tests afterwards"
                } else {
                    ""
                }
            ))?;
        }
    }
    Ok(())
}
