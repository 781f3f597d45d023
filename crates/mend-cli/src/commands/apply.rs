//! `mend apply`: apply automatic fixes with rollback.
//!
//! At most one fix is applied per file per run: positions of the remaining
//! diagnostics refer to the text the compiler saw, which the first edit
//! invalidates. Re-run the compiler and `mend apply` to continue.

use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument, warn};

use mend_core::prelude::*;

use crate::{
    cli::ApplyArgs,
    commands::{build_engine, load_diagnostics, percent},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// A fix chosen for one diagnostic.
struct Planned<'a> {
    diagnostic: &'a Diagnostic,
    fix: Fix,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Preview<'a> {
    fix_id: &'a str,
    file: &'a std::path::Path,
    text: String,
}

#[instrument(skip_all, fields(input = %args.input.input.display(), dry_run = args.dry_run))]
pub fn execute(args: ApplyArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = build_engine(&config)?;
    let diagnostics = load_diagnostics(&engine, &args.input.input, args.input.format.into())?;

    let (plan, deferred) = plan(&engine, &diagnostics, args.fix.as_deref())?;
    if plan.is_empty() {
        output.warning("No automatic fix is available for these diagnostics")?;
        output.info("Run `mend suggest` to see the manual options")?;
        return Ok(());
    }

    if args.dry_run {
        return preview(&engine, &plan, &output);
    }

    if !args.yes && !confirm(plan.len())? {
        return Err(CliError::Cancelled);
    }

    let mut outcomes = Vec::with_capacity(plan.len());
    for Planned { diagnostic, fix } in &plan {
        let outcome = engine.apply_fix(diagnostic, fix)?;
        engine.record_outcome(diagnostic, fix, &outcome)?;
        outcomes.push(outcome);
    }
    engine.flush()?;

    let applied = outcomes.iter().filter(|o| o.success).count();
    info!(applied, attempted = outcomes.len(), "Fixes applied");

    if output.is_json() {
        output.json(&outcomes)?;
        return Ok(());
    }

    for outcome in &outcomes {
        if outcome.success {
            output.success(&format!("{} applied to {}", outcome.fix_id, outcome.file.display()))?;
            for effect in &outcome.side_effects {
                output.detail(effect)?;
            }
        } else {
            output.error(&format!(
                "{} rolled back in {}: {}",
                outcome.fix_id,
                outcome.file.display(),
                outcome.error.as_deref().unwrap_or("verification failed")
            ))?;
        }
    }
    if deferred > 0 {
        output.info(&format!(
            "{deferred} more diagnostic(s) share a file with an applied fix; recompile and re-run"
        ))?;
    }
    Ok(())
}

/// Choose one fix per file: the requested one, else the top automatic fix.
///
/// Returns the plan and the number of diagnostics deferred to a later run.
fn plan<'a>(
    engine: &RecoveryEngine,
    diagnostics: &'a [Diagnostic],
    requested: Option<&str>,
) -> CliResult<(Vec<Planned<'a>>, usize)> {
    let mut plan = Vec::new();
    let mut touched: BTreeSet<PathBuf> = BTreeSet::new();
    let mut deferred = 0;

    for diagnostic in diagnostics {
        let fixes = engine.suggest_fixes(diagnostic)?;
        let chosen = match requested {
            Some(id) => fixes.into_iter().find(|f| f.id == id),
            None => fixes.into_iter().find(Fix::is_automatic),
        };
        let Some(fix) = chosen else {
            continue;
        };

        if !touched.insert(diagnostic.file.clone()) {
            deferred += 1;
            continue;
        }
        plan.push(Planned { diagnostic, fix });
    }

    if let Some(id) = requested {
        if plan.is_empty() {
            return Err(CliError::FixNotFound {
                fix_id: id.to_string(),
            });
        }
    }
    Ok((plan, deferred))
}

fn preview(engine: &RecoveryEngine, plan: &[Planned<'_>], output: &OutputManager) -> CliResult<()> {
    let mut previews = Vec::with_capacity(plan.len());
    for Planned { diagnostic, fix } in plan {
        previews.push(Preview {
            fix_id: &fix.id,
            file: &diagnostic.file,
            text: engine.preview_fix(diagnostic, fix)?,
        });
    }

    if output.is_json() {
        output.json(&previews)?;
        return Ok(());
    }

    for (Planned { fix, .. }, preview) in plan.iter().zip(&previews) {
        output.header(&format!(
            "{} ({}) → {}",
            fix.id,
            percent(fix.confidence),
            preview.file.display()
        ))?;
        let before = std::fs::read_to_string(preview.file).unwrap_or_default();
        for line in changed_lines(&before, &preview.text) {
            output.print(&line)?;
        }
    }
    output.info("Dry run: no files were written")?;
    Ok(())
}

/// Minimal unified-style view: lines between the common prefix and suffix.
fn changed_lines(before: &str, after: &str) -> Vec<String> {
    let old: Vec<&str> = before.lines().collect();
    let new: Vec<&str> = after.lines().collect();

    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let removed = old[prefix..old.len() - suffix].iter().map(|l| format!("- {l}"));
    let added = new[prefix..new.len() - suffix].iter().map(|l| format!("+ {l}"));
    removed.chain(added).collect()
}

/// Ask before writing. Without a terminal the caller must pass `--yes`.
fn confirm(count: usize) -> CliResult<bool> {
    if !std::io::stdin().is_terminal() {
        warn!("Refusing to apply fixes without confirmation");
        return Err(CliError::InvalidInput {
            message: "confirmation required; pass --yes to apply without a terminal".into(),
            source: None,
        });
    }
    prompt(count)
}

#[cfg(feature = "interactive")]
fn prompt(count: usize) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Apply {count} fix(es)?"))
        .default(false)
        .interact()
        .map_err(|e| CliError::IoError {
            message: format!("Failed to read confirmation: {e}"),
            source: std::io::Error::other(e.to_string()),
        })
}

#[cfg(not(feature = "interactive"))]
fn prompt(_count: usize) -> CliResult<bool> {
    Err(CliError::InvalidInput {
        message: "built without interactive prompts; pass --yes".into(),
        source: None,
    })
}
