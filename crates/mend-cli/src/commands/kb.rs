//! `mend kb`: inspect the knowledge base.

use tracing::instrument;

use mend_core::prelude::*;

use crate::{
    cli::KbCommands,
    commands::{build_engine, percent},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(cmd: KbCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = build_engine(&config)?;
    match cmd {
        KbCommands::Stats => stats(&engine, &config, &output),
        KbCommands::List => list(&engine, &output),
        KbCommands::Show { signature } => show(&engine, &signature, &output),
    }
}

fn stats(engine: &RecoveryEngine, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let stats = engine.statistics()?;
    if output.is_json() {
        output.json(&stats)?;
        return Ok(());
    }

    output.header("Knowledge base")?;
    output.print(&format!("  File:         {}", config.knowledge_path().display()))?;
    output.print(&format!("  Signatures:   {}", stats.entries))?;
    output.print(&format!("  Resolutions:  {}", stats.observed_resolutions))?;
    output.print(&format!(
        "  Successful:   {} ({})",
        stats.successes,
        percent(stats.success_rate)
    ))?;
    output.print(&format!(
        "  Avg. time:    {:.1} min",
        stats.average_time_to_resolve
    ))?;
    Ok(())
}

fn list(engine: &RecoveryEngine, output: &OutputManager) -> CliResult<()> {
    let entries = engine.entries()?;
    if output.is_json() {
        output.json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        output.info("Nothing learned yet. Record a resolution with `mend learn`.")?;
        return Ok(());
    }
    for entry in &entries {
        output.print(&format!(
            "{:<28} {:>4} seen  {:>4} ok  {:>+.2}",
            entry.signature.to_string(),
            entry.observed_resolutions,
            entry.success_count,
            entry.derived_confidence_adjustment
        ))?;
    }
    Ok(())
}

fn show(engine: &RecoveryEngine, raw: &str, output: &OutputManager) -> CliResult<()> {
    let signature: Signature = raw.parse().map_err(|e: mend_core::domain::DomainError| {
        CliError::InvalidInput {
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    })?;
    let entry = engine
        .entry(&signature)?
        .ok_or_else(|| CliError::EntryNotFound {
            signature: signature.to_string(),
        })?;

    if output.is_json() {
        output.json(&entry)?;
        return Ok(());
    }

    output.header(&entry.signature.to_string())?;
    output.print(&format!(
        "  {} observed, {} successful ({}), avg. {:.1} min",
        entry.observed_resolutions,
        entry.success_count,
        percent(entry.success_rate()),
        entry.average_time_to_resolve
    ))?;
    output.print(&format!(
        "  Confidence adjustment {:+.2}, updated {}",
        entry.derived_confidence_adjustment,
        entry.last_updated.format("%Y-%m-%d %H:%M UTC")
    ))?;
    if !entry.learned_solutions.is_empty() {
        output.print("  Learned solutions:")?;
    }
    for solution in &entry.learned_solutions {
        output.detail(&format!(
            "{} ({}/{} worked, {} helpful, {} not helpful)",
            solution.solution,
            solution.successes,
            solution.attempts,
            solution.helpful,
            solution.not_helpful
        ))?;
    }
    Ok(())
}
