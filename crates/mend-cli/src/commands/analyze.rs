//! `mend analyze`: full analysis of every diagnostic.

use tracing::instrument;

use mend_core::prelude::*;

use crate::{
    cli::AnalyzeArgs,
    commands::{build_engine, load_diagnostics, percent},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Fixes shown per diagnostic in text output.
const FIXES_SHOWN: usize = 3;

#[instrument(skip_all, fields(input = %args.input.input.display()))]
pub fn execute(args: AnalyzeArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = build_engine(&config)?;
    let diagnostics = load_diagnostics(&engine, &args.input.input, args.input.format.into())?;

    let progress = output.progress(diagnostics.len() as u64, "analysing");
    let mut reports = Vec::with_capacity(diagnostics.len());
    for diagnostic in &diagnostics {
        reports.push(engine.comprehensive_suggestions_in_batch(diagnostic, &diagnostics)?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    if output.is_json() {
        output.json(&reports)?;
        return Ok(());
    }

    for report in &reports {
        render(report, &output)?;
    }
    output.info(&format!("{} diagnostic(s) analysed", reports.len()))?;
    Ok(())
}

fn render(report: &ComprehensiveErrorSuggestion, output: &OutputManager) -> CliResult<()> {
    let analysis = &report.analysis;
    output.header(&analysis.error.to_string())?;
    output.print(&format!("  Root cause:  {}", analysis.root_cause))?;
    output.print(&format!(
        "  Impact:      {}   Complexity: {}   Estimate: ~{} min",
        analysis.impact_level, analysis.fix_complexity, analysis.estimated_fix_time
    ))?;

    if !analysis.prerequisites.is_empty() {
        output.print("  Before fixing:")?;
        for prerequisite in &analysis.prerequisites {
            output.detail(prerequisite)?;
        }
    }
    if !analysis.related_errors.is_empty() {
        let related: Vec<String> = analysis.related_errors.iter().map(|s| s.to_string()).collect();
        output.print(&format!("  Related:     {}", related.join(", ")))?;
    }

    output.print("  Fixes:")?;
    for fix in report.fixes.iter().take(FIXES_SHOWN) {
        output.detail(&format!(
            "[{}] {} ({}, {})",
            fix.id,
            fix.description,
            fix.fix_type,
            percent(fix.confidence)
        ))?;
    }

    if !report.similar_errors.is_empty() {
        let similar: Vec<String> = report.similar_errors.iter().map(|s| s.to_string()).collect();
        output.print(&format!("  Seen before: {}", similar.join(", ")))?;
    }

    output.print("  Prevention:")?;
    for tip in &report.prevention_tips {
        output.detail(tip)?;
    }

    output.print("  Learn more:")?;
    for resource in &report.learning_resources {
        output.detail(&format!("{} ({}) {}", resource.title, resource.kind, resource.url))?;
    }
    output.print("")?;
    Ok(())
}
