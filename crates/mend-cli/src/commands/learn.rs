//! `mend learn`: record a resolution in the knowledge base.

use tracing::instrument;

use mend_core::prelude::*;

use crate::{
    cli::LearnArgs,
    commands::{build_engine, percent},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Placeholder location for resolutions recorded by hand.
const CLI_ORIGIN: &str = "<cli>";

#[instrument(skip_all, fields(code = args.code, failed = args.failed))]
pub fn execute(args: LearnArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = build_engine(&config)?;

    let (diagnostic, resolution) = to_records(&args);
    let entry = engine.learn_from_resolution(&diagnostic, &resolution)?;
    engine.flush()?;

    if output.is_json() {
        output.json(&entry)?;
        return Ok(());
    }

    output.success(&format!("Recorded resolution for {}", entry.signature))?;
    output.detail(&format!(
        "{} observed, {} successful, confidence adjustment {:+.2}",
        entry.observed_resolutions, entry.success_count, entry.derived_confidence_adjustment
    ))?;
    output.detail(&format!("success rate {}", percent(entry.success_rate())))?;
    Ok(())
}

fn to_records(args: &LearnArgs) -> (Diagnostic, Resolution) {
    let mut diagnostic = Diagnostic::new(CLI_ORIGIN, 1, 1, args.code, args.message.clone())
        .with_severity(args.severity.into());
    if let Some(category) = args.category {
        diagnostic = diagnostic.with_category(category);
    }

    let mut resolution = Resolution::new(args.code, args.solution.clone(), !args.failed)
        .with_time(args.minutes)
        .with_pattern(args.message.clone());
    if let Some(feedback) = args.feedback {
        resolution = resolution.with_feedback(feedback.into());
    }
    (diagnostic, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn learn_args(argv: &[&str]) -> LearnArgs {
        let mut full = vec!["mend", "learn"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Learn(args) => args,
            other => panic!("expected Learn, got {other:?}"),
        }
    }

    #[test]
    fn records_carry_every_flag() {
        let args = learn_args(&[
            "--code",
            "TS2304",
            "--solution",
            "Import useState",
            "--failed",
            "--minutes",
            "4",
            "--feedback",
            "partially-helpful",
        ]);
        let (diagnostic, resolution) = to_records(&args);
        assert_eq!(diagnostic.code, 2304);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(!resolution.success);
        assert_eq!(resolution.time_to_resolve, 4);
        assert_eq!(resolution.user_feedback, Some(UserFeedback::PartiallyHelpful));
    }

    #[test]
    fn explicit_category_is_kept() {
        let args = learn_args(&[
            "--code",
            "2322",
            "--category",
            "type",
            "--solution",
            "Cast",
        ]);
        let (diagnostic, _) = to_records(&args);
        assert_eq!(diagnostic.category, ErrorCategory::TypeError);
    }
}
