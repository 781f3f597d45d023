//! Mend Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers of the Mend error
//! recovery engine: it turns compiler diagnostics into root-cause analyses,
//! ranked fix suggestions, safely applied automatic fixes, and a knowledge
//! base that adapts future suggestions to observed outcomes.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            mend-cli (CLI)               │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     RecoveryEngine + Services           │
//! │ (Analysis, Suggestion, Learning, Apply) │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (KnowledgeStore, SourceEditor, Source)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      mend-adapters (Infrastructure)     │
//! │  (JSON store, local editor, tsc parser) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Taxonomy, Catalog, Rules, Fix states)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mend_core::prelude::*;
//!
//! # fn run(store: Arc<dyn KnowledgeStore>) -> MendResult<()> {
//! let engine = RecoveryEngine::new(store, RuleBook::builtin()?, EngineSettings::default());
//!
//! let diagnostic = Diagnostic::new("src/App.tsx", 3, 10, 2304, "Cannot find name 'useState'.");
//! let suggestion = engine.comprehensive_suggestions(&diagnostic)?;
//! println!("{}", suggestion.fixes[0].description);
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        EngineSettings, FixOutcome, KnowledgeStatistics, RecoveryEngine,
        ports::{DiagnosticSource, KnowledgeStore, SourceEditor},
    };
    pub use crate::domain::{
        BlendPolicy, ComprehensiveErrorSuggestion, Diagnostic, ErrorAnalysis, ErrorCategory, Fix,
        FixState, FixType, KnowledgeBaseEntry, PatternRule, Resolution, RuleBook, Severity,
        Signature, TextBuffer, UserFeedback,
    };
    pub use crate::error::{MendError, MendResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
