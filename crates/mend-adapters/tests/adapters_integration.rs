//! The engine wired to real adapters.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mend_adapters::{
    DiagnosticFormat, JsonFileKnowledgeStore, LocalSourceEditor, RulePackLoader, source_for,
};
use mend_core::prelude::*;

const APP: &str = "export function App() {\n  const [n, setN] = useState(0);\n  return n;\n}\n";

fn engine(kb: &Path) -> RecoveryEngine {
    RecoveryEngine::new(
        Arc::new(JsonFileKnowledgeStore::open(kb).unwrap()),
        RuleBook::builtin().unwrap(),
        EngineSettings::default(),
    )
    .with_editor(Arc::new(LocalSourceEditor::new()))
}

#[test]
fn compiler_output_to_applied_fix_to_persisted_knowledge() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("App.tsx");
    fs::write(&source, APP).unwrap();
    let output = dir.path().join("tsc.txt");
    fs::write(
        &output,
        format!(
            "{}(2,21): error TS2304: Cannot find name 'useState'.\nFound 1 error.\n",
            source.display()
        ),
    )
    .unwrap();
    let kb = dir.path().join("kb.json");

    let first = engine(&kb);
    let input = source_for(DiagnosticFormat::Auto, &output);
    let diagnostics = first.ingest(&*input, &output).unwrap();
    assert_eq!(diagnostics.len(), 1);

    let fix = first.suggest_fixes(&diagnostics[0]).unwrap().remove(0);
    assert_eq!(fix.fix_type, FixType::Automatic);
    let outcome = first.apply_fix(&diagnostics[0], &fix).unwrap();
    assert!(outcome.success, "{:?}", outcome.error);
    assert!(
        fs::read_to_string(&source)
            .unwrap()
            .starts_with("import { useState } from 'react';\n")
    );
    first.record_outcome(&diagnostics[0], &fix, &outcome).unwrap();
    drop(first);

    // A fresh process sees the same knowledge.
    let reopened = engine(&kb);
    let entries = reopened.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].signature.to_string(), "TS2304:IMPORT_ERROR");
    assert_eq!(entries[0].observed_resolutions, 1);
    assert_eq!(entries[0].success_count, 1);
}

#[test]
fn knowledge_round_trips_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let kb = dir.path().join("kb.json");
    let diagnostic = Diagnostic::new(
        "src/a.ts",
        1,
        1,
        2322,
        "Type 'string' is not assignable to type 'number'.",
    );

    let first = engine(&kb);
    first
        .learn_from_resolution(
            &diagnostic,
            &Resolution::new(2322, "Parse the string with Number()", true)
                .with_time(4)
                .with_feedback(UserFeedback::Helpful),
        )
        .unwrap();
    first
        .learn_from_resolution(
            &diagnostic,
            &Resolution::new(2322, "Widen the declared type", false).with_time(9),
        )
        .unwrap();
    let written = first.entries().unwrap();
    drop(first);

    let second = engine(&kb);
    assert_eq!(second.entries().unwrap(), written);
    let stats = second.statistics().unwrap();
    assert_eq!(stats.observed_resolutions, 2);
    assert_eq!(stats.successes, 1);
}

#[test]
fn engines_sharing_a_knowledge_file_keep_every_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let kb = dir.path().join("kb.json");
    let diagnostic = Diagnostic::new("src/a.ts", 1, 1, 2304, "Cannot find name 'x'.");

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let engine = engine(&kb);
            let diagnostic = diagnostic.clone();
            std::thread::spawn(move || {
                for _ in 0..5 {
                    engine
                        .learn_from_resolution(
                            &diagnostic,
                            &Resolution::new(2304, "Import x", true),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let stats = engine(&kb).statistics().unwrap();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.observed_resolutions, 10);
    assert_eq!(stats.successes, 10);
}

#[test]
fn rule_packs_extend_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("team.toml"),
        r#"
[[rule]]
id = "use-team-logger"
codes = [2304]
message_pattern = "Cannot find name 'log'"
description = "Import the team logger"
fix_type = "automatic"
confidence = 0.95
edit = { kind = "insert-at-start", text = "import { log } from '@team/logger';\n" }
pre_conditions = ["import not already present"]
post_conditions = ["import statement present"]
rollback_possible = true
"#,
    )
    .unwrap();

    let mut rules = RuleBook::builtin().unwrap();
    RulePackLoader::new([dir.path()]).extend(&mut rules).unwrap();
    let engine = RecoveryEngine::new(
        Arc::new(mend_adapters::InMemoryKnowledgeStore::new()),
        rules,
        EngineSettings::default(),
    );

    let diagnostic = Diagnostic::new("src/a.ts", 1, 1, 2304, "Cannot find name 'log'.");
    let top = engine.suggest_fixes(&diagnostic).unwrap().remove(0);
    assert_eq!(top.id, "2304-use-team-logger");
}

#[test]
fn invalid_rule_pack_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pack = dir.path().join("broken.toml");
    fs::write(
        &pack,
        r#"
[[rule]]
id = "broken"
message_pattern = "([unclosed"
description = "Never loads"
fix_type = "manual"
confidence = 0.5
post_conditions = ["diagnostic no longer reported"]
"#,
    )
    .unwrap();

    let mut rules = RuleBook::builtin().unwrap();
    let before = rules.len();
    let err = RulePackLoader::new([&pack]).extend(&mut rules).unwrap_err();
    assert!(matches!(err, MendError::Configuration { .. }));
    assert_eq!(rules.len(), before);
}
