//! Static knowledge about TypeScript diagnostics.
//!
//! Each category is described exactly once by a [`CategoryDef`] in
//! [`CATEGORY_REGISTRY`]; each known code by a [`CodeDef`] in
//! [`CODE_REGISTRY`]. Classification, analysis, and composition are table
//! lookups over these registries. Built-in fix rules live in
//! [`builtin_rules`] and are owned values so rule packs can extend them.
//!
//! # Adding a code
//!
//! 1. Add a [`CodeDef`] to [`CODE_REGISTRY`]
//! 2. Optionally add a [`PatternRule`] to [`builtin_rules`]

use crate::domain::{
    rules::{EditKind, PatternRule},
    value_objects::{ErrorCategory, FixComplexity, FixType, ImpactLevel, ResourceKind},
};

// ── Categories ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub title: &'static str,
    pub url: &'static str,
    pub kind: ResourceKind,
    pub relevance: f64,
}

/// Everything the analyzer and composer know about one category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryDef {
    pub category: ErrorCategory,
    /// Root-cause sentence used when the code has no specialisation.
    pub root_cause: &'static str,
    pub impact: ImpactLevel,
    pub complexity: FixComplexity,
    /// Estimated minutes when the knowledge base has no history.
    pub default_fix_minutes: u32,
    pub prerequisites: &'static [&'static str],
    pub prevention_tips: &'static [&'static str],
    /// Categories whose findings tend to appear next to this one.
    pub co_occurs_with: &'static [ErrorCategory],
    pub resources: &'static [ResourceDef],
}

const HANDBOOK: &str = "https://www.typescriptlang.org/docs/handbook/2/everyday-types.html";

pub static CATEGORY_REGISTRY: &[CategoryDef] = &[
    CategoryDef {
        category: ErrorCategory::SyntaxError,
        root_cause: "The source text does not parse as valid TypeScript",
        impact: ImpactLevel::Critical,
        complexity: FixComplexity::Simple,
        default_fix_minutes: 2,
        prerequisites: &["Locate the exact token the parser stopped at"],
        prevention_tips: &[
            "Enable format-on-save so unbalanced brackets show up immediately",
            "Keep statements short enough that a missing delimiter is easy to spot",
        ],
        co_occurs_with: &[],
        resources: &[ResourceDef {
            title: "TypeScript Handbook: The Basics",
            url: "https://www.typescriptlang.org/docs/handbook/2/basic-types.html",
            kind: ResourceKind::Documentation,
            relevance: 0.7,
        }],
    },
    CategoryDef {
        category: ErrorCategory::TypeError,
        root_cause: "A value is used with a type that does not match what the code declares",
        impact: ImpactLevel::High,
        complexity: FixComplexity::Moderate,
        default_fix_minutes: 5,
        prerequisites: &[
            "Understand the declared type of the target",
            "Inspect the inferred type of the value",
        ],
        prevention_tips: &[
            "Annotate function boundaries so mismatches surface where they start",
            "Prefer narrowing with type guards over type assertions",
        ],
        co_occurs_with: &[
            ErrorCategory::ImportError,
            ErrorCategory::DeclarationError,
            ErrorCategory::StrictModeError,
            ErrorCategory::DeprecatedApi,
        ],
        resources: &[
            ResourceDef {
                title: "TypeScript Handbook: Everyday Types",
                url: HANDBOOK,
                kind: ResourceKind::Documentation,
                relevance: 0.8,
            },
            ResourceDef {
                title: "TypeScript Handbook: Narrowing",
                url: "https://www.typescriptlang.org/docs/handbook/2/narrowing.html",
                kind: ResourceKind::Tutorial,
                relevance: 0.6,
            },
        ],
    },
    CategoryDef {
        category: ErrorCategory::ImportError,
        root_cause: "A name or module is referenced without being imported or installed",
        impact: ImpactLevel::High,
        complexity: FixComplexity::Simple,
        default_fix_minutes: 3,
        prerequisites: &["Know which module exports the missing name"],
        prevention_tips: &[
            "Let the editor add imports automatically when completing a symbol",
            "Keep path aliases in tsconfig.json in sync with the bundler",
        ],
        co_occurs_with: &[ErrorCategory::TypeError, ErrorCategory::ConfigurationError],
        resources: &[ResourceDef {
            title: "TypeScript Handbook: Modules",
            url: "https://www.typescriptlang.org/docs/handbook/2/modules.html",
            kind: ResourceKind::Documentation,
            relevance: 0.8,
        }],
    },
    CategoryDef {
        category: ErrorCategory::ConfigurationError,
        root_cause: "The compiler configuration is invalid or inconsistent",
        impact: ImpactLevel::Critical,
        complexity: FixComplexity::Complex,
        default_fix_minutes: 15,
        prerequisites: &[
            "Open the tsconfig.json that the build actually uses",
            "Check which options are inherited through `extends`",
        ],
        prevention_tips: &[
            "Validate tsconfig.json against its JSON schema in the editor",
            "Keep one base tsconfig and extend it instead of copying options",
        ],
        co_occurs_with: &[ErrorCategory::ImportError],
        resources: &[ResourceDef {
            title: "TSConfig Reference",
            url: "https://www.typescriptlang.org/tsconfig",
            kind: ResourceKind::Reference,
            relevance: 0.85,
        }],
    },
    CategoryDef {
        category: ErrorCategory::DeclarationError,
        root_cause: "An identifier is declared more than once or used before its declaration",
        impact: ImpactLevel::High,
        complexity: FixComplexity::Moderate,
        default_fix_minutes: 4,
        prerequisites: &["Find every declaration of the identifier in scope"],
        prevention_tips: &[
            "Prefer `const` and `let` over `var` to get block scoping",
            "Give module-level helpers distinct, descriptive names",
        ],
        co_occurs_with: &[ErrorCategory::TypeError],
        resources: &[ResourceDef {
            title: "TypeScript Handbook: Variable Declarations",
            url: "https://www.typescriptlang.org/docs/handbook/variable-declarations.html",
            kind: ResourceKind::Documentation,
            relevance: 0.7,
        }],
    },
    CategoryDef {
        category: ErrorCategory::StrictModeError,
        root_cause: "Code that relies on loose typing is rejected by strict compiler checks",
        impact: ImpactLevel::Medium,
        complexity: FixComplexity::Moderate,
        default_fix_minutes: 8,
        prerequisites: &[
            "Know which strict flags are enabled for the project",
            "Decide whether the value can legitimately be absent",
        ],
        prevention_tips: &[
            "Write new code with strict mode on rather than migrating later",
            "Model optional values explicitly with union types",
        ],
        co_occurs_with: &[ErrorCategory::TypeError, ErrorCategory::UnusedCode],
        resources: &[
            ResourceDef {
                title: "TSConfig Reference: strict",
                url: "https://www.typescriptlang.org/tsconfig#strict",
                kind: ResourceKind::Reference,
                relevance: 0.8,
            },
            ResourceDef {
                title: "TypeScript Handbook: Narrowing",
                url: "https://www.typescriptlang.org/docs/handbook/2/narrowing.html",
                kind: ResourceKind::Tutorial,
                relevance: 0.65,
            },
        ],
    },
    CategoryDef {
        category: ErrorCategory::UnusedCode,
        root_cause: "A declaration is never read",
        impact: ImpactLevel::Low,
        complexity: FixComplexity::Simple,
        default_fix_minutes: 1,
        prerequisites: &["Confirm the declaration has no side effects"],
        prevention_tips: &[
            "Run the linter's unused-variable rule before committing",
            "Remove scaffolding code as soon as the feature lands",
        ],
        co_occurs_with: &[ErrorCategory::StrictModeError],
        resources: &[ResourceDef {
            title: "TSConfig Reference: noUnusedLocals",
            url: "https://www.typescriptlang.org/tsconfig#noUnusedLocals",
            kind: ResourceKind::Reference,
            relevance: 0.75,
        }],
    },
    CategoryDef {
        category: ErrorCategory::DeprecatedApi,
        root_cause: "The code calls an API that its declarations mark as deprecated",
        impact: ImpactLevel::Medium,
        complexity: FixComplexity::Moderate,
        default_fix_minutes: 6,
        prerequisites: &["Read the deprecation notice for the suggested replacement"],
        prevention_tips: &[
            "Review deprecation notes in changelogs when upgrading dependencies",
            "Track deprecated call sites in an issue instead of ignoring the warning",
        ],
        co_occurs_with: &[ErrorCategory::TypeError],
        resources: &[ResourceDef {
            title: "JSDoc Reference: @deprecated",
            url: "https://www.typescriptlang.org/docs/handbook/jsdoc-supported-types.html#deprecated",
            kind: ResourceKind::Reference,
            relevance: 0.7,
        }],
    },
    CategoryDef {
        category: ErrorCategory::GenericError,
        root_cause: "The checker reported a problem that does not match a known pattern",
        impact: ImpactLevel::Medium,
        complexity: FixComplexity::Moderate,
        default_fix_minutes: 10,
        prerequisites: &["Read the full diagnostic message and the code around it"],
        prevention_tips: &[
            "Run the type checker in watch mode to catch problems as they appear",
            "Keep changes small so new diagnostics are easy to attribute",
        ],
        co_occurs_with: &[],
        resources: &[
            ResourceDef {
                title: "TypeScript Handbook",
                url: "https://www.typescriptlang.org/docs/handbook/intro.html",
                kind: ResourceKind::Documentation,
                relevance: 0.5,
            },
            ResourceDef {
                title: "TypeScript Deep Dive",
                url: "https://basarat.gitbook.io/typescript/",
                kind: ResourceKind::Tutorial,
                relevance: 0.4,
            },
        ],
    },
];

/// The definition for `category`. Every category has one; the generic entry
/// is returned if the registry were ever incomplete.
pub fn category_def(category: ErrorCategory) -> &'static CategoryDef {
    CATEGORY_REGISTRY
        .iter()
        .find(|def| def.category == category)
        .unwrap_or(&GENERIC_FALLBACK)
}

static GENERIC_FALLBACK: CategoryDef = CategoryDef {
    category: ErrorCategory::GenericError,
    root_cause: "The checker reported a problem that does not match a known pattern",
    impact: ImpactLevel::Medium,
    complexity: FixComplexity::Moderate,
    default_fix_minutes: 10,
    prerequisites: &["Read the full diagnostic message and the code around it"],
    prevention_tips: &["Run the type checker in watch mode to catch problems as they appear"],
    co_occurs_with: &[],
    resources: &[],
};

/// Whether findings of `a` and `b` are likely to share a cause.
pub fn co_occurs(a: ErrorCategory, b: ErrorCategory) -> bool {
    a == b
        || category_def(a).co_occurs_with.contains(&b)
        || category_def(b).co_occurs_with.contains(&a)
}

// ── Codes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct CodeDef {
    pub code: u32,
    pub category: ErrorCategory,
    /// Overrides the category's root-cause sentence.
    pub root_cause: Option<&'static str>,
}

const fn code(code: u32, category: ErrorCategory) -> CodeDef {
    CodeDef {
        code,
        category,
        root_cause: None,
    }
}

const fn code_with(code: u32, category: ErrorCategory, root_cause: &'static str) -> CodeDef {
    CodeDef {
        code,
        category,
        root_cause: Some(root_cause),
    }
}

pub static CODE_REGISTRY: &[CodeDef] = &[
    code_with(1005, ErrorCategory::SyntaxError, "A required token is missing"),
    code(1109, ErrorCategory::SyntaxError),
    code(1128, ErrorCategory::SyntaxError),
    code(1161, ErrorCategory::SyntaxError),
    code_with(
        2304,
        ErrorCategory::ImportError,
        "An identifier is used without being imported or declared",
    ),
    code_with(
        2305,
        ErrorCategory::ImportError,
        "The imported module does not export the requested member",
    ),
    code_with(
        2307,
        ErrorCategory::ImportError,
        "The module cannot be resolved from the import path",
    ),
    code(2552, ErrorCategory::ImportError),
    code(2724, ErrorCategory::ImportError),
    code(7016, ErrorCategory::ImportError),
    code_with(
        2322,
        ErrorCategory::TypeError,
        "A value is assigned to a target whose declared type does not accept it",
    ),
    code_with(
        2339,
        ErrorCategory::TypeError,
        "A property is accessed that the type does not declare",
    ),
    code_with(
        2345,
        ErrorCategory::TypeError,
        "An argument does not match the parameter type of the called function",
    ),
    code_with(
        2554,
        ErrorCategory::TypeError,
        "A function is called with the wrong number of arguments",
    ),
    code_with(
        2531,
        ErrorCategory::StrictModeError,
        "A value that may be null is used without a null check",
    ),
    code_with(
        2532,
        ErrorCategory::StrictModeError,
        "A value that may be undefined is used without a check",
    ),
    code(2533, ErrorCategory::StrictModeError),
    code(18047, ErrorCategory::StrictModeError),
    code(18048, ErrorCategory::StrictModeError),
    code_with(
        7006,
        ErrorCategory::StrictModeError,
        "A parameter has no type annotation and implicitly has type `any`",
    ),
    code(7031, ErrorCategory::StrictModeError),
    code(2300, ErrorCategory::DeclarationError),
    code(2451, ErrorCategory::DeclarationError),
    code_with(
        2448,
        ErrorCategory::DeclarationError,
        "A block-scoped variable is used before its declaration",
    ),
    code(6133, ErrorCategory::UnusedCode),
    code(6192, ErrorCategory::UnusedCode),
    code(6196, ErrorCategory::UnusedCode),
    code(6198, ErrorCategory::UnusedCode),
    code(6385, ErrorCategory::DeprecatedApi),
    code(6387, ErrorCategory::DeprecatedApi),
    code(5023, ErrorCategory::ConfigurationError),
    code(5024, ErrorCategory::ConfigurationError),
    code(5083, ErrorCategory::ConfigurationError),
    code_with(
        18003,
        ErrorCategory::ConfigurationError,
        "The configuration's include/files patterns match no input files",
    ),
];

pub fn code_def(code: u32) -> Option<&'static CodeDef> {
    CODE_REGISTRY.iter().find(|def| def.code == code)
}

/// Per-code reference page.
pub fn code_reference_url(code: u32) -> String {
    format!("https://typescript.tv/errors/#ts{code}")
}

// ── Well-known exports ───────────────────────────────────────────────────────

/// Names whose source module is unambiguous enough to import automatically.
pub static WELL_KNOWN_EXPORTS: &[(&str, &str)] = &[
    ("useState", "react"),
    ("useEffect", "react"),
    ("useMemo", "react"),
    ("useCallback", "react"),
    ("useRef", "react"),
    ("useContext", "react"),
    ("useReducer", "react"),
    ("createContext", "react"),
    ("Fragment", "react"),
    ("useRouter", "next/router"),
    ("readFile", "node:fs/promises"),
    ("writeFile", "node:fs/promises"),
    ("readFileSync", "node:fs"),
    ("existsSync", "node:fs"),
    ("EventEmitter", "node:events"),
    ("promisify", "node:util"),
    ("fileURLToPath", "node:url"),
    ("ref", "vue"),
    ("computed", "vue"),
    ("Injectable", "@angular/core"),
    ("Component", "@angular/core"),
    ("Observable", "rxjs"),
    ("z", "zod"),
];

pub fn module_for(symbol: &str) -> Option<&'static str> {
    WELL_KNOWN_EXPORTS
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|(_, module)| *module)
}

// ── Built-in rules ───────────────────────────────────────────────────────────

/// Post-condition of fixes a human applies.
pub const RECHECK: &str = "diagnostic no longer reported";

fn guidance(
    id: &str,
    codes: &[u32],
    description: &str,
    fix_type: FixType,
    confidence: f64,
) -> PatternRule {
    PatternRule {
        id: id.to_string(),
        codes: codes.to_vec(),
        category: None,
        message_pattern: None,
        description: description.to_string(),
        fix_type,
        confidence,
        edit: EditKind::None,
        pre_conditions: Vec::new(),
        post_conditions: vec![RECHECK.to_string()],
        side_effects: Vec::new(),
        rollback_possible: false,
    }
}

fn with_pattern(mut rule: PatternRule, pattern: &str) -> PatternRule {
    rule.message_pattern = Some(pattern.to_string());
    rule
}

fn edit(
    mut rule: PatternRule,
    kind: EditKind,
    pre: &[&str],
    post: &[&str],
    side_effects: &[&str],
) -> PatternRule {
    rule.edit = kind;
    rule.pre_conditions = pre.iter().map(|s| s.to_string()).collect();
    rule.post_conditions = post.iter().map(|s| s.to_string()).collect();
    rule.side_effects = side_effects.iter().map(|s| s.to_string()).collect();
    rule.rollback_possible = true;
    rule
}

const UNUSED_CODES: &[u32] = &[6133, 6192, 6196, 6198];
const NULLISH_CODES: &[u32] = &[2531, 2532, 2533, 18047, 18048];

/// The built-in rule catalog, in priority order.
pub fn builtin_rules() -> Vec<PatternRule> {
    vec![
        // Import
        edit(
            with_pattern(
                guidance(
                    "add-missing-import",
                    &[2304],
                    "Add an import for '${1}'",
                    FixType::Automatic,
                    0.8,
                ),
                "Cannot find name '([^']+)'",
            ),
            EditKind::InsertImport,
            &["edits within file bounds", "import not already present"],
            &["import statement present"],
            &["adds a module dependency to the file"],
        ),
        guidance(
            "import-or-declare",
            &[2304],
            "Import the missing identifier from its module or declare it locally",
            FixType::SemiAutomatic,
            0.7,
        ),
        with_pattern(
            guidance(
                "use-suggested-name",
                &[2304, 2552, 2724],
                "Replace the identifier with the suggested '${1}'",
                FixType::SemiAutomatic,
                0.6,
            ),
            "Did you mean '([^']+)'",
        ),
        with_pattern(
            guidance(
                "correct-module-path",
                &[2307],
                "Check that '${1}' is installed and that the import path is correct",
                FixType::SemiAutomatic,
                0.75,
            ),
            "Cannot find module '([^']+)'",
        ),
        guidance(
            "install-type-declarations",
            &[2307, 7016],
            "Install the package's type declarations (e.g. @types/<package>) or add a module declaration",
            FixType::Manual,
            0.5,
        ),
        guidance(
            "import-exported-member",
            &[2305],
            "Import a member the module actually exports",
            FixType::SemiAutomatic,
            0.7,
        ),
        // Type
        with_pattern(
            guidance(
                "convert-value",
                &[2322],
                "Convert the '${1}' value to '${2}'",
                FixType::SemiAutomatic,
                0.75,
            ),
            "Type '([^']+)' is not assignable to type '([^']+)'",
        ),
        guidance(
            "align-declared-type",
            &[2322],
            "Change the value or widen the declared type so they agree",
            FixType::SemiAutomatic,
            0.7,
        ),
        with_pattern(
            guidance(
                "declare-property",
                &[2339],
                "Declare '${1}' on '${2}' or check the property name for typos",
                FixType::SemiAutomatic,
                0.65,
            ),
            "Property '([^']+)' does not exist on type '([^']+)'",
        ),
        guidance(
            "pass-matching-argument",
            &[2345],
            "Pass an argument that matches the parameter type",
            FixType::SemiAutomatic,
            0.75,
        ),
        guidance(
            "assert-argument-type",
            &[2345],
            "Add a type assertion if the argument is known to be compatible",
            FixType::SemiAutomatic,
            0.5,
        ),
        guidance(
            "adjust-argument-count",
            &[2554],
            "Adjust the call to pass the number of arguments the function expects",
            FixType::SemiAutomatic,
            0.8,
        ),
        // Strict mode
        guidance(
            "add-null-check",
            NULLISH_CODES,
            "Guard the value with a null check before using it",
            FixType::SemiAutomatic,
            0.9,
        ),
        edit(
            guidance(
                "non-null-assertion",
                NULLISH_CODES,
                "Add a non-null assertion (`!`) if the value can never be absent here",
                FixType::SemiAutomatic,
                0.6,
            ),
            EditKind::InsertAfterToken("!".into()),
            &["target position exists"],
            &["inserted text present"],
            &["suppresses the null check at runtime"],
        ),
        edit(
            guidance(
                "annotate-parameter",
                &[7006, 7031],
                "Add an explicit type annotation to the parameter",
                FixType::SemiAutomatic,
                0.7,
            ),
            EditKind::InsertAfterToken(": unknown".into()),
            &["target position exists"],
            &["inserted text present"],
            &[],
        ),
        // Unused
        edit(
            guidance(
                "remove-unused-declaration",
                UNUSED_CODES,
                "Remove the unused declaration",
                FixType::Automatic,
                0.85,
            ),
            EditKind::DeleteLine,
            &["target position exists"],
            &["line count decreased"],
            &["removes the whole line containing the declaration"],
        ),
        edit(
            guidance(
                "prefix-underscore",
                &[6133],
                "Prefix the name with `_` to mark it as intentionally unused",
                FixType::SemiAutomatic,
                0.6,
            ),
            EditKind::InsertAtPosition("_".into()),
            &["target position exists"],
            &["inserted text present"],
            &[],
        ),
        // Syntax
        edit(
            with_pattern(
                guidance(
                    "insert-expected-token",
                    &[1005],
                    "Insert the missing '${1}'",
                    FixType::Automatic,
                    0.75,
                ),
                "'(.{1,3})' expected",
            ),
            EditKind::InsertAtPosition("${1}".into()),
            &["target position exists"],
            &["inserted text present"],
            &[],
        ),
        guidance(
            "review-syntax",
            &[1005, 1109, 1128, 1161],
            "Review the surrounding syntax for a missing or extra token",
            FixType::Manual,
            0.5,
        ),
        // Declarations
        guidance(
            "rename-duplicate",
            &[2300, 2451],
            "Rename or remove the duplicate declaration",
            FixType::Manual,
            0.6,
        ),
        guidance(
            "move-declaration",
            &[2448],
            "Move the declaration above its first use",
            FixType::SemiAutomatic,
            0.65,
        ),
        // Deprecated
        guidance(
            "replace-deprecated",
            &[6385, 6387],
            "Replace the deprecated API with its documented successor",
            FixType::SemiAutomatic,
            0.65,
        ),
        // Configuration
        guidance(
            "fix-compiler-options",
            &[5023, 5024, 5083, 18003],
            "Correct the compiler options in tsconfig.json",
            FixType::Manual,
            0.6,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::RuleBook;

    #[test]
    fn every_category_has_a_definition() {
        for category in ErrorCategory::ALL {
            assert_eq!(category_def(category).category, category);
        }
    }

    #[test]
    fn prevention_tips_are_substantial() {
        for def in CATEGORY_REGISTRY {
            assert!(!def.prevention_tips.is_empty());
            assert!(def.prevention_tips.iter().all(|t| t.len() > 10));
            assert!(!def.resources.is_empty());
            assert!(def.default_fix_minutes > 0);
        }
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = CODE_REGISTRY.iter().map(|d| d.code).collect();
        codes.sort_unstable();
        let before = codes.len();
        codes.dedup();
        assert_eq!(before, codes.len());
    }

    #[test]
    fn co_occurrence_is_symmetric() {
        assert!(co_occurs(ErrorCategory::ImportError, ErrorCategory::TypeError));
        assert!(co_occurs(ErrorCategory::TypeError, ErrorCategory::ImportError));
        assert!(!co_occurs(ErrorCategory::SyntaxError, ErrorCategory::UnusedCode));
    }

    #[test]
    fn builtin_rules_are_valid() {
        for rule in builtin_rules() {
            rule.validate().unwrap();
        }
        assert!(RuleBook::builtin().is_ok());
    }

    #[test]
    fn well_known_exports_resolve() {
        assert_eq!(module_for("useState"), Some("react"));
        assert_eq!(module_for("nope"), None);
    }
}
