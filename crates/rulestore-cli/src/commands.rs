//! Command implementations for the `rulestore` binary.
//!
//! Handlers return the process exit code on success so `main` stays a
//! thin dispatcher. Structured output goes to stdout; warnings and the
//! machine-parsable error line go to stderr.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rulestore_engine::validate::validate_store;
use rulestore_engine::{
    Engine, Loader, ResolutionQuery, ResolvedRuleSet, ResolveMode, ValidationReport,
};

use crate::error::{Error, Result};

// ============================================================================
// Argument types
// ============================================================================

/// Output format for `resolve`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Merged sections as markdown-shaped text.
    #[default]
    Text,
    /// The full resolved rule set, provenance included, as JSON.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Arguments for `rulestore resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Source language id (e.g. `go`)
    #[arg(long = "lang")]
    pub lang: String,

    /// Framework id (e.g. `gin`)
    #[arg(long)]
    pub framework: Option<String>,

    /// Structure variant id; requires --framework
    #[arg(long)]
    pub structure: Option<String>,

    /// Process id (e.g. `code-review`)
    #[arg(long)]
    pub process: Option<String>,

    /// File path for glob-scoped documents
    #[arg(long)]
    pub file: Option<String>,

    /// Document root(s); repeatable. Defaults to $RULESTORE_ROOT
    /// (colon-delimited)
    #[arg(long = "root", env = "RULESTORE_ROOT", value_delimiter = ':')]
    pub roots: Vec<PathBuf>,

    /// Treat ambiguous precedence as a hard error (exit 2)
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `rulestore validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document root(s); repeatable. Defaults to $RULESTORE_ROOT
    /// (colon-delimited)
    #[arg(long = "root", env = "RULESTORE_ROOT", value_delimiter = ':')]
    pub roots: Vec<PathBuf>,
}

fn require_roots(roots: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        return Err(Error::Usage(
            "no document roots given; pass --root or set RULESTORE_ROOT".to_string(),
        ));
    }
    Ok(roots)
}

// ============================================================================
// resolve
// ============================================================================

/// Runs `rulestore resolve`; returns the process exit code.
pub async fn run_resolve(args: ResolveArgs) -> Result<i32> {
    let roots = require_roots(args.roots)?;
    let loader = Loader::new(roots);
    let (index, stats) = loader.load().await?;
    log::debug!(
        "store loaded: {} document(s), {} dangling extends",
        stats.documents_parsed,
        stats.dangling_extends.len()
    );

    let mut query = ResolutionQuery::new(&args.lang);
    if let Some(framework) = &args.framework {
        query = query.with_framework(framework);
    }
    if let Some(structure) = &args.structure {
        query = query.with_structure(structure);
    }
    if let Some(process) = &args.process {
        query = query.with_process(process);
    }
    if let Some(file) = &args.file {
        query = query.with_file_path(file);
    }

    let mode = if args.strict {
        ResolveMode::Strict
    } else {
        ResolveMode::Lenient
    };

    let engine = Engine::new(index);
    let result = engine.resolve(&query, mode)?;

    for warning in &result.warnings {
        eprintln!("warning: {}: {}", warning.code, warning.message);
    }
    for conflict in &result.conflicts {
        eprintln!("warning: ambiguous_precedence: {}", conflict.describe());
    }

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&result)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| rulestore_core::Error::parse(e.to_string()))?;
            println!("{json}");
        }
    }

    Ok(0)
}

/// Renders merged sections in resolution order as markdown-shaped text.
fn render_text(result: &ResolvedRuleSet) -> String {
    let mut out = String::new();
    for section in &result.sections {
        out.push_str(&format!("## {}\n\n", section.name));
        let content = section.content();
        if !content.is_empty() {
            out.push_str(&content);
            out.push_str("\n\n");
        }
    }
    out
}

// ============================================================================
// validate
// ============================================================================

/// Runs `rulestore validate`; returns the process exit code.
pub async fn run_validate(args: ValidateArgs) -> Result<i32> {
    let roots = require_roots(args.roots)?;
    let loader = Loader::new(roots);
    let report = validate_store(&loader).await?;

    print_report(&report);
    Ok(if report.is_ok() { 0 } else { 1 })
}

fn print_report(report: &ValidationReport) {
    for problem in &report.problems {
        // Problem messages already carry their paths where one applies
        println!("{}: {}", problem.code, problem.message);
    }
    for conflict in &report.conflicts {
        println!("warning: ambiguous_precedence: {}", conflict.describe());
    }
    println!(
        "{} document(s), {} problem(s), {} conflict(s)",
        report.documents,
        report.problems.len(),
        report.conflicts.len()
    );
}

// ============================================================================
// Tests
// ============================================================================
