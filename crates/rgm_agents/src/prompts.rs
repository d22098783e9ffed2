//! Prompt rendering for the generating agents.

use std::path::Path;

use rgm_core::{FileBatch, PromptOverrides, RepositorySnapshot};

use crate::message::RefactorRequest;

pub const ANALYST_SYSTEM_PROMPT: &str = "\
You analyze failing test runs. The repository content comes first, followed by \
the test output. Identify the most likely root cause in one short paragraph, \
quote the failing test, and list the concrete changes the source code needs so \
that the test passes. Never propose changes to test files. Do not write the \
implementation yourself.";

pub const CODER_SYSTEM_PROMPT: &str = "\
You implement source code that makes failing tests pass. You receive the \
repository content and an analysis of the failure. Make the smallest change \
that satisfies every failing test while keeping the code readable and robust. \
Place all code under `src/` and return the complete content of every file you \
create or modify. Never create or modify test files.";

pub const REFACTOR_SYSTEM_PROMPT: &str = "\
You refactor source code for readability and maintainability. Add type \
annotations and documentation where they are missing. Behavior must stay \
exactly the same: do not add, remove or change functionality. Place all code \
under `src/` and return the complete content of every file you change. Never \
create or modify test files.";

/// System prompts for the three generating agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub analyst: String,
    pub coder: String,
    pub refactor: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            analyst: ANALYST_SYSTEM_PROMPT.to_string(),
            coder: CODER_SYSTEM_PROMPT.to_string(),
            refactor: REFACTOR_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Prompts {
    /// Defaults with any configured replacements applied.
    pub fn from_overrides(overrides: &PromptOverrides) -> Self {
        let defaults = Self::default();
        Self {
            analyst: overrides.analyst.clone().unwrap_or(defaults.analyst),
            coder: overrides.coder.clone().unwrap_or(defaults.coder),
            refactor: overrides.refactor.clone().unwrap_or(defaults.refactor),
        }
    }
}

/// Markdown fence language for a file path.
pub fn fence_language(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py" | "pyi") => "python",
        Some("rs") => "rust",
        Some("js" | "mjs" | "cjs") => "javascript",
        Some("ts") => "typescript",
        Some("go") => "go",
        Some("java") => "java",
        Some("rb") => "ruby",
        Some("toml") => "toml",
        _ => "",
    }
}

/// Render every snapshot file as a path heading plus fenced content.
pub fn render_repository(snapshot: &RepositorySnapshot) -> String {
    snapshot
        .files()
        .iter()
        .map(|file| {
            format!(
                "# {}\n```{}\n{}```",
                file.path.display(),
                fence_language(&file.path),
                file.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analyst_prompt(snapshot: &RepositorySnapshot, test_output: &str) -> String {
    format!(
        "{}\nTest results:\n{}",
        render_repository(snapshot),
        test_output
    )
}

pub fn coder_prompt(snapshot: &RepositorySnapshot, guidance: &str) -> String {
    format!(
        "This is the current state of the repository:\n{}\n{}",
        render_repository(snapshot),
        guidance
    )
}

pub fn refactor_prompt(snapshot: &RepositorySnapshot, request: &RefactorRequest) -> String {
    let mut prompt = format!(
        "This is the current state of the repository:\n{}\n",
        render_repository(snapshot)
    );
    match (&request.test_output, request.after_failure) {
        (Some(output), true) => {
            prompt.push_str("The previous refactoring broke the tests. Test results:\n");
            prompt.push_str(output);
        }
        _ => prompt.push_str("All tests pass. Refactor the source code."),
    }
    prompt
}

/// Display text for a test run.
pub fn test_results_display(output: &str) -> String {
    format!("Test results:\n```{}```\n", output)
}

/// Display text for a generated batch.
pub fn files_display(batch: &FileBatch) -> String {
    batch
        .iter()
        .map(|(path, content)| {
            format!(
                "# {}\n```{}\n{}\n```\n",
                path,
                fence_language(Path::new(path)),
                content
            )
        })
        .collect()
}
