//! Shared value types threaded between agents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generated file contents keyed by the path the model asked to write.
///
/// Later entries for the same path replace earlier ones, so a batch never
/// contains two writes for one path.
pub type FileBatch = BTreeMap<String, String>;

/// Pipeline phase that produced a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// First test run, before any generated code was written.
    Initial,
    /// Test run after the coder's files were written.
    PostImplementation,
    /// Test run after the refactorer's files were written.
    PostRefactor,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::PostImplementation => "post-implementation",
            Stage::PostRefactor => "post-refactor",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pass/fail classification of one test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Classify raw test output.
    ///
    /// Output is failing when it contains any of the markers. The exit code
    /// of the test process plays no part in the decision.
    pub fn classify<S: AsRef<str>>(output: &str, markers: &[S]) -> Self {
        if markers
            .iter()
            .any(|marker| !marker.as_ref().is_empty() && output.contains(marker.as_ref()))
        {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }

    pub fn is_failing(&self) -> bool {
        *self == Verdict::Fail
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
        }
    }
}

/// Terminal record of one run, produced once by the terminal agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub tests_passed: bool,
    pub implemented_file: bool,
    pub failed: bool,
}

impl RunOutcome {
    /// Tests passed before anything was generated.
    pub fn already_passing() -> Self {
        Self {
            tests_passed: true,
            implemented_file: false,
            failed: false,
        }
    }

    /// Tests pass after implementation and refactoring.
    pub fn implemented() -> Self {
        Self {
            tests_passed: true,
            implemented_file: true,
            failed: false,
        }
    }

    /// An agent ran out of attempts.
    pub fn failed() -> Self {
        Self {
            tests_passed: false,
            implemented_file: false,
            failed: true,
        }
    }

    pub fn is_success(&self) -> bool {
        self.tests_passed && !self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure_markers() {
        let markers = ["FAILURES", "ERRORS"];
        assert_eq!(
            Verdict::classify("=== FAILURES ===\ntest_add failed", &markers),
            Verdict::Fail
        );
        assert_eq!(
            Verdict::classify("=== ERRORS ===\ncollection error", &markers),
            Verdict::Fail
        );
        assert_eq!(
            Verdict::classify("3 passed in 0.01s", &markers),
            Verdict::Pass
        );
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(
            Verdict::classify("no failures here", &["FAILURES"]),
            Verdict::Pass
        );
    }

    #[test]
    fn test_classify_ignores_empty_marker() {
        assert_eq!(Verdict::classify("anything", &[""]), Verdict::Pass);
    }

    #[test]
    fn test_outcome_constructors() {
        assert!(RunOutcome::already_passing().is_success());
        assert!(RunOutcome::implemented().implemented_file);
        let failed = RunOutcome::failed();
        assert!(failed.failed);
        assert!(!failed.tests_passed);
        assert!(!failed.is_success());
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&Stage::PostImplementation).unwrap();
        assert_eq!(json, "\"post_implementation\"");
        assert_eq!(Stage::PostRefactor.to_string(), "post-refactor");
    }
}
