// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

fn is_lower_snake(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn has_snake_segments(raw: &str, min: usize) -> bool {
    let parts = raw.split('_').collect::<Vec<_>>();
    parts.len() >= min && parts.iter().all(|p| !p.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CheckId(String);

impl CheckId {
    pub fn parse(value: &str) -> Result<Self, String> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err("check id cannot be empty".to_string());
        }
        if !is_lower_snake(raw) {
            return Err(format!(
                "invalid check id `{raw}`: expected lowercase snake_case"
            ));
        }
        if !has_snake_segments(raw, 2) {
            return Err(format!(
                "invalid check id `{raw}`: expected <suite>_<name>"
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CheckId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CheckId> for String {
    fn from(value: CheckId) -> Self {
        value.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuiteId(String);

impl SuiteId {
    pub fn parse(value: &str) -> Result<Self, String> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err("suite id cannot be empty".to_string());
        }
        if !is_lower_snake(raw) {
            return Err(format!(
                "invalid suite id `{raw}`: expected lowercase snake_case"
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SuiteId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SuiteId> for String {
    fn from(value: SuiteId) -> Self {
        value.0
    }
}

impl fmt::Display for SuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text searched for inside a target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Needle {
    /// Exact substring.
    Literal(String),
    /// Regular expression, matched anywhere in the file.
    Pattern(String),
}

impl Needle {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn pattern(text: impl Into<String>) -> Self {
        Self::Pattern(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Pattern(text) => text,
        }
    }
}

impl fmt::Display for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "`{text}`"),
            Self::Pattern(text) => write!(f, "/{text}/"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    #[default]
    Contains,
    /// The needle is a call into another component, named by `target`.
    CrossReference { target: String },
}

/// One textual requirement inside a check. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    FileExists {
        path: String,
        #[serde(default)]
        label: String,
    },
    Contains {
        path: String,
        needle: Needle,
        #[serde(default)]
        label: String,
        #[serde(default)]
        relation: Relation,
    },
    ContainsAny {
        path: String,
        needles: Vec<Needle>,
        #[serde(default)]
        label: String,
    },
    /// Passes when `trigger` is absent, or when both `trigger` and `needle` are present.
    ContainsIf {
        path: String,
        trigger: Needle,
        needle: Needle,
        #[serde(default)]
        label: String,
    },
    Balanced {
        path: String,
        open: char,
        close: char,
        #[serde(default)]
        label: String,
    },
}

impl Requirement {
    pub fn path(&self) -> &str {
        match self {
            Self::FileExists { path, .. }
            | Self::Contains { path, .. }
            | Self::ContainsAny { path, .. }
            | Self::ContainsIf { path, .. }
            | Self::Balanced { path, .. } => path,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::FileExists { label, .. }
            | Self::Contains { label, .. }
            | Self::ContainsAny { label, .. }
            | Self::ContainsIf { label, .. }
            | Self::Balanced { label, .. } => label,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileExists { .. } => "file_exists",
            Self::Contains { .. } => "contains",
            Self::ContainsAny { .. } => "contains_any",
            Self::ContainsIf { .. } => "contains_if",
            Self::Balanced { .. } => "balanced",
        }
    }

    /// All needles this requirement searches for, in declaration order.
    pub fn needles(&self) -> Vec<&Needle> {
        match self {
            Self::FileExists { .. } | Self::Balanced { .. } => Vec::new(),
            Self::Contains { needle, .. } => vec![needle],
            Self::ContainsAny { needles, .. } => needles.iter().collect(),
            Self::ContainsIf {
                trigger, needle, ..
            } => vec![trigger, needle],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSpec {
    pub id: CheckId,
    pub title: String,
    pub suite: SuiteId,
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSpec {
    pub id: SuiteId,
    pub title: String,
    pub banner: String,
    pub results_heading: String,
    #[serde(default)]
    pub issues_heading: Option<String>,
    pub success_line: String,
    pub failure_line: String,
    pub checks: Vec<CheckId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: CheckId,
    pub name: String,
    pub passed: bool,
    pub status: CheckStatus,
    pub message: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub run: u64,
    pub passed: u64,
    pub failed: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite: SuiteId,
    pub title: String,
    pub results: Vec<CheckResult>,
    pub summary: SuiteSummary,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.summary.passed == self.summary.run
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }

    /// Messages of every check that did not pass, in run order.
    pub fn issues(&self) -> impl Iterator<Item = &str> + '_ {
        self.results
            .iter()
            .filter(|row| !row.passed)
            .map(|row| row.message.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteOutcome {
    pub suite: SuiteId,
    pub title: String,
    pub passed: bool,
    pub output: String,
    pub report: Option<SuiteReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationReport {
    pub suites: Vec<SuiteOutcome>,
    pub passed: u64,
    pub total: u64,
}

impl OrchestrationReport {
    pub fn push(&mut self, outcome: SuiteOutcome) {
        self.total += 1;
        if outcome.passed {
            self.passed += 1;
        }
        self.suites.push(outcome);
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_id_validation() {
        assert!(CheckId::parse("structure_project_files").is_ok());
        assert!(CheckId::parse("structure").is_err());
        assert!(CheckId::parse("structure__files").is_err());
        assert!(CheckId::parse("Structure_Files").is_err());
        assert!(CheckId::parse("").is_err());
    }

    #[test]
    fn suite_validation() {
        assert!(SuiteId::parse("compilation").is_ok());
        assert!(SuiteId::parse("integration-flow").is_err());
    }

    #[test]
    fn ids_reject_invalid_values_when_deserialized() {
        let err = serde_json::from_str::<CheckId>("\"Not-Valid\"");
        assert!(err.is_err());
        let ok = serde_json::from_str::<SuiteId>("\"structure\"").expect("suite id");
        assert_eq!(ok.as_str(), "structure");
    }

    #[test]
    fn requirement_reads_from_tagged_toml() {
        #[derive(Deserialize)]
        struct Doc {
            requirements: Vec<Requirement>,
        }
        let doc: Doc = toml::from_str(
            r#"
            [[requirements]]
            kind = "contains"
            path = "app/Demo.kt"
            needle = { literal = "enableDemoMode()" }
            label = "method"

            [[requirements]]
            kind = "contains"
            path = "app/Integration.kt"
            needle = { literal = "repo.getEntities()" }
            relation = { kind = "cross_reference", target = "EntityRepository" }

            [[requirements]]
            kind = "balanced"
            path = "app/Demo.kt"
            open = "{"
            close = "}"
            "#,
        )
        .expect("parse");
        assert_eq!(doc.requirements.len(), 3);
        assert_eq!(doc.requirements[0].kind(), "contains");
        assert_eq!(doc.requirements[0].label(), "method");
        assert!(matches!(
            &doc.requirements[1],
            Requirement::Contains {
                relation: Relation::CrossReference { target },
                ..
            } if target == "EntityRepository"
        ));
        assert_eq!(doc.requirements[2].path(), "app/Demo.kt");
        assert!(doc.requirements[2].needles().is_empty());
    }

    #[test]
    fn suite_report_exit_code_tracks_pass_count() {
        let id = CheckId::parse("structure_gradle_files").expect("id");
        let mut report = SuiteReport {
            suite: SuiteId::parse("structure").expect("suite"),
            title: "Structure".to_string(),
            results: vec![CheckResult {
                id,
                name: "Gradle Build Files".to_string(),
                passed: false,
                status: CheckStatus::Fail,
                message: "missing build file build.gradle.kts".to_string(),
                duration_ms: 0,
            }],
            summary: SuiteSummary {
                run: 1,
                passed: 0,
                failed: 1,
                errors: 0,
            },
        };
        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            report.issues().collect::<Vec<_>>(),
            vec!["missing build file build.gradle.kts"]
        );
        report.summary.passed = 1;
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn orchestration_report_counts_suites() {
        let mut report = OrchestrationReport::default();
        for (suite, passed) in [("structure", true), ("compilation", false)] {
            report.push(SuiteOutcome {
                suite: SuiteId::parse(suite).expect("suite"),
                title: suite.to_string(),
                passed,
                output: String::new(),
                report: None,
            });
        }
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), 1);
    }
}
