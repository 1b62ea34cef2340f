// SPDX-License-Identifier: Apache-2.0
//! Text assertions over target files.
//!
//! Every requirement reads its file fresh from disk. Evaluation of a check stops at
//! the first unmet requirement so the reported message names the first gap found.

use std::path::Path;

use demo_audit_adapters::Fs;
use demo_audit_model::{CheckSpec, Needle, Relation, Requirement};
use regex::Regex;

use crate::error::CheckError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass(String),
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Pass(message) | Self::Fail(message) => message,
        }
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, CheckError> {
    Regex::new(pattern).map_err(|err| CheckError::Pattern {
        pattern: pattern.to_string(),
        detail: err.to_string(),
    })
}

pub fn needle_matches(text: &str, needle: &Needle) -> Result<bool, CheckError> {
    match needle {
        Needle::Literal(literal) => Ok(text.contains(literal.as_str())),
        Needle::Pattern(pattern) => Ok(compile_pattern(pattern)?.is_match(text)),
    }
}

/// Reads `path` under `project_root` and reports whether `needle` occurs in it.
///
/// A missing or undecodable file is an error, never `false`.
pub fn file_contains(
    fs: &dyn Fs,
    project_root: &Path,
    path: &str,
    needle: &Needle,
) -> Result<bool, CheckError> {
    let text = fs.read_text(project_root, Path::new(path))?;
    needle_matches(&text, needle)
}

fn or_default<'a>(label: &'a str, fallback: &'a str) -> &'a str {
    if label.is_empty() {
        fallback
    } else {
        label
    }
}

fn missing_file(path: &str, label: &str) -> Verdict {
    Verdict::Fail(format!("missing {}: {path}", or_default(label, "file")))
}

pub fn evaluate_requirement(
    fs: &dyn Fs,
    project_root: &Path,
    requirement: &Requirement,
) -> Result<Option<Verdict>, CheckError> {
    let path = requirement.path();
    let label = requirement.label();
    if let Requirement::FileExists { .. } = requirement {
        return Ok(if fs.exists(project_root, Path::new(path)) {
            None
        } else {
            Some(missing_file(path, label))
        });
    }
    if !fs.exists(project_root, Path::new(path)) {
        return Ok(Some(missing_file(path, "file")));
    }

    let unmet = match requirement {
        Requirement::FileExists { .. } => None,
        Requirement::Contains {
            needle, relation, ..
        } => {
            if file_contains(fs, project_root, path, needle)? {
                None
            } else {
                Some(match relation {
                    Relation::Contains => {
                        format!("missing {} {needle} in {path}", or_default(label, "content"))
                    }
                    Relation::CrossReference { target } => format!(
                        "missing cross-reference to {target}: {needle} not found in {path}"
                    ),
                })
            }
        }
        Requirement::ContainsAny { needles, .. } => {
            let text = fs.read_text(project_root, Path::new(path))?;
            let mut found = false;
            for needle in needles {
                if needle_matches(&text, needle)? {
                    found = true;
                    break;
                }
            }
            if found {
                None
            } else {
                let listed = needles
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "missing {} in {path}: none of {listed} found",
                    or_default(label, "content")
                ))
            }
        }
        Requirement::ContainsIf {
            trigger, needle, ..
        } => {
            let text = fs.read_text(project_root, Path::new(path))?;
            if needle_matches(&text, trigger)? && !needle_matches(&text, needle)? {
                Some(format!(
                    "{path} mentions {trigger} but is missing {} {needle}",
                    or_default(label, "content")
                ))
            } else {
                None
            }
        }
        Requirement::Balanced { open, close, .. } => {
            let text = fs.read_text(project_root, Path::new(path))?;
            let opened = text.chars().filter(|c| c == open).count();
            let closed = text.chars().filter(|c| c == close).count();
            if opened == closed {
                None
            } else {
                Some(format!(
                    "mismatched {} in {path}: {opened} `{open}` vs {closed} `{close}`",
                    or_default(label, "delimiters")
                ))
            }
        }
    };
    Ok(unmet.map(Verdict::Fail))
}

/// Evaluates every requirement of `check` in order, stopping at the first unmet one.
pub fn evaluate_check(
    fs: &dyn Fs,
    project_root: &Path,
    check: &CheckSpec,
) -> Result<Verdict, CheckError> {
    for requirement in &check.requirements {
        if let Some(verdict) = evaluate_requirement(fs, project_root, requirement)? {
            return Ok(verdict);
        }
    }
    Ok(Verdict::Pass(format!(
        "{}: {} requirement(s) satisfied",
        check.title,
        check.requirements.len()
    )))
}
