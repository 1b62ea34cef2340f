// SPDX-License-Identifier: Apache-2.0
//! Catalog loading, validation and selection.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use demo_audit_model::{CheckId, CheckSpec, Needle, Relation, Requirement, SuiteId};

use crate::assertions::compile_pattern;
use crate::error::CatalogError;
use crate::Catalog;

const BUILTIN_CATALOG: &str = include_str!("../catalog/builtin.toml");
const BUILTIN_ORIGIN: &str = "<builtin catalog>";

#[derive(Debug, Clone, Default)]
pub struct Selectors {
    pub suite: Option<SuiteId>,
    pub id_glob: Option<String>,
}

pub fn parse_catalog(text: &str, origin: &Path) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = toml::from_str(text).map_err(|err| CatalogError::Parse {
        path: origin.to_path_buf(),
        detail: err.to_string(),
    })?;
    let errors = validate_catalog(&catalog);
    if errors.is_empty() {
        Ok(catalog)
    } else {
        Err(CatalogError::Invalid(errors))
    }
}

pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    parse_catalog(BUILTIN_CATALOG, Path::new(BUILTIN_ORIGIN))
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|err| CatalogError::Read {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;
    parse_catalog(&text, path)
}

/// Loads the catalog at `path`, or the builtin one, and returns every lint error found.
pub fn catalog_doctor(path: Option<&Path>) -> Vec<String> {
    let loaded = match path {
        Some(path) => load_catalog(path),
        None => builtin_catalog(),
    };
    match loaded {
        Ok(catalog) => validate_catalog(&catalog),
        Err(CatalogError::Invalid(errors)) => errors,
        Err(err) => vec![err.to_string()],
    }
}

fn validate_needle(owner: &CheckId, needle: &Needle, errors: &mut Vec<String>) {
    if needle.text().is_empty() {
        errors.push(format!("{owner}: empty needle"));
        return;
    }
    if let Needle::Pattern(pattern) = needle {
        if let Err(err) = compile_pattern(pattern) {
            errors.push(format!("{owner}: {err}"));
        }
    }
}

fn validate_requirement(owner: &CheckId, requirement: &Requirement, errors: &mut Vec<String>) {
    if requirement.path().trim().is_empty() {
        errors.push(format!("{owner}: {} requirement has an empty path", requirement.kind()));
    }
    match requirement {
        Requirement::ContainsAny { needles, .. } if needles.is_empty() => {
            errors.push(format!("{owner}: contains_any requires at least one needle"));
        }
        Requirement::Balanced { open, close, .. } if open == close => {
            errors.push(format!("{owner}: balanced delimiters must differ, got `{open}`"));
        }
        _ => {}
    }
    for needle in requirement.needles() {
        validate_needle(owner, needle, errors);
    }
}

pub fn validate_catalog(catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();
    if catalog.suites.is_empty() {
        errors.push("catalog declares no suites".to_string());
    }
    let suite_ids: BTreeSet<&str> = catalog.suites.iter().map(|s| s.id.as_str()).collect();

    let mut seen = BTreeSet::new();
    for check in &catalog.checks {
        if !seen.insert(check.id.as_str()) {
            errors.push(format!("duplicate check id `{}`", check.id));
        }
        if check.title.trim().is_empty() {
            errors.push(format!("{}: title must not be empty", check.id));
        }
        if !suite_ids.contains(check.suite.as_str()) {
            errors.push(format!("{}: unknown suite `{}`", check.id, check.suite));
        }
        if check.requirements.is_empty() {
            errors.push(format!("{}: requirements must not be empty", check.id));
        }
        for requirement in &check.requirements {
            validate_requirement(&check.id, requirement, &mut errors);
        }
    }

    let mut seen_suites = BTreeSet::new();
    let mut scheduled = BTreeSet::new();
    for suite in &catalog.suites {
        if !seen_suites.insert(suite.id.as_str()) {
            errors.push(format!("duplicate suite id `{}`", suite.id));
        }
        if suite.checks.is_empty() {
            errors.push(format!("suite {} schedules no checks", suite.id));
        }
        let mut in_suite = BTreeSet::new();
        for check_id in &suite.checks {
            if !in_suite.insert(check_id.as_str()) {
                errors.push(format!("suite {} schedules {} twice", suite.id, check_id));
            }
            scheduled.insert(check_id.as_str());
            match catalog.check(check_id) {
                None => errors.push(format!(
                    "suite {} references unknown check {}",
                    suite.id, check_id
                )),
                Some(check) if check.suite != suite.id => errors.push(format!(
                    "suite {} schedules {} which belongs to suite {}",
                    suite.id, check_id, check.suite
                )),
                Some(_) => {}
            }
        }
    }

    for check in &catalog.checks {
        if !scheduled.contains(check.id.as_str()) {
            errors.push(format!("{}: not scheduled by any suite", check.id));
        }
    }

    errors
}

pub(crate) fn wildcard_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == value;
    }
    let last = parts.len() - 1;
    let mut cursor = 0usize;
    for (idx, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if idx == 0 {
            if !value.starts_with(part) {
                return false;
            }
            cursor = part.len();
        } else if idx == last {
            return value.len() >= cursor + part.len() && value.ends_with(part);
        } else if let Some(pos) = value[cursor..].find(part) {
            cursor += pos + part.len();
        } else {
            return false;
        }
    }
    true
}

/// Checks matching `selectors`, in suite order when a suite is given, else catalog order.
pub fn select_checks<'a>(
    catalog: &'a Catalog,
    selectors: &Selectors,
) -> Result<Vec<&'a CheckSpec>, String> {
    let candidates: Vec<&CheckSpec> = match &selectors.suite {
        Some(suite_id) => {
            let suite = catalog
                .suite(suite_id)
                .ok_or_else(|| format!("unknown suite `{suite_id}`"))?;
            suite
                .checks
                .iter()
                .filter_map(|id| catalog.check(id))
                .collect()
        }
        None => catalog.checks.iter().collect(),
    };
    Ok(candidates
        .into_iter()
        .filter(|check| {
            selectors
                .id_glob
                .as_ref()
                .is_none_or(|glob| wildcard_matches(glob, check.id.as_str()))
        })
        .collect())
}

pub fn list_output(checks: &[&CheckSpec]) -> String {
    checks
        .iter()
        .map(|check| format!("{}\t{}", check.id, check.title))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_requirement(requirement: &Requirement) -> String {
    let label = requirement.label();
    let label = if label.is_empty() {
        String::new()
    } else {
        format!(" ({label})")
    };
    match requirement {
        Requirement::FileExists { path, .. } => format!("file_exists {path}{label}"),
        Requirement::Contains {
            path,
            needle,
            relation,
            ..
        } => match relation {
            Relation::Contains => format!("contains {path} {needle}{label}"),
            Relation::CrossReference { target } => {
                format!("cross_reference {path} {needle} -> {target}{label}")
            }
        },
        Requirement::ContainsAny { path, needles, .. } => {
            let listed = needles
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | ");
            format!("contains_any {path} {listed}{label}")
        }
        Requirement::ContainsIf {
            path,
            trigger,
            needle,
            ..
        } => format!("contains_if {path} {trigger} => {needle}{label}"),
        Requirement::Balanced {
            path, open, close, ..
        } => format!("balanced {path} `{open}` `{close}`{label}"),
    }
}

pub fn explain_output(catalog: &Catalog, check_id: &CheckId) -> Result<String, String> {
    let check = catalog
        .check(check_id)
        .ok_or_else(|| format!("unknown check id `{check_id}`"))?;
    let mut out = format!(
        "id: {}\ntitle: {}\nsuite: {}\nrequirements: {}",
        check.id,
        check.title,
        check.suite,
        check.requirements.len()
    );
    for requirement in &check.requirements {
        out.push_str(&format!("\n  - {}", describe_requirement(requirement)));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
title = "Small"

[[suites]]
id = "structure"
title = "Structure"
banner = "start"
results_heading = "Results"
success_line = "ok"
failure_line = "not ok"
checks = ["structure_gradle_files", "structure_manager_logic"]

[[checks]]
id = "structure_gradle_files"
title = "Gradle Build Files"
suite = "structure"
requirements = [
  { kind = "file_exists", path = "build.gradle.kts", label = "build file" },
]

[[checks]]
id = "structure_manager_logic"
title = "DemoModeManager Logic"
suite = "structure"
requirements = [
  { kind = "contains", path = "Demo.kt", needle = { literal = "enableDemoMode()" }, label = "method" },
]
"#;

    fn small() -> Catalog {
        parse_catalog(SMALL, Path::new("small.toml")).expect("catalog")
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin_catalog().expect("builtin catalog");
        assert!(validate_catalog(&catalog).is_empty());
        let counts = catalog
            .suites
            .iter()
            .map(|suite| (suite.id.as_str(), suite.checks.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            counts,
            vec![("structure", 11), ("compilation", 10), ("integration", 8)]
        );
        assert_eq!(catalog.checks.len(), 29);
        assert_eq!(catalog.findings.len(), 10);
        assert_eq!(catalog.features.len(), 7);
    }

    #[test]
    fn validation_reports_every_problem() {
        let mut catalog = small();
        catalog.checks.push(catalog.checks[0].clone());
        catalog.checks[1].requirements = vec![Requirement::Contains {
            path: "Demo.kt".to_string(),
            needle: Needle::pattern("class ("),
            label: String::new(),
            relation: Relation::Contains,
        }];
        catalog.suites[0]
            .checks
            .push(CheckId::parse("structure_unknown_check").expect("id"));
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.starts_with("duplicate check id")));
        assert!(errors.iter().any(|e| e.contains("invalid pattern /class (/")));
        assert!(errors
            .iter()
            .any(|e| e == "suite structure references unknown check structure_unknown_check"));
    }

    #[test]
    fn unscheduled_and_mismatched_checks_are_rejected() {
        let mut catalog = small();
        catalog.suites[0].checks.truncate(1);
        catalog.checks[0].suite = SuiteId::parse("compilation").expect("suite");
        let errors = validate_catalog(&catalog);
        assert!(errors
            .iter()
            .any(|e| e == "structure_manager_logic: not scheduled by any suite"));
        assert!(errors
            .iter()
            .any(|e| e == "structure_gradle_files: unknown suite `compilation`"));
        assert!(errors.iter().any(|e| e.contains("which belongs to suite compilation")));
    }

    #[test]
    fn parse_errors_name_the_origin() {
        let err = parse_catalog("title = ", Path::new("broken.toml")).expect_err("must fail");
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse broken.toml"));
    }

    #[test]
    fn load_catalog_reports_missing_file() {
        let err = load_catalog(Path::new("/definitely/missing/catalog.toml")).expect_err("fail");
        assert!(matches!(err, CatalogError::Read { .. }));
        let errors = catalog_doctor(Some(Path::new("/definitely/missing/catalog.toml")));
        assert_eq!(errors.len(), 1);
        assert!(catalog_doctor(None).is_empty());
    }

    #[test]
    fn wildcard_selection() {
        assert!(wildcard_matches("*", "structure_gradle_files"));
        assert!(wildcard_matches("structure_*", "structure_gradle_files"));
        assert!(wildcard_matches("*_files", "structure_gradle_files"));
        assert!(wildcard_matches("structure_*_files", "structure_gradle_files"));
        assert!(!wildcard_matches("compilation_*", "structure_gradle_files"));
        assert!(!wildcard_matches("ab*ba", "aba"));

        let catalog = small();
        let selected = select_checks(
            &catalog,
            &Selectors {
                suite: None,
                id_glob: Some("*_logic".to_string()),
            },
        )
        .expect("select");
        assert_eq!(list_output(&selected), "structure_manager_logic\tDemoModeManager Logic");

        let unknown = select_checks(
            &catalog,
            &Selectors {
                suite: Some(SuiteId::parse("integration").expect("suite")),
                id_glob: None,
            },
        );
        assert_eq!(unknown, Err("unknown suite `integration`".to_string()));
    }

    #[test]
    fn explain_lists_requirements() {
        let catalog = small();
        let text = explain_output(
            &catalog,
            &CheckId::parse("structure_manager_logic").expect("id"),
        )
        .expect("explain");
        assert_eq!(
            text,
            "id: structure_manager_logic\ntitle: DemoModeManager Logic\nsuite: structure\nrequirements: 1\n  - contains Demo.kt `enableDemoMode()` (method)"
        );
        assert!(explain_output(&catalog, &CheckId::parse("structure_nope").expect("id")).is_err());
    }
}
