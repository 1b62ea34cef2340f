// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use demo_audit_adapters::Fs;
use demo_audit_model::{SuiteReport, SuiteSpec};
use tracing::info;

use crate::assertions::evaluate_check;
use crate::error::CheckError;
use crate::runner::TestRunner;
use crate::Catalog;

/// Result of one suite: the structured report plus the text a user would see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRun {
    pub report: SuiteReport,
    pub transcript: String,
}

impl SuiteRun {
    pub fn exit_code(&self) -> i32 {
        self.report.exit_code()
    }
}

pub fn run_suite(
    fs: &dyn Fs,
    project_root: &Path,
    catalog: &Catalog,
    suite: &SuiteSpec,
) -> SuiteRun {
    let span = tracing::info_span!("suite", suite = %suite.id);
    let _guard = span.enter();

    let mut runner = TestRunner::new();
    for check_id in &suite.checks {
        match catalog.check(check_id) {
            Some(check) => {
                runner.run_test(&check.id, &check.title, || {
                    evaluate_check(fs, project_root, check)
                });
            }
            None => {
                runner.run_test(check_id, check_id.as_str(), || {
                    Err(CheckError::Unregistered(check_id.clone()))
                });
            }
        }
    }
    let (report, checks_text) = runner.finish(suite.id.clone(), &suite.title);
    info!(
        run = report.summary.run,
        passed = report.summary.passed,
        "suite finished"
    );

    let mut out = String::new();
    out.push_str(&format!("{}\n", suite.banner));
    out.push_str(&checks_text);
    out.push_str(&format!("\n📊 {}:\n", suite.results_heading));
    out.push_str(&format!(
        "Tests passed: {}/{}\n",
        report.summary.passed, report.summary.run
    ));
    if let Some(heading) = &suite.issues_heading {
        let issues = report.issues().collect::<Vec<_>>();
        if !issues.is_empty() {
            out.push_str(&format!("\n⚠️  {heading}:\n"));
            for issue in issues {
                out.push_str(&format!("  - {issue}\n"));
            }
        }
    }
    if report.all_passed() {
        out.push_str(&format!("{}\n", suite.success_line));
    } else {
        out.push_str(&format!("{}\n", suite.failure_line));
    }

    SuiteRun {
        report,
        transcript: out,
    }
}
