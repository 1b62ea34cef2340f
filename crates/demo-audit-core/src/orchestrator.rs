// SPDX-License-Identifier: Apache-2.0
//! Runs every suite through a launcher and collects the outcomes.

use std::path::{Path, PathBuf};

use demo_audit_adapters::{Fs, ProcessRunner};
use demo_audit_model::{OrchestrationReport, SuiteOutcome, SuiteReport, SuiteSpec};
use tracing::{info, warn};

use crate::error::LaunchError;
use crate::suite::run_suite;
use crate::Catalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutput {
    pub passed: bool,
    pub output: String,
    pub report: Option<SuiteReport>,
}

pub trait SuiteLauncher {
    fn launch(&self, suite: &SuiteSpec) -> Result<LaunchOutput, LaunchError>;
}

/// Runs suites in the current process and keeps their structured reports.
pub struct InProcessLauncher<'a> {
    pub fs: &'a dyn Fs,
    pub project_root: &'a Path,
    pub catalog: &'a Catalog,
}

impl SuiteLauncher for InProcessLauncher<'_> {
    fn launch(&self, suite: &SuiteSpec) -> Result<LaunchOutput, LaunchError> {
        if self.catalog.suite(&suite.id).is_none() {
            return Err(LaunchError::UnknownSuite(suite.id.clone()));
        }
        let run = run_suite(self.fs, self.project_root, self.catalog, suite);
        Ok(LaunchOutput {
            passed: run.exit_code() == 0,
            output: run.transcript,
            report: Some(run.report),
        })
    }
}

/// Re-invokes `program suite <id>` as a child process with the project root as cwd.
pub struct SubprocessLauncher<'a> {
    pub runner: &'a dyn ProcessRunner,
    pub program: PathBuf,
    pub project_root: PathBuf,
    /// Passed before the subcommand, e.g. `--catalog <file>`.
    pub extra_args: Vec<String>,
}

impl SubprocessLauncher<'_> {
    fn args_for(&self, suite: &SuiteSpec) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend([
            "suite".to_string(),
            suite.id.as_str().to_string(),
            "--project-root".to_string(),
            self.project_root.display().to_string(),
        ]);
        args
    }
}

impl SuiteLauncher for SubprocessLauncher<'_> {
    fn launch(&self, suite: &SuiteSpec) -> Result<LaunchOutput, LaunchError> {
        let captured =
            self.runner
                .output(&self.program, &self.args_for(suite), &self.project_root)?;
        let mut output = captured.stdout.clone();
        if !captured.stderr.is_empty() {
            output.push_str(&format!("STDERR: {}", captured.stderr));
        }
        Ok(LaunchOutput {
            passed: captured.success(),
            output,
            report: None,
        })
    }
}

pub struct Orchestrator<'a> {
    launcher: &'a dyn SuiteLauncher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(launcher: &'a dyn SuiteLauncher) -> Self {
        Self { launcher }
    }

    /// Launches every suite in order. A failing or unlaunchable suite never stops the rest.
    pub fn run(&self, suites: &[SuiteSpec]) -> OrchestrationReport {
        let mut report = OrchestrationReport::default();
        for suite in suites {
            info!(suite = %suite.id, "launching suite");
            let outcome = match self.launcher.launch(suite) {
                Ok(launched) => SuiteOutcome {
                    suite: suite.id.clone(),
                    title: suite.title.clone(),
                    passed: launched.passed,
                    output: launched.output,
                    report: launched.report,
                },
                Err(err) => {
                    warn!(suite = %suite.id, error = %err, "suite launch failed");
                    SuiteOutcome {
                        suite: suite.id.clone(),
                        title: suite.title.clone(),
                        passed: false,
                        output: format!("❌ Error running {}: {err}\n", suite.id),
                        report: None,
                    }
                }
            };
            report.push(outcome);
        }
        info!(
            passed = report.passed,
            total = report.total,
            "orchestration finished"
        );
        report
    }
}
