// SPDX-License-Identifier: Apache-2.0

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use demo_audit_model::{CheckId, CheckResult, CheckStatus, SuiteId, SuiteReport, SuiteSummary};
use tracing::{debug, warn};

use crate::assertions::Verdict;
use crate::error::CheckError;

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs checks one at a time, tallying results and recording a transcript.
#[derive(Debug, Default)]
pub struct TestRunner {
    summary: SuiteSummary,
    results: Vec<CheckResult>,
    transcript: String,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &SuiteSummary {
        &self.summary
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Runs one check. Errors and panics are recorded with status `error`.
    pub fn run_test<F>(&mut self, id: &CheckId, name: &str, check: F) -> bool
    where
        F: FnOnce() -> Result<Verdict, CheckError>,
    {
        self.summary.run += 1;
        self.transcript.push_str(&format!("\n🔍 Testing {name}...\n"));

        let started = Instant::now();
        let outcome = match catch_unwind(AssertUnwindSafe(check)) {
            Ok(outcome) => outcome,
            Err(payload) => Err(CheckError::Panicked(panic_payload_to_string(
                payload.as_ref(),
            ))),
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        let (status, message) = match outcome {
            Ok(Verdict::Pass(message)) => (CheckStatus::Pass, message),
            Ok(Verdict::Fail(message)) => (CheckStatus::Fail, message),
            Err(err) => (CheckStatus::Error, err.to_string()),
        };
        match status {
            CheckStatus::Pass => {
                self.summary.passed += 1;
                self.transcript.push_str(&format!("✅ Passed - {name}\n"));
                debug!(check = %id, duration_ms, "check passed");
            }
            CheckStatus::Fail => {
                self.summary.failed += 1;
                self.transcript
                    .push_str(&format!("❌ Failed - {name}: {message}\n"));
                debug!(check = %id, duration_ms, %message, "check failed");
            }
            CheckStatus::Error => {
                self.summary.errors += 1;
                self.transcript
                    .push_str(&format!("❌ Failed - {name}: {message}\n"));
                warn!(check = %id, duration_ms, %message, "check errored");
            }
        }

        let passed = status == CheckStatus::Pass;
        self.results.push(CheckResult {
            id: id.clone(),
            name: name.to_string(),
            passed,
            status,
            message,
            duration_ms,
        });
        passed
    }

    pub fn finish(self, suite: SuiteId, title: &str) -> (SuiteReport, String) {
        let report = SuiteReport {
            suite,
            title: title.to_string(),
            results: self.results,
            summary: self.summary,
        };
        (report, self.transcript)
    }
}
