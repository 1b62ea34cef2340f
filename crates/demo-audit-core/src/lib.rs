// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use demo_audit_model::{CheckId, CheckSpec, SuiteId, SuiteSpec};
use serde::{Deserialize, Serialize};

pub mod assertions;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod render;
pub mod runner;
pub mod suite;

pub use assertions::{evaluate_check, file_contains, Verdict};
pub use error::{CatalogError, CheckError, LaunchError};
pub use orchestrator::{
    InProcessLauncher, LaunchOutput, Orchestrator, SubprocessLauncher, SuiteLauncher,
};
pub use registry::{builtin_catalog, load_catalog, validate_catalog, Selectors};
pub use runner::TestRunner;
pub use suite::{run_suite, SuiteRun};

pub const DEFAULT_PROJECT_ROOT: &str = "/app";

/// Suites, checks and the closing summary text, as loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub title: String,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub suites: Vec<SuiteSpec>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl Catalog {
    pub fn suite(&self, id: &SuiteId) -> Option<&SuiteSpec> {
        self.suites.iter().find(|suite| suite.id == *id)
    }

    pub fn check(&self, id: &CheckId) -> Option<&CheckSpec> {
        self.checks.iter().find(|check| check.id == *id)
    }
}
