// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use demo_audit_adapters::AdapterError;
use demo_audit_model::{CheckId, SuiteId};

/// Unexpected failure while evaluating a check. Missing content is not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("invalid pattern /{pattern}/: {detail}")]
    Pattern { pattern: String, detail: String },
    #[error("check `{0}` is scheduled but not registered")]
    Unregistered(CheckId),
    #[error("check panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {}: {detail}", path.display())]
    Read { path: PathBuf, detail: String },
    #[error("failed to parse {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },
    #[error("invalid catalog: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("unknown suite `{0}`")]
    UnknownSuite(SuiteId),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
