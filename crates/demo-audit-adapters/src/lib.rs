// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("io error: {op} {} ({detail})", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },
    #[error("decode error: {} is not valid utf-8 ({detail})", path.display())]
    Decode { path: PathBuf, detail: String },
    #[error("process error: {program} ({detail})")]
    Process { program: String, detail: String },
}

/// Joins `path` onto `project_root` unless it is already absolute.
pub fn resolve_from_root(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

pub trait Fs {
    fn read_text(&self, project_root: &Path, path: &Path) -> Result<String, AdapterError>;
    fn exists(&self, project_root: &Path, path: &Path) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait ProcessRunner {
    /// Runs `program` to completion and captures both output streams.
    fn output(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<CapturedOutput, AdapterError>;
}

#[derive(Debug, Default)]
pub struct RealFs;

impl Fs for RealFs {
    fn read_text(&self, project_root: &Path, path: &Path) -> Result<String, AdapterError> {
        let target = resolve_from_root(project_root, path);
        let bytes = fs::read(&target).map_err(|err| AdapterError::Io {
            op: "read",
            path: target.clone(),
            detail: err.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|err| AdapterError::Decode {
            path: target,
            detail: err.utf8_error().to_string(),
        })
    }

    fn exists(&self, project_root: &Path, path: &Path) -> bool {
        resolve_from_root(project_root, path).exists()
    }
}

#[derive(Debug, Default)]
pub struct RealProcessRunner;

impl ProcessRunner for RealProcessRunner {
    fn output(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<CapturedOutput, AdapterError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|err| AdapterError::Process {
                program: program.display().to_string(),
                detail: err.to_string(),
            })?;
        Ok(CapturedOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
