// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use demo_audit_core::DEFAULT_PROJECT_ROOT;

#[derive(Parser, Debug)]
#[command(name = "demo-audit", version)]
#[command(about = "Checks an Android project snapshot for the demo mode feature")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    /// Root of the project under inspection.
    #[arg(long, global = true, default_value = DEFAULT_PROJECT_ROOT)]
    pub project_root: PathBuf,
    /// TOML catalog to use instead of the builtin one.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every suite and print the consolidated summary.
    All {
        /// Run each suite in its own child process.
        #[arg(long, default_value_t = false)]
        isolate: bool,
    },
    /// Run a single suite.
    Suite { id: String },
    /// List checks as `id<TAB>title`.
    List {
        #[arg(long)]
        suite: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Show the requirements of one check.
    Explain { check_id: String },
    /// Validate the catalog.
    Doctor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}
