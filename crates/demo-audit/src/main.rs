// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod cli;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use demo_audit_adapters::{RealFs, RealProcessRunner};
use demo_audit_core::registry::{
    catalog_doctor, explain_output, list_output, select_checks, Selectors,
};
use demo_audit_core::render::{render_json, render_orchestration};
use demo_audit_core::{
    builtin_catalog, load_catalog, run_suite, Catalog, InProcessLauncher, Orchestrator,
    SubprocessLauncher, SuiteLauncher,
};
use demo_audit_model::{CheckId, SuiteId};
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, FormatArg};

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let ansi = std::io::stderr().is_terminal();
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load(cli: &Cli) -> Result<Catalog, String> {
    match &cli.catalog {
        Some(path) => load_catalog(path),
        None => builtin_catalog(),
    }
    .map_err(|err| err.to_string())
}

/// Resolves against our cwd; isolated children run with the project root as cwd.
fn absolute(path: &Path) -> Result<PathBuf, String> {
    std::path::absolute(path)
        .map_err(|err| format!("cannot resolve path {}: {err}", path.display()))
}

fn run_all(cli: &Cli, isolate: bool) -> Result<i32, String> {
    let catalog = load(cli)?;
    let fs = RealFs;
    let process = RealProcessRunner;
    let in_process = InProcessLauncher {
        fs: &fs,
        project_root: &cli.project_root,
        catalog: &catalog,
    };
    let subprocess;
    let launcher: &dyn SuiteLauncher = if isolate {
        let program = std::env::current_exe()
            .map_err(|err| format!("cannot locate demo-audit executable: {err}"))?;
        let mut extra_args = vec!["--log-level".to_string(), cli.log_level.clone()];
        if cli.log_json {
            extra_args.push("--log-json".to_string());
        }
        if let Some(path) = &cli.catalog {
            extra_args.push("--catalog".to_string());
            extra_args.push(absolute(path)?.display().to_string());
        }
        subprocess = SubprocessLauncher {
            runner: &process,
            program,
            project_root: absolute(&cli.project_root)?,
            extra_args,
        };
        &subprocess
    } else {
        &in_process
    };

    let report = Orchestrator::new(launcher).run(&catalog.suites);
    match cli.format {
        FormatArg::Text => print!("{}", render_orchestration(&catalog, &report)),
        FormatArg::Json => println!("{}", render_json(&report)?),
    }
    Ok(report.exit_code())
}

fn run_one_suite(cli: &Cli, raw_id: &str) -> Result<i32, String> {
    let catalog = load(cli)?;
    let suite_id = SuiteId::parse(raw_id)?;
    let suite = catalog
        .suite(&suite_id)
        .ok_or_else(|| format!("unknown suite `{suite_id}`"))?;
    let run = run_suite(&RealFs, &cli.project_root, &catalog, suite);
    match cli.format {
        FormatArg::Text => print!("{}", run.transcript),
        FormatArg::Json => println!("{}", render_json(&run.report)?),
    }
    Ok(run.exit_code())
}

fn run(cli: &Cli) -> Result<i32, String> {
    match &cli.command {
        None => run_all(cli, false),
        Some(Command::All { isolate }) => run_all(cli, *isolate),
        Some(Command::Suite { id }) => run_one_suite(cli, id),
        Some(Command::List { suite, id }) => {
            let catalog = load(cli)?;
            let selectors = Selectors {
                suite: suite.as_deref().map(SuiteId::parse).transpose()?,
                id_glob: id.clone(),
            };
            let checks = select_checks(&catalog, &selectors)?;
            match cli.format {
                FormatArg::Text => println!("{}", list_output(&checks)),
                FormatArg::Json => println!("{}", render_json(&checks)?),
            }
            Ok(0)
        }
        Some(Command::Explain { check_id }) => {
            let catalog = load(cli)?;
            let check_id = CheckId::parse(check_id)?;
            match cli.format {
                FormatArg::Text => println!("{}", explain_output(&catalog, &check_id)?),
                FormatArg::Json => {
                    let check = catalog
                        .check(&check_id)
                        .ok_or_else(|| format!("unknown check id `{check_id}`"))?;
                    println!("{}", render_json(check)?);
                }
            }
            Ok(0)
        }
        Some(Command::Doctor) => {
            let errors = catalog_doctor(cli.catalog.as_deref());
            match cli.format {
                FormatArg::Text if errors.is_empty() => println!("demo-audit doctor: ok"),
                FormatArg::Text => {
                    for error in &errors {
                        println!("{error}");
                    }
                }
                FormatArg::Json => println!(
                    "{}",
                    render_json(&serde_json::json!({ "errors": errors }))?
                ),
            }
            Ok(i32::from(!errors.is_empty()))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);
    let exit = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("demo-audit: {err}");
            1
        }
    };
    std::process::exit(exit);
}
