use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use git_semver::cli::{run_workflow, WorkflowArgs};
use git_semver::config;
use git_semver::ui::{self, OutputFormat};

#[derive(clap::Parser)]
#[command(
    name = "git-semver",
    version,
    about = "Resolve the semantic version of a commit from git tags and conventional commits"
)]
struct Args {
    #[arg(long, default_value = ".", help = "Path inside the git repository")]
    repo: PathBuf,

    #[arg(long, default_value = "HEAD", help = "Commit to resolve")]
    commit: String,

    #[arg(short, long, help = "Branch under build (defaults to the checked-out branch)")]
    branch: Option<String>,

    #[arg(long, help = "Build-sequence counter added as pre-release build metadata")]
    build_number: Option<u64>,

    #[arg(long, help = "Build identifier recorded in the tag message")]
    build_id: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    format: OutputFormat,

    #[arg(long, help = "Create and push the release tag when the decision calls for one")]
    publish: bool,

    #[arg(long, help = "Preview what publishing would do without making changes")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

const EXIT_PUBLISH_FAILED: u8 = 2;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "git_semver=debug"
    } else {
        "git_semver=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    let config = config::load_config(args.config.as_deref()).context("Failed to load configuration")?;

    let workflow_args = WorkflowArgs {
        repo_path: args.repo,
        commit: args.commit,
        branch: args.branch,
        build_number: args.build_number,
        build_id: args.build_id,
        publish: args.publish,
        dry_run: args.dry_run,
    };

    let result = run_workflow(&workflow_args, &config)?;

    for warning in &result.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_decision_summary(&result.decision);
    println!("{}", ui::render_decision(&result.decision, args.format)?);

    match &result.publish {
        Some(Ok(outcome)) => ui::display_publish_outcome(outcome),
        Some(Err(e)) => {
            ui::display_error(&format!("Publish failed: {}", e));
            return Ok(ExitCode::from(EXIT_PUBLISH_FAILED));
        }
        None => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
