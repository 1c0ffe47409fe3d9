//! Main workflow orchestration logic
//!
//! Ties configuration, repository, resolver and publisher together. Kept
//! separate from `main.rs` so the workflow can be called programmatically
//! without depending on clap.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{BranchContext, VersionDecision};
use crate::error::ResolverError;
use crate::git::{Git2Repository, Repository};
use crate::publish::{publish, PublishOutcome, PublishRequest};
use crate::resolver::Resolver;

/// Arguments for the resolve-and-publish workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowArgs {
    /// Any path inside the repository
    pub repo_path: PathBuf,

    /// Revision to resolve
    pub commit: String,

    /// Branch under build; `None` uses the checked-out branch
    pub branch: Option<String>,

    /// Build-sequence counter for pre-release build metadata
    pub build_number: Option<u64>,

    /// Build identifier embedded in tag messages
    pub build_id: Option<String>,

    /// Run the publish step after resolving
    pub publish: bool,

    /// Report what publish would do without writing
    pub dry_run: bool,
}

impl Default for WorkflowArgs {
    fn default() -> Self {
        WorkflowArgs {
            repo_path: PathBuf::from("."),
            commit: "HEAD".to_string(),
            branch: None,
            build_number: None,
            build_id: None,
            publish: false,
            dry_run: false,
        }
    }
}

/// Result of a workflow run
///
/// The decision is always present; a failed publish is carried alongside it
/// rather than replacing it.
#[derive(Debug)]
pub struct WorkflowResult {
    pub decision: VersionDecision,
    pub warnings: Vec<BoundaryWarning>,
    pub branch: BranchContext,
    /// `None` when publishing was not requested
    pub publish: Option<std::result::Result<PublishOutcome, ResolverError>>,
}

impl WorkflowResult {
    pub fn publish_failed(&self) -> bool {
        matches!(self.publish, Some(Err(_)))
    }
}

/// Resolve the version of a commit and optionally publish it
///
/// 1. Open the repository
/// 2. Determine the branch under build
/// 3. Resolve the version decision
/// 4. Publish the release tag if requested
///
/// # Returns
///
/// `Err` only when resolution fails; publish failures are reported inside
/// [WorkflowResult::publish].
pub fn run_workflow(args: &WorkflowArgs, config: &Config) -> Result<WorkflowResult> {
    let repo = Git2Repository::open(&args.repo_path)
        .with_context(|| format!("Failed to open repository at {}", args.repo_path.display()))?;

    run_workflow_with(&repo, args, config)
}

/// [run_workflow] against an already opened repository
pub fn run_workflow_with<R: Repository>(
    repo: &R,
    args: &WorkflowArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    let branch_name = match &args.branch {
        Some(branch) => branch.clone(),
        None => repo
            .current_branch()
            .context("Failed to read the checked-out branch")?
            .unwrap_or_default(),
    };
    let branch = BranchContext::with_main_branches(&branch_name, &config.versioning.main_branches);
    info!(branch = %branch.name, commit = %args.commit, "resolving version");

    let resolution = Resolver::new(repo, config)?
        .with_build_number(args.build_number)
        .resolve_with_warnings(&args.commit, &branch_name)
        .with_context(|| format!("Failed to resolve version of '{}'", args.commit))?;

    let publish_result = if args.publish || args.dry_run {
        let request = PublishRequest {
            branch: &branch,
            build_id: args.build_id.as_deref(),
            dry_run: args.dry_run,
        };
        Some(publish(&resolution.decision, repo, &request, &config.publish))
    } else {
        None
    };

    Ok(WorkflowResult {
        decision: resolution.decision,
        warnings: resolution.warnings,
        branch,
        publish: publish_result,
    })
}
