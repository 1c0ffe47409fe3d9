//! Idempotent publication of release tags
//!
//! A release decision becomes an annotated `v<version>` tag that is pushed to
//! the configured remote. Publication is safe to repeat: a tag already at the
//! same commit is a no-op, a tag at another commit is never moved.

use crate::config::PublishConfig;
use crate::domain::{BranchContext, VersionDecision};
use crate::error::{ResolverError, Result};
use crate::git::Repository;
use git2::Oid;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Build identifier used in tag messages when the caller supplies none
pub const LOCAL_BUILD_ID: &str = "local";

/// Why a decision was not published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NotRelease,
    NotMainBranch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotRelease => f.write_str("version is not a release"),
            SkipReason::NotMainBranch => f.write_str("releases are only tagged on main branches"),
        }
    }
}

/// What the publish step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PublishOutcome {
    Skipped { reason: SkipReason },
    AlreadyPublished { tag: String },
    /// Dry run: the tag would have been created and pushed
    WouldCreate { tag: String, remote: String },
    Created { tag: String, remote: String },
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Skipped { reason } => write!(f, "Tag not published: {}", reason),
            PublishOutcome::AlreadyPublished { tag } => {
                write!(f, "Tag '{}' already points at this commit", tag)
            }
            PublishOutcome::WouldCreate { tag, remote } => {
                write!(f, "Would create tag '{}' and push it to '{}'", tag, remote)
            }
            PublishOutcome::Created { tag, remote } => {
                write!(f, "Created tag '{}' and pushed it to '{}'", tag, remote)
            }
        }
    }
}

/// Inputs of one publish call besides the decision itself
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    pub branch: &'a BranchContext,
    pub build_id: Option<&'a str>,
    pub dry_run: bool,
}

/// Annotated tag message embedding the build identifier and version
pub fn tag_message(decision: &VersionDecision, build_id: Option<&str>) -> String {
    format!(
        "Release {}\n\nVersion: {}\nBuild: {}\nCommit: {}\n",
        decision.tag_name.as_deref().unwrap_or(&decision.version),
        decision.version,
        build_id.unwrap_or(LOCAL_BUILD_ID),
        decision.commit
    )
}

/// Publish a release decision as an annotated tag
///
/// # Returns
/// * `Ok(PublishOutcome)` - Skipped, already published, or created and pushed
/// * `Err(TagConflict)` - If the tag exists at a different commit
/// * `Err(Remote)` - If the push failed; the local tag is removed again
pub fn publish<R: Repository>(
    decision: &VersionDecision,
    repo: &R,
    request: &PublishRequest<'_>,
    config: &PublishConfig,
) -> Result<PublishOutcome> {
    if !decision.should_tag {
        info!(version = %decision.version, "not a release, nothing to publish");
        return Ok(PublishOutcome::Skipped {
            reason: SkipReason::NotRelease,
        });
    }
    if !request.branch.is_main {
        info!(branch = %request.branch.name, "not a main branch, release tag not published");
        return Ok(PublishOutcome::Skipped {
            reason: SkipReason::NotMainBranch,
        });
    }

    let tag = decision
        .tag_name
        .clone()
        .ok_or_else(|| ResolverError::tag("release decision carries no tag name"))?;
    let target = Oid::from_str(&decision.commit)?;

    if let Some(existing) = repo.find_tag(&tag)? {
        if existing.targets(&decision.commit) {
            info!(tag = %tag, "tag already points at this commit");
            return Ok(PublishOutcome::AlreadyPublished { tag });
        }
        return Err(ResolverError::TagConflict {
            tag,
            existing: existing.target,
            requested: decision.commit.clone(),
        });
    }

    let remote = config.remote.clone();
    if request.dry_run {
        info!(tag = %tag, remote = %remote, "dry run, tag not created");
        return Ok(PublishOutcome::WouldCreate { tag, remote });
    }

    repo.create_annotated_tag(&tag, target, &tag_message(decision, request.build_id))?;
    info!(tag = %tag, "created annotated tag");

    if let Err(e) = repo.push_tag(&remote, &tag, &config.auth) {
        warn!(tag = %tag, remote = %remote, "push failed, removing local tag: {}", e);
        if let Err(rollback) = repo.delete_tag(&tag) {
            warn!(tag = %tag, "could not remove local tag: {}", rollback);
        }
        return Err(e);
    }

    info!(tag = %tag, remote = %remote, auth = config.auth.name(), "pushed tag");
    Ok(PublishOutcome::Created { tag, remote })
}
