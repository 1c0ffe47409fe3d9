//! Version resolution: from tags and commit history to a [VersionDecision]
//!
//! The decision tree has three branches, each logged at `info` level:
//!
//! 1. the commit already carries a release tag (`exact-tag`);
//! 2. a release tag is reachable, and the commits after it determine the bump
//!    (`derived`);
//! 3. no release tag is reachable, and the configured baseline is used
//!    (`fallback`).
//!
//! Release candidates are checked against existing tags before they are
//! returned, so a decision never proposes a tag that already points at
//! another commit.

use crate::analyzer::VersionAnalyzer;
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::tag::{highest_version_tag, release_tag_name};
use crate::domain::{
    BranchContext, BumpKind, DecisionContext, PreRelease, PreReleaseType, SemVer, Tag,
    VersionDecision, VersionSource,
};
use crate::error::{ResolverError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use tracing::{debug, info, warn};

/// A decision together with the non-fatal conditions met on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub decision: VersionDecision,
    pub warnings: Vec<BoundaryWarning>,
}

/// Resolves the version of a commit in a repository
pub struct Resolver<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
    analyzer: VersionAnalyzer,
    build_number: Option<u64>,
}

/// Tag names that look like an attempt at a version
fn looks_versioned(name: &str) -> bool {
    name.strip_prefix('v')
        .unwrap_or(name)
        .starts_with(|c: char| c.is_ascii_digit())
}

impl<'a, R: Repository> Resolver<'a, R> {
    pub fn new(repo: &'a R, config: &'a Config) -> Result<Self> {
        config.validate()?;
        let analyzer = VersionAnalyzer::new(config.conventional_commits.clone())?;

        Ok(Resolver {
            repo,
            config,
            analyzer,
            build_number: None,
        })
    }

    /// Build-sequence counter rendered as `+build.<n>` on pre-releases
    pub fn with_build_number(mut self, build_number: Option<u64>) -> Self {
        self.build_number = build_number;
        self
    }

    /// Resolve the version of `commit` built on `branch`
    pub fn resolve(&self, commit: &str, branch: &str) -> Result<VersionDecision> {
        Ok(self.resolve_with_warnings(commit, branch)?.decision)
    }

    /// Resolve and also return the boundary warnings collected on the way
    pub fn resolve_with_warnings(&self, commit: &str, branch: &str) -> Result<Resolution> {
        if self.repo.is_shallow() {
            return Err(ResolverError::ShallowClone(
                "repository history is truncated; fetch full history and tags first".to_string(),
            ));
        }

        let commit = self.repo.resolve_commit(commit)?;
        let branch = BranchContext::with_main_branches(branch, &self.config.versioning.main_branches);
        let short_hash = commit.short_hash(self.config.versioning.short_hash_len).to_string();
        debug!(commit = %commit.hash, branch = %branch.name, is_main = branch.is_main, "resolving version");

        let mut warnings = Vec::new();
        let tags = self.repo.list_tags()?;
        for tag in tags.iter().filter(|t| t.version().is_none()) {
            debug!(tag = %tag.name, "ignoring tag that is not a release version");
            if looks_versioned(&tag.name) {
                warnings.push(BoundaryWarning::UnparsableTag {
                    tag: tag.name.clone(),
                });
            }
        }

        if let Some((tag, version)) = highest_version_tag(tags.iter().filter(|t| t.targets(&commit.hash))) {
            info!(tag = %tag.name, version = %version, "commit carries a release tag, using it verbatim");
            let context = DecisionContext {
                reference_tag: Some(tag.name.clone()),
                commits_since_tag: 0,
                commit: commit.hash.clone(),
                short_hash,
            };
            let decision = VersionDecision::new(&version, BumpKind::None, VersionSource::ExactTag, context);
            return Ok(Resolution { decision, warnings });
        }

        let reachable = self.reachable_release_tags(&tags, commit.oid)?;
        let decision = match highest_version_tag(reachable) {
            Some((tag, version)) => {
                self.derive(tag, version, &commit, &branch, short_hash, &mut warnings)?
            }
            None => self.fallback(&commit, &branch, short_hash, &mut warnings)?,
        };

        Ok(Resolution { decision, warnings })
    }

    fn reachable_release_tags<'t>(&self, tags: &'t [Tag], head: Oid) -> Result<Vec<&'t Tag>> {
        let mut reachable = Vec::new();
        for tag in tags.iter().filter(|t| t.version().is_some()) {
            let target = Oid::from_str(&tag.target)?;
            if self.repo.is_ancestor(target, head)? {
                reachable.push(tag);
            } else {
                debug!(tag = %tag.name, "tag is not in the history of the commit");
            }
        }
        Ok(reachable)
    }

    fn derive(
        &self,
        reference: &Tag,
        version: SemVer,
        commit: &CommitInfo,
        branch: &BranchContext,
        short_hash: String,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<VersionDecision> {
        let from = Oid::from_str(&reference.target)?;
        let analysis = self
            .analyzer
            .analyze_repository_range(self.repo, Some(from), commit.oid)?;

        let context = DecisionContext {
            reference_tag: Some(reference.name.clone()),
            commits_since_tag: analysis.commit_count,
            commit: commit.hash.clone(),
            short_hash,
        };

        if analysis.commit_count == 0 {
            info!(reference = %reference.name, "no commits since reference tag, keeping its version");
            warnings.push(BoundaryWarning::NoNewCommits {
                latest_tag: reference.name.clone(),
                current_commit_hash: commit.hash.clone(),
            });
            return Ok(VersionDecision::new(&version, BumpKind::None, VersionSource::Derived, context));
        }

        let next = version.bump(analysis.bump)?;
        info!(
            reference = %reference.name,
            bump = %analysis.bump,
            commits = analysis.commit_count,
            next = %next,
            release = analysis.is_release(),
            "derived version from commits since reference tag"
        );

        if analysis.is_release() {
            self.claim_release(next, analysis.bump, VersionSource::Derived, context, warnings)
        } else {
            self.prerelease(&next, analysis.bump, VersionSource::Derived, context, branch)
        }
    }

    fn fallback(
        &self,
        commit: &CommitInfo,
        branch: &BranchContext,
        short_hash: String,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<VersionDecision> {
        let base = self.config.versioning.base()?;
        let analysis = self
            .analyzer
            .analyze_repository_range(self.repo, None, commit.oid)?;

        let context = DecisionContext {
            reference_tag: None,
            commits_since_tag: analysis.commit_count,
            commit: commit.hash.clone(),
            short_hash,
        };

        if analysis.is_release() && branch.is_main {
            info!(version = %base, "no release tag reachable, releasing baseline version");
            return self.claim_release(base, BumpKind::None, VersionSource::Fallback, context, warnings);
        }

        info!(version = %base, "no release tag reachable, using baseline version");
        Ok(VersionDecision::new(&base, BumpKind::None, VersionSource::Fallback, context))
    }

    /// Find a release version that no tag claims for another commit
    ///
    /// Every tag whose name parses to the candidate counts, with or without
    /// the `v` prefix.
    fn claim_release(
        &self,
        next: SemVer,
        bump: BumpKind,
        source: VersionSource,
        context: DecisionContext,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<VersionDecision> {
        let retries = self.config.versioning.max_collision_retries;
        let tags = self.repo.list_tags()?;
        let mut candidate = next.core();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let holders: Vec<&Tag> = tags
                .iter()
                .filter(|t| t.version().as_ref() == Some(&candidate))
                .collect();

            match holders.iter().find(|t| !t.targets(&context.commit)) {
                None => {
                    let name = release_tag_name(&candidate);
                    if holders.is_empty() {
                        info!(tag = %name, "release version is free");
                    } else {
                        info!(tag = %name, "release version already tagged at this commit, reusing it");
                    }
                    return Ok(VersionDecision::new(&candidate, bump, source, context).release(name));
                }
                Some(taken) => {
                    warn!(tag = %taken.name, tagged_commit = %taken.target, "release version already tagged at another commit");
                    warnings.push(BoundaryWarning::TagCollision {
                        tag: taken.name.clone(),
                        target: taken.target.clone(),
                    });
                }
            }

            if attempts > retries {
                break;
            }
            match candidate.bump(BumpKind::Patch) {
                Ok(bumped) => candidate = bumped,
                Err(e) => {
                    debug!("no further patch candidates: {}", e);
                    break;
                }
            }
        }

        let label = PreReleaseType::Collision(self.config.versioning.collision_prerelease_label.clone());
        let pre = PreRelease::new(label, context.commits_since_tag, context.short_hash.clone());
        let version = self.with_build(pre.apply(&next)?)?;
        warn!(version = %version, attempts, "no free release tag, falling back to pre-release");
        warnings.push(BoundaryWarning::CollisionRetriesExhausted {
            version: version.to_string(),
            attempts,
        });

        Ok(VersionDecision::new(&version, bump, source, context))
    }

    fn prerelease(
        &self,
        next: &SemVer,
        bump: BumpKind,
        source: VersionSource,
        context: DecisionContext,
        branch: &BranchContext,
    ) -> Result<VersionDecision> {
        let label = PreReleaseType::for_branch(branch, &self.config.versioning.main_prerelease_label);
        let pre = PreRelease::new(label, context.commits_since_tag, context.short_hash.clone());
        let version = self.with_build(pre.apply(next)?)?;
        debug!(version = %version, "pre-release version");

        Ok(VersionDecision::new(&version, bump, source, context))
    }

    fn with_build(&self, version: SemVer) -> Result<SemVer> {
        match self.build_number {
            Some(n) => version.with_build(format!("build.{}", n)),
            None => Ok(version),
        }
    }
}
