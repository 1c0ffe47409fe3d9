use crate::config::ConventionalCommitsConfig;
use crate::domain::commit::{range_bump, subject_line};
use crate::domain::{BumpKind, CommitKind};
use crate::error::{ResolverError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use regex::Regex;
use tracing::debug;

/// Result of analyzing the commits after a reference tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAnalysis {
    pub bump: BumpKind,
    pub commit_count: usize,
    /// Full hash of a commit whose subject begins with the release prefix
    pub release_commit: Option<String>,
}

impl RangeAnalysis {
    pub fn is_release(&self) -> bool {
        self.release_commit.is_some()
    }
}

/// Classifies commit subjects and determines the bump for a range
pub struct VersionAnalyzer {
    config: ConventionalCommitsConfig,
    feature: Regex,
    patch: Regex,
}

fn type_pattern(types: &[String]) -> Result<Regex> {
    let alternatives: Vec<String> = types.iter().map(|t| regex::escape(t)).collect();
    // An empty alternation must match nothing, not everything.
    let group = if alternatives.is_empty() {
        "[^\\s\\S]".to_string()
    } else {
        alternatives.join("|")
    };

    Regex::new(&format!(r"^(?:{})(?:\([^)]*\))?:", group))
        .map_err(|e| ResolverError::config(format!("Invalid commit type pattern: {}", e)))
}

impl VersionAnalyzer {
    /// Create a new version analyzer
    pub fn new(config: ConventionalCommitsConfig) -> Result<Self> {
        let feature = type_pattern(&config.feature_types)?;
        let patch = type_pattern(&config.patch_types)?;

        Ok(VersionAnalyzer {
            config,
            feature,
            patch,
        })
    }

    /// Whether a subject line marks a release
    pub fn is_release(&self, subject: &str) -> bool {
        subject.starts_with(&self.config.release_prefix)
    }

    /// Classify a commit by the first line of its message
    pub fn classify(&self, message: &str) -> CommitKind {
        let subject = subject_line(message);

        let breaking = subject.contains("!:")
            || self
                .config
                .breaking_change_indicators
                .iter()
                .any(|indicator| subject.starts_with(indicator.as_str()))
            || (self.config.release_is_breaking && self.is_release(subject));

        if breaking {
            CommitKind::Breaking
        } else if self.feature.is_match(subject) {
            CommitKind::Feature
        } else if self.patch.is_match(subject) {
            CommitKind::Fix
        } else {
            CommitKind::Unclassified
        }
    }

    /// Analyze a range of commits: bump, size, and release marker
    pub fn analyze_commits(&self, commits: &[CommitInfo]) -> RangeAnalysis {
        let kinds = commits.iter().map(|commit| {
            let kind = self.classify(&commit.message);
            debug!(commit = %commit.short_hash(7), %kind, subject = commit.subject(), "classified commit");
            kind
        });
        let bump = range_bump(kinds);

        let release_commit = commits
            .iter()
            .find(|commit| self.is_release(commit.subject()))
            .map(|commit| commit.hash.clone());

        RangeAnalysis {
            bump,
            commit_count: commits.len(),
            release_commit,
        }
    }

    /// Analyze commits from a repository between two commits
    pub fn analyze_repository_range<R: Repository>(
        &self,
        repo: &R,
        from_oid: Option<Oid>,
        to_oid: Oid,
    ) -> Result<RangeAnalysis> {
        let commits = repo.commits_between(from_oid, to_oid)?;
        Ok(self.analyze_commits(&commits))
    }
}
