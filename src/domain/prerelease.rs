//! Pre-release labels for builds that are not formal releases
//!
//! Every label has the shape `<identifier>.<commitsSinceTag>-<shortHash>`:
//! - `alpha.3-abc1234` on a main branch
//! - `feature-login.3-abc1234` on any other branch
//! - `release.3-abc1234` when no free release tag could be found

use crate::domain::branch::BranchContext;
use crate::domain::version::SemVer;
use crate::error::Result;
use std::fmt;

/// Where a pre-release identifier comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreReleaseType {
    /// Build of a main branch
    Mainline(String),
    /// Build of any other branch, carrying the sanitized branch name
    Branch(String),
    /// Release whose tag could not be claimed
    Collision(String),
}

impl PreReleaseType {
    /// Select the identifier for a branch build
    pub fn for_branch(branch: &BranchContext, mainline_label: &str) -> Self {
        if branch.is_main {
            PreReleaseType::Mainline(mainline_label.to_string())
        } else {
            PreReleaseType::Branch(branch.sanitized())
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            PreReleaseType::Mainline(s) | PreReleaseType::Branch(s) | PreReleaseType::Collision(s) => s,
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Pre-release label with its distance from the reference tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub identifier: PreReleaseType,
    pub commits_since_tag: usize,
    pub short_hash: String,
}

impl PreRelease {
    pub fn new(
        identifier: PreReleaseType,
        commits_since_tag: usize,
        short_hash: impl Into<String>,
    ) -> Self {
        PreRelease {
            identifier,
            commits_since_tag,
            short_hash: short_hash.into(),
        }
    }

    /// Attach this label to a version core
    pub fn apply(&self, version: &SemVer) -> Result<SemVer> {
        version.core().with_pre(self.to_string())
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}-{}",
            self.identifier, self.commits_since_tag, self.short_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::is_valid_label;

    #[test]
    fn test_mainline_label() {
        let branch = BranchContext::new("main");
        let pr = PreRelease::new(PreReleaseType::for_branch(&branch, "alpha"), 3, "abc1234");
        assert_eq!(pr.to_string(), "alpha.3-abc1234");
    }

    #[test]
    fn test_branch_label_is_sanitized() {
        let branch = BranchContext::new("Feature/Login");
        let pr = PreRelease::new(PreReleaseType::for_branch(&branch, "alpha"), 2, "def5678");
        assert_eq!(pr.to_string(), "feature-login.2-def5678");
        assert!(is_valid_label(&pr.to_string()));
    }

    #[test]
    fn test_detached_label() {
        let branch = BranchContext::new("");
        let pr = PreRelease::new(PreReleaseType::for_branch(&branch, "alpha"), 1, "0000000");
        assert_eq!(pr.to_string(), "detached.1-0000000");
    }

    #[test]
    fn test_collision_label() {
        let pr = PreRelease::new(PreReleaseType::Collision("release".into()), 4, "abc1234");
        assert_eq!(pr.to_string(), "release.4-abc1234");
    }

    #[test]
    fn test_apply_drops_existing_labels() {
        let base = SemVer::new(1, 3, 0).with_build("meta").unwrap();
        let pr = PreRelease::new(PreReleaseType::Mainline("alpha".into()), 3, "abc1234");
        let v = pr.apply(&base).unwrap();
        assert_eq!(v.to_string(), "1.3.0-alpha.3-abc1234");
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(PreReleaseType::Branch("dev".into()).to_string(), "dev");
        assert_eq!(PreReleaseType::Mainline("alpha".into()).identifier(), "alpha");
    }
}
