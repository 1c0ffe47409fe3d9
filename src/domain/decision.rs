use crate::domain::version::{docker_safe, BumpKind, SemVer};
use serde::Serialize;
use std::fmt;

/// Which branch of the decision tree produced a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    /// The commit already carries a release tag
    ExactTag,
    /// Computed from a reference tag and the commits after it
    Derived,
    /// No reference tag exists; the baseline version was used
    Fallback,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionSource::ExactTag => "exact-tag",
            VersionSource::Derived => "derived",
            VersionSource::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Outcome of version resolution for one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDecision {
    /// Resolved version without tag prefix
    pub version: String,
    /// `version` with every `+` replaced by `-`
    pub docker_version: String,
    pub bump: BumpKind,
    pub source: VersionSource,
    pub should_tag: bool,
    /// Tag name a release would be published under (`v<version>`)
    pub tag_name: Option<String>,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build_metadata: Option<String>,
    pub reference_tag: Option<String>,
    pub commits_since_tag: usize,
    pub commit: String,
    pub short_hash: String,
}

impl VersionDecision {
    /// Build a decision from a resolved version and its context
    pub fn new(version: &SemVer, bump: BumpKind, source: VersionSource, context: DecisionContext) -> Self {
        let rendered = version.to_string();
        VersionDecision {
            docker_version: docker_safe(&rendered),
            version: rendered,
            bump,
            source,
            should_tag: false,
            tag_name: None,
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            prerelease: version.pre.clone(),
            build_metadata: version.build.clone(),
            reference_tag: context.reference_tag,
            commits_since_tag: context.commits_since_tag,
            commit: context.commit,
            short_hash: context.short_hash,
        }
    }

    /// Mark the decision as a release to be published under `tag_name`
    pub fn release(mut self, tag_name: impl Into<String>) -> Self {
        self.should_tag = true;
        self.tag_name = Some(tag_name.into());
        self
    }
}

/// Repository facts that travel with a decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionContext {
    pub reference_tag: Option<String>,
    pub commits_since_tag: usize,
    pub commit: String,
    pub short_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> DecisionContext {
        DecisionContext {
            reference_tag: Some("v1.2.3".into()),
            commits_since_tag: 3,
            commit: "abc1234def".into(),
            short_hash: "abc1234".into(),
        }
    }

    #[test]
    fn test_decision_components() {
        let v: SemVer = "1.3.0-alpha.3-abc1234+build.9".parse().unwrap();
        let d = VersionDecision::new(&v, BumpKind::Minor, VersionSource::Derived, context());

        assert_eq!(d.version, "1.3.0-alpha.3-abc1234+build.9");
        assert_eq!(d.docker_version, "1.3.0-alpha.3-abc1234-build.9");
        assert_eq!((d.major, d.minor, d.patch), (1, 3, 0));
        assert_eq!(d.prerelease.as_deref(), Some("alpha.3-abc1234"));
        assert_eq!(d.build_metadata.as_deref(), Some("build.9"));
        assert!(!d.should_tag);
        assert_eq!(d.tag_name, None);
    }

    #[test]
    fn test_release_marks_tag() {
        let d = VersionDecision::new(&SemVer::new(1, 3, 0), BumpKind::Minor, VersionSource::Derived, context())
            .release("v1.3.0");
        assert!(d.should_tag);
        assert_eq!(d.prerelease, None);
        assert_eq!(d.tag_name.as_deref(), Some("v1.3.0"));
    }

    #[test]
    fn test_serialized_names() {
        let d = VersionDecision::new(&SemVer::new(2, 0, 0), BumpKind::None, VersionSource::ExactTag, context());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["source"], "exact-tag");
        assert_eq!(json["bump"], "none");
        assert_eq!(json["version"], "2.0.0");
    }
}
