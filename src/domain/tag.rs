use crate::domain::version::SemVer;

/// Prefix written in front of release tag names
pub const TAG_PREFIX: &str = "v";

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// Full hash of the commit the tag peels to
    pub target: String,
    pub annotated: bool,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, target: impl Into<String>, annotated: bool) -> Self {
        Tag {
            name: name.into(),
            target: target.into(),
            annotated,
        }
    }

    /// Strict release version carried by the tag name, if any
    pub fn version(&self) -> Option<SemVer> {
        SemVer::parse_tag(&self.name)
    }

    /// Whether the tag points at the given commit
    pub fn targets(&self, commit: &str) -> bool {
        self.target == commit
    }
}

/// Tag name for a release version (e.g., 1.2.3 -> "v1.2.3")
pub fn release_tag_name(version: &SemVer) -> String {
    version.tag_name(TAG_PREFIX)
}

/// Highest strict semver tag among `tags`, ignoring everything else
pub fn highest_version_tag<'a, I>(tags: I) -> Option<(&'a Tag, SemVer)>
where
    I: IntoIterator<Item = &'a Tag>,
{
    tags.into_iter()
        .filter_map(|tag| tag.version().map(|v| (tag, v)))
        .max_by(|(a_tag, a), (b_tag, b)| a.cmp(b).then_with(|| b_tag.name.cmp(&a_tag.name)))
}
