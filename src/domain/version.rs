use crate::error::{ResolverError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Semantic version representation
///
/// Pre-release and build-metadata labels are restricted to `[A-Za-z0-9.-]+`.
/// Build metadata never takes part in precedence; it only breaks ties so that
/// `Ord` stays consistent with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
    pub build: Option<String>,
}

fn strict_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^v?(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$")
            .expect("strict tag pattern is valid")
    })
}

fn full_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^v?(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:-([A-Za-z0-9.-]+))?(?:\+([A-Za-z0-9.-]+))?$",
        )
        .expect("full version pattern is valid")
    })
}

/// Whether a label only uses characters allowed in pre-release/build segments
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

impl SemVer {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemVer {
            major,
            minor,
            patch,
            pre: None,
            build: None,
        }
    }

    /// Parse a tag name as a strict release version (e.g., "v1.2.3" -> 1.2.3)
    ///
    /// Only `[v]MAJOR.MINOR.PATCH` qualifies; any suffix disqualifies the tag.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let captures = strict_tag_regex().captures(tag)?;
        let component = |i: usize| captures.get(i)?.as_str().parse::<u64>().ok();

        Some(SemVer::new(component(1)?, component(2)?, component(3)?))
    }

    /// Bump version according to bump kind
    ///
    /// The result never carries pre-release or build labels. Fails when the
    /// bumped component would exceed `u64::MAX`.
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let next = |component: u64| {
            component.checked_add(1).ok_or_else(|| {
                ResolverError::version(format!("Cannot apply {} bump to {}: component overflows", kind, self))
            })
        };

        Ok(match kind {
            BumpKind::Major => SemVer::new(next(self.major)?, 0, 0),
            BumpKind::Minor => SemVer::new(self.major, next(self.minor)?, 0),
            BumpKind::Patch => SemVer::new(self.major, self.minor, next(self.patch)?),
            BumpKind::None => self.core(),
        })
    }

    /// The `MAJOR.MINOR.PATCH` part without any labels
    pub fn core(&self) -> Self {
        SemVer::new(self.major, self.minor, self.patch)
    }

    /// Attach a pre-release label
    pub fn with_pre(mut self, pre: impl Into<String>) -> Result<Self> {
        let pre = pre.into();
        if !is_valid_label(&pre) {
            return Err(ResolverError::version(format!(
                "Invalid pre-release label: '{}'",
                pre
            )));
        }
        self.pre = Some(pre);
        Ok(self)
    }

    /// Attach a build-metadata label
    pub fn with_build(mut self, build: impl Into<String>) -> Result<Self> {
        let build = build.into();
        if !is_valid_label(&build) {
            return Err(ResolverError::version(format!(
                "Invalid build metadata: '{}'",
                build
            )));
        }
        self.build = Some(build);
        Ok(self)
    }

    /// Tag name for this version with the given prefix (e.g., "v1.2.3")
    pub fn tag_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self)
    }
}

impl FromStr for SemVer {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        let captures = full_version_regex().captures(s).ok_or_else(|| {
            ResolverError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z[-pre][+build]",
                s
            ))
        })?;

        let component = |i: usize| -> Result<u64> {
            captures[i]
                .parse::<u64>()
                .map_err(|_| ResolverError::version(format!("Version component too large in '{}'", s)))
        };

        Ok(SemVer {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            pre: captures.get(4).map(|m| m.as_str().to_string()),
            build: captures.get(5).map(|m| m.as_str().to_string()),
        })
    }
}

fn compare_prerelease(a: &str, b: &str) -> Ordering {
    // Labels such as "01.3-abc" are fine for us but not for the semver crate.
    match (semver::Prerelease::new(a), semver::Prerelease::new(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

/// Version bump kind decision
///
/// Ordered so that the strongest bump in a commit range is simply the max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpKind::None => "none",
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        };
        f.write_str(name)
    }
}

/// Render a version so it can be used as a container image tag.
///
/// Registry tag names disallow `+`; every `+` becomes `-`, nothing else changes.
pub fn docker_safe(version: &str) -> String {
    version.replace('+', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_with_prefix() {
        assert_eq!(SemVer::parse_tag("v1.2.3"), Some(SemVer::new(1, 2, 3)));
    }

    #[test]
    fn test_parse_tag_without_prefix() {
        assert_eq!(SemVer::parse_tag("1.2.3"), Some(SemVer::new(1, 2, 3)));
    }

    #[test]
    fn test_parse_tag_rejects_suffixes_and_junk() {
        for tag in [
            "v1.2",
            "v1.2.3.4",
            "v1.2.3-rc.1",
            "v1.2.3+meta",
            "release-1.2.3",
            "V1.2.3",
            "v01.2.3",
            "vv1.2.3",
            "backend-v1.0.0",
            "",
        ] {
            assert_eq!(SemVer::parse_tag(tag), None, "tag {:?} should be ignored", tag);
        }
    }

    #[test]
    fn test_parse_tag_overflow_is_ignored() {
        assert_eq!(SemVer::parse_tag("v99999999999999999999999.0.0"), None);
    }

    #[test]
    fn test_from_str_full() {
        let v: SemVer = "1.3.0-alpha.3-abc1234+build.7".parse().unwrap();
        assert_eq!(v.core(), SemVer::new(1, 3, 0));
        assert_eq!(v.pre.as_deref(), Some("alpha.3-abc1234"));
        assert_eq!(v.build.as_deref(), Some("build.7"));
        assert_eq!(v.to_string(), "1.3.0-alpha.3-abc1234+build.7");
    }

    #[test]
    fn test_from_str_rejects_bad_labels() {
        assert!("1.2.3-feat/x".parse::<SemVer>().is_err());
        assert!("1.2.3+".parse::<SemVer>().is_err());
        assert!("1.2".parse::<SemVer>().is_err());
    }

    #[test]
    fn test_bump_kinds() {
        let v = SemVer::new(1, 2, 3);
        assert_eq!(v.bump(BumpKind::Major).unwrap(), SemVer::new(2, 0, 0));
        assert_eq!(v.bump(BumpKind::Minor).unwrap(), SemVer::new(1, 3, 0));
        assert_eq!(v.bump(BumpKind::Patch).unwrap(), SemVer::new(1, 2, 4));
        assert_eq!(v.bump(BumpKind::None).unwrap(), v);
    }

    #[test]
    fn test_bump_at_component_limit_is_error() {
        let v = SemVer::parse_tag("v1.2.18446744073709551615").unwrap();
        assert!(matches!(v.bump(BumpKind::Patch), Err(ResolverError::Version(_))));
        assert_eq!(v.bump(BumpKind::Minor).unwrap(), SemVer::new(1, 3, 0));

        let v = SemVer::new(u64::MAX, 0, 0);
        assert!(v.bump(BumpKind::Major).is_err());
        assert_eq!(v.bump(BumpKind::None).unwrap(), v);
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        let pre = SemVer::new(1, 3, 0).with_pre("alpha.3-abc1234").unwrap();
        assert!(pre < SemVer::new(1, 3, 0));
        assert!(pre > SemVer::new(1, 2, 9));
    }

    #[test]
    fn test_ordering_by_components() {
        let mut versions = vec![
            SemVer::new(1, 10, 0),
            SemVer::new(1, 2, 0),
            SemVer::new(2, 0, 0),
            SemVer::new(1, 2, 10),
        ];
        versions.sort();
        assert_eq!(
            versions.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            vec!["1.2.0", "1.2.10", "1.10.0", "2.0.0"]
        );
    }

    #[test]
    fn test_prerelease_numeric_identifiers_compare_numerically() {
        let a = SemVer::new(1, 0, 0).with_pre("alpha.2").unwrap();
        let b = SemVer::new(1, 0, 0).with_pre("alpha.10").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_with_pre_rejects_invalid_label() {
        assert!(SemVer::new(1, 0, 0).with_pre("feature/x").is_err());
        assert!(SemVer::new(1, 0, 0).with_build("").is_err());
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(SemVer::new(1, 3, 0).tag_name("v"), "v1.3.0");
    }

    #[test]
    fn test_docker_safe() {
        assert_eq!(
            docker_safe("1.3.0-alpha.3-abc1234+buildmeta"),
            "1.3.0-alpha.3-abc1234-buildmeta"
        );
        assert_eq!(docker_safe("1.2.3"), "1.2.3");
        assert!(!docker_safe("1.0.0+a+b").contains('+'));
    }

    #[test]
    fn test_bump_kind_ordering_and_display() {
        assert!(BumpKind::Major > BumpKind::Minor);
        assert!(BumpKind::Minor > BumpKind::Patch);
        assert!(BumpKind::Patch > BumpKind::None);
        assert_eq!(BumpKind::Minor.to_string(), "minor");
    }
}
