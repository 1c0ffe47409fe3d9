use std::fmt;

/// Non-fatal conditions met while resolving a version.
/// These are reported to the user but never abort resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// No new commits since the reference tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
    /// Tag exists but cannot be parsed as a semantic version
    UnparsableTag { tag: String },
    /// Candidate release tag already exists at another commit
    TagCollision { tag: String, target: String },
    /// Every patch candidate was taken; a pre-release was used instead
    CollisionRetriesExhausted { version: String, attempts: u32 },
}

fn short(hash: &str) -> &str {
    if hash.len() > 7 {
        &hash[..7]
    } else {
        hash
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => {
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    latest_tag,
                    short(current_commit_hash)
                )
            }
            BoundaryWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': not a semantic version", tag)
            }
            BoundaryWarning::TagCollision { tag, target } => {
                write!(
                    f,
                    "Tag '{}' already exists at {}, trying next patch version",
                    tag,
                    short(target)
                )
            }
            BoundaryWarning::CollisionRetriesExhausted { version, attempts } => {
                write!(
                    f,
                    "No free release tag after {} attempts, falling back to pre-release {}",
                    attempts, version
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_new_commits_shortens_hash() {
        let w = BoundaryWarning::NoNewCommits {
            latest_tag: "v1.0.0".into(),
            current_commit_hash: "abc1234def5678".into(),
        };
        assert_eq!(w.to_string(), "No new commits since tag 'v1.0.0' (current: abc1234)");
    }

    #[test]
    fn test_collision_display() {
        let w = BoundaryWarning::TagCollision {
            tag: "v1.3.0".into(),
            target: "def".into(),
        };
        assert!(w.to_string().contains("v1.3.0"));
        assert!(w.to_string().contains("at def,"));
    }
}
