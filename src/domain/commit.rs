use crate::domain::version::BumpKind;
use serde::Serialize;
use std::fmt;

/// Classification of a commit subject line
///
/// Variants are ordered by strength, so the bump for a range of commits is
/// the maximum over their kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitKind {
    Unclassified,
    Fix,
    Feature,
    Breaking,
}

impl CommitKind {
    /// The bump this kind of commit forces on its own
    pub fn bump(self) -> BumpKind {
        match self {
            CommitKind::Breaking => BumpKind::Major,
            CommitKind::Feature => BumpKind::Minor,
            CommitKind::Fix => BumpKind::Patch,
            CommitKind::Unclassified => BumpKind::None,
        }
    }
}

impl fmt::Display for CommitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitKind::Unclassified => "unclassified",
            CommitKind::Fix => "fix",
            CommitKind::Feature => "feature",
            CommitKind::Breaking => "breaking",
        };
        f.write_str(name)
    }
}

/// First line of a commit message, without trailing whitespace
pub fn subject_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}

/// Bump for a whole commit range.
///
/// A non-empty range never yields `None`: unclassifiable history still
/// moves the patch number.
pub fn range_bump<I>(kinds: I) -> BumpKind
where
    I: IntoIterator<Item = CommitKind>,
{
    let mut count = 0usize;
    let strongest = kinds
        .into_iter()
        .inspect(|_| count += 1)
        .max()
        .unwrap_or(CommitKind::Unclassified);

    match (count, strongest.bump()) {
        (0, _) => BumpKind::None,
        (_, BumpKind::None) => BumpKind::Patch,
        (_, bump) => bump,
    }
}
