//! Domain logic - pure business rules independent of git operations

pub mod branch;
pub mod commit;
pub mod decision;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::BranchContext;
pub use commit::CommitKind;
pub use decision::{DecisionContext, VersionDecision, VersionSource};
pub use prerelease::{PreRelease, PreReleaseType};
pub use tag::Tag;
pub use version::{docker_safe, BumpKind, SemVer};
