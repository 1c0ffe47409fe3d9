//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! resolver and the publisher need, with a real implementation on top of
//! `git2` and an in-memory one for tests.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory commit graph for testing
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use git_semver::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! let head = repo.resolve_commit("HEAD")?;
//! let commits = repo.commits_between(None, head.oid)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::config::PushAuth;
use crate::domain::commit::subject_line;
use crate::domain::Tag;
use crate::error::Result;
use git2::Oid;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub oid: Oid,
    /// The full commit hash
    pub hash: String,
    /// The full commit message
    pub message: String,
}

impl CommitInfo {
    pub fn new(oid: Oid, message: impl Into<String>) -> Self {
        CommitInfo {
            oid,
            hash: oid.to_string(),
            message: message.into(),
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        subject_line(&self.message)
    }

    /// Leading `len` characters of the hash
    pub fn short_hash(&self, len: usize) -> &str {
        &self.hash[..len.min(self.hash.len())]
    }
}

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// "cannot read the repository at all" conditions to configuration errors and
/// transport problems to [crate::error::ResolverError::Remote].
pub trait Repository: Send + Sync {
    /// Whether the repository only has truncated history
    fn is_shallow(&self) -> bool;

    /// Resolve a revision (`HEAD`, a branch, a hash) to a commit
    ///
    /// # Returns
    /// * `Ok(CommitInfo)` - The commit the revision peels to
    /// * `Err(CommitNotFound)` - If the revision does not name a commit
    fn resolve_commit(&self, rev: &str) -> Result<CommitInfo>;

    /// Short name of the checked-out branch, `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// All tags in the repository with the commits they peel to
    ///
    /// Tags that do not point at commits are skipped.
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Find a tag by name
    ///
    /// # Returns
    /// * `Ok(Some(Tag))` - If the tag exists
    /// * `Ok(None)` - If the tag doesn't exist
    fn find_tag(&self, name: &str) -> Result<Option<Tag>>;

    /// Commits reachable from `to` but not from `from`
    ///
    /// `from` is exclusive, `to` inclusive. With `from = None` the whole
    /// history of `to` is returned. Order is newest first.
    fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<CommitInfo>>;

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Create an annotated tag at `target`
    ///
    /// Fails if a tag with that name already exists.
    fn create_annotated_tag(&self, name: &str, target: Oid, message: &str) -> Result<()>;

    /// Delete a local tag
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Push one tag to `remote` using exactly the given credential channel
    ///
    /// The push never forces: a remote tag at a different commit rejects it.
    fn push_tag(&self, remote: &str, name: &str, auth: &PushAuth) -> Result<()>;
}
