use thiserror::Error;

/// Unified error type for version resolution and tag publication
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file is invalid: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Tag conflict: '{tag}' already points at {existing}, refusing to move it to {requested}")]
    TagConflict {
        tag: String,
        existing: String,
        requested: String,
    },

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Repository at '{0}' is a shallow clone; full history is required")]
    ShallowClone(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-semver
pub type Result<T> = std::result::Result<T, ResolverError>;

impl ResolverError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ResolverError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ResolverError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ResolverError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ResolverError::Remote(msg.into())
    }
}
