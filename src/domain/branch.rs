/// Fallback label for builds without a symbolic branch
pub const DETACHED_LABEL: &str = "detached";

/// Represents the branch under build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub is_main: bool,
}

impl BranchContext {
    /// Create a branch context, treating `main` and `master` as main branches
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_main_branches(name, &["main".to_string(), "master".to_string()])
    }

    /// Create a branch context with a configured set of main branch names.
    ///
    /// Full refs (`refs/heads/x`, `refs/tags/x`) are reduced to their short name.
    pub fn with_main_branches(name: impl Into<String>, main_branches: &[String]) -> Self {
        let name_str = normalize_ref(&name.into()).to_string();
        let is_main = main_branches.iter().any(|m| m == &name_str);

        BranchContext {
            name: name_str,
            is_main,
        }
    }

    /// Branch name reduced to a pre-release label
    pub fn sanitized(&self) -> String {
        let label = sanitize_branch_name(&self.name);
        if label.is_empty() {
            DETACHED_LABEL.to_string()
        } else {
            label
        }
    }
}

/// Strip `refs/heads/` or `refs/tags/` from a ref name
pub fn normalize_ref(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("refs/heads/")
        .or_else(|| name.strip_prefix("refs/tags/"))
        .unwrap_or(name)
}

/// Replace characters outside `[A-Za-z0-9.-]` with `-`, lowercase, and trim
/// leading/trailing `-`.
pub fn sanitize_branch_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    replaced.trim_matches('-').to_string()
}
