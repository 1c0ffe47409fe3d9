//! User interface module - decision rendering and status output.
//!
//! Separates concerns:
//! - `formatter` - Styled status lines for humans (stderr)
//! - This module - Machine-readable renderings of a decision (stdout)

use anyhow::Result;
use clap::ValueEnum;

use crate::domain::VersionDecision;

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_decision_summary, display_error, display_publish_outcome,
    display_status, display_success,
};

/// How the decision is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `key: value` lines
    #[default]
    Text,
    /// A JSON object
    Json,
    /// `KEY=value` lines suitable for sourcing or CI parameter files
    Env,
}

/// Render a decision in the requested format
pub fn render_decision(decision: &VersionDecision, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(decision)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(decision)?),
        OutputFormat::Env => Ok(render_env(decision)),
    }
}

fn render_text(decision: &VersionDecision) -> String {
    let mut lines = vec![
        format!("version: {}", decision.version),
        format!("docker_version: {}", decision.docker_version),
        format!("source: {}", decision.source),
        format!("bump: {}", decision.bump),
        format!("should_tag: {}", decision.should_tag),
    ];
    if let Some(tag) = &decision.tag_name {
        lines.push(format!("tag: {}", tag));
    }
    if let Some(reference) = &decision.reference_tag {
        lines.push(format!("reference_tag: {}", reference));
    }
    lines.push(format!("commits_since_tag: {}", decision.commits_since_tag));
    lines.push(format!("commit: {}", decision.commit));

    lines.join("\n")
}

/// `KEY=value` lines; absent labels render as empty values
pub fn render_env(decision: &VersionDecision) -> String {
    let pairs = [
        ("SEMANTIC_VERSION", decision.version.clone()),
        ("DOCKER_VERSION", decision.docker_version.clone()),
        ("VERSION_SOURCE", decision.source.to_string()),
        ("VERSION_BUMP", decision.bump.to_string()),
        ("VERSION_MAJOR", decision.major.to_string()),
        ("VERSION_MINOR", decision.minor.to_string()),
        ("VERSION_PATCH", decision.patch.to_string()),
        ("VERSION_PRERELEASE", decision.prerelease.clone().unwrap_or_default()),
        ("VERSION_BUILD", decision.build_metadata.clone().unwrap_or_default()),
        ("SHOULD_TAG", decision.should_tag.to_string()),
    ];

    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BumpKind, DecisionContext, SemVer, VersionSource};

    fn prerelease_decision() -> VersionDecision {
        let version: SemVer = "1.3.0-alpha.3-abc1234+build.7".parse().unwrap();
        let context = DecisionContext {
            reference_tag: Some("v1.2.3".into()),
            commits_since_tag: 3,
            commit: "abc1234def".into(),
            short_hash: "abc1234".into(),
        };
        VersionDecision::new(&version, BumpKind::Minor, VersionSource::Derived, context)
    }

    #[test]
    fn test_render_env() {
        let env = render_env(&prerelease_decision());
        let lines: Vec<&str> = env.lines().collect();
        assert_eq!(lines[0], "SEMANTIC_VERSION=1.3.0-alpha.3-abc1234+build.7");
        assert_eq!(lines[1], "DOCKER_VERSION=1.3.0-alpha.3-abc1234-build.7");
        assert!(lines.contains(&"VERSION_SOURCE=derived"));
        assert!(lines.contains(&"VERSION_BUMP=minor"));
        assert!(lines.contains(&"VERSION_MINOR=3"));
        assert!(lines.contains(&"VERSION_PRERELEASE=alpha.3-abc1234"));
        assert!(lines.contains(&"VERSION_BUILD=build.7"));
        assert!(lines.contains(&"SHOULD_TAG=false"));
    }

    #[test]
    fn test_render_env_release_has_empty_labels() {
        let decision = VersionDecision::new(
            &SemVer::new(2, 0, 0),
            BumpKind::Major,
            VersionSource::Derived,
            DecisionContext::default(),
        )
        .release("v2.0.0");
        let env = render_env(&decision);
        assert!(env.contains("VERSION_PRERELEASE=\n"));
        assert!(env.contains("SHOULD_TAG=true"));
    }

    #[test]
    fn test_render_json() {
        let json = render_decision(&prerelease_decision(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.3.0-alpha.3-abc1234+build.7");
        assert_eq!(value["should_tag"], false);
        assert_eq!(value["source"], "derived");
        assert_eq!(value["tag_name"], serde_json::Value::Null);
    }

    #[test]
    fn test_render_text() {
        let text = render_decision(&prerelease_decision(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("version: 1.3.0-alpha.3-abc1234+build.7\n"));
        assert!(text.contains("reference_tag: v1.2.3"));
        assert!(!text.lines().any(|line| line.starts_with("tag:")));
    }
}
