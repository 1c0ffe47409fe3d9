//! Human-facing status lines.
//!
//! Everything here writes to stderr so stdout only ever carries the rendered
//! decision.

use crate::boundary::BoundaryWarning;
use crate::domain::VersionDecision;
use crate::publish::PublishOutcome;
use console::style;

/// Format an error message in red.
pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

/// Format a success message with green checkmark.
pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

/// Format a status message with yellow arrow.
pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_boundary_warning(warning: &BoundaryWarning) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow(), warning)
}

/// One-line audit summary of which decision branch produced the version
pub fn format_decision_summary(decision: &VersionDecision) -> String {
    let reference = decision.reference_tag.as_deref().unwrap_or("none");
    format!(
        "{} {} (source: {}, bump: {}, reference: {}, commits since: {})",
        style("Version").bold(),
        style(&decision.version).cyan(),
        decision.source,
        decision.bump,
        reference,
        decision.commits_since_tag
    )
}

pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

pub fn display_success(message: &str) {
    eprintln!("{}", format_success(message));
}

pub fn display_status(message: &str) {
    eprintln!("{}", format_status(message));
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{}", format_boundary_warning(warning));
}

pub fn display_decision_summary(decision: &VersionDecision) {
    eprintln!("{}", format_decision_summary(decision));
}

/// Display the result of the publish step.
///
/// Created tags are reported as success, everything else as status.
pub fn display_publish_outcome(outcome: &PublishOutcome) {
    match outcome {
        PublishOutcome::Created { .. } | PublishOutcome::AlreadyPublished { .. } => {
            display_success(&outcome.to_string())
        }
        PublishOutcome::Skipped { .. } | PublishOutcome::WouldCreate { .. } => {
            display_status(&outcome.to_string())
        }
    }
}
