mod common;

use common::{annotated_tag, checkout_new_branch, commit, init_repo, short};
use git_semver::cli::orchestration::{run_workflow, run_workflow_with, WorkflowArgs};
use git_semver::config::Config;
use git_semver::git::MockRepository;
use git_semver::publish::{PublishOutcome, SkipReason};
use git_semver::ResolverError;

#[test]
fn test_workflow_args_defaults() {
    let args = WorkflowArgs::default();
    assert_eq!(args.commit, "HEAD");
    assert_eq!(args.branch, None);
    assert!(!args.publish);
    assert!(!args.dry_run);
}

#[test]
fn test_workflow_uses_checked_out_branch() {
    let (dir, repo) = init_repo();
    let base = commit(&repo, "chore: init");
    annotated_tag(&repo, "v2.1.0", base);
    checkout_new_branch(&repo, "bugfix/crash");
    let head = commit(&repo, "fix: crash");

    let args = WorkflowArgs {
        repo_path: dir.path().to_path_buf(),
        ..WorkflowArgs::default()
    };
    let result = run_workflow(&args, &Config::default()).unwrap();

    assert_eq!(result.branch.name, "bugfix/crash");
    assert!(!result.branch.is_main);
    assert_eq!(
        result.decision.version,
        format!("2.1.1-bugfix-crash.1-{}", short(head))
    );
    assert!(result.publish.is_none());
}

#[test]
fn test_workflow_explicit_branch_overrides_checkout() {
    let (dir, repo) = init_repo();
    let base = commit(&repo, "chore: init");
    annotated_tag(&repo, "v2.1.0", base);
    checkout_new_branch(&repo, "bugfix/crash");
    commit(&repo, "fix: crash");

    let args = WorkflowArgs {
        repo_path: dir.path().to_path_buf(),
        branch: Some("refs/heads/master".to_string()),
        ..WorkflowArgs::default()
    };
    let result = run_workflow(&args, &Config::default()).unwrap();
    assert!(result.branch.is_main);
    assert!(result.decision.version.starts_with("2.1.1-alpha.1-"));
}

#[test]
fn test_workflow_dry_run_reports_planned_tag() {
    let (dir, repo) = init_repo();
    let base = commit(&repo, "chore: init");
    annotated_tag(&repo, "v0.9.0", base);
    commit(&repo, "release: feat!: 1.0");

    let args = WorkflowArgs {
        repo_path: dir.path().to_path_buf(),
        dry_run: true,
        ..WorkflowArgs::default()
    };
    let result = run_workflow(&args, &Config::default()).unwrap();

    assert_eq!(result.decision.version, "1.0.0");
    match result.publish {
        Some(Ok(PublishOutcome::WouldCreate { tag, remote })) => {
            assert_eq!(tag, "v1.0.0");
            assert_eq!(remote, "origin");
        }
        other => panic!("unexpected publish result: {:?}", other),
    }
    assert!(repo.find_reference("refs/tags/v1.0.0").is_err());
}

#[test]
fn test_workflow_publish_failure_keeps_decision() {
    let (mut mock, oids) = MockRepository::linear(&["init", "release: ship"]);
    mock.add_tag("v1.0.0", oids[0]);
    mock.fail_pushes("network unreachable");

    let args = WorkflowArgs {
        branch: Some("main".to_string()),
        publish: true,
        ..WorkflowArgs::default()
    };
    let result = run_workflow_with(&mock, &args, &Config::default()).unwrap();

    assert!(result.publish_failed());
    assert!(matches!(result.publish, Some(Err(ResolverError::Remote(_)))));
    assert_eq!(result.decision.version, "1.0.1");
    assert!(result.decision.should_tag);
}

#[test]
fn test_workflow_publish_skipped_off_main() {
    let (mut mock, oids) = MockRepository::linear(&["init", "release: ship"]);
    mock.add_tag("v1.0.0", oids[0]);

    let args = WorkflowArgs {
        branch: Some("develop".to_string()),
        publish: true,
        ..WorkflowArgs::default()
    };
    let result = run_workflow_with(&mock, &args, &Config::default()).unwrap();

    assert!(!result.publish_failed());
    assert!(matches!(
        result.publish,
        Some(Ok(PublishOutcome::Skipped {
            reason: SkipReason::NotMainBranch
        }))
    ));
    assert!(mock.pushed().is_empty());
}

#[test]
fn test_workflow_unknown_commit_fails() {
    let (mock, _) = MockRepository::linear(&["init"]);
    let args = WorkflowArgs {
        commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
        branch: Some("main".to_string()),
        ..WorkflowArgs::default()
    };
    let error = run_workflow_with(&mock, &args, &Config::default()).unwrap_err();
    assert!(format!("{:#}", error).contains("Commit not found"));
}
