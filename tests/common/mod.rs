//! Helpers for building throwaway repositories with git2
#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Fresh repository whose unborn HEAD points at `main`
pub fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    repo.set_head("refs/heads/main").unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo)
}

fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

fn write_tree(repo: &Repository, content: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join("file.txt"), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("file.txt")).unwrap();
    index.write().unwrap();
    index.write_tree().unwrap()
}

/// Commit on the checked-out branch
pub fn commit(repo: &Repository, message: &str) -> Oid {
    let tree = repo.find_tree(write_tree(repo, message)).unwrap();
    let parents: Vec<Commit<'_>> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();
    let sig = signature();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Commit on top of `parent` without moving any branch
pub fn commit_aside(repo: &Repository, message: &str, parent: Oid) -> Oid {
    let tree = repo.find_tree(write_tree(repo, message)).unwrap();
    let parent = repo.find_commit(parent).unwrap();
    let sig = signature();

    repo.commit(None, &sig, &sig, message, &tree, &[&parent])
        .unwrap()
}

pub fn annotated_tag(repo: &Repository, name: &str, target: Oid) {
    let object = repo.find_object(target, None).unwrap();
    repo.tag(name, &object, &signature(), name, false).unwrap();
}

pub fn lightweight_tag(repo: &Repository, name: &str, target: Oid) {
    let object = repo.find_object(target, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap();
}

/// Create a branch at HEAD and check it out
pub fn checkout_new_branch(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(name, &head, false).unwrap();
    repo.set_head(&format!("refs/heads/{}", name)).unwrap();
}

pub fn short(oid: Oid) -> String {
    oid.to_string()[..7].to_string()
}
