use crate::config::PushAuth;
use crate::domain::Tag;
use crate::error::{ResolverError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct MockCommit {
    info: CommitInfo,
    parents: Vec<Oid>,
}

/// In-memory commit graph for testing without actual git operations
///
/// Tag writes and pushes go through interior mutability so the mock can be
/// used behind the shared `&self` of the [Repository] trait.
pub struct MockRepository {
    commits: HashMap<Oid, MockCommit>,
    head: Option<Oid>,
    branch: Option<String>,
    shallow: bool,
    tags: Mutex<HashMap<String, Tag>>,
    pushed: Mutex<Vec<(String, String)>>,
    remote_tags: Mutex<HashMap<String, String>>,
    push_failure: Option<String>,
}

/// Deterministic object id for the n-th fake commit
pub fn fake_oid(n: u8) -> Oid {
    let mut bytes = [0u8; 20];
    bytes[0] = n;
    bytes[19] = n;
    Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero())
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            head: None,
            branch: None,
            shallow: false,
            tags: Mutex::new(HashMap::new()),
            pushed: Mutex::new(Vec::new()),
            remote_tags: Mutex::new(HashMap::new()),
            push_failure: None,
        }
    }

    /// Add a commit with its parents
    pub fn add_commit(&mut self, oid: Oid, message: &str, parents: &[Oid]) {
        self.commits.insert(
            oid,
            MockCommit {
                info: CommitInfo::new(oid, message),
                parents: parents.to_vec(),
            },
        );
    }

    /// Build a linear history from oldest to newest; returns the commit ids
    pub fn linear(messages: &[&str]) -> (Self, Vec<Oid>) {
        let mut repo = MockRepository::new();
        let mut oids = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            let oid = fake_oid(i as u8 + 1);
            let parents: Vec<Oid> = oids.last().copied().into_iter().collect();
            repo.add_commit(oid, message, &parents);
            oids.push(oid);
        }
        (repo, oids)
    }

    /// Add a tag pointing to a commit
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        let name = name.into();
        let tag = Tag::new(name.clone(), oid.to_string(), true);
        self.tags
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name, tag);
    }

    /// Record a tag that only exists on the remote
    pub fn add_remote_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.remote_tags
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), oid.to_string());
    }

    /// Point HEAD at a specific commit
    pub fn set_head(&mut self, oid: Oid) {
        self.head = Some(oid);
    }

    /// Set the checked-out branch
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = Some(branch.into());
    }

    pub fn set_shallow(&mut self, shallow: bool) {
        self.shallow = shallow;
    }

    /// Make every push fail with the given message
    pub fn fail_pushes(&mut self, message: impl Into<String>) {
        self.push_failure = Some(message.into());
    }

    /// `(remote, tag)` pairs pushed so far
    pub fn pushed(&self) -> Vec<(String, String)> {
        self.pushed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn ancestors(&self, start: Oid) -> HashSet<Oid> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(oid) = queue.pop_front() {
            if !seen.insert(oid) {
                continue;
            }
            if let Some(commit) = self.commits.get(&oid) {
                queue.extend(commit.parents.iter().copied());
            }
        }
        seen
    }

    fn require(&self, oid: Oid) -> Result<&MockCommit> {
        self.commits
            .get(&oid)
            .ok_or_else(|| ResolverError::CommitNotFound(oid.to_string()))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn is_shallow(&self) -> bool {
        self.shallow
    }

    fn resolve_commit(&self, rev: &str) -> Result<CommitInfo> {
        let oid = if let (Some(head), "HEAD") = (self.head, rev) {
            head
        } else if rev == "HEAD" {
            // Newest commit: the one no other commit lists as a parent.
            let parents: HashSet<Oid> = self
                .commits
                .values()
                .flat_map(|c| c.parents.iter().copied())
                .collect();
            let mut heads: Vec<Oid> = self
                .commits
                .keys()
                .filter(|oid| !parents.contains(oid))
                .copied()
                .collect();
            heads.sort();
            heads
                .pop()
                .ok_or_else(|| ResolverError::CommitNotFound(rev.to_string()))?
        } else {
            Oid::from_str(rev).map_err(|_| ResolverError::CommitNotFound(rev.to_string()))?
        };

        Ok(self.require(oid)?.info.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let tags = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        let mut list: Vec<Tag> = tags.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    fn find_tag(&self, name: &str) -> Result<Option<Tag>> {
        let tags = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tags.get(name).cloned())
    }

    fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<CommitInfo>> {
        self.require(to)?;
        let hidden = from.map(|f| self.ancestors(f)).unwrap_or_default();

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([to]);
        let mut commits = Vec::new();
        while let Some(oid) = queue.pop_front() {
            if hidden.contains(&oid) || !seen.insert(oid) {
                continue;
            }
            let commit = self.require(oid)?;
            commits.push(commit.info.clone());
            queue.extend(commit.parents.iter().copied());
        }

        Ok(commits)
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.ancestors(descendant).contains(&ancestor))
    }

    fn create_annotated_tag(&self, name: &str, target: Oid, _message: &str) -> Result<()> {
        self.require(target)?;
        let mut tags = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        if tags.contains_key(name) {
            return Err(ResolverError::tag(format!("Tag '{}' already exists", name)));
        }
        tags.insert(name.to_string(), Tag::new(name, target.to_string(), true));
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        let mut tags = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        tags.remove(name)
            .map(|_| ())
            .ok_or_else(|| ResolverError::tag(format!("Tag '{}' does not exist", name)))
    }

    fn push_tag(&self, remote: &str, name: &str, _auth: &PushAuth) -> Result<()> {
        if let Some(message) = &self.push_failure {
            return Err(ResolverError::remote(message.clone()));
        }

        let local = self
            .find_tag(name)?
            .ok_or_else(|| ResolverError::remote(format!("src refspec {} does not match any", name)))?;

        let mut remote_tags = self.remote_tags.lock().unwrap_or_else(|e| e.into_inner());
        match remote_tags.get(name) {
            Some(target) if target != &local.target => {
                return Err(ResolverError::remote(format!(
                    "refs/tags/{} rejected: already exists",
                    name
                )));
            }
            _ => {
                remote_tags.insert(name.to_string(), local.target.clone());
            }
        }

        self.pushed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_history_head() {
        let (repo, oids) = MockRepository::linear(&["first", "second", "third"]);
        let head = repo.resolve_commit("HEAD").unwrap();
        assert_eq!(head.oid, oids[2]);
        assert_eq!(head.subject(), "third");
    }

    #[test]
    fn test_resolve_by_hash() {
        let (repo, oids) = MockRepository::linear(&["first", "second"]);
        let commit = repo.resolve_commit(&oids[0].to_string()).unwrap();
        assert_eq!(commit.message, "first");
        assert!(repo.resolve_commit("deadbeef").is_err());
    }

    #[test]
    fn test_commits_between_excludes_from() {
        let (repo, oids) = MockRepository::linear(&["a", "b", "c", "d"]);
        let commits = repo.commits_between(Some(oids[1]), oids[3]).unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["d", "c"]);

        let all = repo.commits_between(None, oids[3]).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_is_ancestor_on_branches() {
        let (mut repo, oids) = MockRepository::linear(&["a", "b"]);
        let side = fake_oid(50);
        repo.add_commit(side, "side", &[oids[0]]);

        assert!(repo.is_ancestor(oids[0], oids[1]).unwrap());
        assert!(repo.is_ancestor(oids[1], oids[1]).unwrap());
        assert!(!repo.is_ancestor(side, oids[1]).unwrap());
        assert!(!repo.is_ancestor(oids[1], side).unwrap());

        repo.set_head(side);
        assert_eq!(repo.resolve_commit("HEAD").unwrap().oid, side);
    }

    #[test]
    fn test_tags_round_trip() {
        let (mut repo, oids) = MockRepository::linear(&["a"]);
        repo.add_tag("v1.0.0", oids[0]);

        let tag = repo.find_tag("v1.0.0").unwrap().unwrap();
        assert!(tag.targets(&oids[0].to_string()));
        assert!(repo.find_tag("v2.0.0").unwrap().is_none());
        assert_eq!(repo.list_tags().unwrap().len(), 1);
    }

    #[test]
    fn test_create_existing_tag_fails() {
        let (mut repo, oids) = MockRepository::linear(&["a"]);
        repo.add_tag("v1.0.0", oids[0]);
        assert!(repo.create_annotated_tag("v1.0.0", oids[0], "again").is_err());
    }

    #[test]
    fn test_push_rejected_when_remote_tag_differs() {
        let (mut repo, oids) = MockRepository::linear(&["a", "b"]);
        repo.add_remote_tag("v1.0.0", oids[0]);
        repo.create_annotated_tag("v1.0.0", oids[1], "release").unwrap();

        let result = repo.push_tag("origin", "v1.0.0", &PushAuth::Default);
        assert!(matches!(result, Err(ResolverError::Remote(_))));
        assert!(repo.pushed().is_empty());
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags().unwrap().is_empty());
        assert!(repo.resolve_commit("HEAD").is_err());
    }
}
