use crate::config::PushAuth;
use crate::domain::Tag;
use crate::error::{ResolverError, Result};
use crate::git::CommitInfo;
use git2::{Cred, CredentialType, ErrorCode, Oid, Repository as Git2Repo, Signature};
use std::cell::{Cell, RefCell};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    ///
    /// A missing repository is a configuration error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repo::discover(path).map_err(|e| {
            ResolverError::config(format!(
                "Not in a git repository ({}): {}",
                path.display(),
                e.message()
            ))
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now("git-semver", "git-semver@localhost")?),
        }
    }

    fn tag_from_reference(&self, name: &str, reference: &git2::Reference<'_>) -> Option<Tag> {
        let commit = match reference.peel_to_commit() {
            Ok(commit) => commit,
            Err(e) => {
                debug!(tag = name, "skipping tag that does not point at a commit: {}", e);
                return None;
            }
        };

        let annotated = reference
            .target()
            .map(|oid| self.repo.find_tag(oid).is_ok())
            .unwrap_or(false);

        Some(Tag::new(name, commit.id().to_string(), annotated))
    }
}

fn lookup_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| {
        ResolverError::config(format!(
            "Environment variable '{}' required for push authentication is not set",
            var
        ))
    })
}

impl super::Repository for Git2Repository {
    fn is_shallow(&self) -> bool {
        self.repo.is_shallow()
    }

    fn resolve_commit(&self, rev: &str) -> Result<CommitInfo> {
        let commit = self
            .repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| ResolverError::CommitNotFound(format!("{}: {}", rev, e.message())))?;

        let message = commit.message().unwrap_or("").to_string();
        Ok(CommitInfo::new(commit.id(), message))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }

        Ok(head.shorthand().map(|s| s.to_string()))
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            if let Some(tag) = self.tag_from_reference(name, &reference) {
                tags.push(tag);
            }
        }

        Ok(tags)
    }

    fn find_tag(&self, name: &str) -> Result<Option<Tag>> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(reference) => Ok(self.tag_from_reference(name, &reference)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ResolverError::tag(format!(
                "Cannot find tag '{}': {}",
                name, e
            ))),
        }
    }

    fn commits_between(&self, from: Option<Oid>, to: Oid) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.push(to)?;
        if let Some(from) = from {
            revwalk.hide(from)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let message = commit.message().unwrap_or("").to_string();
            commits.push(CommitInfo::new(oid, message));
        }

        Ok(commits)
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn create_annotated_tag(&self, name: &str, target: Oid, message: &str) -> Result<()> {
        let object = self
            .repo
            .find_object(target, None)
            .map_err(|e| ResolverError::tag(format!("Cannot find object: {}", e)))?;

        let signature = self.signature()?;
        self.repo
            .tag(name, &object, &signature, message, false)
            .map_err(|e| ResolverError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo
            .tag_delete(name)
            .map_err(|e| ResolverError::tag(format!("Cannot delete tag '{}': {}", name, e)))
    }

    fn push_tag(&self, remote_name: &str, name: &str, auth: &PushAuth) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|_| {
            ResolverError::remote(format!("No remote named '{}' found", remote_name))
        })?;

        // Secrets are looked up before any network traffic.
        let token = match auth {
            PushAuth::Token { token_env, .. } => Some(lookup_env(token_env)?),
            _ => None,
        };
        let passphrase = match auth {
            PushAuth::SshKey {
                passphrase_env: Some(var),
                ..
            } => Some(lookup_env(var)?),
            _ => None,
        };
        let git_config = self.repo.config()?;

        let attempts = Cell::new(0u32);
        let rejection: RefCell<Option<String>> = RefCell::new(None);

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|url, username_from_url, allowed_types| {
            // libgit2 calls back again after a rejected credential; one channel, one try.
            attempts.set(attempts.get() + 1);
            if attempts.get() > 1 {
                return Err(git2::Error::from_str(&format!(
                    "{} credentials were rejected",
                    auth.name()
                )));
            }

            let user = username_from_url.unwrap_or("git");
            match auth {
                PushAuth::Token { username, .. } => {
                    if !allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                        return Err(git2::Error::from_str(
                            "token authentication requires an https remote",
                        ));
                    }
                    Cred::userpass_plaintext(username, token.as_deref().unwrap_or(""))
                }
                PushAuth::SshKey { path, .. } => {
                    Cred::ssh_key(user, None, Path::new(path), passphrase.as_deref())
                }
                PushAuth::SshAgent => Cred::ssh_key_from_agent(user),
                PushAuth::Default => Cred::credential_helper(&git_config, url, username_from_url)
                    .or_else(|_| Cred::default()),
            }
        });

        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                *rejection.borrow_mut() = Some(format!("{} rejected: {}", refname, status));
            }
            Ok(())
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        debug!(remote = remote_name, tag = name, auth = auth.name(), "pushing tag");

        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    ResolverError::remote(format!("Network error during push: {}", e))
                } else {
                    ResolverError::remote(format!("Failed to push tag '{}': {}", name, e))
                }
            })?;

        let rejected = rejection.borrow_mut().take();
        if let Some(reason) = rejected {
            return Err(ResolverError::remote(reason));
        }

        Ok(())
    }
}

// SAFETY: git2::Repository is Send; shared references are only used for
// read operations and single-threaded tag writes within one resolution.
unsafe impl Sync for Git2Repository {}
