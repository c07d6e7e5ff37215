use crate::error::{ReleaseError, Result};
use crate::git::TagStore;
use chrono::{DateTime, FixedOffset};
use git2::{
    Commit, Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks,
    Repository as Git2Repo,
};
use std::path::Path;

/// Give up on a remote after this many rejected credentials
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Wrapper around git2::Repository implementing [`TagStore`]
pub struct Git2TagStore {
    repo: Git2Repo,
    token: Option<String>,
}

impl Git2TagStore {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2TagStore { repo, token: None })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2TagStore { repo, token: None }
    }

    /// Use an access token for HTTPS remotes when fetching
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn tag_commit(&self, tag: &str) -> Result<Commit<'_>> {
        let reference = self.repo.find_reference(&format!("refs/tags/{}", tag))?;
        Ok(reference.peel_to_commit()?)
    }

    /// Creation time used for `--sort=-creatordate` ordering
    fn creator_time(&self, tag: &str) -> Option<i64> {
        let reference = self.repo.find_reference(&format!("refs/tags/{}", tag)).ok()?;

        if let Some(tagger) = reference
            .target()
            .and_then(|oid| self.repo.find_tag(oid).ok())
            .and_then(|annotated| annotated.tagger().map(|sig| sig.when().seconds()))
        {
            return Some(tagger);
        }

        let commit = reference.peel_to_commit().ok()?;
        let seconds = commit.committer().when().seconds();
        Some(seconds)
    }

    fn credentials_callback(&self) -> RemoteCallbacks<'static> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0u32;
        let token = self.token.clone();

        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication rejected by remote"));
            }

            // Token authentication for HTTPS remotes
            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(token) = token.as_deref() {
                    return Cred::userpass_plaintext("x-access-token", token);
                }
            }

            if allowed_types.contains(CredentialType::SSH_KEY) {
                let username = username_from_url.unwrap_or("git");
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }

            Cred::default()
        });

        callbacks
    }
}

impl TagStore for Git2TagStore {
    fn fetch_tags(&self, remote: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote)?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.credentials_callback());

        remote.fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut fetch_options), None)?;

        Ok(())
    }

    fn list_tags_by_creation(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;

        let mut tags: Vec<(i64, String)> = names
            .iter()
            .flatten()
            .map(|name| (self.creator_time(name).unwrap_or(0), name.to_string()))
            .collect();

        tags.sort_by(|a, b| b.cmp(a));

        Ok(tags.into_iter().map(|(_, name)| name).collect())
    }

    fn read_file_at_tag(&self, tag: &str, path: &str) -> Result<Option<String>> {
        let tree = self.tag_commit(tag)?.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;

        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }

    fn tag_commit_date(&self, tag: &str) -> Result<DateTime<FixedOffset>> {
        let commit = self.tag_commit(tag)?;
        let when = commit.author().when();

        let offset = FixedOffset::east_opt(when.offset_minutes() * 60).ok_or_else(|| {
            ReleaseError::VersionControl(git2::Error::from_str("invalid author time offset"))
        })?;

        DateTime::from_timestamp(when.seconds(), 0)
            .map(|utc| utc.with_timezone(&offset))
            .ok_or_else(|| {
                ReleaseError::VersionControl(git2::Error::from_str("invalid author timestamp"))
            })
    }
}
