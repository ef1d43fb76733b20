//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use commitsmith::ai::AiCollaborator;
use commitsmith::error::{AiError, GitError, SessionError};
use commitsmith::git::diff::{ChangedFile, DiffContext, FileStatus};
use commitsmith::git::{BranchInfo, CommandRecord, CommitSummary, GitCollaborator};
use commitsmith::prompt::PromptRequest;
use commitsmith::grammar::CommitMessage;
use commitsmith::session::{Notice, Reviewer, Session, UserAction};

/// A small staged diff touching one source file.
pub fn sample_diff() -> DiffContext {
    DiffContext {
        text: "diff --git a/src/auth.rs b/src/auth.rs\n+pub fn login() {}\n".to_string(),
        files: vec![ChangedFile {
            path: "src/auth.rs".to_string(),
            status: FileStatus::Modified,
            old_path: None,
        }],
        insertions: 1,
        deletions: 0,
        truncated: false,
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
            config.set_bool("commit.gpgsign", false).unwrap();
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    /// Add a file to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage and commit one file. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write(name, content);
        self.stage(name);

        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Commit one file on top of `parent` on another branch, leaving HEAD alone.
    pub fn commit_on_branch(
        &self,
        branch: &str,
        parent: Oid,
        name: &str,
        content: &str,
        message: &str,
    ) -> Oid {
        let parent = self.repo.find_commit(parent).expect("Failed to find parent");
        let blob = self.repo.blob(content.as_bytes()).expect("Failed to write blob");
        let base = parent.tree().expect("Failed to read parent tree");
        let mut builder = self
            .repo
            .treebuilder(Some(&base))
            .expect("Failed to create tree builder");
        builder
            .insert(name, blob, 0o100644)
            .expect("Failed to insert blob");
        let tree = self
            .repo
            .find_tree(builder.write().expect("Failed to write tree"))
            .expect("Failed to find tree");

        let sig = self.signature();
        self.repo
            .commit(
                Some(&format!("refs/heads/{branch}")),
                &sig,
                &sig,
                message,
                &tree,
                &[&parent],
            )
            .expect("Failed to create branch commit")
    }

    pub fn set_config(&self, key: &str, value: bool) {
        let mut config = self.repo.config().expect("Failed to open repo config");
        config.set_bool(key, value).expect("Failed to set config");
    }

    pub fn head_id(&self) -> Oid {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .expect("Failed to read HEAD")
    }

    /// Messages from HEAD back to the root.
    pub fn messages(&self) -> Vec<String> {
        let mut walk = self.repo.revwalk().unwrap();
        walk.push_head().unwrap();
        walk.map(|oid| {
            let commit = self.repo.find_commit(oid.unwrap()).unwrap();
            commit.message().unwrap_or_default().trim_end().to_string()
        })
        .collect()
    }
}

/// AI collaborator that replays scripted answers and records the prompts.
pub struct FakeAi {
    answers: Mutex<VecDeque<Result<String, AiError>>>,
    pub requests: Mutex<Vec<PromptRequest>>,
}

impl FakeAi {
    pub fn new(answers: Vec<Result<String, AiError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AiCollaborator for FakeAi {
    async fn complete(&self, request: &PromptRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AiError::EmptyCompletion))
    }
}

/// Git collaborator that records applied messages instead of touching a repository.
#[derive(Default)]
pub struct FakeGit {
    /// Commit ids that `reword` accepts.
    pub known_ids: Vec<String>,
    pub applied: Mutex<Vec<(String, String)>>,
}

impl FakeGit {
    pub fn with_commits(ids: &[&str]) -> Self {
        Self {
            known_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn applied(&self) -> Vec<(String, String)> {
        self.applied.lock().unwrap().clone()
    }

    fn record(&self, operation: &str, message: &str) {
        self.applied
            .lock()
            .unwrap()
            .push((operation.to_string(), message.to_string()));
    }
}

impl GitCollaborator for FakeGit {
    fn staged_diff(&self) -> Result<DiffContext, GitError> {
        Ok(sample_diff())
    }

    fn commit_diff(&self, _rev: &str) -> Result<DiffContext, GitError> {
        Ok(sample_diff())
    }

    fn commit_message(&self, rev: &str) -> Result<String, GitError> {
        Err(GitError::CommitNotFound(rev.to_string()))
    }

    fn resolve_commit(&self, rev: &str) -> Result<String, GitError> {
        if self.known_ids.iter().any(|id| id == rev) {
            Ok(rev.to_string())
        } else {
            Err(GitError::CommitNotFound(rev.to_string()))
        }
    }

    fn recent_commits(&self, _limit: usize) -> Result<Vec<CommitSummary>, GitError> {
        Ok(Vec::new())
    }

    fn status(&self) -> Result<String, GitError> {
        Ok(String::new())
    }

    fn branches(&self) -> Result<Vec<BranchInfo>, GitError> {
        Ok(Vec::new())
    }

    fn create_branch(&self, _name: &str) -> Result<(), GitError> {
        Ok(())
    }

    fn switch_branch(&self, _name: &str) -> Result<(), GitError> {
        Ok(())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        Ok(())
    }

    fn stage_paths(&self, _paths: &[String]) -> Result<(), GitError> {
        Ok(())
    }

    fn unstage_paths(&self, _paths: &[String]) -> Result<(), GitError> {
        Ok(())
    }

    fn stash_save(&self, _message: Option<String>) -> Result<(), GitError> {
        Ok(())
    }

    fn stash_pop(&self) -> Result<(), GitError> {
        Ok(())
    }

    fn stash_list(&self) -> Result<Vec<String>, GitError> {
        Ok(Vec::new())
    }

    fn stash_apply(&self, _stash: Option<String>) -> Result<(), GitError> {
        Ok(())
    }

    fn discard_changes(&self, _paths: &[String]) -> Result<(), GitError> {
        Ok(())
    }

    fn revert_last_commit(&self) -> Result<String, GitError> {
        Ok("5eed5ed".to_string())
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        self.record("commit", message);
        Ok("c0ffee0".to_string())
    }

    fn amend(&self, message: &str) -> Result<String, GitError> {
        self.record("amend", message);
        Ok("a11ce00".to_string())
    }

    fn reword(&self, commit_id: &str, message: &str) -> Result<String, GitError> {
        self.resolve_commit(commit_id)?;
        self.record("reword", message);
        Ok(format!("{commit_id}-new"))
    }

    fn push(&self, _branch: Option<String>) -> Result<String, GitError> {
        Ok(String::new())
    }

    fn pull(&self) -> Result<String, GitError> {
        Ok(String::new())
    }

    fn take_command_log(&self) -> Vec<CommandRecord> {
        Vec::new()
    }
}

/// What the reviewer was shown at one prompt.
#[derive(Debug, Clone)]
pub struct Screen {
    pub state: &'static str,
    pub draft: Option<CommitMessage>,
    pub raw_suggestion: Option<String>,
    pub notice: Option<Notice>,
}

/// Reviewer that plays back a fixed list of actions and records what it saw.
pub struct ScriptedReviewer {
    actions: VecDeque<UserAction>,
    /// State name at every prompt.
    pub seen: Vec<&'static str>,
    pub screens: Vec<Screen>,
    pub rejected: usize,
    pub waited: usize,
}

impl ScriptedReviewer {
    pub fn new(actions: Vec<UserAction>) -> Self {
        Self {
            actions: actions.into(),
            seen: Vec::new(),
            screens: Vec::new(),
            rejected: 0,
            waited: 0,
        }
    }
}

#[async_trait]
impl Reviewer for ScriptedReviewer {
    async fn next_action(&mut self, session: &Session) -> Result<UserAction, SessionError> {
        self.seen.push(session.state().name());
        self.screens.push(Screen {
            state: session.state().name(),
            draft: session.draft().cloned(),
            raw_suggestion: session.raw_suggestion().map(str::to_string),
            notice: session.notice().cloned(),
        });
        self.actions
            .pop_front()
            .ok_or_else(|| SessionError::Input("script exhausted".to_string()))
    }

    fn waiting(&mut self, _session: &Session) {
        self.waited += 1;
    }

    fn rejected(&mut self, _session: &Session, _error: &SessionError) {
        self.rejected += 1;
    }
}
