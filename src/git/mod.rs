//! Git collaborator: repository reads through git2, writes through the `git` binary.

pub mod diff;
pub mod system;

pub use diff::{ChangedFile, DiffContext, FileStatus};
pub use system::SystemGit;

use std::fmt;

use crate::error::GitError;

/// One line of `git log --oneline`, enriched with the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub short_id: String,
    pub summary: String,
    pub author: String,
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.short_id, self.summary, self.author)
    }
}

/// A local branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub is_head: bool,
}

/// A git command that was executed, kept for the end-of-operation summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub command: String,
    pub operation: String,
}

/// Everything the composition engine and the menus need from git.
///
/// Reads never mutate the repository. Writes are recorded in a command log
/// that callers drain with [`take_command_log`](Self::take_command_log).
#[cfg_attr(test, mockall::automock)]
pub trait GitCollaborator {
    /// Diff of the staged changes. Empty when nothing is staged.
    fn staged_diff(&self) -> Result<DiffContext, GitError>;

    /// Diff introduced by an existing commit.
    fn commit_diff(&self, rev: &str) -> Result<DiffContext, GitError>;

    /// Full message of an existing commit.
    fn commit_message(&self, rev: &str) -> Result<String, GitError>;

    /// Resolve a revision to a full commit id, or `CommitNotFound`.
    fn resolve_commit(&self, rev: &str) -> Result<String, GitError>;

    /// Most recent commits reachable from HEAD, newest first.
    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitSummary>, GitError>;

    fn status(&self) -> Result<String, GitError>;
    fn branches(&self) -> Result<Vec<BranchInfo>, GitError>;
    fn create_branch(&self, name: &str) -> Result<(), GitError>;
    fn switch_branch(&self, name: &str) -> Result<(), GitError>;
    fn stage_all(&self) -> Result<(), GitError>;
    fn stage_paths(&self, paths: &[String]) -> Result<(), GitError>;
    fn unstage_paths(&self, paths: &[String]) -> Result<(), GitError>;
    fn stash_save(&self, message: Option<String>) -> Result<(), GitError>;
    fn stash_pop(&self) -> Result<(), GitError>;
    fn stash_list(&self) -> Result<Vec<String>, GitError>;

    /// Apply a stash without dropping it. `None` applies the latest one.
    fn stash_apply(&self, stash: Option<String>) -> Result<(), GitError>;

    /// Discard unstaged changes to `paths`, or to the whole tree when empty.
    fn discard_changes(&self, paths: &[String]) -> Result<(), GitError>;

    /// Commit the inverse of HEAD. Returns the new commit id.
    fn revert_last_commit(&self) -> Result<String, GitError>;

    /// Create a commit from the staged changes. Returns the new commit id.
    fn commit(&self, message: &str) -> Result<String, GitError>;

    /// Replace the last commit, folding in anything staged.
    fn amend(&self, message: &str) -> Result<String, GitError>;

    /// Replace the message of an arbitrary commit, rewriting its descendants.
    fn reword(&self, commit_id: &str, message: &str) -> Result<String, GitError>;

    /// Push to `origin`. `None` pushes the current branch.
    fn push(&self, branch: Option<String>) -> Result<String, GitError>;
    fn pull(&self) -> Result<String, GitError>;

    /// Drain the commands executed since the last call.
    fn take_command_log(&self) -> Vec<CommandRecord>;
}
