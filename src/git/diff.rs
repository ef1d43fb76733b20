//! Staged and per-commit diff collection using git2.

use std::fmt;

use git2::{Delta, Diff, DiffFormat, ErrorCode, Oid, Repository, Tree};
use tracing::{debug, warn};

use crate::error::GitError;

/// Maximum characters collected from git before the prompt budget applies.
const MAX_COLLECTED_LENGTH: usize = 200_000;

/// Status of a changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A file touched by the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
    /// Old path for renamed files (None for non-rename changes).
    pub old_path: Option<String>,
}

/// Diff text plus the metadata the prompt and type hints need.
///
/// The text is opaque: nothing in the crate interprets hunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffContext {
    pub text: String,
    pub files: Vec<ChangedFile>,
    pub insertions: usize,
    pub deletions: usize,
    pub truncated: bool,
}

impl DiffContext {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.text.trim().is_empty()
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::Read(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::Read)?;
    Ok(Some(tree))
}

/// Collect the staged changes (HEAD tree against the index).
///
/// Unstaged and untracked files are ignored; nothing staged yields an
/// empty context rather than an error.
pub fn collect_staged(repo: &Repository) -> Result<DiffContext, GitError> {
    let head_tree = resolve_head_tree(repo)?;
    let mut diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::Read)?;
    diff.find_similar(None).map_err(GitError::Read)?;

    let context = build_context(&diff);
    debug!(
        files = context.file_count(),
        insertions = context.insertions,
        deletions = context.deletions,
        "Collected staged diff"
    );
    Ok(context)
}

/// Collect the changes introduced by one commit (its parent tree against its tree).
///
/// Root commits are diffed against the empty tree.
pub fn collect_commit(repo: &Repository, oid: Oid) -> Result<DiffContext, GitError> {
    let commit = repo.find_commit(oid).map_err(GitError::Read)?;
    let tree = commit.tree().map_err(GitError::Read)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(GitError::Read)?),
        Err(e) if e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(GitError::Read(e)),
    };

    let mut diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .map_err(GitError::Read)?;
    diff.find_similar(None).map_err(GitError::Read)?;
    Ok(build_context(&diff))
}

fn build_context(diff: &Diff<'_>) -> DiffContext {
    let mut files = collect_files(diff);
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);

    let mut context = DiffContext {
        files,
        ..Default::default()
    };
    append_diff_text(diff, &mut context);
    context
}

fn collect_files(diff: &Diff<'_>) -> Vec<ChangedFile> {
    diff.deltas()
        .filter_map(|delta| {
            let status = match delta.status() {
                Delta::Added | Delta::Untracked => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };

            let new_path = delta
                .new_file()
                .path()
                .map(|p| p.to_string_lossy().to_string());
            let old_path = delta
                .old_file()
                .path()
                .map(|p| p.to_string_lossy().to_string());

            let (path, old_path) = match status {
                FileStatus::Renamed => (new_path.clone().or_else(|| old_path.clone())?, old_path),
                _ => (new_path.or(old_path)?, None),
            };

            Some(ChangedFile {
                path,
                status,
                old_path,
            })
        })
        .collect()
}

/// Append unified diff text, counting insertions and deletions.
///
/// Counting continues after the text cap so the totals stay accurate.
fn append_diff_text(diff: &Diff<'_>, context: &mut DiffContext) {
    let result = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        match origin {
            '+' => context.insertions += 1,
            '-' => context.deletions += 1,
            _ => {}
        }

        if context.truncated {
            return true;
        }

        let content = String::from_utf8_lossy(line.content());
        if context.text.len() + content.len() + 1 > MAX_COLLECTED_LENGTH {
            context.truncated = true;
            return true;
        }

        if matches!(origin, '+' | '-' | ' ') {
            context.text.push(origin);
        }
        context.text.push_str(&content);
        true
    });

    if let Err(e) = result {
        warn!("Failed to collect diff text: {e}");
        context.truncated = true;
    }
}
