//! [`GitCollaborator`] backed by git2 and the system `git` binary.
//!
//! Mutating operations shell out to `git`, inheriting the user's config,
//! hooks, SSH agent and credential store.

use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{BranchType, ErrorCode, Oid, Repository, RepositoryState, Sort};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, GitError};
use crate::git::diff::{self, DiffContext};
use crate::git::{BranchInfo, CommandRecord, CommitSummary, GitCollaborator};

/// Sequence editor that marks the todo entry of one commit as `edit`.
///
/// Matches both `pick` and the abbreviated `p`; `-i.bak` and `-E` keep the
/// invocation portable between GNU and BSD sed.
fn edit_todo_script(commit_id: &str) -> String {
    let prefix: String = commit_id.chars().take(7).collect();
    format!("sed -i.bak -E 's/^(pick|p) ({prefix}[0-9a-f]*)( |$)/edit \\2\\3/'")
}

/// Git collaborator for the repository containing a working directory.
#[derive(Debug)]
pub struct SystemGit {
    root: PathBuf,
    log: RefCell<Vec<CommandRecord>>,
}

impl SystemGit {
    /// Find the repository containing `path` and use its working directory.
    pub fn discover(path: &Path) -> Result<Self, ConfigError> {
        let repo = Repository::discover(path).map_err(ConfigError::NotARepository)?;
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo.path().to_path_buf());
        debug!(root = %root.display(), "Opened repository");
        Ok(Self {
            root,
            log: RefCell::new(Vec::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a fresh handle so reads see writes made by the `git` binary.
    fn repo(&self) -> Result<Repository, GitError> {
        Repository::open(&self.root).map_err(GitError::OpenRepository)
    }

    fn run_git(&self, args: &[&str], operation: &str) -> Result<String, GitError> {
        self.run_git_with(args, &[], operation, None)
    }

    /// Run a git command in the repository root and return its output.
    ///
    /// `shown` replaces the recorded command line when the real arguments
    /// point at temporary files.
    fn run_git_with(
        &self,
        args: &[&str],
        envs: &[(&str, &str)],
        operation: &str,
        shown: Option<String>,
    ) -> Result<String, GitError> {
        debug!(?args, "Running git {operation}");
        let output = Command::new("git")
            .current_dir(&self.root)
            .args(args)
            .envs(envs.iter().copied())
            .output()
            .map_err(|source| GitError::Spawn {
                operation: operation.to_string(),
                source,
            })?;

        self.log.borrow_mut().push(CommandRecord {
            command: shown.unwrap_or_else(|| display_command(args)),
            operation: operation.to_string(),
        });

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            // push and pull report progress on stderr
            Ok(String::from_utf8_lossy(&output.stderr).trim().to_string())
        } else {
            Ok(stdout)
        }
    }

    fn head_id(&self) -> Result<String, GitError> {
        self.run_git(&["rev-parse", "HEAD"], "read HEAD")
    }

    /// Run `git commit` with the message passed through a temp file.
    fn commit_with_file(
        &self,
        extra_args: &[&str],
        message: &str,
        operation: &str,
    ) -> Result<String, GitError> {
        let mut file = tempfile::NamedTempFile::new().map_err(GitError::MessageFile)?;
        file.write_all(message.as_bytes())
            .and_then(|()| file.flush())
            .map_err(GitError::MessageFile)?;
        let path = file.path().to_string_lossy().to_string();

        // the default cleanup would drop body lines starting with '#'
        let mut args = vec!["commit", "--cleanup=whitespace"];
        args.extend_from_slice(extra_args);
        args.extend(["-F", path.as_str()]);

        let header = message.lines().next().unwrap_or_default();
        let mut shown = vec!["commit"];
        shown.extend_from_slice(extra_args);
        let shown = format!("{} -m {}", display_command(&shown), quote(header));

        self.run_git_with(&args, &[], operation, Some(shown))?;
        self.head_id()
    }

    fn abort_rebase(&self) {
        let in_progress = self
            .repo()
            .map(|repo| repo.state() != RepositoryState::Clean)
            .unwrap_or(true);
        if !in_progress {
            return;
        }
        if let Err(e) = self.run_git(&["rebase", "--abort"], "abort rebase") {
            warn!("Failed to abort rebase: {e}");
        }
    }

    /// Name of the checked out branch.
    fn current_branch(&self) -> Result<String, GitError> {
        let repo = self.repo()?;
        let head = repo.head().map_err(GitError::Read)?;
        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or(GitError::DetachedHead)
    }

    /// Whether `target` is HEAD or one of its ancestors.
    fn is_ancestor_of_head(&self, target: &str) -> Result<bool, GitError> {
        let repo = self.repo()?;
        let target = Oid::from_str(target).map_err(GitError::Read)?;
        let head = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(GitError::Read)?
            .id();
        if head == target {
            return Ok(true);
        }
        repo.graph_descendant_of(head, target)
            .map_err(GitError::Read)
    }
}

impl GitCollaborator for SystemGit {
    fn staged_diff(&self) -> Result<DiffContext, GitError> {
        diff::collect_staged(&self.repo()?)
    }

    fn commit_diff(&self, rev: &str) -> Result<DiffContext, GitError> {
        let repo = self.repo()?;
        let oid = resolve_oid(&repo, rev)?;
        diff::collect_commit(&repo, oid)
    }

    fn commit_message(&self, rev: &str) -> Result<String, GitError> {
        let repo = self.repo()?;
        let oid = resolve_oid(&repo, rev)?;
        let commit = repo.find_commit(oid).map_err(GitError::Read)?;
        Ok(String::from_utf8_lossy(commit.message_bytes())
            .trim_end()
            .to_string())
    }

    fn resolve_commit(&self, rev: &str) -> Result<String, GitError> {
        let repo = self.repo()?;
        resolve_oid(&repo, rev).map(|oid| oid.to_string())
    }

    fn recent_commits(&self, limit: usize) -> Result<Vec<CommitSummary>, GitError> {
        let repo = self.repo()?;
        let mut walk = repo.revwalk().map_err(GitError::Read)?;
        match walk.push_head() {
            Ok(()) => {}
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(GitError::Read(e)),
        }
        walk.set_sorting(Sort::TIME).map_err(GitError::Read)?;

        let mut commits = Vec::new();
        for oid in walk.take(limit) {
            let oid = oid.map_err(GitError::Read)?;
            let commit = repo.find_commit(oid).map_err(GitError::Read)?;
            let id = oid.to_string();
            commits.push(CommitSummary {
                short_id: id.chars().take(7).collect(),
                id,
                summary: commit.summary().unwrap_or_default().to_string(),
                author: commit.author().name().unwrap_or_default().to_string(),
            });
        }
        Ok(commits)
    }

    fn status(&self) -> Result<String, GitError> {
        self.run_git(&["status", "--short", "--branch"], "status")
    }

    fn branches(&self) -> Result<Vec<BranchInfo>, GitError> {
        let repo = self.repo()?;
        let mut branches = Vec::new();
        for branch in repo
            .branches(Some(BranchType::Local))
            .map_err(GitError::Read)?
        {
            let (branch, _) = branch.map_err(GitError::Read)?;
            let Some(name) = branch.name().map_err(GitError::Read)? else {
                continue;
            };
            branches.push(BranchInfo {
                name: name.to_string(),
                is_head: branch.is_head(),
            });
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn create_branch(&self, name: &str) -> Result<(), GitError> {
        self.run_git(&["checkout", "-b", name], "create branch")
            .map(|_| ())
    }

    fn switch_branch(&self, name: &str) -> Result<(), GitError> {
        self.run_git(&["checkout", name], "switch branch").map(|_| ())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.run_git(&["add", "-A"], "stage all").map(|_| ())
    }

    fn stage_paths(&self, paths: &[String]) -> Result<(), GitError> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, "stage files").map(|_| ())
    }

    fn unstage_paths(&self, paths: &[String]) -> Result<(), GitError> {
        let mut args = vec!["restore", "--staged", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, "unstage files").map(|_| ())
    }

    fn stash_save(&self, message: Option<String>) -> Result<(), GitError> {
        let mut args = vec!["stash", "push"];
        if let Some(ref message) = message {
            args.extend(["-m", message.as_str()]);
        }
        self.run_git(&args, "stash").map(|_| ())
    }

    fn stash_pop(&self) -> Result<(), GitError> {
        self.run_git(&["stash", "pop"], "stash pop").map(|_| ())
    }

    fn stash_list(&self) -> Result<Vec<String>, GitError> {
        let mut repo = self.repo()?;
        let mut entries = Vec::new();
        match repo.stash_foreach(|index, message, _oid| {
            entries.push(format!("stash@{{{index}}}: {message}"));
            true
        }) {
            Ok(()) => Ok(entries),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(Vec::new()),
            Err(e) => Err(GitError::Read(e)),
        }
    }

    fn stash_apply(&self, stash: Option<String>) -> Result<(), GitError> {
        let stash = stash.as_deref().map(stash_ref);
        let mut args = vec!["stash", "apply"];
        if let Some(ref stash) = stash {
            args.push(stash.as_str());
        }
        self.run_git(&args, "stash apply").map(|_| ())
    }

    fn discard_changes(&self, paths: &[String]) -> Result<(), GitError> {
        let mut args = vec!["checkout", "--"];
        if paths.is_empty() {
            args.push(".");
        } else {
            args.extend(paths.iter().map(String::as_str));
        }
        self.run_git(&args, "discard changes").map(|_| ())
    }

    fn revert_last_commit(&self) -> Result<String, GitError> {
        self.run_git(&["revert", "--no-edit", "HEAD"], "revert")?;
        let id = self.head_id()?;
        info!(commit = %id, "Reverted last commit");
        Ok(id)
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        if self.staged_diff()?.is_empty() {
            return Err(GitError::NothingStaged);
        }
        let id = self.commit_with_file(&[], message, "commit")?;
        info!(commit = %id, "Created commit");
        Ok(id)
    }

    fn amend(&self, message: &str) -> Result<String, GitError> {
        let id = self.commit_with_file(&["--amend"], message, "amend")?;
        info!(commit = %id, "Amended last commit");
        Ok(id)
    }

    fn reword(&self, commit_id: &str, message: &str) -> Result<String, GitError> {
        let target = self.resolve_commit(commit_id)?;
        if target == self.head_id()? {
            // Message only: staged changes stay staged.
            return self.commit_with_file(&["--amend", "--only"], message, "reword HEAD");
        }

        if !self.is_ancestor_of_head(&target)? {
            return Err(GitError::NotOnCurrentBranch(commit_id.trim().to_string()));
        }

        let parent = self
            .run_git(
                &["rev-parse", "--verify", "--quiet", &format!("{target}^")],
                "find parent",
            )
            .ok();
        let mut args = vec!["rebase", "-i", "--autostash"];
        match parent.as_deref() {
            Some(parent) => args.push(parent),
            None => args.push("--root"),
        }

        let editor = edit_todo_script(&target);
        if let Err(e) = self.run_git_with(
            &args,
            &[("GIT_SEQUENCE_EDITOR", editor.as_str())],
            "start rebase",
            None,
        ) {
            self.abort_rebase();
            return Err(e);
        }

        // the rebase must have stopped on the target itself
        match self.head_id() {
            Ok(stopped) if stopped == target => {}
            Ok(stopped) => {
                self.abort_rebase();
                return Err(GitError::RewordFailed(format!(
                    "rebase stopped at {stopped} instead of {target}"
                )));
            }
            Err(e) => {
                self.abort_rebase();
                return Err(e);
            }
        }

        let new_id = match self.commit_with_file(&["--amend", "--only"], message, "reword") {
            Ok(id) => id,
            Err(e) => {
                self.abort_rebase();
                return Err(e);
            }
        };

        match self.run_git_with(
            &["rebase", "--continue"],
            &[("GIT_EDITOR", "true")],
            "continue rebase",
            None,
        ) {
            Ok(_) => {}
            Err(GitError::CommandFailed { stderr, .. }) => {
                self.abort_rebase();
                return Err(GitError::RebaseConflict(stderr));
            }
            Err(e) => {
                self.abort_rebase();
                return Err(e);
            }
        }

        if !self.is_ancestor_of_head(&new_id)?
            || !same_message(&self.commit_message(&new_id)?, message)
        {
            return Err(GitError::RewordFailed(format!(
                "reworded commit {new_id} is not in the branch with the new message"
            )));
        }
        info!(from = %target, to = %new_id, "Reworded commit");
        Ok(new_id)
    }

    fn push(&self, branch: Option<String>) -> Result<String, GitError> {
        let branch = match branch {
            Some(branch) => branch,
            None => self.current_branch()?,
        };
        self.run_git(&["push", "origin", &branch], "push")
    }

    fn pull(&self) -> Result<String, GitError> {
        self.run_git(&["pull"], "pull")
    }

    fn take_command_log(&self) -> Vec<CommandRecord> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

/// Resolve any revision to a commit id, mapping lookup failures to `CommitNotFound`.
fn resolve_oid(repo: &Repository, rev: &str) -> Result<git2::Oid, GitError> {
    let rev = rev.trim();
    if rev.is_empty() {
        return Err(GitError::CommitNotFound(String::new()));
    }
    repo.revparse_single(rev)
        .and_then(|obj| obj.peel_to_commit())
        .map(|commit| commit.id())
        .map_err(|_| GitError::CommitNotFound(rev.to_string()))
}

/// `1` and `stash@{1}` both name the second stash entry.
fn stash_ref(input: &str) -> String {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        format!("stash@{{{input}}}")
    } else {
        input.to_string()
    }
}

/// Compare messages the way `--cleanup=whitespace` normalizes them.
fn same_message(stored: &str, written: &str) -> bool {
    fn normalized(text: &str) -> Vec<&str> {
        let mut lines: Vec<&str> = Vec::new();
        for line in text.trim().lines().map(str::trim_end) {
            if line.is_empty() && lines.last().is_some_and(|l| l.is_empty()) {
                continue;
            }
            lines.push(line);
        }
        lines
    }
    normalized(stored) == normalized(written)
}

fn display_command(args: &[&str]) -> String {
    let mut command = String::from("git");
    for arg in args {
        command.push(' ');
        command.push_str(&quote(arg));
    }
    command
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '"', '\'', '\t']) {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}
