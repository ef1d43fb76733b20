//! Applying a finished message to the repository.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::error::GitError;
use crate::git::GitCollaborator;
use crate::grammar::CommitMessage;

/// Where a finished message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyTarget {
    NewCommit,
    AmendLast,
    /// Reword an existing commit through an interactive rebase edit stop.
    RebaseEdit(String),
}

impl ApplyTarget {
    pub fn label(&self) -> &'static str {
        match self {
            ApplyTarget::NewCommit => "new commit",
            ApplyTarget::AmendLast => "amend last commit",
            ApplyTarget::RebaseEdit(_) => "rebase edit",
        }
    }
}

impl fmt::Display for ApplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyTarget::RebaseEdit(id) => write!(f, "rebase edit of {id}"),
            other => f.write_str(other.label()),
        }
    }
}

/// A successful application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub commit_id: String,
    pub target: ApplyTarget,
}

/// A failed application, with git's error kept verbatim.
#[derive(Error, Debug)]
#[error("{target} failed: {source}")]
pub struct ApplyError {
    pub target: ApplyTarget,
    #[source]
    pub source: GitError,
}

/// Renders messages and hands them to git.
pub struct CommitApplier<'a, G: GitCollaborator + ?Sized> {
    git: &'a G,
}

impl<'a, G: GitCollaborator + ?Sized> CommitApplier<'a, G> {
    pub fn new(git: &'a G) -> Self {
        Self { git }
    }

    pub fn apply(&self, message: &CommitMessage, target: &ApplyTarget) -> Result<Applied, ApplyError> {
        let text = message.render();
        let result = match target {
            ApplyTarget::NewCommit => self.git.commit(&text),
            ApplyTarget::AmendLast => self.git.amend(&text),
            ApplyTarget::RebaseEdit(id) => self.git.reword(id, &text),
        };

        match result {
            Ok(commit_id) => {
                info!(target = %target, commit = %commit_id, header = %message.header(), "Applied commit message");
                Ok(Applied {
                    commit_id,
                    target: target.clone(),
                })
            }
            Err(source) => Err(ApplyError {
                target: target.clone(),
                source,
            }),
        }
    }
}
