//! Error types for commitsmith modules using thiserror.

use thiserror::Error;

/// Fatal configuration errors, raised before any composition session starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No API key found. Set COMMITSMITH_API_KEY (or OPENROUTER_API_KEY) to the key for your completion endpoint"
    )]
    MissingApiKey,

    #[error("git executable not found in PATH. Install git to use commitsmith")]
    GitNotInstalled,

    #[error("Not a git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors from the git collaborator.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to read repository: {0}")]
    Read(#[source] git2::Error),

    #[error("Nothing staged to commit. Stage changes first")]
    NothingStaged,

    #[error("Commit id not found: {0}")]
    CommitNotFound(String),

    #[error("Merge conflict during rebase (rebase aborted): {0}")]
    RebaseConflict(String),

    #[error("Commit {0} is not part of the current branch")]
    NotOnCurrentBranch(String),

    #[error("Reword did not complete: {0}")]
    RewordFailed(String),

    #[error("HEAD is detached. Name the branch to push")]
    DetachedHead,

    #[error("Failed to run git {operation}: {source}")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("Failed to write commit message file: {0}")]
    MessageFile(#[source] std::io::Error),
}

/// Errors from the AI completion collaborator.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Completion request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Completion endpoint rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("Rate limited by completion endpoint: {0}")]
    RateLimited(String),

    #[error("Completion endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Could not reach completion endpoint: {0}")]
    Transport(String),

    #[error("Completion endpoint returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Completion endpoint returned no text")]
    EmptyCompletion,

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<AiError>),
}

impl AiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::RateLimited(_) | AiError::Transport(_) => true,
            AiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors from strict commit message parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Commit message is empty")]
    Empty,

    #[error("Header '{0}' does not match `type(scope): subject`")]
    MalformedHeader(String),

    #[error("Header must be followed by a blank line before the body")]
    MissingBlankLine,
}

/// Errors from the history file.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to create history directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("Failed to append to history file: {0}")]
    Append(#[source] std::io::Error),

    #[error("Failed to read history file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to serialize history record: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Errors from driving a composition session.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Event '{event}' is not allowed while {state}")]
    InvalidEvent { state: &'static str, event: &'static str },

    #[error("Session already ended ({0})")]
    Terminated(&'static str),

    #[error("Reviewer input failed: {0}")]
    Input(String),
}

/// Errors surfaced by the interactive menus.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Terminal input failed: {0}")]
    Input(#[from] dialoguer::Error),
}
