//! commitsmith - an interactive composer for Conventional Commits messages.
//!
//! # Overview
//!
//! commitsmith reads the staged diff, asks an OpenAI-compatible chat endpoint
//! for a draft, lets the user review and fix it against the Conventional
//! Commits grammar, and applies it as a new commit, an amend or a reword of
//! an older commit.

pub mod ai;
pub mod apply;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod grammar;
pub mod history;
pub mod i18n;
pub mod prompt;
pub mod session;
pub mod suggestion;

// Re-export commonly used types
pub use ai::{AiCollaborator, ChatClient};
pub use apply::{ApplyTarget, CommitApplier};
pub use config::Config;
pub use error::{AiError, CliError, ConfigError, GitError, GrammarError, HistoryError, SessionError};
pub use git::{GitCollaborator, SystemGit};
pub use grammar::{CommitMessage, CommitType, Field, Grammar};
pub use i18n::Language;
pub use session::{Session, SessionOptions};
