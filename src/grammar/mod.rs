//! Conventional Commits grammar: types, message layout, validation and type hints.

pub mod commit_type;
pub mod message;
pub mod suggest;
pub mod validate;

pub use commit_type::{CommitType, TypeToken};
pub use message::{CommitMessage, Field, is_trailer_line};
pub use suggest::suggest_types;
pub use validate::{Rule, Violation, validate};

use crate::error::GrammarError;
use crate::git::diff::DiffContext;

/// Default maximum subject length, in characters.
pub const DEFAULT_MAX_SUBJECT_LEN: usize = 72;

/// Grammar configured with the session's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grammar {
    pub max_subject_len: usize,
}

impl Grammar {
    pub fn new(max_subject_len: usize) -> Self {
        Self { max_subject_len }
    }

    pub fn validate(&self, msg: &CommitMessage) -> Vec<Violation> {
        validate(msg, self.max_subject_len)
    }

    pub fn is_valid(&self, msg: &CommitMessage) -> bool {
        self.validate(msg).is_empty()
    }

    pub fn render(&self, msg: &CommitMessage) -> String {
        msg.render()
    }

    pub fn parse(&self, text: &str) -> Result<CommitMessage, GrammarError> {
        CommitMessage::parse(text)
    }

    pub fn suggest_types(&self, diff: &DiffContext) -> Vec<CommitType> {
        suggest_types(diff)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUBJECT_LEN)
    }
}
