//! States, events and effects of a composition session.

use std::fmt;

use crate::apply::{Applied, ApplyError, ApplyTarget};
use crate::error::AiError;
use crate::git::diff::DiffContext;
use crate::grammar::{CommitMessage, Field, Violation};
use crate::prompt::PromptRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Gathering,
    /// A suggestion was requested. `fallback` is the draft to edit if it fails.
    AwaitingSuggestion { fallback: CommitMessage },
    Reviewing { draft: CommitMessage },
    Editing {
        draft: CommitMessage,
        violations: Vec<Violation>,
        /// Completion text kept for reference when it could not be used as is.
        raw_suggestion: Option<String>,
    },
    Applying { message: CommitMessage },
    Finalized { message: CommitMessage, commit_id: String },
    Cancelled,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Gathering => "gathering",
            State::AwaitingSuggestion { .. } => "awaiting suggestion",
            State::Reviewing { .. } => "reviewing",
            State::Editing { .. } => "editing",
            State::Applying { .. } => "applying",
            State::Finalized { .. } => "finalized",
            State::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Finalized { .. } | State::Cancelled)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that happened: user input or a collaborator's answer.
#[derive(Debug)]
pub enum Event {
    Gathered(DiffContext),
    SuggestionReceived(Result<String, AiError>),
    Accept,
    EditField { field: Field, value: String },
    ReplaceText(String),
    Regenerate { hint: Option<String> },
    Retarget(ApplyTarget),
    Applied(Applied),
    ApplyFailed(ApplyError),
    Cancel,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Gathered(_) => "gathered",
            Event::SuggestionReceived(_) => "suggestion received",
            Event::Accept => "accept",
            Event::EditField { .. } => "edit field",
            Event::ReplaceText(_) => "replace text",
            Event::Regenerate { .. } => "regenerate",
            Event::Retarget(_) => "retarget",
            Event::Applied(_) => "applied",
            Event::ApplyFailed(_) => "apply failed",
            Event::Cancel => "cancel",
        }
    }
}

/// Work the session asks its driver to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RequestSuggestion(PromptRequest),
    Apply {
        message: CommitMessage,
        target: ApplyTarget,
    },
}

/// Entry in the session's action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Accepted,
    EditedField(Field),
    ReplacedText,
    Regenerated { hint: Option<String> },
    Retargeted(ApplyTarget),
    Cancelled,
    SuggestionFailed(String),
    SuggestionUnusable(&'static str),
    ApplyFailed(String),
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::Accepted => "accept",
            SessionAction::EditedField(_) => "edit_field",
            SessionAction::ReplacedText => "replace_text",
            SessionAction::Regenerated { .. } => "regenerate",
            SessionAction::Retargeted(_) => "retarget",
            SessionAction::Cancelled => "cancel",
            SessionAction::SuggestionFailed(_) => "suggestion_failed",
            SessionAction::SuggestionUnusable(_) => "suggestion_unusable",
            SessionAction::ApplyFailed(_) => "apply_failed",
        }
    }
}

/// Something the user should be told about the last transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoChanges,
    Manual,
    SuggestionFailed(String),
    SuggestionUnusable,
    SuggestionInvalid,
    ApplyFailed(String),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Finalized {
        message: CommitMessage,
        commit_id: String,
        target: ApplyTarget,
    },
    Cancelled,
}
