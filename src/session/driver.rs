//! Async driver: runs a session's effects against the collaborators.

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::ai::AiCollaborator;
use crate::apply::{ApplyTarget, CommitApplier};
use crate::error::SessionError;
use crate::git::GitCollaborator;
use crate::git::diff::DiffContext;
use crate::grammar::Field;
use crate::session::{Effect, Event, Session};

/// A decision taken by the user while reviewing or editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Accept,
    EditField { field: Field, value: String },
    ReplaceText(String),
    Regenerate(Option<String>),
    Retarget(ApplyTarget),
    Cancel,
}

impl From<UserAction> for Event {
    fn from(action: UserAction) -> Self {
        match action {
            UserAction::Accept => Event::Accept,
            UserAction::EditField { field, value } => Event::EditField { field, value },
            UserAction::ReplaceText(text) => Event::ReplaceText(text),
            UserAction::Regenerate(hint) => Event::Regenerate { hint },
            UserAction::Retarget(target) => Event::Retarget(target),
            UserAction::Cancel => Event::Cancel,
        }
    }
}

/// The user's side of a session.
#[async_trait]
pub trait Reviewer: Send {
    /// Show the session and ask what to do next.
    async fn next_action(&mut self, session: &Session) -> Result<UserAction, SessionError>;

    /// Called right before a suggestion is requested.
    fn waiting(&mut self, _session: &Session) {}

    /// Called when the reviewer asked for something the session does not allow.
    fn rejected(&mut self, _session: &Session, _error: &SessionError) {}
}

/// Drive a session from gathering to a terminal state.
///
/// Collaborator failures never end the session: they come back as events
/// and leave the draft editable.
pub async fn run<A, G, R>(
    session: &mut Session,
    diff: DiffContext,
    ai: &A,
    git: &G,
    reviewer: &mut R,
) -> Result<(), SessionError>
where
    A: AiCollaborator + ?Sized,
    G: GitCollaborator + ?Sized,
    R: Reviewer + ?Sized,
{
    let applier = CommitApplier::new(git);
    let mut pending: VecDeque<Effect> = session.handle(Event::Gathered(diff))?.into();

    loop {
        while let Some(effect) = pending.pop_front() {
            let event = match effect {
                Effect::RequestSuggestion(request) => {
                    reviewer.waiting(session);
                    Event::SuggestionReceived(ai.complete(&request).await)
                }
                Effect::Apply { message, target } => match applier.apply(&message, &target) {
                    Ok(applied) => Event::Applied(applied),
                    Err(e) => Event::ApplyFailed(e),
                },
            };
            pending.extend(session.handle(event)?);
        }

        if session.is_terminal() {
            debug!(state = session.state().name(), "Session finished");
            return Ok(());
        }

        let action = reviewer.next_action(session).await?;
        match session.handle(action.into()) {
            Ok(effects) => pending.extend(effects),
            Err(e @ SessionError::InvalidEvent { .. }) => {
                warn!("{e}");
                reviewer.rejected(session, &e);
            }
            Err(e) => return Err(e),
        }
    }
}
