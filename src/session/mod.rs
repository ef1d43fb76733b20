//! Composition session: an explicit state machine with effects.
//!
//! [`Session::handle`] performs no I/O. It moves the session to its next
//! state and returns the [`Effect`]s the driver must carry out; their results
//! come back as new events.

pub mod driver;
pub mod state;

pub use driver::{Reviewer, UserAction, run};
pub use state::{Effect, Event, Notice, Outcome, SessionAction, State};

use tracing::{debug, info, warn};

use crate::apply::ApplyTarget;
use crate::error::{AiError, SessionError};
use crate::git::diff::DiffContext;
use crate::grammar::{CommitMessage, Grammar, Violation};
use crate::i18n::Language;
use crate::prompt::{PromptBuilder, PromptHints};
use crate::suggestion::{self, ParseOutcome};

/// Fixed inputs of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub language: Language,
    pub grammar: Grammar,
    pub prompts: PromptBuilder,
    pub hints: PromptHints,
    pub target: ApplyTarget,
    /// Whether to ask the AI collaborator for drafts.
    pub ai_enabled: bool,
    /// Starting draft, e.g. the current message of a commit being reworded.
    pub seed: CommitMessage,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            grammar: Grammar::default(),
            prompts: PromptBuilder::default(),
            hints: PromptHints::default(),
            target: ApplyTarget::NewCommit,
            ai_enabled: true,
            seed: CommitMessage::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    state: State,
    options: SessionOptions,
    diff: DiffContext,
    log: Vec<SessionAction>,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            state: State::Gathering,
            options,
            diff: DiffContext::default(),
            log: Vec::new(),
            notice: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn language(&self) -> Language {
        self.options.language
    }

    pub fn grammar(&self) -> &Grammar {
        &self.options.grammar
    }

    pub fn target(&self) -> &ApplyTarget {
        &self.options.target
    }

    pub fn hints(&self) -> &PromptHints {
        &self.options.hints
    }

    pub fn diff(&self) -> &DiffContext {
        &self.diff
    }

    pub fn log(&self) -> &[SessionAction] {
        &self.log
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The message currently being worked on, if any.
    pub fn draft(&self) -> Option<&CommitMessage> {
        match &self.state {
            State::AwaitingSuggestion { fallback } => Some(fallback),
            State::Reviewing { draft } | State::Editing { draft, .. } => Some(draft),
            State::Applying { message } | State::Finalized { message, .. } => Some(message),
            State::Gathering | State::Cancelled => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match &self.state {
            State::Editing { violations, .. } => violations,
            _ => &[],
        }
    }

    pub fn raw_suggestion(&self) -> Option<&str> {
        match &self.state {
            State::Editing { raw_suggestion, .. } => raw_suggestion.as_deref(),
            _ => None,
        }
    }

    /// A draft can be accepted in review, or while editing once nothing is left to fix.
    ///
    /// The second case arises when an unusable suggestion arrives on top of
    /// a valid starting draft: the raw text stays on screen next to it.
    pub fn can_accept(&self) -> bool {
        match &self.state {
            State::Reviewing { .. } => true,
            State::Editing { violations, .. } => violations.is_empty(),
            _ => false,
        }
    }

    /// Regeneration needs the AI and something to describe.
    pub fn can_regenerate(&self) -> bool {
        self.options.ai_enabled && !self.diff.is_empty()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            State::Finalized { message, commit_id } => Some(Outcome::Finalized {
                message: message.clone(),
                commit_id: commit_id.clone(),
                target: self.options.target.clone(),
            }),
            State::Cancelled => Some(Outcome::Cancelled),
            _ => None,
        }
    }

    /// Feed one event to the session.
    ///
    /// A disallowed event returns an error and leaves the session unchanged.
    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, SessionError> {
        self.check_allowed(&event)?;
        debug!(state = self.state.name(), event = event.name(), "Session event");

        self.notice = None;
        let effects = self.transition(event);
        debug!(state = self.state.name(), effects = effects.len(), "Session moved");
        Ok(effects)
    }

    fn check_allowed(&self, event: &Event) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::Terminated(self.state.name()));
        }

        let allowed = match (&self.state, event) {
            (State::Applying { .. }, Event::Applied(_) | Event::ApplyFailed(_)) => true,
            (State::Applying { .. }, _) => false,
            (_, Event::Cancel) => true,
            (State::Gathering, Event::Gathered(_)) => true,
            (State::AwaitingSuggestion { .. }, Event::SuggestionReceived(_)) => true,
            (_, Event::Accept) => self.can_accept(),
            (
                State::Reviewing { .. } | State::Editing { .. },
                Event::EditField { .. } | Event::ReplaceText(_) | Event::Retarget(_),
            ) => true,
            (State::Reviewing { .. } | State::Editing { .. }, Event::Regenerate { .. }) => {
                self.can_regenerate()
            }
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(SessionError::InvalidEvent {
                state: self.state.name(),
                event: event.name(),
            })
        }
    }

    /// Move to the next state. Only called for allowed events.
    fn transition(&mut self, event: Event) -> Vec<Effect> {
        let state = std::mem::replace(&mut self.state, State::Gathering);
        let (next, effects) = match (state, event) {
            (_, Event::Cancel) => {
                self.log.push(SessionAction::Cancelled);
                info!("Session cancelled");
                (State::Cancelled, Vec::new())
            }

            (State::Gathering, Event::Gathered(diff)) => {
                self.diff = diff;
                let seed = self.options.seed.clone();
                if self.diff.is_empty() || !self.options.ai_enabled {
                    self.notice = Some(if self.diff.is_empty() {
                        Notice::NoChanges
                    } else {
                        Notice::Manual
                    });
                    (self.settle(seed, None), Vec::new())
                } else {
                    let effect = self.request_suggestion();
                    (State::AwaitingSuggestion { fallback: seed }, vec![effect])
                }
            }

            (State::AwaitingSuggestion { fallback }, Event::SuggestionReceived(result)) => {
                (self.receive_suggestion(fallback, result), Vec::new())
            }

            (State::Reviewing { draft } | State::Editing { draft, .. }, Event::Accept) => {
                let violations = self.options.grammar.validate(&draft);
                if violations.is_empty() {
                    self.log.push(SessionAction::Accepted);
                    let effect = Effect::Apply {
                        message: draft.clone(),
                        target: self.options.target.clone(),
                    };
                    (State::Applying { message: draft }, vec![effect])
                } else {
                    (
                        State::Editing {
                            draft,
                            violations,
                            raw_suggestion: None,
                        },
                        Vec::new(),
                    )
                }
            }

            (state, Event::EditField { field, value }) => {
                let (mut draft, raw) = split_editable(state);
                draft.set_field(field, &value);
                self.log.push(SessionAction::EditedField(field));
                (self.settle(draft, raw), Vec::new())
            }

            (state, Event::ReplaceText(text)) => {
                let (_, raw) = split_editable(state);
                let draft = suggestion::draft_from_text(&text);
                self.log.push(SessionAction::ReplacedText);
                (self.settle(draft, raw), Vec::new())
            }

            (state, Event::Regenerate { hint }) => {
                let (draft, _) = split_editable(state);
                if let Some(ref hint) = hint
                    && !hint.trim().is_empty()
                {
                    self.options.hints.extra.push(hint.trim().to_string());
                }
                self.log.push(SessionAction::Regenerated { hint });
                let effect = self.request_suggestion();
                (State::AwaitingSuggestion { fallback: draft }, vec![effect])
            }

            (state, Event::Retarget(target)) => {
                info!(from = %self.options.target, to = %target, "Retargeted session");
                self.log.push(SessionAction::Retargeted(target.clone()));
                self.options.target = target;
                (state, Vec::new())
            }

            (State::Applying { message }, Event::Applied(applied)) => (
                State::Finalized {
                    message,
                    commit_id: applied.commit_id,
                },
                Vec::new(),
            ),

            (State::Applying { message }, Event::ApplyFailed(error)) => {
                warn!("Apply failed: {error}");
                self.log.push(SessionAction::ApplyFailed(error.to_string()));
                self.notice = Some(Notice::ApplyFailed(error.to_string()));
                (State::Reviewing { draft: message }, Vec::new())
            }

            (state, _) => (state, Vec::new()),
        };

        self.state = next;
        effects
    }

    fn request_suggestion(&self) -> Effect {
        Effect::RequestSuggestion(self.options.prompts.build(
            &self.diff,
            self.options.language,
            &self.options.hints,
        ))
    }

    fn receive_suggestion(
        &mut self,
        fallback: CommitMessage,
        result: Result<String, AiError>,
    ) -> State {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Suggestion request failed: {e}");
                self.log.push(SessionAction::SuggestionFailed(e.to_string()));
                self.notice = Some(Notice::SuggestionFailed(e.to_string()));
                return self.settle(fallback, None);
            }
        };

        let outcome = suggestion::parse(&raw);
        debug!(outcome = outcome.kind(), "Parsed suggestion");
        match outcome {
            ParseOutcome::Parsed(draft) => {
                let violations = self.options.grammar.validate(&draft);
                if violations.is_empty() {
                    return State::Reviewing { draft };
                }
                self.notice = Some(Notice::SuggestionInvalid);
                State::Editing {
                    draft,
                    violations,
                    raw_suggestion: Some(raw),
                }
            }
            ParseOutcome::PartialParsed { draft, .. } => {
                self.log.push(SessionAction::SuggestionUnusable("partial"));
                self.notice = Some(Notice::SuggestionInvalid);
                State::Editing {
                    violations: self.options.grammar.validate(&draft),
                    draft,
                    raw_suggestion: Some(raw),
                }
            }
            ParseOutcome::Unparseable(raw) => {
                self.log.push(SessionAction::SuggestionUnusable("unparseable"));
                self.notice = Some(Notice::SuggestionUnusable);
                State::Editing {
                    violations: self.options.grammar.validate(&fallback),
                    draft: fallback,
                    raw_suggestion: Some(raw),
                }
            }
        }
    }

    /// Reviewing when the draft is valid, Editing otherwise.
    fn settle(&self, draft: CommitMessage, raw_suggestion: Option<String>) -> State {
        let violations = self.options.grammar.validate(&draft);
        if violations.is_empty() {
            State::Reviewing { draft }
        } else {
            State::Editing {
                draft,
                violations,
                raw_suggestion,
            }
        }
    }
}

/// Take the draft (and any raw suggestion) out of a state.
fn split_editable(state: State) -> (CommitMessage, Option<String>) {
    match state {
        State::Editing {
            draft,
            raw_suggestion,
            ..
        } => (draft, raw_suggestion),
        State::Reviewing { draft }
        | State::AwaitingSuggestion { fallback: draft }
        | State::Applying { message: draft }
        | State::Finalized { message: draft, .. } => (draft, None),
        State::Gathering | State::Cancelled => (CommitMessage::default(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::{Applied, ApplyError};
    use crate::error::GitError;
    use crate::git::diff::{ChangedFile, FileStatus};
    use crate::grammar::{CommitType, Field, Rule, TypeToken};

    fn diff() -> DiffContext {
        DiffContext {
            text: "+fn login() {}\n".to_string(),
            files: vec![ChangedFile {
                path: "src/auth.rs".to_string(),
                status: FileStatus::Added,
                old_path: None,
            }],
            insertions: 1,
            deletions: 0,
            truncated: false,
        }
    }

    fn session() -> Session {
        Session::new(SessionOptions::default())
    }

    fn reviewing() -> Session {
        let mut s = session();
        s.handle(Event::Gathered(diff())).unwrap();
        s.handle(Event::SuggestionReceived(Ok(
            "feat(auth): add login endpoint".to_string()
        )))
        .unwrap();
        assert!(matches!(s.state(), State::Reviewing { .. }));
        s
    }

    #[test]
    fn test_gathered_requests_suggestion() {
        let mut s = session();
        let effects = s.handle(Event::Gathered(diff())).unwrap();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::RequestSuggestion(_)));
        assert!(matches!(s.state(), State::AwaitingSuggestion { .. }));
    }

    #[test]
    fn test_empty_diff_goes_to_editing_without_request() {
        let mut s = session();
        let effects = s.handle(Event::Gathered(DiffContext::default())).unwrap();
        assert!(effects.is_empty());
        assert!(matches!(s.state(), State::Editing { .. }));
        assert_eq!(s.draft(), Some(&CommitMessage::default()));
        assert_eq!(s.notice(), Some(&Notice::NoChanges));
        assert!(!s.can_regenerate());
    }

    #[test]
    fn test_ai_disabled_with_valid_seed_goes_to_reviewing() {
        let seed = CommitMessage::parse("fix: handle empty input").unwrap();
        let mut s = Session::new(SessionOptions {
            ai_enabled: false,
            seed: seed.clone(),
            target: ApplyTarget::AmendLast,
            ..Default::default()
        });
        assert!(s.handle(Event::Gathered(diff())).unwrap().is_empty());
        assert_eq!(s.state(), &State::Reviewing { draft: seed });
    }

    #[test]
    fn test_accept_emits_apply_and_finalizes() {
        let mut s = reviewing();
        let effects = s.handle(Event::Accept).unwrap();
        let Effect::Apply { message, target } = &effects[0] else {
            panic!("expected Apply effect");
        };
        assert_eq!(message.render(), "feat(auth): add login endpoint");
        assert_eq!(target, &ApplyTarget::NewCommit);

        s.handle(Event::Applied(Applied {
            commit_id: "abc123".to_string(),
            target: ApplyTarget::NewCommit,
        }))
        .unwrap();
        assert!(s.is_terminal());
        assert!(matches!(s.outcome(), Some(Outcome::Finalized { ref commit_id, .. }) if commit_id == "abc123"));
        assert_eq!(s.log(), &[SessionAction::Accepted]);
    }

    #[test]
    fn test_invalid_suggestion_goes_to_editing_with_raw_text() {
        let mut s = session();
        s.handle(Event::Gathered(diff())).unwrap();
        let raw = format!("feat: {}", "a".repeat(80));
        s.handle(Event::SuggestionReceived(Ok(raw.clone()))).unwrap();

        assert_eq!(s.raw_suggestion(), Some(raw.as_str()));
        assert_eq!(s.violations().len(), 1);
        assert_eq!(s.violations()[0].field, Field::Subject);
        assert!(matches!(
            s.violations()[0].rule,
            Rule::SubjectTooLong { max: 72, actual: 80 }
        ));
    }

    #[test]
    fn test_edit_to_valid_moves_to_reviewing() {
        let mut s = session();
        s.handle(Event::Gathered(diff())).unwrap();
        s.handle(Event::SuggestionReceived(Ok("feature: add login".to_string())))
            .unwrap();
        assert!(matches!(s.state(), State::Editing { .. }));
        assert!(matches!(s.handle(Event::Accept), Err(SessionError::InvalidEvent { .. })));

        s.handle(Event::EditField {
            field: Field::Type,
            value: "feat".to_string(),
        })
        .unwrap();
        assert_eq!(
            s.state(),
            &State::Reviewing {
                draft: CommitMessage {
                    commit_type: Some(TypeToken::Known(CommitType::Feat)),
                    subject: "add login".to_string(),
                    ..Default::default()
                }
            }
        );
    }

    #[test]
    fn test_ai_failure_keeps_fallback_and_logs() {
        let mut s = session();
        s.handle(Event::Gathered(diff())).unwrap();
        s.handle(Event::SuggestionReceived(Err(AiError::Timeout(30))))
            .unwrap();
        assert!(matches!(s.state(), State::Editing { .. }));
        assert_eq!(s.draft(), Some(&CommitMessage::default()));
        assert!(matches!(s.log(), [SessionAction::SuggestionFailed(_)]));
        assert!(matches!(s.notice(), Some(Notice::SuggestionFailed(_))));
    }

    #[test]
    fn test_regenerate_keeps_hint_and_draft() {
        let mut s = reviewing();
        let effects = s
            .handle(Event::Regenerate {
                hint: Some("shorter".to_string()),
            })
            .unwrap();
        let Effect::RequestSuggestion(request) = &effects[0] else {
            panic!("expected RequestSuggestion");
        };
        assert!(request.user.contains("- shorter"));
        assert_eq!(
            s.state(),
            &State::AwaitingSuggestion {
                fallback: CommitMessage::parse("feat(auth): add login endpoint").unwrap()
            }
        );
    }

    #[test]
    fn test_apply_failure_returns_to_reviewing_with_draft() {
        let mut s = reviewing();
        s.handle(Event::Retarget(ApplyTarget::RebaseEdit("deadbeef".to_string())))
            .unwrap();
        s.handle(Event::Accept).unwrap();
        assert!(matches!(s.handle(Event::Cancel), Err(SessionError::InvalidEvent { .. })));

        s.handle(Event::ApplyFailed(ApplyError {
            target: ApplyTarget::RebaseEdit("deadbeef".to_string()),
            source: GitError::CommitNotFound("deadbeef".to_string()),
        }))
        .unwrap();
        assert_eq!(
            s.state(),
            &State::Reviewing {
                draft: CommitMessage::parse("feat(auth): add login endpoint").unwrap()
            }
        );
        assert!(matches!(s.notice(), Some(Notice::ApplyFailed(_))));
    }

    #[test]
    fn test_replace_text_is_parsed_tolerantly() {
        let mut s = reviewing();
        s.handle(Event::ReplaceText(
            "fix(api): handle timeout\n\nCloses: #31\n".to_string(),
        ))
        .unwrap();
        let draft = s.draft().unwrap();
        assert_eq!(draft.header(), "fix(api): handle timeout");
        assert_eq!(draft.footer.as_deref(), Some("Closes: #31"));
        assert!(matches!(s.state(), State::Reviewing { .. }));

        s.handle(Event::ReplaceText("just words\nand more".to_string()))
            .unwrap();
        assert!(matches!(s.state(), State::Editing { .. }));
        assert_eq!(s.draft().unwrap().subject, "just words");
    }

    #[test]
    fn test_unparseable_suggestion_over_valid_seed_can_be_accepted() {
        let seed = CommitMessage::parse("fix(api): handle timeout").unwrap();
        let mut s = Session::new(SessionOptions {
            seed: seed.clone(),
            target: ApplyTarget::AmendLast,
            ..Default::default()
        });
        s.handle(Event::Gathered(diff())).unwrap();
        s.handle(Event::SuggestionReceived(Ok("I am not sure".to_string())))
            .unwrap();

        assert!(matches!(s.state(), State::Editing { .. }));
        assert!(s.violations().is_empty());
        assert_eq!(s.raw_suggestion(), Some("I am not sure"));
        assert!(s.can_accept());

        let effects = s.handle(Event::Accept).unwrap();
        assert_eq!(
            effects,
            vec![Effect::Apply {
                message: seed,
                target: ApplyTarget::AmendLast,
            }]
        );
    }

    #[test]
    fn test_disallowed_event_leaves_state_unchanged() {
        let mut s = session();
        let err = s.handle(Event::Accept).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidEvent {
                state: "gathering",
                event: "accept"
            }
        );
        assert_eq!(s.state(), &State::Gathering);
    }

    #[test]
    fn test_terminal_states_reject_events() {
        let mut s = reviewing();
        s.handle(Event::Cancel).unwrap();
        assert_eq!(s.outcome(), Some(Outcome::Cancelled));
        assert_eq!(s.handle(Event::Cancel), Err(SessionError::Terminated("cancelled")));
    }
}
