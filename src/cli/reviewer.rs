//! Terminal implementation of [`Reviewer`] built on dialoguer prompts.

use async_trait::async_trait;
use dialoguer::{Confirm, Editor, Input, Select};

use crate::apply::ApplyTarget;
use crate::cli::view;
use crate::error::SessionError;
use crate::grammar::{CommitMessage, CommitType, Field};
use crate::i18n::{Language, Msg};
use crate::session::{Reviewer, Session, UserAction};

/// Menu entries of the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Accept,
    EditField,
    EditText,
    Regenerate,
    Retarget,
    Cancel,
}

impl Choice {
    fn label(self, lang: Language) -> &'static str {
        let msg = match self {
            Choice::Accept => Msg::ActionAccept,
            Choice::EditField => Msg::ActionEditField,
            Choice::EditText => Msg::ActionEditText,
            Choice::Regenerate => Msg::ActionRegenerate,
            Choice::Retarget => Msg::ActionRetarget,
            Choice::Cancel => Msg::ActionCancel,
        };
        lang.tr(msg)
    }
}

/// Entries offered for the session's current state.
fn choices(session: &Session) -> Vec<Choice> {
    let mut choices = Vec::new();
    if session.can_accept() {
        choices.push(Choice::Accept);
    }
    choices.push(Choice::EditField);
    choices.push(Choice::EditText);
    if session.can_regenerate() {
        choices.push(Choice::Regenerate);
    }
    if matches!(session.target(), ApplyTarget::RebaseEdit(_)) {
        choices.push(Choice::Retarget);
    }
    choices.push(Choice::Cancel);
    choices
}

fn input_error(e: dialoguer::Error) -> SessionError {
    SessionError::Input(e.to_string())
}

/// Asks the user what to do with the draft on stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalReviewer;

impl TerminalReviewer {
    pub fn new() -> Self {
        Self
    }

    fn edit_field(&self, draft: &CommitMessage, lang: Language) -> Result<UserAction, SessionError> {
        let labels: Vec<String> = Field::ALL
            .iter()
            .map(|field| format!("{:<8} {}", field.as_str(), view::field_value(draft, *field)))
            .collect();
        let idx = Select::new()
            .with_prompt(lang.tr(Msg::FieldPrompt))
            .items(&labels)
            .default(0)
            .interact()
            .map_err(input_error)?;
        let field = Field::ALL[idx];

        let value = match field {
            Field::Type => self.pick_type(draft, lang)?,
            Field::Scope => self.text(lang.tr(Msg::ScopePrompt), &view::field_value(draft, field))?,
            Field::Subject => {
                self.text(lang.tr(Msg::SubjectPrompt), &view::field_value(draft, field))?
            }
            Field::Body => self.block(lang.tr(Msg::BodyPrompt), draft.body.as_deref())?,
            Field::Footer => self.block(lang.tr(Msg::FooterPrompt), draft.footer.as_deref())?,
        };
        Ok(UserAction::EditField { field, value })
    }

    /// Type from the closed set plus the breaking marker, as a `type!` token.
    fn pick_type(&self, draft: &CommitMessage, lang: Language) -> Result<String, SessionError> {
        let current = draft.commit_type.as_ref().and_then(|t| t.known());
        let labels: Vec<String> = CommitType::ALL
            .iter()
            .map(|t| view::type_choice(*t, &[], lang))
            .collect();
        let default = current
            .and_then(|c| CommitType::ALL.iter().position(|t| *t == c))
            .unwrap_or(0);

        let idx = Select::new()
            .with_prompt(lang.tr(Msg::TypePrompt))
            .items(&labels)
            .default(default)
            .interact()
            .map_err(input_error)?;
        let breaking = Confirm::new()
            .with_prompt(lang.tr(Msg::BreakingPrompt))
            .default(draft.breaking)
            .interact()
            .map_err(input_error)?;

        let token = CommitType::ALL[idx].as_str();
        Ok(if breaking { format!("{token}!") } else { token.to_string() })
    }

    /// Multi-line fields are edited in `$EDITOR`, so line breaks and pipes survive.
    fn block(&self, prompt: &str, current: Option<&str>) -> Result<String, SessionError> {
        let current = current.unwrap_or_default();
        println!("{prompt}");
        let edited = Editor::new()
            .extension(".txt")
            .edit(current)
            .map_err(input_error)?;
        Ok(view::edited_block(edited, current))
    }

    fn text(&self, prompt: &str, initial: &str) -> Result<String, SessionError> {
        Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)
    }
}

#[async_trait]
impl Reviewer for TerminalReviewer {
    async fn next_action(&mut self, session: &Session) -> Result<UserAction, SessionError> {
        let lang = session.language();
        println!("\n{}", view::session_screen(session));

        let choices = choices(session);
        let labels: Vec<&str> = choices.iter().map(|c| c.label(lang)).collect();

        loop {
            let idx = Select::new()
                .with_prompt(lang.tr(Msg::ActionPrompt))
                .items(&labels)
                .default(0)
                .interact()
                .map_err(input_error)?;

            let draft = session.draft().cloned().unwrap_or_default();
            match choices[idx] {
                Choice::Accept => return Ok(UserAction::Accept),
                Choice::EditField => return self.edit_field(&draft, lang),
                Choice::EditText => {
                    // None means the editor was closed without saving
                    let edited = Editor::new()
                        .extension(".txt")
                        .edit(&draft.render())
                        .map_err(input_error)?;
                    if let Some(text) = edited {
                        return Ok(UserAction::ReplaceText(text));
                    }
                }
                Choice::Regenerate => {
                    let hint = self.text(lang.tr(Msg::RegenerateHintPrompt), "")?;
                    let hint = hint.trim();
                    return Ok(UserAction::Regenerate(
                        (!hint.is_empty()).then(|| hint.to_string()),
                    ));
                }
                Choice::Retarget => {
                    let id = self.text(lang.tr(Msg::CommitIdPrompt), "")?;
                    let id = id.trim();
                    if !id.is_empty() {
                        return Ok(UserAction::Retarget(ApplyTarget::RebaseEdit(id.to_string())));
                    }
                }
                Choice::Cancel => return Ok(UserAction::Cancel),
            }
        }
    }

    fn waiting(&mut self, session: &Session) {
        println!("{}", session.language().tr(Msg::Generating));
    }

    fn rejected(&mut self, _session: &Session, error: &SessionError) {
        eprintln!("{error}");
    }
}
