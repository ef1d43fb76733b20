//! Turning raw completion text into a commit message draft.

mod parser;

pub use parser::parse;

use crate::grammar::{CommitMessage, Field};

/// What the parser could recover from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A header with a type from the closed set was found.
    Parsed(CommitMessage),
    /// Some structure was found, but the listed fields need the user.
    PartialParsed {
        draft: CommitMessage,
        missing: Vec<Field>,
    },
    /// No header could be found. Carries the raw text.
    Unparseable(String),
}

impl ParseOutcome {
    pub fn draft(&self) -> Option<&CommitMessage> {
        match self {
            ParseOutcome::Parsed(draft) | ParseOutcome::PartialParsed { draft, .. } => Some(draft),
            ParseOutcome::Unparseable(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParseOutcome::Parsed(_) => "parsed",
            ParseOutcome::PartialParsed { .. } => "partial",
            ParseOutcome::Unparseable(_) => "unparseable",
        }
    }
}

/// Read a full message typed by a person, keeping whatever structure it has.
///
/// Text without a recognizable header becomes a subject (first line) and body.
pub fn draft_from_text(text: &str) -> CommitMessage {
    match parse(text) {
        ParseOutcome::Parsed(draft) | ParseOutcome::PartialParsed { draft, .. } => draft,
        ParseOutcome::Unparseable(_) => {
            let text = text.trim();
            let (subject, body) = match text.split_once('\n') {
                Some((subject, body)) => (subject, Some(body.trim().to_string())),
                None => (text, None),
            };
            CommitMessage {
                subject: subject.trim().to_string(),
                body: body.filter(|b| !b.is_empty()),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_becomes_subject_and_body() {
        let draft = draft_from_text("Update things\n\nLonger explanation.\n");
        assert_eq!(draft.commit_type, None);
        assert_eq!(draft.subject, "Update things");
        assert_eq!(draft.body.as_deref(), Some("Longer explanation."));
    }

    #[test]
    fn test_conventional_text_keeps_structure() {
        let draft = draft_from_text("docs(readme): fix typo");
        assert_eq!(draft.header(), "docs(readme): fix typo");
    }
}
