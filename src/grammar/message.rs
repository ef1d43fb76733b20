//! The structured commit message and its canonical text layout.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::GrammarError;
use crate::grammar::commit_type::TypeToken;

/// Header pattern: `type(scope)!: subject`. Scope and `!` are optional.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)(?:\(([^()\r\n]*)\))?(!)?:[ \t]*(.*)$")
        .expect("header pattern is valid")
});

/// Git trailer line: `Token: value`, `Token #value` or `BREAKING CHANGE: value`.
static TRAILER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:BREAKING CHANGE|[A-Za-z][A-Za-z0-9-]*)(?:: | #)\S.*$")
        .expect("trailer pattern is valid")
});

/// A commit message field that can be edited and validated on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Type,
    Scope,
    Subject,
    Body,
    Footer,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Type,
        Field::Scope,
        Field::Subject,
        Field::Body,
        Field::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Type => "type",
            Field::Scope => "scope",
            Field::Subject => "subject",
            Field::Body => "body",
            Field::Footer => "footer",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Conventional Commits message.
///
/// Renders as:
/// ```text
/// type(scope)!: subject
///
/// Body text.
///
/// Footer-Token: value
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMessage {
    pub commit_type: Option<TypeToken>,
    pub scope: Option<String>,
    /// Renders the `!` marker after the type/scope.
    pub breaking: bool,
    pub subject: String,
    pub body: Option<String>,
    pub footer: Option<String>,
}

impl CommitMessage {
    /// The first line of the rendered message.
    pub fn header(&self) -> String {
        let Some(ref commit_type) = self.commit_type else {
            return self.subject.clone();
        };

        let mut header = commit_type.to_string();
        if let Some(ref scope) = self.scope {
            header.push('(');
            header.push_str(scope);
            header.push(')');
        }
        if self.breaking {
            header.push('!');
        }
        header.push_str(": ");
        header.push_str(&self.subject);
        header
    }

    /// Render the canonical message text.
    ///
    /// Body and footer are each preceded by exactly one blank line and are
    /// omitted when blank.
    pub fn render(&self) -> String {
        let mut parts = vec![self.header()];

        if let Some(body) = block(&self.body) {
            parts.push(String::new());
            parts.push(body.to_string());
        }

        if let Some(footer) = block(&self.footer) {
            parts.push(String::new());
            parts.push(footer.to_string());
        }

        parts.join("\n")
    }

    /// Strictly parse a rendered message. The inverse of [`render`](Self::render)
    /// for every message that passes validation.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let text = text.trim_end_matches(['\n', '\r']);
        if text.trim().is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut lines = text.splitn(3, '\n');
        let header_line = lines.next().unwrap_or_default();
        let mut message = parse_header(header_line)
            .ok_or_else(|| GrammarError::MalformedHeader(header_line.to_string()))?;

        match lines.next() {
            None => return Ok(message),
            Some(separator) if !separator.trim().is_empty() => {
                return Err(GrammarError::MissingBlankLine);
            }
            Some(_) => {}
        }

        let rest = lines.next().unwrap_or_default();
        let (body, footer) = split_body_footer(rest);
        message.body = body;
        message.footer = footer;
        Ok(message)
    }

    /// Whether the message has nothing in it yet.
    pub fn is_empty(&self) -> bool {
        *self == CommitMessage::default()
    }

    /// Replace one field from user input.
    ///
    /// Blank input clears optional fields. A trailing `!` on the type sets
    /// the breaking marker.
    pub fn set_field(&mut self, field: Field, value: &str) {
        match field {
            Field::Type => {
                let value = value.trim();
                let (token, breaking) = match value.strip_suffix('!') {
                    Some(token) => (token.trim(), true),
                    None => (value, false),
                };
                self.breaking = breaking;
                self.commit_type = (!token.is_empty()).then(|| TypeToken::parse(token));
            }
            Field::Scope => {
                let value = value.trim();
                self.scope = (!value.is_empty()).then(|| value.to_string());
            }
            Field::Subject => self.subject = value.trim().to_string(),
            Field::Body => self.body = (!value.trim().is_empty()).then(|| value.to_string()),
            Field::Footer => {
                self.footer = (!value.trim().is_empty()).then(|| value.to_string())
            }
        }
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Parse a header line into a message with only the header fields set.
///
/// Accepts any type token; callers decide what an unlisted type means.
pub(crate) fn parse_header(line: &str) -> Option<CommitMessage> {
    let caps = HEADER_RE.captures(line.trim_end())?;
    let commit_type = caps.get(1).map(|m| TypeToken::parse(m.as_str()))?;
    let scope = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    Some(CommitMessage {
        commit_type: Some(commit_type),
        scope,
        breaking: caps.get(3).is_some(),
        subject: caps.get(4).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        body: None,
        footer: None,
    })
}

/// Whether a line is a git trailer (`Closes: #31`, `Refs #12`, `BREAKING CHANGE: ...`).
pub fn is_trailer_line(line: &str) -> bool {
    TRAILER_RE.is_match(line)
}

/// Whether every line of a block is a trailer.
pub fn is_trailer_block(block: &str) -> bool {
    !block.trim().is_empty() && block.lines().all(is_trailer_line)
}

/// Split the text after the header's blank line into body and footer.
///
/// The footer is the final paragraph when it consists only of trailers.
pub(crate) fn split_body_footer(rest: &str) -> (Option<String>, Option<String>) {
    if rest.trim().is_empty() {
        return (None, None);
    }

    match rest.rfind("\n\n") {
        Some(idx) if is_trailer_block(&rest[idx + 2..]) => {
            let body = &rest[..idx];
            (
                (!body.trim().is_empty()).then(|| body.to_string()),
                Some(rest[idx + 2..].to_string()),
            )
        }
        None if is_trailer_block(rest) => (None, Some(rest.to_string())),
        _ => (Some(rest.to_string()), None),
    }
}

/// The renderable content of an optional block, without surrounding newlines.
fn block(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(|v| v.trim_matches(['\n', '\r']))
        .filter(|v| !v.trim().is_empty())
}
