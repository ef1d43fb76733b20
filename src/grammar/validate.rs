//! Rule checks for commit messages.
//!
//! Validation never mutates or corrects a message: every problem is
//! reported as a [`Violation`] naming the field and the rule it breaks.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::grammar::commit_type::{CommitType, TypeToken};
use crate::grammar::message::{CommitMessage, Field, is_trailer_block, is_trailer_line};
use crate::i18n::Language;

static SCOPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_/-]+$").expect("scope pattern is valid"));

/// A broken rule, with the data needed to explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    MissingType,
    UnknownType(String),
    InvalidScope(String),
    EmptySubject,
    MultiLineSubject,
    SubjectTooLong { max: usize, actual: usize },
    TrailingPeriod,
    SurroundingWhitespace,
    SurroundingBlankLines,
    NotATrailer(String),
    TrailersInBody,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub rule: Rule,
}

impl Violation {
    fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }

    /// Actionable description in the session language.
    pub fn describe(&self, lang: Language) -> String {
        let detail = match (&self.rule, lang) {
            (Rule::MissingType, Language::En) => format!(
                "a type is required (one of {})",
                allowed_types()
            ),
            (Rule::MissingType, Language::Es) => format!(
                "el tipo es obligatorio (uno de {})",
                allowed_types()
            ),
            (Rule::UnknownType(t), Language::En) => format!(
                "'{t}' is not a Conventional Commits type (use one of {})",
                allowed_types()
            ),
            (Rule::UnknownType(t), Language::Es) => format!(
                "'{t}' no es un tipo de Conventional Commits (usa uno de {})",
                allowed_types()
            ),
            (Rule::InvalidScope(s), Language::En) => format!(
                "'{s}' may only contain letters, digits, '-', '_' and '/'"
            ),
            (Rule::InvalidScope(s), Language::Es) => format!(
                "'{s}' solo puede contener letras, dígitos, '-', '_' y '/'"
            ),
            (Rule::EmptySubject, Language::En) => "the subject cannot be empty".to_string(),
            (Rule::EmptySubject, Language::Es) => "el asunto no puede estar vacío".to_string(),
            (Rule::MultiLineSubject, Language::En) => "the subject must be a single line".to_string(),
            (Rule::MultiLineSubject, Language::Es) => "el asunto debe ser una sola línea".to_string(),
            (Rule::SubjectTooLong { max, actual }, Language::En) => {
                format!("the subject is {actual} characters long (maximum {max})")
            }
            (Rule::SubjectTooLong { max, actual }, Language::Es) => {
                format!("el asunto tiene {actual} caracteres (máximo {max})")
            }
            (Rule::TrailingPeriod, Language::En) => "do not end the subject with a period".to_string(),
            (Rule::TrailingPeriod, Language::Es) => "no termines el asunto con un punto".to_string(),
            (Rule::SurroundingWhitespace, Language::En) => {
                "remove leading and trailing spaces".to_string()
            }
            (Rule::SurroundingWhitespace, Language::Es) => {
                "elimina los espacios al inicio y al final".to_string()
            }
            (Rule::SurroundingBlankLines, Language::En) => {
                "remove blank lines at the start and end".to_string()
            }
            (Rule::SurroundingBlankLines, Language::Es) => {
                "elimina las líneas en blanco al inicio y al final".to_string()
            }
            (Rule::NotATrailer(line), Language::En) => format!(
                "'{line}' is not a trailer (use 'Token: value' or 'Token #value')"
            ),
            (Rule::NotATrailer(line), Language::Es) => format!(
                "'{line}' no es un trailer (usa 'Token: valor' o 'Token #valor')"
            ),
            (Rule::TrailersInBody, Language::En) => {
                "the last paragraph only has trailers; move it to the footer".to_string()
            }
            (Rule::TrailersInBody, Language::Es) => {
                "el último párrafo solo tiene trailers; muévelo al pie".to_string()
            }
        };
        format!("{}: {}", self.field, detail)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(Language::En))
    }
}

/// Check a message against the grammar. An empty result means valid.
pub fn validate(msg: &CommitMessage, max_subject_len: usize) -> Vec<Violation> {
    let mut violations = Vec::new();

    match &msg.commit_type {
        None => violations.push(Violation::new(Field::Type, Rule::MissingType)),
        Some(TypeToken::Other(t)) => {
            violations.push(Violation::new(Field::Type, Rule::UnknownType(t.clone())))
        }
        Some(TypeToken::Known(_)) => {}
    }

    if let Some(ref scope) = msg.scope
        && !SCOPE_RE.is_match(scope)
    {
        violations.push(Violation::new(Field::Scope, Rule::InvalidScope(scope.clone())));
    }

    check_subject(&msg.subject, max_subject_len, &mut violations);

    if let Some(ref body) = msg.body
        && !body.trim().is_empty()
    {
        if has_surrounding_blank_lines(body) {
            violations.push(Violation::new(Field::Body, Rule::SurroundingBlankLines));
        }
        let last_paragraph = body
            .trim_end_matches(['\n', '\r'])
            .rsplit("\n\n")
            .next()
            .unwrap_or_default();
        if is_trailer_block(last_paragraph) {
            violations.push(Violation::new(Field::Body, Rule::TrailersInBody));
        }
    }

    if let Some(ref footer) = msg.footer
        && !footer.trim().is_empty()
    {
        if has_surrounding_blank_lines(footer) {
            violations.push(Violation::new(Field::Footer, Rule::SurroundingBlankLines));
        }
        for line in footer.trim_matches(['\n', '\r']).lines() {
            if !is_trailer_line(line) {
                violations.push(Violation::new(Field::Footer, Rule::NotATrailer(line.to_string())));
            }
        }
    }

    violations
}

fn check_subject(subject: &str, max_len: usize, violations: &mut Vec<Violation>) {
    if subject.trim().is_empty() {
        violations.push(Violation::new(Field::Subject, Rule::EmptySubject));
        return;
    }
    if subject.contains('\n') {
        violations.push(Violation::new(Field::Subject, Rule::MultiLineSubject));
    }
    if subject.trim() != subject {
        violations.push(Violation::new(Field::Subject, Rule::SurroundingWhitespace));
    }
    let actual = subject.chars().count();
    if actual > max_len {
        violations.push(Violation::new(
            Field::Subject,
            Rule::SubjectTooLong { max: max_len, actual },
        ));
    }
    if subject.trim_end().ends_with('.') {
        violations.push(Violation::new(Field::Subject, Rule::TrailingPeriod));
    }
}

fn has_surrounding_blank_lines(block: &str) -> bool {
    let first = block.lines().next().unwrap_or_default();
    let last = block.lines().last().unwrap_or_default();
    // render trims line breaks at both ends, so a stray `\r` would not survive
    first.trim().is_empty()
        || last.trim().is_empty()
        || block.starts_with(['\n', '\r'])
        || block.ends_with(['\n', '\r'])
}

fn allowed_types() -> String {
    CommitType::ALL
        .iter()
        .map(CommitType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
