//! Text shown by the interactive menus. Pure functions, no terminal access.

use std::fmt::Write as _;

use crate::git::CommandRecord;
use crate::grammar::{CommitMessage, CommitType, Field};
use crate::history::{HistorySummary, RecordOutcome};
use crate::i18n::{Language, Msg};
use crate::session::{Notice, Session, State};

/// One-line preview of a multi-line block for the field picker.
fn block_preview(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    match lines.count() {
        0 => first.to_string(),
        more => format!("{first} (+{more})"),
    }
}

/// Editor output for a body or footer. Closing without saving keeps the current text.
pub fn edited_block(edited: Option<String>, current: &str) -> String {
    match edited {
        Some(text) => text.trim_matches(['\n', '\r']).to_string(),
        None => current.to_string(),
    }
}

pub fn notice_text(notice: &Notice, lang: Language) -> String {
    match notice {
        Notice::NoChanges => lang.tr(Msg::NoticeNoChanges).to_string(),
        Notice::Manual => lang.tr(Msg::NoticeManual).to_string(),
        Notice::SuggestionFailed(e) => format!("{} ({e})", lang.tr(Msg::NoticeSuggestionFailed)),
        Notice::SuggestionUnusable => lang.tr(Msg::NoticeSuggestionUnusable).to_string(),
        Notice::SuggestionInvalid => lang.tr(Msg::NoticeSuggestionInvalid).to_string(),
        Notice::ApplyFailed(e) => format!("{} ({e})", lang.tr(Msg::NoticeApplyFailed)),
    }
}

/// Current value of a field, as shown in the field picker.
pub fn field_value(draft: &CommitMessage, field: Field) -> String {
    match field {
        Field::Type => {
            let token = draft
                .commit_type
                .as_ref()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default();
            if draft.breaking {
                format!("{token}!")
            } else {
                token
            }
        }
        Field::Scope => draft.scope.clone().unwrap_or_default(),
        Field::Subject => draft.subject.clone(),
        Field::Body => block_preview(draft.body.as_deref().unwrap_or_default()),
        Field::Footer => block_preview(draft.footer.as_deref().unwrap_or_default()),
    }
}

/// The review screen: notice, draft, problems and raw completion.
pub fn session_screen(session: &Session) -> String {
    let lang = session.language();
    let mut out = String::new();

    if let Some(notice) = session.notice() {
        let _ = writeln!(out, "! {}\n", notice_text(notice, lang));
    }

    let title = match session.state() {
        State::Editing { .. } => lang.tr(Msg::EditingTitle),
        _ => lang.tr(Msg::ReviewTitle),
    };
    let _ = writeln!(out, "── {title} ──");
    let _ = writeln!(out, "{}: {}", lang.tr(Msg::TargetLabel), session.target());

    if let Some(draft) = session.draft() {
        let rendered = draft.render();
        if rendered.trim().is_empty() {
            let _ = writeln!(out, "\n  (empty)");
        } else {
            let _ = writeln!(out);
            for line in rendered.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
    }

    let violations = session.violations();
    if !violations.is_empty() {
        let _ = writeln!(out, "\n{}:", lang.tr(Msg::ViolationsTitle));
        for violation in violations {
            let _ = writeln!(out, "  - {}", violation.describe(lang));
        }
    }

    if let Some(raw) = session.raw_suggestion() {
        let _ = writeln!(out, "\n{}:", lang.tr(Msg::RawSuggestionTitle));
        for line in raw.lines() {
            let _ = writeln!(out, "  | {line}");
        }
    }
    out
}

/// Entry of the type picker, marking types that fit the diff.
pub fn type_choice(commit_type: CommitType, suggested: &[CommitType], lang: Language) -> String {
    let mut label = format!("{:<9} {}", commit_type.as_str(), commit_type.description(lang));
    if suggested.contains(&commit_type) {
        let _ = write!(label, "  ({})", lang.tr(Msg::Suggested));
    }
    label
}

/// Commands run during the last operation, so the user can repeat them by hand.
pub fn command_summary(records: &[CommandRecord], lang: Language) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let mut out = format!("{}\n", lang.tr(Msg::CommandSummaryTitle));
    for record in records {
        let _ = writeln!(out, "  $ {}", record.command);
    }
    let _ = write!(out, "{}", lang.tr(Msg::CommandSummaryHint));
    Some(out)
}

pub fn history_text(summary: &HistorySummary, lang: Language) -> String {
    if summary.total == 0 {
        return lang.tr(Msg::HistoryEmpty).to_string();
    }

    let mut out = format!("── {} ──\n", lang.tr(Msg::HistoryTitle));
    let _ = writeln!(out, "  {}: {}", lang.tr(Msg::HistoryFinalized), summary.finalized);
    let _ = writeln!(out, "  {}: {}", lang.tr(Msg::HistoryCancelled), summary.cancelled);

    if !summary.by_type.is_empty() {
        let _ = writeln!(out, "{}:", lang.tr(Msg::HistoryByType));
        for (commit_type, count) in &summary.by_type {
            let _ = writeln!(out, "  {commit_type:<9} {count}");
        }
    }

    if let Some(ref last) = summary.last {
        let outcome = match last.outcome {
            RecordOutcome::Finalized => lang.tr(Msg::HistoryFinalized),
            RecordOutcome::Cancelled => lang.tr(Msg::HistoryCancelled),
        };
        let _ = write!(
            out,
            "{}: {} ({}, {})",
            lang.tr(Msg::HistoryLast),
            last.timestamp.format("%Y-%m-%d %H:%M"),
            outcome,
            last.target
        );
        if let Some(ref header) = last.header {
            let _ = write!(out, "\n  {header}");
        }
    }
    out
}

/// Reference card for the message format.
pub fn format_rules(lang: Language, max_subject_len: usize) -> String {
    let mut out = String::new();
    match lang {
        Language::En => {
            out.push_str("── Conventional Commits format ──\n\n");
            out.push_str("  type(scope)!: subject\n\n  body\n\n  footer\n\n");
            out.push_str("Types:\n");
        }
        Language::Es => {
            out.push_str("── Formato Conventional Commits ──\n\n");
            out.push_str("  tipo(ámbito)!: asunto\n\n  cuerpo\n\n  pie\n\n");
            out.push_str("Tipos:\n");
        }
    }
    for commit_type in CommitType::ALL {
        let _ = writeln!(out, "  {:<9} {}", commit_type.as_str(), commit_type.description(lang));
    }

    let rules = match lang {
        Language::En => [
            "Scope is optional: letters, digits, '-', '_' and '/'.".to_string(),
            "'!' after the type or scope marks a breaking change.".to_string(),
            format!("Subject: one line, at most {max_subject_len} characters, no trailing period."),
            "Body: optional, separated from the header by a blank line.".to_string(),
            "Footer: trailers such as 'Closes: #12' or 'BREAKING CHANGE: ...'.".to_string(),
        ],
        Language::Es => [
            "El ámbito es opcional: letras, dígitos, '-', '_' y '/'.".to_string(),
            "'!' tras el tipo o el ámbito marca un cambio disruptivo.".to_string(),
            format!("Asunto: una línea, como máximo {max_subject_len} caracteres, sin punto final."),
            "Cuerpo: opcional, separado del encabezado por una línea en blanco.".to_string(),
            "Pie: trailers como 'Closes: #12' o 'BREAKING CHANGE: ...'.".to_string(),
        ],
    };
    out.push('\n');
    for rule in rules {
        let _ = writeln!(out, "- {rule}");
    }

    let example = match lang {
        Language::En => "\nExample:\n  feat(auth): add login endpoint\n\n  Closes: #42",
        Language::Es => "\nEjemplo:\n  feat(auth): añade endpoint de login\n\n  Closes: #42",
    };
    out.push_str(example);
    out
}
