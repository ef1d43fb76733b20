//! Prompt construction for AI-drafted commit messages.
//!
//! Building a prompt is pure: the same diff, language and hints always give
//! the same request.

pub mod sanitize;

use crate::git::diff::DiffContext;
use crate::grammar::{CommitType, DEFAULT_MAX_SUBJECT_LEN};
use crate::i18n::Language;

pub use sanitize::sanitize_diff;

/// Default diff budget, in characters.
pub const DEFAULT_DIFF_BUDGET: usize = 30_000;

/// A prompt ready for the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub system: String,
    pub user: String,
    pub language: Language,
}

/// Optional steering for the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptHints {
    pub commit_type: Option<CommitType>,
    pub scope: Option<String>,
    /// Issue reference to close in the footer, e.g. `#31`.
    pub ticket: Option<String>,
    /// Free-form requests collected on regeneration ("shorter", "mention the cache").
    pub extra: Vec<String>,
}

impl PromptHints {
    pub fn is_empty(&self) -> bool {
        self.commit_type.is_none()
            && self.scope.is_none()
            && self.ticket.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    pub diff_budget: usize,
    pub max_subject_len: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            diff_budget: DEFAULT_DIFF_BUDGET,
            max_subject_len: DEFAULT_MAX_SUBJECT_LEN,
        }
    }
}

impl PromptBuilder {
    pub fn new(diff_budget: usize, max_subject_len: usize) -> Self {
        Self {
            diff_budget,
            max_subject_len,
        }
    }

    pub fn build(&self, diff: &DiffContext, language: Language, hints: &PromptHints) -> PromptRequest {
        PromptRequest {
            system: self.system_prompt(language),
            user: self.user_prompt(diff, language, hints),
            language,
        }
    }

    fn system_prompt(&self, lang: Language) -> String {
        let types = CommitType::ALL
            .iter()
            .map(|t| format!("- {}: {}", t, t.description(lang)))
            .collect::<Vec<_>>()
            .join("\n");
        let max = self.max_subject_len;

        match lang {
            Language::En => format!(
                r#"You write git commit messages that follow the Conventional Commits specification.

## Allowed types
{types}

## Header
- Format: `type(scope): subject`. The scope is optional; add `!` before the colon for breaking changes.
- The scope may only contain letters, digits, `-`, `_` and `/`.
- Subject: imperative mood, lowercase first word, at most {max} characters, NO period at the end.

## Body
- Optional. Separate it from the header with one blank line.
- Explain WHY the change was made, not what the diff already shows.
- Wrap lines at 72 characters.

## Footer
- Optional. Separate it from the body with one blank line.
- Only trailer lines such as `Closes: #31`, `Refs #12` or `BREAKING CHANGE: description`.

## Output
Write the message in English. Reply with ONLY the commit message: no markdown, no code fences, no explanation."#
            ),
            Language::Es => format!(
                r#"Escribes mensajes de commit de git que siguen la especificación Conventional Commits.

## Tipos permitidos
{types}

## Cabecera
- Formato: `tipo(ámbito): asunto`. El ámbito es opcional; añade `!` antes de los dos puntos para cambios disruptivos.
- El ámbito solo puede contener letras, dígitos, `-`, `_` y `/`.
- Los tipos se escriben siempre en inglés, tal como aparecen en la lista.
- Asunto: modo imperativo, primera palabra en minúscula, como máximo {max} caracteres, SIN punto final.

## Cuerpo
- Opcional. Sepáralo de la cabecera con una línea en blanco.
- Explica POR QUÉ se hizo el cambio, no lo que el diff ya muestra.
- Ajusta las líneas a 72 caracteres.

## Pie
- Opcional. Sepáralo del cuerpo con una línea en blanco.
- Solo líneas de trailer como `Closes: #31`, `Refs #12` o `BREAKING CHANGE: descripción`.

## Salida
Escribe el mensaje en español. Responde ÚNICAMENTE con el mensaje de commit: sin markdown, sin bloques de código, sin explicaciones."#
            ),
        }
    }

    fn user_prompt(&self, diff: &DiffContext, lang: Language, hints: &PromptHints) -> String {
        let files = if diff.files.is_empty() {
            "-".to_string()
        } else {
            diff.files
                .iter()
                .map(|f| match f.old_path {
                    Some(ref old) => format!("- {} ({}, {} -> {})", f.path, f.status, old, f.path),
                    None => format!("- {} ({})", f.path, f.status),
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let sanitized = sanitize_diff(&diff.text);
        let total = sanitized.chars().count();
        let (kept, cut) = sanitize::truncate_chars(&sanitized, self.diff_budget);
        let marker = if cut || diff.truncated {
            match lang {
                Language::En => format!(
                    "\n[diff truncated: showing {} of {} characters; focus on the visible changes]",
                    kept.chars().count(),
                    total
                ),
                Language::Es => format!(
                    "\n[diff truncado: se muestran {} de {} caracteres; céntrate en los cambios visibles]",
                    kept.chars().count(),
                    total
                ),
            }
        } else {
            String::new()
        };

        let hint_lines = hint_lines(hints, lang);
        let (files_title, diff_title, hints_title) = match lang {
            Language::En => ("Changed files", "Diff", "Requirements"),
            Language::Es => ("Archivos modificados", "Diff", "Requisitos"),
        };

        let mut prompt = format!(
            "## {files_title} ({count}, +{insertions} -{deletions})\n{files}\n\n## {diff_title}\n```diff\n{kept}\n```{marker}",
            count = diff.file_count(),
            insertions = diff.insertions,
            deletions = diff.deletions,
        );
        if !hint_lines.is_empty() {
            prompt.push_str(&format!("\n\n## {hints_title}\n{}", hint_lines.join("\n")));
        }
        prompt
    }
}

fn hint_lines(hints: &PromptHints, lang: Language) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(t) = hints.commit_type {
        lines.push(match lang {
            Language::En => format!("- Use the type `{t}`."),
            Language::Es => format!("- Usa el tipo `{t}`."),
        });
    }
    if let Some(ref scope) = hints.scope {
        lines.push(match lang {
            Language::En => format!("- Use the scope `{scope}`."),
            Language::Es => format!("- Usa el ámbito `{scope}`."),
        });
    }
    if let Some(ref ticket) = hints.ticket {
        lines.push(match lang {
            Language::En => format!("- Add the footer trailer `Closes: {ticket}`."),
            Language::Es => format!("- Añade el trailer de pie `Closes: {ticket}`."),
        });
    }
    for extra in &hints.extra {
        lines.push(format!("- {}", sanitize::remove_control_chars(extra.trim())));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::diff::{ChangedFile, FileStatus};

    fn diff(text: &str) -> DiffContext {
        DiffContext {
            text: text.to_string(),
            files: vec![
                ChangedFile {
                    path: "src/auth/login.rs".to_string(),
                    status: FileStatus::Added,
                    old_path: None,
                },
                ChangedFile {
                    path: "src/auth/session.rs".to_string(),
                    status: FileStatus::Modified,
                    old_path: None,
                },
            ],
            insertions: 10,
            deletions: 3,
            truncated: false,
        }
    }

    #[test]
    fn test_build_includes_types_and_limits() {
        let request = PromptBuilder::new(30_000, 50).build(&diff("+x\n"), Language::En, &PromptHints::default());
        for t in CommitType::ALL {
            assert!(request.system.contains(&format!("- {}: ", t)));
        }
        assert!(request.system.contains("at most 50 characters"));
        assert!(request.system.contains("BREAKING CHANGE"));
        assert_eq!(request.language, Language::En);
    }

    #[test]
    fn test_build_includes_files_and_diff() {
        let request = PromptBuilder::default().build(
            &diff("+pub fn login() {}\n"),
            Language::En,
            &PromptHints::default(),
        );
        assert!(request.user.contains("src/auth/login.rs (Added)"));
        assert!(request.user.contains("src/auth/session.rs (Modified)"));
        assert!(request.user.contains("+pub fn login() {}"));
        assert!(request.user.contains("(2, +10 -3)"));
        assert!(!request.user.contains("Requirements"));
    }

    #[test]
    fn test_build_spanish_text() {
        let request = PromptBuilder::default().build(&diff("+x\n"), Language::Es, &PromptHints::default());
        assert!(request.system.contains("Escribe el mensaje en español"));
        assert!(request.system.contains(CommitType::Feat.description(Language::Es)));
        assert!(request.user.contains("Archivos modificados"));
    }

    #[test]
    fn test_build_truncates_to_budget_with_marker() {
        let text = "+line\n".repeat(100);
        let request = PromptBuilder::new(60, 72).build(&diff(&text), Language::En, &PromptHints::default());
        assert!(request.user.contains("[diff truncated: showing 60 of 600 characters"));
        assert!(!request.user.contains(&"+line\n".repeat(11)));
    }

    #[test]
    fn test_build_strips_escape_sequences() {
        let request = PromptBuilder::default().build(
            &diff("+\u{1b}[32mok\u{1b}[0m\n"),
            Language::En,
            &PromptHints::default(),
        );
        assert!(request.user.contains("+ok\n"));
        assert!(!request.user.contains('\u{1b}'));
    }

    #[test]
    fn test_build_embeds_hints() {
        let hints = PromptHints {
            commit_type: Some(CommitType::Fix),
            scope: Some("api".to_string()),
            ticket: Some("#31".to_string()),
            extra: vec!["shorter".to_string()],
        };
        let request = PromptBuilder::default().build(&diff("+x\n"), Language::En, &hints);
        assert!(request.user.contains("- Use the type `fix`."));
        assert!(request.user.contains("- Use the scope `api`."));
        assert!(request.user.contains("`Closes: #31`"));
        assert!(request.user.contains("- shorter"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::default();
        let d = diff("+x\n");
        assert_eq!(
            builder.build(&d, Language::En, &PromptHints::default()),
            builder.build(&d, Language::En, &PromptHints::default())
        );
    }
}
