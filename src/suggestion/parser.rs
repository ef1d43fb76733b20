//! Tolerant, line-oriented parsing of completion text.
//!
//! Models wrap messages in code fences, quote them, open with a sentence of
//! chatter, or drop the colon after the type. The parser looks past all of
//! that for a header, then reads the remaining blocks as body and footer.

use tracing::debug;

use crate::grammar::message::{parse_header, split_body_footer};
use crate::grammar::{CommitMessage, CommitType, Field, TypeToken};
use crate::suggestion::ParseOutcome;

const WRAPPERS: [char; 4] = ['`', '"', '\'', '*'];

struct Header {
    message: CommitMessage,
    missing: Vec<Field>,
    /// Text after the first sentence of a colon-less header.
    spill: Option<String>,
}

/// Parse raw completion text.
///
/// Never yields [`ParseOutcome::Parsed`] with a type outside the closed set.
pub fn parse(raw: &str) -> ParseOutcome {
    let cleaned = clean(raw);
    let lines: Vec<&str> = cleaned.lines().collect();

    let Some((idx, header)) = find_header(&lines) else {
        debug!("No commit header found in suggestion");
        return ParseOutcome::Unparseable(raw.to_string());
    };
    if idx > 0 {
        debug!(skipped = idx, "Skipped preamble lines before header");
    }

    let Header {
        mut message,
        mut missing,
        spill,
    } = header;

    let rest = remaining_text(&lines[idx + 1..], spill);
    let (body, footer) = split_body_footer(&rest);
    message.body = body;
    message.footer = footer;

    if message.subject.is_empty() {
        missing.push(Field::Subject);
    }

    if missing.is_empty() {
        ParseOutcome::Parsed(message)
    } else {
        ParseOutcome::PartialParsed {
            draft: message,
            missing,
        }
    }
}

/// Normalize line endings, drop code fence lines and unwrap quotes around the whole text.
fn clean(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let text = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");
    unwrap_pairs(text.trim()).to_string()
}

/// Strip matching wrapper characters from both ends, repeatedly.
fn unwrap_pairs(mut text: &str) -> &str {
    loop {
        let mut chars = text.chars();
        match (chars.next(), chars.next_back()) {
            (Some(first), Some(last)) if first == last && WRAPPERS.contains(&first) => {
                text = text[first.len_utf8()..text.len() - last.len_utf8()].trim();
            }
            _ => return text,
        }
    }
}

fn strip_line(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("> "))
        .unwrap_or(line);
    unwrap_pairs(line.trim())
}

/// A header whose type is in the closed set, possibly missing its colon or
/// carrying a malformed scope.
fn recognized_header(line: &str) -> Option<Header> {
    let line = strip_line(line);

    if let Some(message) = parse_header(line)
        && message.commit_type.as_ref().and_then(TypeToken::known).is_some()
    {
        return Some(Header {
            message,
            missing: Vec::new(),
            spill: None,
        });
    }

    let token_end = line
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(line.len());
    let commit_type: CommitType = line[..token_end].parse().ok()?;
    let tail = line[token_end..].trim_start();

    match tail.chars().next() {
        None => {}
        Some(c) if c.is_whitespace() || matches!(c, '(' | '!' | ':') => {}
        Some(_) if token_end < line.len() && line[token_end..].starts_with(char::is_whitespace) => {}
        Some(_) => return None,
    }

    // "feat (auth): x" and similar: only the spacing was off
    if let Some(mut message) = parse_header(&format!("{commit_type}{tail}")) {
        message.commit_type = Some(TypeToken::Known(commit_type));
        return Some(Header {
            message,
            missing: Vec::new(),
            spill: None,
        });
    }

    let mut message = CommitMessage {
        commit_type: Some(TypeToken::Known(commit_type)),
        ..Default::default()
    };

    if tail.starts_with('(') {
        // unbalanced scope: keep what follows the colon, ask for the scope
        let subject = tail
            .split_once(':')
            .or_else(|| tail.split_once(')'))
            .map(|(_, s)| s.trim())
            .unwrap_or_default();
        message.subject = subject.to_string();
        return Some(Header {
            message,
            missing: vec![Field::Scope],
            spill: None,
        });
    }

    let tail = match tail.strip_prefix('!') {
        Some(rest) => {
            message.breaking = true;
            rest.trim_start()
        }
        None => tail,
    };
    let (subject, spill) = split_sentence(tail);
    message.subject = subject.to_string();
    Some(Header {
        message,
        missing: Vec::new(),
        spill,
    })
}

/// Locate the header line.
///
/// The first line with content is the header whenever it is header-shaped,
/// whatever its type. Otherwise it is preamble, and only a well-formed header
/// with a listed type further down is taken. Bullet and quote markers are
/// only looked past inside the preamble's own paragraph, so body lines of a
/// message never stand in for its header.
fn find_header(lines: &[&str]) -> Option<(usize, Header)> {
    let first = lines.iter().position(|line| !line.trim().is_empty())?;
    if let Some(header) =
        recognized_header(lines[first]).or_else(|| unrecognized_header(lines[first]))
    {
        return Some((first, header));
    }

    let mut in_preamble_paragraph = true;
    for (idx, line) in lines.iter().enumerate().skip(first + 1) {
        if line.trim().is_empty() {
            in_preamble_paragraph = false;
            continue;
        }
        let candidate = if in_preamble_paragraph {
            strip_line(line)
        } else {
            unwrap_pairs(line.trim())
        };
        if let Some(message) = parse_header(candidate)
            && message.commit_type.as_ref().and_then(TypeToken::known).is_some()
        {
            return Some((
                idx,
                Header {
                    message,
                    missing: Vec::new(),
                    spill: None,
                },
            ));
        }
    }
    None
}

/// A well-formed header whose type is not in the closed set.
fn unrecognized_header(line: &str) -> Option<Header> {
    let message = parse_header(strip_line(line))?;
    Some(Header {
        message,
        missing: vec![Field::Type],
        spill: None,
    })
}

/// Split at the first sentence boundary (`.`, `!`, `?` or `;` followed by
/// whitespace or the end of the line).
fn split_sentence(text: &str) -> (&str, Option<String>) {
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?' | ';') {
            continue;
        }
        match chars.peek() {
            None => return (text[..idx].trim(), None),
            Some((_, next)) if next.is_whitespace() => {
                let rest = text[idx + c.len_utf8()..].trim();
                return (text[..idx].trim(), (!rest.is_empty()).then(|| rest.to_string()));
            }
            Some(_) => {}
        }
    }
    (text.trim(), None)
}

/// Everything after the header, without leading blank lines or trailing whitespace.
fn remaining_text(lines: &[&str], spill: Option<String>) -> String {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let rest = lines[start..].join("\n");
    let rest = rest.trim_end();

    match spill {
        Some(spill) if rest.is_empty() => spill,
        Some(spill) => format!("{spill}\n\n{rest}"),
        None => rest.to_string(),
    }
}
