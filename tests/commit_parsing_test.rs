//! Integration tests for the Conventional Commits grammar.

use commitsmith::error::GrammarError;
use commitsmith::grammar::{CommitMessage, CommitType, Field, Grammar, Rule, TypeToken};

#[test]
fn test_parse_all_commit_types() {
    for commit_type in CommitType::ALL {
        let text = format!("{}: do something", commit_type.as_str());
        let message = CommitMessage::parse(&text).unwrap();
        assert_eq!(
            message.commit_type,
            Some(TypeToken::Known(commit_type)),
            "Failed to parse: {text}"
        );
    }
}

#[test]
fn test_parse_with_various_scopes() {
    let cases = vec![
        ("feat(api): new endpoint", Some("api")),
        ("fix(ui): button alignment", Some("ui")),
        ("feat(auth/oauth): add provider", Some("auth/oauth")),
        ("fix(db-layer): connection leak", Some("db-layer")),
        ("feat: no scope", None),
    ];

    for (text, expected_scope) in cases {
        let message = CommitMessage::parse(text).unwrap();
        assert_eq!(message.scope.as_deref(), expected_scope, "Failed scope for: {text}");
    }
}

#[test]
fn test_parse_breaking_marker() {
    assert!(CommitMessage::parse("feat!: drop v1 api").unwrap().breaking);
    assert!(CommitMessage::parse("feat(api)!: drop v1 api").unwrap().breaking);
    assert!(!CommitMessage::parse("feat: normal feature").unwrap().breaking);

    let message =
        CommitMessage::parse("feat: some change\n\nBREAKING CHANGE: this breaks stuff").unwrap();
    assert_eq!(message.footer.as_deref(), Some("BREAKING CHANGE: this breaks stuff"));
    assert!(Grammar::default().is_valid(&message));
}

#[test]
fn test_round_trip_of_valid_messages() {
    let grammar = Grammar::default();
    let messages = vec![
        CommitMessage {
            commit_type: Some(TypeToken::Known(CommitType::Feat)),
            scope: Some("auth".to_string()),
            subject: "implement OAuth2 flow".to_string(),
            body: Some("Adds Google and GitHub providers.\n\n- Token refresh logic".to_string()),
            footer: Some("Closes #123\nReviewed-by: Sam".to_string()),
            ..Default::default()
        },
        CommitMessage {
            commit_type: Some(TypeToken::Known(CommitType::Fix)),
            breaking: true,
            subject: "error: connection timeout handling".to_string(),
            ..Default::default()
        },
        CommitMessage {
            commit_type: Some(TypeToken::Known(CommitType::Docs)),
            subject: "✨ add sparkles to the readme".to_string(),
            footer: Some("Refs: #9".to_string()),
            ..Default::default()
        },
        CommitMessage {
            commit_type: Some(TypeToken::Known(CommitType::Chore)),
            subject: "bump".to_string(),
            body: Some("Single paragraph body.".to_string()),
            ..Default::default()
        },
    ];

    for message in messages {
        assert!(grammar.is_valid(&message), "{message:?} should be valid");
        let rendered = grammar.render(&message);
        assert_eq!(grammar.parse(&rendered).unwrap(), message, "round trip of {rendered:?}");
        // rendering is deterministic
        assert_eq!(grammar.render(&message), rendered);
    }
}

#[test]
fn test_render_layout() {
    let message = CommitMessage {
        commit_type: Some(TypeToken::Known(CommitType::Feat)),
        scope: Some("auth".to_string()),
        subject: "add login endpoint".to_string(),
        body: Some("Adds POST /login.".to_string()),
        footer: Some("Closes: #31".to_string()),
        ..Default::default()
    };
    assert_eq!(
        message.render(),
        "feat(auth): add login endpoint\n\nAdds POST /login.\n\nCloses: #31"
    );
}

#[test]
fn test_non_conventional_text_fails_strict_parse() {
    for text in [
        "Updated the README",
        "Merge branch 'feature' into main",
        "v1.0.0",
    ] {
        assert!(
            matches!(CommitMessage::parse(text), Err(GrammarError::MalformedHeader(_))),
            "Should not parse as conventional: {text}"
        );
    }
    assert_eq!(CommitMessage::parse(""), Err(GrammarError::Empty));
    assert_eq!(
        CommitMessage::parse("feat: x\nbody without gap"),
        Err(GrammarError::MissingBlankLine)
    );
}

#[test]
fn test_unknown_type_parses_but_fails_validation() {
    let message = CommitMessage::parse("WIP: work in progress").unwrap();
    let violations = Grammar::default().validate(&message);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, Field::Type);
    assert!(matches!(violations[0].rule, Rule::UnknownType(ref t) if t == "WIP"));
}

#[test]
fn test_whitespace_variations() {
    let message = CommitMessage::parse("feat:   extra spaces").unwrap();
    assert_eq!(message.subject, "extra spaces");

    let message = CommitMessage::parse("feat:no space").unwrap();
    assert_eq!(message.subject, "no space");
}

#[test]
fn test_subject_rules() {
    let grammar = Grammar::new(20);
    let base = CommitMessage {
        commit_type: Some(TypeToken::Known(CommitType::Fix)),
        ..Default::default()
    };

    let rules = |subject: &str| -> Vec<Rule> {
        let mut message = base.clone();
        message.subject = subject.to_string();
        grammar.validate(&message).into_iter().map(|v| v.rule).collect()
    };

    assert_eq!(rules("handle empty input"), vec![]);
    assert_eq!(rules(""), vec![Rule::EmptySubject]);
    assert_eq!(rules("handle input."), vec![Rule::TrailingPeriod]);
    assert_eq!(rules(" handle input"), vec![Rule::SurroundingWhitespace]);
    assert_eq!(
        rules("handle every single input"),
        vec![Rule::SubjectTooLong { max: 20, actual: 25 }]
    );
}

#[test]
fn test_footer_must_be_trailers() {
    let message = CommitMessage {
        commit_type: Some(TypeToken::Known(CommitType::Feat)),
        subject: "add login".to_string(),
        footer: Some("Closes: #31\nthanks everyone".to_string()),
        ..Default::default()
    };
    let violations = Grammar::default().validate(&message);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, Field::Footer);
    assert_eq!(
        violations[0].rule,
        Rule::NotATrailer("thanks everyone".to_string())
    );
}

#[test]
fn test_carriage_return_at_block_edges_is_rejected() {
    let grammar = Grammar::default();
    for (body, footer) in [
        (Some("Adds POST /login.\r"), None),
        (Some("\rAdds POST /login."), None),
        (None, Some("Closes: #31\r")),
    ] {
        let message = CommitMessage {
            commit_type: Some(TypeToken::Known(CommitType::Feat)),
            subject: "add login".to_string(),
            body: body.map(str::to_string),
            footer: footer.map(str::to_string),
            ..Default::default()
        };
        let violations = grammar.validate(&message);
        assert!(
            violations
                .iter()
                .any(|v| v.rule == Rule::SurroundingBlankLines),
            "{message:?} should be flagged"
        );
    }
}
