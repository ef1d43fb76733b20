//! Integration tests for the session history file.

mod common;

use chrono::{TimeZone, Utc};
use commitsmith::history::{HistoryLog, HistoryRecord, RecordOutcome};
use commitsmith::i18n::Language;
use commitsmith::session::{self, Session, SessionOptions, UserAction};

use common::{FakeAi, FakeGit, ScriptedReviewer, sample_diff};

fn log_in(dir: &tempfile::TempDir) -> HistoryLog {
    HistoryLog::new(dir.path().join("nested").join("history.jsonl"))
}

async fn finished_session(actions: Vec<UserAction>) -> Session {
    let ai = FakeAi::new(vec![Ok("feat(auth): add login endpoint".to_string())]);
    let git = FakeGit::default();
    let mut reviewer = ScriptedReviewer::new(actions);
    let mut session = Session::new(SessionOptions::default());
    session::run(&mut session, sample_diff(), &ai, &git, &mut reviewer)
        .await
        .unwrap();
    session
}

#[test]
fn test_missing_file_is_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_in(&dir);
    assert!(log.read_all().unwrap().is_empty());
    assert_eq!(log.summarize().unwrap().total, 0);
}

#[tokio::test]
async fn test_records_from_finished_sessions() {
    let timestamp = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();

    let accepted = finished_session(vec![UserAction::Accept]).await;
    let record = HistoryRecord::from_session(&accepted, timestamp).unwrap();
    assert_eq!(record.outcome, RecordOutcome::Finalized);
    assert_eq!(record.commit_id.as_deref(), Some("c0ffee0"));
    assert_eq!(record.header.as_deref(), Some("feat(auth): add login endpoint"));
    assert_eq!(record.commit_type.as_deref(), Some("feat"));
    assert_eq!(record.target, "new commit");
    assert_eq!(record.language, Language::En);
    assert_eq!(record.actions, accepted.log().len());

    let cancelled = finished_session(vec![UserAction::Cancel]).await;
    let record = HistoryRecord::from_session(&cancelled, timestamp).unwrap();
    assert_eq!(record.outcome, RecordOutcome::Cancelled);
    assert_eq!(record.commit_id, None);
    assert_eq!(record.header, None);

    let running = Session::new(SessionOptions::default());
    assert_eq!(HistoryRecord::from_session(&running, timestamp), None);
}

#[tokio::test]
async fn test_append_then_summarize() {
    let dir = tempfile::tempdir().unwrap();
    let log = log_in(&dir);
    let timestamp = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();

    let accepted = finished_session(vec![UserAction::Accept]).await;
    let cancelled = finished_session(vec![UserAction::Cancel]).await;
    let first = HistoryRecord::from_session(&accepted, timestamp).unwrap();
    let second = HistoryRecord::from_session(&cancelled, timestamp).unwrap();

    log.append(&first).unwrap();
    log.append(&second).unwrap();

    assert_eq!(log.read_all().unwrap(), vec![first, second.clone()]);

    let summary = log.summarize().unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.finalized, 1);
    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.by_type.get("feat"), Some(&1));
    assert_eq!(summary.last, Some(second));
}

#[test]
fn test_corrupt_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.jsonl");
    let good = r#"{"timestamp":"2026-10-19T09:30:00Z","outcome":"finalized","target":"new commit","commit_id":"c0ffee0","header":"fix: typo","commit_type":"fix","actions":2,"language":"es"}"#;
    std::fs::write(&path, format!("not json\n\n{good}\n{{\"outcome\":\n")).unwrap();

    let records = HistoryLog::new(&path).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].header.as_deref(), Some("fix: typo"));
    assert_eq!(records[0].language, Language::Es);
}
