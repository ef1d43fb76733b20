//! Append-only session history, one JSON object per line.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::HistoryError;
use crate::grammar::TypeToken;
use crate::i18n::Language;
use crate::session::{Outcome, Session};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    Finalized,
    Cancelled,
}

/// One finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub outcome: RecordOutcome,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_type: Option<String>,
    pub actions: usize,
    pub language: Language,
}

impl HistoryRecord {
    /// Build a record for a session that has ended. `None` while it is still running.
    pub fn from_session(session: &Session, timestamp: DateTime<Utc>) -> Option<Self> {
        let outcome = session.outcome()?;
        let mut record = HistoryRecord {
            timestamp,
            outcome: RecordOutcome::Cancelled,
            target: session.target().to_string(),
            commit_id: None,
            header: None,
            commit_type: None,
            actions: session.log().len(),
            language: session.language(),
        };

        if let Outcome::Finalized {
            message,
            commit_id,
            target,
        } = outcome
        {
            record.outcome = RecordOutcome::Finalized;
            record.target = target.to_string();
            record.commit_id = Some(commit_id);
            record.header = Some(message.header());
            record.commit_type = message.commit_type.as_ref().map(|t| t.as_str().to_string());
        }
        Some(record)
    }
}

/// Totals over the history file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub total: usize,
    pub finalized: usize,
    pub cancelled: usize,
    pub by_type: BTreeMap<String, usize>,
    pub last: Option<HistoryRecord>,
}

impl HistorySummary {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut summary = HistorySummary {
            total: records.len(),
            last: records.last().cloned(),
            ..Default::default()
        };

        for record in records {
            match record.outcome {
                RecordOutcome::Finalized => summary.finalized += 1,
                RecordOutcome::Cancelled => summary.cancelled += 1,
            }
            if let Some(ref t) = record.commit_type {
                // normalise through the closed set so "Feat" and "feat" count together
                let key = TypeToken::parse(t).as_str().to_string();
                *summary.by_type.entry(key).or_default() += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(HistoryError::CreateDir)?;
        }

        let mut line = serde_json::to_string(record).map_err(HistoryError::Serialize)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(HistoryError::Append)?;
        file.write_all(line.as_bytes()).map_err(HistoryError::Append)?;
        debug!(path = %self.path.display(), "Appended history record");
        Ok(())
    }

    /// Read every record. A missing file is an empty history; bad lines are skipped.
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HistoryError::Read(e)),
        };

        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping history line {}: {e}", idx + 1);
                    None
                }
            })
            .collect())
    }

    pub fn summarize(&self) -> Result<HistorySummary, HistoryError> {
        Ok(HistorySummary::from_records(&self.read_all()?))
    }
}
