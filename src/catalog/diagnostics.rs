//! Observable diagnostics for problems that are tolerated rather than raised.

use crate::types::EntryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A resolved reference names an entry that is not in the catalog.
    UnknownReference {
        entry: EntryId,
        attribute: String,
        missing: EntryId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnknownReference {
                entry,
                attribute,
                missing,
            } => write!(
                f,
                "{}.{} references unknown entry '{}'",
                entry, attribute, missing
            ),
        }
    }
}

/// Bounded log of diagnostics; the oldest records are dropped first.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    records: VecDeque<Diagnostic>,
    max_recorded: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_RECORDED)
    }
}

impl Diagnostics {
    pub const DEFAULT_MAX_RECORDED: usize = 1000;

    pub fn with_capacity(max_recorded: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_recorded,
        }
    }

    pub fn record(&mut self, kind: DiagnosticKind) {
        if self.max_recorded == 0 {
            return;
        }
        while self.records.len() >= self.max_recorded {
            self.records.pop_front();
        }
        self.records.push_back(Diagnostic {
            recorded_at: Utc::now(),
            kind,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.records.drain(..).collect()
    }
}
