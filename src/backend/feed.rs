use std::collections::{HashMap, HashSet};

use rusqlite::Result as SqlResult;

use crate::common::{FeedChild, FeedEvent};
use crate::storage::{FeedDatabase, FeedRow, FeedSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Delivered {
    seq: i64,
    revision: i64,
}

/// How much of the store a poll has to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPlan {
    Idle,
    /// Only rows after this sequence can be new.
    Tail(i64),
    Full,
}

/// What one subscription has already delivered for its path.
///
/// Each poll compares the store summary with the last one seen. Unchanged
/// paths cost a single aggregate query, pure appends read only the new rows,
/// and anything else falls back to a full snapshot diff.
#[derive(Debug)]
pub struct FeedCursor {
    path: String,
    delivered: HashMap<String, Delivered>,
    seen: Option<FeedSummary>,
}

impl FeedCursor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            delivered: HashMap::new(),
            seen: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn sync(&mut self, feed: &FeedDatabase) -> SqlResult<Vec<FeedEvent>> {
        let summary = feed.summary(&self.path)?;
        match self.plan(&summary) {
            SyncPlan::Idle => Ok(Vec::new()),
            SyncPlan::Tail(after) => {
                let rows = feed.children_after(&self.path, after)?;
                match self.append(summary, &rows) {
                    Some(events) => Ok(events),
                    None => {
                        let rows = feed.children(&self.path)?;
                        Ok(self.diff(summary, &rows))
                    }
                }
            }
            SyncPlan::Full => {
                let rows = feed.children(&self.path)?;
                Ok(self.diff(summary, &rows))
            }
        }
    }

    pub fn plan(&self, summary: &FeedSummary) -> SyncPlan {
        match &self.seen {
            Some(seen) if seen == summary => SyncPlan::Idle,
            Some(seen) if seen.revisions == summary.revisions && seen.count < summary.count => {
                SyncPlan::Tail(seen.max_seq)
            }
            _ => SyncPlan::Full,
        }
    }

    /// Deliver `rows` as plain appends. Returns `None` when they do not
    /// account for the whole change, e.g. a removal hidden behind an append.
    fn append(&mut self, summary: FeedSummary, rows: &[FeedRow]) -> Option<Vec<FeedEvent>> {
        let seen = self.seen?;
        if seen.count + rows.len() != summary.count
            || rows.iter().any(|row| self.delivered.contains_key(&row.key))
        {
            return None;
        }

        for row in rows {
            self.remember(row);
        }
        self.seen = Some(summary);
        Some(rows.iter().map(|row| FeedEvent::ChildAdded(to_child(row))).collect())
    }

    /// `rows` must be the full snapshot ordered by `seq`, as returned by
    /// `FeedDatabase::children`.
    fn diff(&mut self, summary: FeedSummary, rows: &[FeedRow]) -> Vec<FeedEvent> {
        let mut events = Vec::new();

        let present: HashSet<&str> = rows.iter().map(|row| row.key.as_str()).collect();
        let mut removed: Vec<(&String, &Delivered)> = self
            .delivered
            .iter()
            .filter(|(key, _)| !present.contains(key.as_str()))
            .collect();
        removed.sort_by_key(|(_, delivered)| delivered.seq);
        events.extend(
            removed
                .into_iter()
                .map(|(key, _)| FeedEvent::ChildRemoved { key: key.clone() }),
        );

        for row in rows {
            match self.delivered.get(&row.key) {
                None => events.push(FeedEvent::ChildAdded(to_child(row))),
                Some(previous) if previous.seq != row.seq => {
                    events.push(FeedEvent::ChildMoved(to_child(row)))
                }
                Some(previous) if previous.revision != row.revision => {
                    events.push(FeedEvent::ChildChanged(to_child(row)))
                }
                Some(_) => {}
            }
        }

        self.delivered.clear();
        for row in rows {
            self.remember(row);
        }
        self.seen = Some(summary);

        events
    }

    fn remember(&mut self, row: &FeedRow) {
        self.delivered.insert(
            row.key.clone(),
            Delivered {
                seq: row.seq,
                revision: row.revision,
            },
        );
    }
}

fn to_child(row: &FeedRow) -> FeedChild {
    let value = match serde_json::from_str(&row.value) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Child {} holds invalid JSON: {err}", row.key);
            serde_json::Value::Null
        }
    };
    FeedChild {
        key: row.key.clone(),
        value,
    }
}
