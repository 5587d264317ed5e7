//! In-memory visitor store for handler tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;

use super::{DbError, Visitor, VisitorStore};

pub(crate) struct InMemoryVisitorStore {
    rows: Mutex<Vec<Visitor>>,
    offline: AtomicBool,
}

impl InMemoryVisitorStore {
    pub(crate) fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail like an unreachable server
    pub(crate) fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_online(&self) -> Result<(), DbError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl VisitorStore for InMemoryVisitorStore {
    async fn list_recent(&self) -> Result<Vec<Visitor>, DbError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, name: &str, message: Option<&str>) -> Result<(), DbError> {
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i32 + 1;
        // Strictly increasing timestamps keep ordering deterministic
        let created_at = DateTime::from_timestamp(i64::from(id), 0).map(|dt| dt.naive_utc());
        rows.push(Visitor {
            id,
            name: name.to_string(),
            message: message.map(str::to_owned),
            created_at,
        });
        Ok(())
    }
}
