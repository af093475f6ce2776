use chrono::{SecondsFormat, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Append-only diagnostic log kept next to the index.
///
/// Lines are `"<rfc3339 time> <operation> <detail>"`. When `capacity` is reached
/// the oldest line is dropped to make room.
#[derive(Debug, Clone)]
pub struct Journal {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
        }
    }

    pub async fn record(&self, operation: &str, detail: impl AsRef<str>) {
        let line = format!(
            "{} {} {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            operation,
            detail.as_ref()
        );

        let mut lines = self.lines.lock().await;
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    pub async fn lines(&self) -> Vec<String> {
        let lines = self.lines.lock().await;
        lines.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.lines.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
