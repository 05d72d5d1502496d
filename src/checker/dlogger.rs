//! Per-check detail logger
//!
//! Evaluators explain a score by logging [`CheckDetail`]s here. Each check
//! gets its own logger; the dispatcher drains it into the result.

use crate::models::{CheckDetail, DetailKind, LogMessage};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct DetailLogger {
    details: Arc<Mutex<Vec<CheckDetail>>>,
}

impl DetailLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, kind: DetailKind, msg: LogMessage) {
        let mut details = self.details.lock().unwrap_or_else(|e| e.into_inner());
        details.push(CheckDetail { kind, msg });
    }

    pub fn info(&self, msg: LogMessage) {
        self.log(DetailKind::Info, msg);
    }

    pub fn warn(&self, msg: LogMessage) {
        self.log(DetailKind::Warn, msg);
    }

    pub fn debug(&self, msg: LogMessage) {
        self.log(DetailKind::Debug, msg);
    }

    /// Take every detail logged so far, in logging order
    pub fn flush(&self) -> Vec<CheckDetail> {
        let mut details = self.details.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *details)
    }

    pub fn len(&self) -> usize {
        self.details.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
