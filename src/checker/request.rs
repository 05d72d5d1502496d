//! Per-invocation context handed to every check

use super::dlogger::DetailLogger;
use super::error::CheckError;
use crate::clients::{BadgeClient, RepoClient, VulnerabilityClient};
use crate::raw::RawResults;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation shared by every check of a run.
///
/// Clones share the cancel flag. A token derived with [`CancelToken::with_budget`]
/// additionally carries a per-check deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Same flag, plus a deadline `budget` from now
    pub fn with_budget(&self, budget: Duration) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some((Instant::now() + budget, budget)),
        }
    }

    /// `Err` once the run is cancelled or this token's deadline has passed
    pub fn check(&self) -> Result<(), CheckError> {
        if self.is_cancelled() {
            return Err(CheckError::Cancelled);
        }
        if let Some((deadline, budget)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(CheckError::Timeout(budget));
            }
        }
        Ok(())
    }
}

/// Everything a check may read. Cheap to clone.
#[derive(Clone)]
pub struct CheckRequest {
    pub repo: Arc<dyn RepoClient>,
    pub vulns: Option<Arc<dyn VulnerabilityClient>>,
    pub badges: Option<Arc<dyn BadgeClient>>,
    /// Evidence cache shared by every check of the run
    pub raw: Arc<RawResults>,
    pub cancel: CancelToken,
    pub dlogger: DetailLogger,
}

impl CheckRequest {
    pub fn new(repo: Arc<dyn RepoClient>) -> Self {
        Self {
            repo,
            vulns: None,
            badges: None,
            raw: Arc::new(RawResults::new()),
            cancel: CancelToken::new(),
            dlogger: DetailLogger::new(),
        }
    }

    pub fn with_vulnerability_client(mut self, client: Arc<dyn VulnerabilityClient>) -> Self {
        self.vulns = Some(client);
        self
    }

    pub fn with_badge_client(mut self, client: Arc<dyn BadgeClient>) -> Self {
        self.badges = Some(client);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Request for one check: fresh logger, optional per-check deadline,
    /// shared clients and cache.
    pub fn for_check(&self, timeout: Option<Duration>) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            vulns: self.vulns.clone(),
            badges: self.badges.clone(),
            raw: Arc::clone(&self.raw),
            cancel: match timeout {
                Some(budget) => self.cancel.with_budget(budget),
                None => self.cancel.clone(),
            },
            dlogger: DetailLogger::new(),
        }
    }
}
