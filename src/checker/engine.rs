//! Check execution engine
//!
//! The CheckEngine runs a set of requested checks against one repository:
//! - Resolves names against the registry (unknown or unsupported → `-1`)
//! - Orders checks into dependency waves (petgraph topological sort)
//! - Runs each wave on a bounded rayon pool, every check inside `catch_unwind`
//! - Enforces per-check timeouts and run-wide cancellation
//! - Reports progress through callbacks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      CheckEngine                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Resolve requested names                             │
//! │  2. Plan dependency waves, reject cycles                │
//! │  3. Spawn a wave on the pool                            │
//! │  4. Wait on Started/Finished events with recv_timeout   │
//! │  5. Expire slow checks, honour cancellation             │
//! │  6. Collect results keyed by name                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A check that times out keeps its worker thread until it returns; its
//! late result is discarded.

use super::base::{CheckStatus, ProgressCallback, Registration, RunSummary};
use super::error::CheckError;
use super::registry::CheckRegistry;
use super::request::CheckRequest;
use crate::models::{CheckResult, RepoReport};
use crate::scoring::{overall_score, Risk};
use crossbeam_channel::RecvTimeoutError;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::DiGraph;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 8;

/// Upper bound on how long the dispatcher sleeps between cancellation polls
const POLL_INTERVAL: Duration = Duration::from_millis(50);

enum WorkerEvent {
    Started {
        name: &'static str,
        at: Instant,
    },
    Finished {
        result: CheckResult,
        status: CheckStatus,
    },
}

/// Results of one run, keyed (and therefore sorted) by check name
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub results: BTreeMap<String, CheckResult>,
    /// Last lifecycle state of every requested check
    pub statuses: BTreeMap<String, CheckStatus>,
    pub summary: RunSummary,
}

impl RunOutcome {
    pub fn into_results(self) -> Vec<CheckResult> {
        self.results.into_values().collect()
    }

    /// Repository report with the risk-weighted overall score
    pub fn into_report(self, repo: &str, risks: &HashMap<String, Risk>) -> RepoReport {
        let checks = self.into_results();
        RepoReport {
            repo: repo.to_string(),
            date: chrono::Utc::now(),
            overall_score: overall_score(&checks, risks),
            checks,
        }
    }
}

struct RunState<'a> {
    outcome: RunOutcome,
    done: usize,
    total: usize,
    progress: Option<&'a ProgressCallback>,
}

impl RunState<'_> {
    fn mark(&mut self, name: &str, status: CheckStatus) {
        self.outcome.statuses.insert(name.to_string(), status);
    }

    fn record(&mut self, result: CheckResult, status: CheckStatus) {
        self.mark(&result.name, status);
        self.outcome.summary.add_result(&result, status);
        self.done += 1;
        if let Some(callback) = self.progress {
            callback(&result.name, self.done, self.total);
        }
        self.outcome.results.insert(result.name.clone(), result);
    }
}

/// `-1` result for a check that never ran
fn skipped_result(name: &str, err: &CheckError) -> CheckResult {
    let mut result = CheckResult::inconclusive(name, err.to_string());
    result.error = Some(err.to_string());
    result
}

/// Orchestrates check execution across the worker pool
pub struct CheckEngine {
    registry: Arc<CheckRegistry>,
    /// Number of worker threads
    workers: usize,
    /// Budget per check, measured from when a worker picks it up
    check_timeout: Option<Duration>,
    /// Budget for the whole run
    run_timeout: Option<Duration>,
    progress_callback: Option<ProgressCallback>,
}

impl CheckEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = default of 8)
    pub fn new(registry: impl Into<Arc<CheckRegistry>>, workers: usize) -> Self {
        Self {
            registry: registry.into(),
            workers: if workers == 0 { DEFAULT_WORKERS } else { workers },
            check_timeout: None,
            run_timeout: None,
            progress_callback: None,
        }
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = Some(timeout);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Set a progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run the named checks. Every requested name yields exactly one result.
    ///
    /// Only fails if the worker pool cannot be created.
    pub fn run(&self, req: &CheckRequest, names: &[String]) -> anyhow::Result<RunOutcome> {
        let start = Instant::now();
        let run_deadline = self.run_timeout.map(|t| start + t);
        let mode = req.repo.access_mode();

        let mut seen = BTreeSet::new();
        let mut immediate = Vec::new();
        let mut runnable = Vec::new();
        for name in names {
            match self.registry.resolve(name) {
                None => {
                    if seen.insert(name.clone()) {
                        warn!("Unknown check requested: {}", name);
                        immediate.push(skipped_result(name, &CheckError::UnknownCheck(name.clone())));
                    }
                }
                Some(registration) => {
                    if !seen.insert(registration.name.to_string()) {
                        continue;
                    }
                    if registration.supports(mode) {
                        runnable.push(registration.clone());
                    } else {
                        debug!("Skipping {}: requires {}", registration.name, registration.supported_modes_label());
                        immediate.push(skipped_result(
                            registration.name,
                            &CheckError::UnsupportedMode {
                                actual: mode,
                                supported: registration.supported_modes_label(),
                            },
                        ));
                    }
                }
            }
        }

        let mut state = RunState {
            outcome: RunOutcome::default(),
            done: 0,
            total: immediate.len() + runnable.len(),
            progress: self.progress_callback.as_ref(),
        };
        for result in immediate {
            state.record(result, CheckStatus::Skipped);
        }

        info!(
            "Starting {} checks on {} workers against {}",
            runnable.len(),
            self.workers,
            req.repo.repo_name()
        );

        for registration in &runnable {
            state.mark(registration.name, CheckStatus::Pending);
        }
        let (waves, cyclic) = plan_waves(runnable);
        for (registration, err) in cyclic {
            warn!("Check {} not run: {}", registration.name, err);
            state.record(
                CheckResult::runtime_error(registration.name, &err),
                CheckStatus::Failed,
            );
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("trustcheck-worker-{i}"))
            .build()?;

        for wave in waves {
            if is_cancelled(req, run_deadline) {
                req.cancel.cancel();
                for registration in wave {
                    state.record(
                        skipped_result(registration.name, &CheckError::Cancelled),
                        CheckStatus::Skipped,
                    );
                }
                continue;
            }
            self.run_wave(&pool, req, wave, &mut state, run_deadline);
        }

        let mut outcome = state.outcome;
        outcome.summary.total_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Checks complete: {} run, {} conclusive, {} inconclusive, {} failed, {} skipped in {}ms",
            outcome.summary.checks_run,
            outcome.summary.succeeded,
            outcome.summary.inconclusive,
            outcome.summary.failed,
            outcome.summary.skipped,
            outcome.summary.total_duration_ms
        );
        Ok(outcome)
    }

    fn run_wave(
        &self,
        pool: &rayon::ThreadPool,
        req: &CheckRequest,
        wave: Vec<Registration>,
        state: &mut RunState<'_>,
        run_deadline: Option<Instant>,
    ) {
        let (tx, rx) = crossbeam_channel::unbounded::<WorkerEvent>();
        let mut pending: HashMap<&'static str, Option<Instant>> = HashMap::new();

        for registration in wave {
            pending.insert(registration.name, None);
            let tx = tx.clone();
            let req = req.clone();
            let timeout = self.check_timeout;
            pool.spawn(move || {
                let _ = tx.send(WorkerEvent::Started {
                    name: registration.name,
                    at: Instant::now(),
                });
                let (result, status) = run_single_check(&registration, &req.for_check(timeout));
                let _ = tx.send(WorkerEvent::Finished { result, status });
            });
        }
        drop(tx);

        while !pending.is_empty() {
            if is_cancelled(req, run_deadline) {
                req.cancel.cancel();
                warn!("Run cancelled with {} checks outstanding", pending.len());
                for (name, _) in pending.drain() {
                    state.record(
                        skipped_result(name, &CheckError::Cancelled),
                        CheckStatus::Skipped,
                    );
                }
                break;
            }

            match rx.recv_timeout(self.next_wakeup(&pending, run_deadline)) {
                Ok(WorkerEvent::Started { name, at }) => {
                    if let Some(started) = pending.get_mut(name) {
                        *started = Some(at);
                        state.mark(name, CheckStatus::Running);
                    }
                }
                Ok(WorkerEvent::Finished { result, status }) => {
                    if pending.remove(result.name.as_str()).is_some() {
                        state.record(result, status);
                    } else {
                        debug!("Discarding late result from {}", result.name);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    for (name, _) in pending.drain() {
                        let err = CheckError::Panic("worker exited without reporting".to_string());
                        state.record(CheckResult::runtime_error(name, &err), CheckStatus::Failed);
                    }
                    break;
                }
            }

            if let Some(limit) = self.check_timeout {
                let now = Instant::now();
                let expired: Vec<&'static str> = pending
                    .iter()
                    .filter(|(_, started)| started.is_some_and(|at| now.duration_since(at) >= limit))
                    .map(|(name, _)| *name)
                    .collect();
                for name in expired {
                    pending.remove(name);
                    warn!("Check {} timed out after {:?}", name, limit);
                    state.record(
                        CheckResult::runtime_error(name, &CheckError::Timeout(limit)),
                        CheckStatus::Failed,
                    );
                }
            }
        }
    }

    /// How long the dispatcher may block before something needs attention
    fn next_wakeup(
        &self,
        pending: &HashMap<&'static str, Option<Instant>>,
        run_deadline: Option<Instant>,
    ) -> Duration {
        let now = Instant::now();
        let mut wait = POLL_INTERVAL;
        if let Some(deadline) = run_deadline {
            wait = wait.min(deadline.saturating_duration_since(now));
        }
        if let Some(limit) = self.check_timeout {
            for started in pending.values().flatten() {
                wait = wait.min((*started + limit).saturating_duration_since(now));
            }
        }
        wait
    }
}

fn is_cancelled(req: &CheckRequest, run_deadline: Option<Instant>) -> bool {
    req.cancel.is_cancelled() || run_deadline.is_some_and(|d| Instant::now() >= d)
}

/// Run a single check with panic isolation and timing
fn run_single_check(registration: &Registration, req: &CheckRequest) -> (CheckResult, CheckStatus) {
    let name = registration.name;
    let start = Instant::now();

    if let Err(err) = req.cancel.check() {
        return (skipped_result(name, &err), CheckStatus::Skipped);
    }

    debug!("Running check: {}", name);

    // Wrap in catch_unwind to handle panics
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        registration.check.run(req)
    }));

    let (mut result, status) = match outcome {
        Ok(Ok(result)) => (result, CheckStatus::Succeeded),
        Ok(Err(err)) => {
            debug!("Check {} failed: {}", name, err);
            let mut result = CheckResult::runtime_error(name, &err);
            result.details = req.dlogger.flush();
            (result, CheckStatus::Failed)
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Check {} panicked: {}", name, panic_msg);
            (
                CheckResult::runtime_error(name, &CheckError::Panic(panic_msg)),
                CheckStatus::Failed,
            )
        }
    };

    result.name = name.to_string();
    result.duration_ms = start.elapsed().as_millis() as u64;
    debug!("Check {} scored {} in {}ms", name, result.score, result.duration_ms);
    (result, status)
}

/// Split checks into waves; every dependency of a check sits in an earlier
/// wave. Members of a dependency cycle are returned separately.
fn plan_waves(checks: Vec<Registration>) -> (Vec<Vec<Registration>>, Vec<(Registration, CheckError)>) {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<_> = (0..checks.len()).map(|i| graph.add_node(i)).collect();
    let index: HashMap<&str, usize> = checks.iter().enumerate().map(|(i, r)| (r.name, i)).collect();

    for (i, registration) in checks.iter().enumerate() {
        for dep in registration.depends_on {
            match index.get(dep) {
                Some(&j) => {
                    graph.add_edge(nodes[j], nodes[i], ());
                }
                None => debug!("{} depends on {}, which was not requested", registration.name, dep),
            }
        }
    }

    let mut in_cycle = vec![false; checks.len()];
    for scc in tarjan_scc(&graph) {
        let cyclic = scc.len() > 1 || scc.first().is_some_and(|n| graph.contains_edge(*n, *n));
        if cyclic {
            for node in scc {
                in_cycle[graph[node]] = true;
            }
        }
    }

    let acyclic = graph.filter_map(|_, &i| (!in_cycle[i]).then_some(i), |_, _| Some(()));
    let mut level = vec![0usize; checks.len()];
    match toposort(&acyclic, None) {
        Ok(order) => {
            for node in order {
                let depth = acyclic
                    .neighbors_directed(node, Direction::Incoming)
                    .map(|pred| level[acyclic[pred]] + 1)
                    .max()
                    .unwrap_or(0);
                level[acyclic[node]] = depth;
            }
        }
        Err(cycle) => {
            // Cycle members were filtered out above, so this is unreachable in practice
            warn!("Unexpected cycle at {:?}; running remaining checks in one wave", cycle.node_id());
        }
    }

    let cycle_names: Vec<&str> = checks
        .iter()
        .zip(&in_cycle)
        .filter(|(_, cyclic)| **cyclic)
        .map(|(r, _)| r.name)
        .collect();
    let cycle_label = cycle_names.join(" -> ");

    let depth = level.iter().copied().max().unwrap_or(0);
    let mut waves: Vec<Vec<Registration>> = vec![Vec::new(); depth + 1];
    let mut cyclic = Vec::new();
    for (i, registration) in checks.into_iter().enumerate() {
        if in_cycle[i] {
            cyclic.push((registration, CheckError::DependencyCycle(cycle_label.clone())));
        } else {
            waves[level[i]].push(registration);
        }
    }
    waves.retain(|w| !w.is_empty());
    (waves, cyclic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Check;
    use crate::clients::fake::FakeRepoClient;
    use crate::clients::AccessMode;
    use crate::scoring::Risk;
    use std::sync::Mutex;

    struct FnCheck<F>(F);

    impl<F> Check for FnCheck<F>
    where
        F: Fn(&CheckRequest) -> Result<CheckResult, CheckError> + Send + Sync,
    {
        fn run(&self, req: &CheckRequest) -> Result<CheckResult, CheckError> {
            (self.0)(req)
        }
    }

    fn registration<F>(name: &'static str, depends_on: &'static [&'static str], f: F) -> Registration
    where
        F: Fn(&CheckRequest) -> Result<CheckResult, CheckError> + Send + Sync + 'static,
    {
        Registration {
            name,
            description: "test check",
            risk: Risk::Medium,
            supported_modes: &[AccessMode::Commit],
            evidence: &[],
            depends_on,
            check: Arc::new(FnCheck(f)),
        }
    }

    fn request() -> CheckRequest {
        CheckRequest::new(Arc::new(FakeRepoClient::default()))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_engine_default_workers() {
        let engine = CheckEngine::new(CheckRegistry::new(), 0);
        assert_eq!(engine.workers(), DEFAULT_WORKERS);
    }

    #[test]
    fn test_lifecycle_pending_running_finished() {
        let mut state = RunState {
            outcome: RunOutcome::default(),
            done: 0,
            total: 1,
            progress: None,
        };
        state.mark("Fine", CheckStatus::Pending);
        assert_eq!(state.outcome.statuses["Fine"], CheckStatus::Pending);
        state.mark("Fine", CheckStatus::Running);
        assert!(!state.outcome.statuses["Fine"].is_finished());

        state.record(CheckResult::max("Fine", "ok"), CheckStatus::Succeeded);
        assert_eq!(state.outcome.statuses["Fine"], CheckStatus::Succeeded);
        assert_eq!(state.done, 1);
    }

    #[test]
    fn test_every_check_ends_in_a_final_status() {
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("Boom", &[], |_| panic!("kaboom")))
            .expect("register");
        registry
            .register(registration("Fine", &[], |_| Ok(CheckResult::max("Fine", "ok"))))
            .expect("register");

        let outcome = CheckEngine::new(registry, 2)
            .run(&request(), &names(&["Boom", "Fine", "Fuzzing"]))
            .expect("run");

        assert_eq!(outcome.statuses.len(), 3);
        assert!(outcome.statuses.values().all(|s| s.is_finished()));
        assert_eq!(outcome.statuses["Boom"], CheckStatus::Failed);
        assert_eq!(outcome.statuses["Fine"], CheckStatus::Succeeded);
        assert_eq!(outcome.statuses["Fuzzing"], CheckStatus::Skipped);
    }

    #[test]
    fn test_panic_is_isolated() {
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("Boom", &[], |_| panic!("kaboom")))
            .expect("register");
        registry
            .register(registration("Fine", &[], |_| Ok(CheckResult::max("Fine", "ok"))))
            .expect("register");

        let engine = CheckEngine::new(registry, 2);
        let outcome = engine.run(&request(), &names(&["Boom", "Fine"])).expect("run");

        let boom = &outcome.results["Boom"];
        assert_eq!(boom.score, -1);
        assert!(boom.error.as_deref().is_some_and(|e| e.contains("kaboom")));
        assert_eq!(outcome.results["Fine"].score, 10);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.summary.succeeded, 1);
    }

    #[test]
    fn test_error_becomes_inconclusive() {
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("Broken", &[], |_| {
                Err(CheckError::Malformed("bad yaml".to_string()))
            }))
            .expect("register");

        let engine = CheckEngine::new(registry, 1);
        let outcome = engine.run(&request(), &names(&["Broken"])).expect("run");
        let result = &outcome.results["Broken"];
        assert_eq!(result.score, -1);
        assert_eq!(result.error.as_deref(), Some("malformed evidence: bad yaml"));
    }

    #[test]
    fn test_per_check_timeout() {
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("Slow", &[], |_| {
                std::thread::sleep(Duration::from_secs(2));
                Ok(CheckResult::max("Slow", "finally"))
            }))
            .expect("register");
        registry
            .register(registration("Quick", &[], |_| Ok(CheckResult::max("Quick", "ok"))))
            .expect("register");

        let engine = CheckEngine::new(registry, 2).with_check_timeout(Duration::from_millis(100));
        let started = Instant::now();
        let outcome = engine.run(&request(), &names(&["Slow", "Quick"])).expect("run");

        assert!(started.elapsed() < Duration::from_secs(2));
        let slow = &outcome.results["Slow"];
        assert_eq!(slow.score, -1);
        assert!(slow.error.as_deref().is_some_and(|e| e.contains("timed out")));
        assert_eq!(outcome.results["Quick"].score, 10);
    }

    #[test]
    fn test_unknown_and_unsupported_checks() {
        let mut registry = CheckRegistry::new();
        let mut local_only = registration("Local", &[], |_| Ok(CheckResult::max("Local", "ok")));
        local_only.supported_modes = &[AccessMode::FileBased];
        registry.register(local_only).expect("register");

        let engine = CheckEngine::new(registry, 1);
        let outcome = engine
            .run(&request(), &names(&["Local", "Fuzzing"]))
            .expect("run");

        assert_eq!(outcome.results.len(), 2);
        let local = &outcome.results["Local"];
        assert_eq!(local.score, -1);
        assert!(local.reason.contains("does not support commit-based"));
        let unknown = &outcome.results["Fuzzing"];
        assert_eq!(unknown.score, -1);
        assert_eq!(unknown.error.as_deref(), Some("unknown check 'Fuzzing'"));
        assert_eq!(outcome.summary.skipped, 2);
    }

    #[test]
    fn test_dependencies_run_first() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CheckRegistry::new();
        let chain: [(&'static str, &'static [&'static str]); 3] =
            [("C", &["B"]), ("B", &["A"]), ("A", &[])];
        for (name, deps) in chain {
            let order = Arc::clone(&order);
            registry
                .register(registration(name, deps, move |_| {
                    std::thread::sleep(Duration::from_millis(10));
                    order.lock().expect("lock").push(name);
                    Ok(CheckResult::max(name, "ok"))
                }))
                .expect("register");
        }

        let engine = CheckEngine::new(registry, 4);
        let outcome = engine.run(&request(), &names(&["C", "B", "A"])).expect("run");
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(*order.lock().expect("lock"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_dependency_cycle_is_inconclusive() {
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("X", &["Y"], |_| Ok(CheckResult::max("X", "ok"))))
            .expect("register");
        registry
            .register(registration("Y", &["X"], |_| Ok(CheckResult::max("Y", "ok"))))
            .expect("register");
        registry
            .register(registration("Z", &[], |_| Ok(CheckResult::max("Z", "ok"))))
            .expect("register");

        let engine = CheckEngine::new(registry, 2);
        let outcome = engine.run(&request(), &names(&["X", "Y", "Z"])).expect("run");
        assert_eq!(outcome.results["X"].score, -1);
        assert!(outcome.results["Y"]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("dependency cycle")));
        assert_eq!(outcome.results["Z"].score, 10);
    }

    #[test]
    fn test_cancelled_run_marks_everything_inconclusive() {
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("A", &[], |_| Ok(CheckResult::max("A", "ok"))))
            .expect("register");
        registry
            .register(registration("B", &["A"], |_| Ok(CheckResult::max("B", "ok"))))
            .expect("register");

        let req = request();
        req.cancel.cancel();
        let engine = CheckEngine::new(registry, 2);
        let outcome = engine.run(&req, &names(&["A", "B"])).expect("run");

        for result in outcome.results.values() {
            assert_eq!(result.score, -1);
            assert!(result.error.as_deref().is_some_and(|e| e.contains("cancelled")));
        }
    }

    #[test]
    fn test_progress_callback_counts_every_check() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CheckRegistry::new();
        registry
            .register(registration("A", &[], |_| Ok(CheckResult::max("A", "ok"))))
            .expect("register");

        let sink = Arc::clone(&calls);
        let engine = CheckEngine::new(registry, 1).with_progress_callback(Box::new(
            move |name, done, total| {
                sink.lock().expect("lock").push((name.to_string(), done, total));
            },
        ));
        engine.run(&request(), &names(&["A", "Nope"])).expect("run");

        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, _, total)| *total == 2));
        assert_eq!(calls.last().map(|c| c.1), Some(2));
    }
}
