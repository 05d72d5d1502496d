//! Check registry and dispatcher
//!
//! A check is a compiled-in pipeline of three stages:
//!
//! 1. **collect** raw evidence through the shared [`crate::raw::RawResults`] cache
//! 2. **probe** the evidence into classified [`crate::models::Finding`]s
//! 3. **evaluate** the findings into one bounded [`crate::models::CheckResult`]
//!
//! Checks are registered once at startup ([`crate::checks::default_registry`])
//! and run by the [`CheckEngine`].

mod base;
mod dlogger;
mod engine;
mod error;
mod registry;
mod request;

pub use base::{Check, CheckPipeline, CheckStatus, ProgressCallback, Registration, RunSummary};
pub use dlogger::DetailLogger;
pub use engine::{CheckEngine, RunOutcome, DEFAULT_WORKERS};
pub use error::CheckError;
pub use registry::{CheckRegistry, RegistryError};
pub use request::{CancelToken, CheckRequest};
