//! trustcheck - supply-chain trust scoring for source repositories
//!
//! A repository is evaluated by a set of independent checks. Each check
//! collects raw evidence through a [`clients::RepoClient`], classifies it
//! with pure probes and turns the findings into a bounded 0-10 score, or
//! `-1` when the evidence was not available.
//!
//! ```ignore
//! use std::sync::Arc;
//! use trustcheck::checker::{CheckEngine, CheckRequest};
//! use trustcheck::clients::LocalDirClient;
//!
//! let repo = Arc::new(LocalDirClient::new(".")?);
//! let registry = trustcheck::checks::default_registry()?;
//! let risks = registry.risks();
//! let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
//!
//! let outcome = CheckEngine::new(registry, 8).run(&CheckRequest::new(repo), &names)?;
//! let report = outcome.into_report(".", &risks);
//! ```

pub mod checker;
pub mod checks;
pub mod cli;
pub mod clients;
pub mod config;
pub mod evaluation;
pub mod models;
pub mod probes;
pub mod raw;
pub mod reporters;
pub mod scoring;
pub mod workflow;
