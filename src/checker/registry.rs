//! Append-only table of compiled-in checks

use super::base::Registration;
use crate::config::normalize_check_name;
use crate::scoring::Risk;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("check '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Debug, Default, Clone)]
pub struct CheckRegistry {
    checks: BTreeMap<&'static str, Registration>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check. Names are unique; the first registration wins.
    pub fn register(&mut self, registration: Registration) -> Result<(), RegistryError> {
        if self.checks.contains_key(registration.name) {
            return Err(RegistryError::Duplicate(registration.name.to_string()));
        }
        self.checks.insert(registration.name, registration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.checks.get(name)
    }

    /// Look up by exact name, falling back to a normalized match
    /// (`branch_protection` finds `Branch-Protection`)
    pub fn resolve(&self, name: &str) -> Option<&Registration> {
        if let Some(registration) = self.checks.get(name) {
            return Some(registration);
        }
        let wanted = normalize_check_name(name);
        self.checks
            .values()
            .find(|r| normalize_check_name(r.name) == wanted)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        self.checks.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.checks.values()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Risk per check name, for the overall score
    pub fn risks(&self) -> HashMap<String, Risk> {
        self.checks
            .values()
            .map(|r| (r.name.to_string(), r.risk))
            .collect()
    }

    /// Replace the risk of an already registered check
    pub fn set_risk(&mut self, name: &str, risk: Risk) -> bool {
        let Some(key) = self.resolve(name).map(|r| r.name) else {
            return false;
        };
        if let Some(registration) = self.checks.get_mut(key) {
            registration.risk = risk;
            return true;
        }
        false
    }

    /// Drop a check so it can no longer be requested
    pub fn remove(&mut self, name: &str) -> Option<Registration> {
        let key = self.resolve(name).map(|r| r.name)?;
        self.checks.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Check, CheckError, CheckRequest};
    use crate::clients::AccessMode;
    use crate::models::CheckResult;
    use std::sync::Arc;

    struct Noop;

    impl Check for Noop {
        fn run(&self, _req: &CheckRequest) -> Result<CheckResult, CheckError> {
            Ok(CheckResult::max("Noop", "ok"))
        }
    }

    fn registration(name: &'static str) -> Registration {
        Registration {
            name,
            description: "test check",
            risk: Risk::Low,
            supported_modes: &[AccessMode::Commit],
            evidence: &[],
            depends_on: &[],
            check: Arc::new(Noop),
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = CheckRegistry::new();
        registry.register(registration("Noop")).expect("first");
        assert_eq!(
            registry.register(registration("Noop")),
            Err(RegistryError::Duplicate("Noop".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_sorted_and_resolve_normalized() {
        let mut registry = CheckRegistry::new();
        registry.register(registration("Signed-Releases")).expect("register");
        registry.register(registration("Branch-Protection")).expect("register");

        assert_eq!(registry.names(), vec!["Branch-Protection", "Signed-Releases"]);
        assert!(registry.resolve("branch_protection").is_some());
        assert!(registry.resolve("SignedReleases").is_some());
        assert!(registry.resolve("Fuzzing").is_none());
    }

    #[test]
    fn test_set_risk() {
        let mut registry = CheckRegistry::new();
        registry.register(registration("Branch-Protection")).expect("register");
        assert!(registry.set_risk("branch-protection", Risk::Critical));
        assert_eq!(registry.risks()["Branch-Protection"], Risk::Critical);
        assert!(!registry.set_risk("missing", Risk::Low));
    }
}
