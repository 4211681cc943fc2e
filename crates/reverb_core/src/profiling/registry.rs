//! # Profiler Registry
//!
//! Explicit home for the named profilers of a process. Created once at
//! startup; components receive the `Arc<DurationProfiler>` they record into.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::profiler::{DurationProfiler, ProfileReport};

/// Registry of named duration profilers.
#[derive(Debug, Default)]
pub struct ProfilerRegistry {
    profilers: RwLock<HashMap<String, Arc<DurationProfiler>>>,
}

impl ProfilerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the profiler with this identifier, creating it on first use.
    #[must_use]
    pub fn get_or_create(&self, identifier: &str) -> Arc<DurationProfiler> {
        if let Some(profiler) = self.profilers.read().get(identifier) {
            return Arc::clone(profiler);
        }

        let mut profilers = self.profilers.write();
        Arc::clone(
            profilers
                .entry(identifier.to_owned())
                .or_insert_with(|| Arc::new(DurationProfiler::new(identifier))),
        )
    }

    /// Returns the profiler with this identifier, if registered.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<DurationProfiler>> {
        self.profilers.read().get(identifier).cloned()
    }

    /// Drops the registry's reference to a profiler.
    ///
    /// Measurements still in flight finish as no-ops once no other component
    /// holds the profiler.
    pub fn remove(&self, identifier: &str) -> Option<Arc<DurationProfiler>> {
        self.profilers.write().remove(identifier)
    }

    /// Number of registered profilers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profilers.read().len()
    }

    /// Returns true if no profiler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profilers.read().is_empty()
    }

    /// Reports of every registered profiler, sorted by identifier.
    #[must_use]
    pub fn reports(&self) -> Vec<ProfileReport> {
        let mut reports: Vec<_> = self
            .profilers
            .read()
            .values()
            .map(|profiler| profiler.report())
            .collect();
        reports.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        reports
    }
}
