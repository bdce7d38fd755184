//! Work-graph preparation seam.

use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// The tasks scheduled for execution, and where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkGraph {
    pub scheduled: Vec<String>,
    pub loaded_from_cache: bool,
}

/// Turns the requested tasks into a [`WorkGraph`].
pub trait WorkGraphPreparer: Send + Sync + Debug {
    fn prepare(&self, tasks: &[String]) -> WorkGraph;
}

/// Schedules the requested tasks as given.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultWorkGraphPreparer;

impl WorkGraphPreparer for DefaultWorkGraphPreparer {
    fn prepare(&self, tasks: &[String]) -> WorkGraph {
        WorkGraph { scheduled: tasks.to_vec(), loaded_from_cache: false }
    }
}

/// Configuration cache engine as seen by the work-graph preparer.
pub trait BuildTreeConfigurationCache: Send + Sync + Debug {
    /// Returns the cached graph for `tasks`, or runs `schedule` and stores its result.
    fn load_or_schedule(&self, tasks: &[String], schedule: &dyn Fn() -> WorkGraph) -> WorkGraph;
}

/// Consults the configuration cache before falling back to its delegate.
#[derive(Debug)]
pub struct CacheAwareWorkGraphPreparer {
    cache: Arc<dyn BuildTreeConfigurationCache>,
    delegate: Box<dyn WorkGraphPreparer>,
}

impl CacheAwareWorkGraphPreparer {
    pub fn new(
        cache: Arc<dyn BuildTreeConfigurationCache>,
        delegate: impl WorkGraphPreparer + 'static,
    ) -> Self {
        Self { cache, delegate: Box::new(delegate) }
    }
}

impl WorkGraphPreparer for CacheAwareWorkGraphPreparer {
    fn prepare(&self, tasks: &[String]) -> WorkGraph {
        let graph = self.cache.load_or_schedule(tasks, &|| self.delegate.prepare(tasks));
        debug!(tasks = ?tasks, loaded_from_cache = graph.loaded_from_cache, "Prepared work graph");
        graph
    }
}
