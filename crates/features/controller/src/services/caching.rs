//! The caching bundle and the collaborators only it provides.

use super::lifecycle::{BuildTreeLifecycleControllerFactory, CachingLifecycleControllerFactory};
use super::work_graph::{
    BuildTreeConfigurationCache, CacheAwareWorkGraphPreparer, DefaultWorkGraphPreparer, WorkGraph,
    WorkGraphPreparer,
};
use super::{BundleKind, InstrumentationStrategy, ServiceBundle};
use crate::error::ControllerError;
use crate::options::{InternalOptions, TASK_EXECUTION_ACCESS_PRE_STABLE};
use arbor_domain::ModelRequirements;
use arbor_kernel::RegistryError;
use arbor_kernel::registry::ServiceRegistry;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

/// Records the environment inputs read while configuring, so a cache entry can be invalidated.
#[derive(Debug, Default)]
pub struct EnvironmentChangeTracker {
    reads: Mutex<BTreeMap<String, Option<String>>>,
}

impl EnvironmentChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the first observed value of `key`.
    pub fn system_property_read(&self, key: &str, value: Option<&str>) {
        self.reads.lock().entry(key.to_owned()).or_insert_with(|| value.map(str::to_owned));
    }

    #[must_use]
    pub fn observed(&self) -> BTreeMap<String, Option<String>> {
        self.reads.lock().clone()
    }
}

/// Start parameters as the configuration cache sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachingStartParameter {
    task_execution_access_pre_stable: bool,
    quiet: bool,
    requested_tasks: Vec<String>,
}

impl CachingStartParameter {
    #[must_use]
    pub const fn new(
        task_execution_access_pre_stable: bool,
        quiet: bool,
        requested_tasks: Vec<String>,
    ) -> Self {
        Self { task_execution_access_pre_stable, quiet, requested_tasks }
    }

    /// Resolves the adapter from the build requirements and their system properties.
    #[must_use]
    pub fn from_requirements(requirements: &ModelRequirements) -> Self {
        let start = requirements.start_parameters();
        Self {
            task_execution_access_pre_stable: InternalOptions::new(start)
                .resolve(TASK_EXECUTION_ACCESS_PRE_STABLE),
            quiet: start.configuration_cache_quiet,
            requested_tasks: start.task_names.clone(),
        }
    }

    #[must_use]
    pub const fn task_execution_access_pre_stable(&self) -> bool {
        self.task_execution_access_pre_stable
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    #[must_use]
    pub fn requested_tasks(&self) -> &[String] {
        &self.requested_tasks
    }
}

/// Tracks the classloader scopes created while configuring.
#[derive(Debug, Default)]
pub struct ClassLoaderScopeRegistryListener {
    scopes: Mutex<Vec<String>>,
}

impl ClassLoaderScopeRegistryListener {
    pub fn scope_created(&self, id: impl Into<String>) {
        self.scopes.lock().push(id.into());
    }

    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.scopes.lock().clone()
    }
}

/// Collects problems that make the configuration state uncacheable.
#[derive(Debug, Default)]
pub struct ConfigurationCacheProblems {
    problems: Mutex<Vec<String>>,
}

impl ConfigurationCacheProblems {
    pub fn report(&self, problem: impl Into<String>) {
        self.problems.lock().push(problem.into());
    }

    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        self.problems.lock().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.lock().is_empty()
    }
}

/// In-memory configuration cache keyed by the requested task list.
///
/// Nothing is stored while problems are reported, since the state would not be reusable.
#[derive(Debug)]
pub struct DefaultConfigurationCache {
    problems: Arc<ConfigurationCacheProblems>,
    quiet: bool,
    entries: Mutex<FxHashMap<Vec<String>, WorkGraph>>,
}

impl DefaultConfigurationCache {
    #[must_use]
    pub fn new(start: &CachingStartParameter, problems: Arc<ConfigurationCacheProblems>) -> Self {
        Self { problems, quiet: start.is_quiet(), entries: Mutex::default() }
    }
}

impl BuildTreeConfigurationCache for DefaultConfigurationCache {
    fn load_or_schedule(&self, tasks: &[String], schedule: &dyn Fn() -> WorkGraph) -> WorkGraph {
        if let Some(graph) = self.entries.lock().get(tasks) {
            if !self.quiet {
                debug!(?tasks, "Reusing configuration cache entry");
            }
            return WorkGraph { loaded_from_cache: true, ..graph.clone() };
        }

        let graph = schedule();
        if self.problems.is_empty() {
            self.entries.lock().insert(tasks.to_vec(), graph.clone());
        } else {
            debug!(problems = self.problems.problems().len(), "Configuration cache entry discarded");
        }
        graph
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Write {}

#[derive(Debug, Clone, Copy)]
pub enum Read {}

/// Resolves how beans of a given type are written to (or read from) the cache.
#[derive(Debug)]
pub struct BeanStateLookup<D> {
    resolved: Mutex<Vec<&'static str>>,
    direction: PhantomData<fn() -> D>,
}

impl<D> BeanStateLookup<D> {
    #[must_use]
    pub fn new() -> Self {
        Self { resolved: Mutex::default(), direction: PhantomData }
    }

    /// Registers `bean_type` on first use; returns whether it was already known.
    pub fn lookup(&self, bean_type: &'static str) -> bool {
        let mut resolved = self.resolved.lock();
        if resolved.contains(&bean_type) {
            return true;
        }
        trace!(bean_type, "Resolved bean state");
        resolved.push(bean_type);
        false
    }
}

impl<D> Default for BeanStateLookup<D> {
    fn default() -> Self {
        Self::new()
    }
}

pub type BeanStateWriterLookup = BeanStateLookup<Write>;
pub type BeanStateReaderLookup = BeanStateLookup<Read>;

/// Services registered when the configuration cache is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct CachingBundle;

impl ServiceBundle for CachingBundle {
    fn kind(&self) -> BundleKind {
        BundleKind::Caching
    }

    fn register(&self, registry: &mut ServiceRegistry) -> Result<(), ControllerError> {
        registry
            .add(EnvironmentChangeTracker::new())?
            .add_shared::<dyn BuildTreeLifecycleControllerFactory>(Arc::new(
                CachingLifecycleControllerFactory,
            ))?
            .add_factory(|registry: &ServiceRegistry| {
                registry
                    .get::<ModelRequirements>()
                    .map(|requirements| CachingStartParameter::from_requirements(&requirements))
            })?
            .add(ClassLoaderScopeRegistryListener::default())?
            .add(InstrumentationStrategy::Caching)?
            .add(ConfigurationCacheProblems::default())?
            .add_factory(|registry: &ServiceRegistry| {
                Ok::<_, RegistryError>(DefaultConfigurationCache::new(
                    &*registry.get::<CachingStartParameter>()?,
                    registry.get::<ConfigurationCacheProblems>()?,
                ))
            })?
            .add(BeanStateWriterLookup::new())?
            .add(BeanStateReaderLookup::new())?
            .add_shared_factory(|registry: &ServiceRegistry| {
                let cache = registry.get::<DefaultConfigurationCache>()?;
                Ok::<_, RegistryError>(Arc::new(CacheAwareWorkGraphPreparer::new(
                    cache,
                    DefaultWorkGraphPreparer,
                )) as Arc<dyn WorkGraphPreparer>)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_domain::StartParameters;

    fn start_parameter() -> CachingStartParameter {
        CachingStartParameter::new(false, false, vec!["build".to_owned()])
    }

    #[test]
    fn start_parameter_resolves_pre_stable_flag() {
        let start = StartParameters::new()
            .with_configuration_cache_quiet(true)
            .with_task_names(["assemble"])
            .with_system_property(
                "org.gradle.configuration-cache.internal.task-execution-access-pre-stable",
                "",
            );

        let adapter = CachingStartParameter::from_requirements(&ModelRequirements::RunTasks(start));

        assert!(adapter.task_execution_access_pre_stable());
        assert!(adapter.is_quiet());
        assert_eq!(adapter.requested_tasks(), ["assemble"]);
    }

    #[test]
    fn start_parameter_defaults_to_stable_access() {
        let adapter = CachingStartParameter::from_requirements(&ModelRequirements::CreateModel(
            StartParameters::new(),
        ));
        assert!(!adapter.task_execution_access_pre_stable());
    }

    #[test]
    fn cache_reuses_entries_for_the_same_tasks() {
        let cache = DefaultConfigurationCache::new(&start_parameter(), Arc::default());
        let tasks = vec!["build".to_owned()];

        let first = cache.load_or_schedule(&tasks, &|| DefaultWorkGraphPreparer.prepare(&tasks));
        let second = cache.load_or_schedule(&tasks, &|| unreachable!("entry should be reused"));

        assert!(!first.loaded_from_cache);
        assert!(second.loaded_from_cache);
        assert_eq!(second.scheduled, tasks);
    }

    #[test]
    fn problems_prevent_storing_an_entry() {
        let problems = Arc::new(ConfigurationCacheProblems::default());
        problems.report("invocation of Task.project at execution time");
        let cache = DefaultConfigurationCache::new(&start_parameter(), Arc::clone(&problems));
        let tasks = vec!["build".to_owned()];

        cache.load_or_schedule(&tasks, &|| DefaultWorkGraphPreparer.prepare(&tasks));
        let again = cache.load_or_schedule(&tasks, &|| DefaultWorkGraphPreparer.prepare(&tasks));

        assert!(!again.loaded_from_cache);
    }

    #[test]
    fn environment_tracker_keeps_first_value() {
        let tracker = EnvironmentChangeTracker::new();
        tracker.system_property_read("user.home", Some("/home/a"));
        tracker.system_property_read("user.home", Some("/home/b"));
        tracker.system_property_read("ci", None);

        let observed = tracker.observed();
        assert_eq!(observed["user.home"].as_deref(), Some("/home/a"));
        assert_eq!(observed["ci"], None);
    }

    #[test]
    fn bean_lookups_remember_resolved_types() {
        let writers = BeanStateWriterLookup::new();
        assert!(!writers.lookup("JavaCompile"));
        assert!(writers.lookup("JavaCompile"));
        assert!(!BeanStateReaderLookup::new().lookup("JavaCompile"));
    }
}
