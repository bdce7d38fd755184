//! Policy deciding when tooling may touch project state.

use super::caching::CachingStartParameter;
use crate::error::ControllerError;
use arbor_domain::BuildModelParameters;
use arbor_kernel::registry::ServiceRegistry;
use arbor_kernel::RegistryError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Marks the end of the configuration phase of a build tree.
///
/// Supplied by the scope hosting the build tree, not by a bundle.
#[derive(Debug)]
pub struct ConfigurationTimeBarrier {
    at_configuration_time: AtomicBool,
}

impl ConfigurationTimeBarrier {
    #[must_use]
    pub const fn new() -> Self {
        Self { at_configuration_time: AtomicBool::new(true) }
    }

    pub fn is_at_configuration_time(&self) -> bool {
        self.at_configuration_time.load(Ordering::Acquire)
    }

    /// Moves the build tree into its execution phase. Irreversible.
    pub fn cross(&self) {
        self.at_configuration_time.store(false, Ordering::Release);
    }
}

impl Default for ConfigurationTimeBarrier {
    fn default() -> Self {
        Self::new()
    }
}

/// Detects project access from task actions.
#[derive(Debug, Clone)]
pub enum TaskExecutionAccessChecker {
    /// Access is forbidden while a task is executing.
    TaskStateBased,
    /// Access is forbidden once the configuration-time barrier has been crossed.
    ConfigurationTimeBarrierBased(Arc<ConfigurationTimeBarrier>),
}

impl TaskExecutionAccessChecker {
    #[must_use]
    pub fn is_project_access_allowed(&self, task_is_executing: bool) -> bool {
        match self {
            Self::TaskStateBased => !task_is_executing,
            Self::ConfigurationTimeBarrierBased(barrier) => barrier.is_at_configuration_time(),
        }
    }

    #[must_use]
    pub const fn variant(&self) -> &'static str {
        match self {
            Self::TaskStateBased => "task_state_based",
            Self::ConfigurationTimeBarrierBased(_) => "configuration_time_barrier_based",
        }
    }
}

/// Picks the checker for the given parameters from what is registered.
///
/// # Errors
/// [`ControllerError::MissingDependency`] when the configuration cache is on but
/// the caching start parameter or the barrier is not registered.
pub fn create_access_checker(
    registry: &ServiceRegistry,
    parameters: &BuildModelParameters,
) -> Result<TaskExecutionAccessChecker, ControllerError> {
    if !parameters.is_configuration_cache() {
        return Ok(TaskExecutionAccessChecker::TaskStateBased);
    }

    let start = registry.find::<CachingStartParameter>()?.ok_or_else(|| {
        ControllerError::MissingDependency {
            message: "caching start parameter".into(),
            context: Some("configuration cache is enabled".into()),
        }
    })?;
    if start.task_execution_access_pre_stable() {
        debug!("Task execution access checks use pre-stable behaviour");
        return Ok(TaskExecutionAccessChecker::TaskStateBased);
    }

    let barrier = registry.find::<ConfigurationTimeBarrier>()?.ok_or_else(|| {
        ControllerError::MissingDependency {
            message: "configuration time barrier".into(),
            context: Some("configuration cache is enabled".into()),
        }
    })?;
    Ok(TaskExecutionAccessChecker::ConfigurationTimeBarrierBased(barrier))
}

/// Registers the lazy [`TaskExecutionAccessChecker`] factory shared by both bundles.
///
/// # Errors
/// [`RegistryError::Duplicate`] if a checker is already registered.
pub fn register_access_checker(
    registry: &mut ServiceRegistry,
    parameters: BuildModelParameters,
) -> Result<(), RegistryError> {
    registry.add_factory(move |registry: &ServiceRegistry| {
        create_access_checker(registry, &parameters)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_domain::ConfigurationMode;

    fn cached() -> BuildModelParameters {
        BuildModelParameters::new(ConfigurationMode::Cached)
    }

    #[test]
    fn vintage_builds_use_task_state() {
        let registry = ServiceRegistry::new();
        let params = BuildModelParameters::new(ConfigurationMode::Vintage);

        let checker = create_access_checker(&registry, &params).unwrap();
        assert!(matches!(checker, TaskExecutionAccessChecker::TaskStateBased));
    }

    #[test]
    fn caching_without_start_parameter_is_a_missing_dependency() {
        let mut registry = ServiceRegistry::new();
        registry.add(ConfigurationTimeBarrier::new()).unwrap();

        let err = create_access_checker(&registry, &cached()).unwrap_err();
        assert!(matches!(err, ControllerError::MissingDependency { .. }));
    }

    #[test]
    fn pre_stable_mode_keeps_task_state_checks() {
        let mut registry = ServiceRegistry::new();
        registry.add(CachingStartParameter::new(true, false, Vec::new())).unwrap();

        let checker = create_access_checker(&registry, &cached()).unwrap();
        assert!(matches!(checker, TaskExecutionAccessChecker::TaskStateBased));
    }

    #[test]
    fn stable_mode_uses_the_registered_barrier() {
        let barrier = Arc::new(ConfigurationTimeBarrier::new());
        let mut registry = ServiceRegistry::new();
        registry.add(CachingStartParameter::new(false, false, Vec::new())).unwrap();
        registry.add_shared(Arc::clone(&barrier)).unwrap();

        let checker = create_access_checker(&registry, &cached()).unwrap();
        let TaskExecutionAccessChecker::ConfigurationTimeBarrierBased(used) = &checker else {
            panic!("expected the barrier based checker");
        };
        assert!(Arc::ptr_eq(used, &barrier));

        assert!(checker.is_project_access_allowed(true));
        barrier.cross();
        assert!(!checker.is_project_access_allowed(false));
    }

    #[test]
    fn stable_mode_without_barrier_is_a_missing_dependency() {
        let mut registry = ServiceRegistry::new();
        registry.add(CachingStartParameter::new(false, false, Vec::new())).unwrap();

        let err = create_access_checker(&registry, &cached()).unwrap_err();
        assert!(err.to_string().contains("configuration time barrier"));
    }

    #[test]
    fn task_state_checker_blocks_executing_tasks() {
        let checker = TaskExecutionAccessChecker::TaskStateBased;
        assert!(checker.is_project_access_allowed(false));
        assert!(!checker.is_project_access_allowed(true));
    }
}
