//! Build-tree lifecycle controllers, one factory per bundle.

use super::caching::EnvironmentChangeTracker;
use super::work_graph::{WorkGraph, WorkGraphPreparer};
use crate::error::ControllerError;
use arbor_domain::BuildType;
use arbor_kernel::registry::ServiceRegistry;
use std::fmt::Debug;
use std::sync::Arc;

/// Drives the requested work of one build tree.
#[derive(Debug)]
pub struct BuildTreeLifecycleController {
    build_type: BuildType,
    preparer: Arc<dyn WorkGraphPreparer>,
    environment: Option<Arc<EnvironmentChangeTracker>>,
}

impl BuildTreeLifecycleController {
    #[must_use]
    pub const fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// Whether environment inputs are tracked for cache invalidation.
    #[must_use]
    pub const fn tracks_environment(&self) -> bool {
        self.environment.is_some()
    }

    /// Schedules `tasks`. Model builds schedule nothing beyond what the model needs,
    /// which at this level means nothing.
    #[must_use]
    pub fn schedule_requested_tasks(&self, tasks: &[String]) -> WorkGraph {
        match self.build_type {
            BuildType::Tasks => self.preparer.prepare(tasks),
            BuildType::Model => self.preparer.prepare(&[]),
        }
    }
}

/// Creates the lifecycle controller for a build tree.
pub trait BuildTreeLifecycleControllerFactory: Send + Sync + Debug {
    /// # Errors
    /// Fails if a service the controller depends on is not registered.
    fn create_controller(
        &self,
        registry: &ServiceRegistry,
    ) -> Result<BuildTreeLifecycleController, ControllerError>;
}

/// Lifecycle factory of the caching bundle; also wires environment tracking.
#[derive(Debug, Default, Clone, Copy)]
pub struct CachingLifecycleControllerFactory;

impl BuildTreeLifecycleControllerFactory for CachingLifecycleControllerFactory {
    fn create_controller(
        &self,
        registry: &ServiceRegistry,
    ) -> Result<BuildTreeLifecycleController, ControllerError> {
        Ok(BuildTreeLifecycleController {
            build_type: *registry.get::<BuildType>()?,
            preparer: registry.get::<dyn WorkGraphPreparer>()?,
            environment: Some(registry.get::<EnvironmentChangeTracker>()?),
        })
    }
}

/// Lifecycle factory of the legacy bundle.
#[derive(Debug, Default, Clone, Copy)]
pub struct VintageLifecycleControllerFactory;

impl BuildTreeLifecycleControllerFactory for VintageLifecycleControllerFactory {
    fn create_controller(
        &self,
        registry: &ServiceRegistry,
    ) -> Result<BuildTreeLifecycleController, ControllerError> {
        Ok(BuildTreeLifecycleController {
            build_type: *registry.get::<BuildType>()?,
            preparer: registry.get::<dyn WorkGraphPreparer>()?,
            environment: None,
        })
    }
}
