//! Facade crate for Arbor.
//! Re-exports the domain, kernel and controller crates and bootstraps a [`BuildTree`].
//! Keep this crate thin: it composes other crates, it does not decide anything itself.
//!
//! ## Usage
//! ```rust
//! use arbor::BuildTree;
//! use arbor::domain::{ModelRequirements, StartParameters};
//!
//! let start = StartParameters::new().with_configuration_cache(true);
//! let tree = BuildTree::for_requirements(ModelRequirements::RunTasks(start)).build()?;
//! assert!(tree.parameters().is_configuration_cache());
//! # Ok::<(), arbor::controller::ControllerError>(())
//! ```

pub use arbor_controller as controller;
pub use arbor_domain as domain;
pub use arbor_kernel as kernel;

use arbor_controller::services::lifecycle::{
    BuildTreeLifecycleController, BuildTreeLifecycleControllerFactory,
};
use arbor_controller::{
    BuildTreeModelControllerServices, BundleKind, ConfigurationTimeBarrier, ControllerError,
    DefaultBuildTreeModelControllerServices, NoticeSink, TaskExecutionAccessChecker,
    TracingNoticeSink,
};
use arbor_domain::{
    BuildModelParameters, BuildType, IncubatingFeatures, ModelRequirements, StartParameters,
};
use arbor_kernel::registry::ServiceRegistry;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
enum Request {
    Root(ModelRequirements),
    Nested(StartParameters),
}

/// Configures a [`BuildTree`] before its services are registered.
#[derive(Debug)]
pub struct BuildTreeBuilder {
    request: Request,
    notices: Arc<dyn NoticeSink>,
}

impl BuildTreeBuilder {
    /// Where incubating-feature notices go. Defaults to [`TracingNoticeSink`].
    #[must_use]
    pub fn notice_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    /// Resolves the configuration and registers every service of the build tree.
    ///
    /// # Errors
    /// * [`ControllerError::Configuration`] for incompatible start parameters.
    /// * [`ControllerError::Registry`] if registration fails.
    pub fn build(self) -> Result<BuildTree, ControllerError> {
        let controller = DefaultBuildTreeModelControllerServices::new(self.notices);
        let supplier = match self.request {
            Request::Root(requirements) => controller.services_for_build_tree(requirements)?,
            Request::Nested(start) => controller.services_for_nested_build_tree(start),
        };
        let parameters = *supplier.parameters();
        let build_type = supplier.requirements().build_type();
        let notices = supplier.notices();

        let barrier = Arc::new(ConfigurationTimeBarrier::new());
        let mut registry = ServiceRegistry::new();
        registry.add_shared(Arc::clone(&barrier))?;
        let bundle = supplier.apply(&mut registry)?;

        info!(%build_type, %bundle, services = registry.len(), "Build tree services registered");
        Ok(BuildTree { registry: Arc::new(registry), parameters, build_type, bundle, notices, barrier })
    }
}

/// A build tree with its finalized configuration and service registry.
#[derive(Debug, Clone)]
pub struct BuildTree {
    registry: Arc<ServiceRegistry>,
    parameters: BuildModelParameters,
    build_type: BuildType,
    bundle: BundleKind,
    notices: IncubatingFeatures,
    barrier: Arc<ConfigurationTimeBarrier>,
}

impl BuildTree {
    /// A root build tree for the given requirements.
    #[must_use]
    pub fn for_requirements(requirements: ModelRequirements) -> BuildTreeBuilder {
        BuildTreeBuilder { request: Request::Root(requirements), notices: Arc::new(TracingNoticeSink) }
    }

    /// A build tree spawned from within another build.
    #[must_use]
    pub fn nested(start: StartParameters) -> BuildTreeBuilder {
        BuildTreeBuilder { request: Request::Nested(start), notices: Arc::new(TracingNoticeSink) }
    }

    #[must_use]
    pub const fn parameters(&self) -> &BuildModelParameters {
        &self.parameters
    }

    #[must_use]
    pub const fn build_type(&self) -> BuildType {
        self.build_type
    }

    #[must_use]
    pub const fn bundle(&self) -> BundleKind {
        self.bundle
    }

    #[must_use]
    pub const fn notices(&self) -> IncubatingFeatures {
        self.notices
    }

    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn configuration_time_barrier(&self) -> &ConfigurationTimeBarrier {
        &self.barrier
    }

    /// The access checker, created on first call.
    ///
    /// # Errors
    /// [`ControllerError::Registry`] wrapping the checker factory's failure.
    pub fn access_checker(&self) -> Result<Arc<TaskExecutionAccessChecker>, ControllerError> {
        Ok(self.registry.get::<TaskExecutionAccessChecker>()?)
    }

    /// A lifecycle controller from the selected bundle's factory.
    ///
    /// # Errors
    /// Fails if the bundle did not register a factory or one of its dependencies.
    pub fn lifecycle_controller(&self) -> Result<BuildTreeLifecycleController, ControllerError> {
        self.registry
            .get::<dyn BuildTreeLifecycleControllerFactory>()?
            .create_controller(&self.registry)
    }
}
