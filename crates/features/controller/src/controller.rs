//! Entry points turning build requirements into registered build-tree services.

use crate::error::ControllerError;
use crate::notice::{NoticeSink, TracingNoticeSink};
use crate::options::ResolvedFlags;
use crate::parameters::{compute_model_parameters, incubating_features, nested_model_parameters};
use crate::services::legacy::LegacyBundle;
use crate::services::{BundleKind, ServiceBundle, register_with_bundle, select_bundle};
use crate::validate::validate_start_parameters;
use arbor_domain::{BuildModelParameters, IncubatingFeatures, ModelRequirements, StartParameters};
use arbor_kernel::registry::ServiceRegistry;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Decides the configuration of a build tree and the services it runs with.
pub trait BuildTreeModelControllerServices: Send + Sync + Debug {
    /// # Errors
    /// [`ControllerError::Configuration`] for incompatible start parameters.
    fn services_for_build_tree(
        &self,
        requirements: ModelRequirements,
    ) -> Result<ServicesSupplier, ControllerError>;

    /// Services for a build tree spawned from inside another build. Never cached.
    fn services_for_nested_build_tree(&self, start: StartParameters) -> ServicesSupplier;
}

/// A finalized build-tree configuration, ready to be registered.
#[derive(Debug)]
pub struct ServicesSupplier {
    parameters: BuildModelParameters,
    requirements: ModelRequirements,
    bundle: Box<dyn ServiceBundle>,
    notices: IncubatingFeatures,
}

impl ServicesSupplier {
    #[must_use]
    pub const fn parameters(&self) -> &BuildModelParameters {
        &self.parameters
    }

    #[must_use]
    pub const fn requirements(&self) -> &ModelRequirements {
        &self.requirements
    }

    #[must_use]
    pub fn bundle_kind(&self) -> BundleKind {
        self.bundle.kind()
    }

    /// Incubating features announced while computing this configuration.
    #[must_use]
    pub const fn notices(&self) -> IncubatingFeatures {
        self.notices
    }

    /// Registers the configuration and the selected bundle, all or nothing.
    ///
    /// # Errors
    /// [`ControllerError::Registry`] if the registry already holds one of the services.
    pub fn apply(self, registry: &mut ServiceRegistry) -> Result<BundleKind, ControllerError> {
        register_with_bundle(registry, self.parameters, self.requirements, self.bundle.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct DefaultBuildTreeModelControllerServices {
    notices: Arc<dyn NoticeSink>,
}

impl DefaultBuildTreeModelControllerServices {
    #[must_use]
    pub fn new(notices: Arc<dyn NoticeSink>) -> Self {
        Self { notices }
    }

    fn announce(&self, features: IncubatingFeatures) {
        for feature in features.names() {
            self.notices.incubating_feature_used(feature);
        }
    }
}

impl Default for DefaultBuildTreeModelControllerServices {
    fn default() -> Self {
        Self::new(Arc::new(TracingNoticeSink))
    }
}

impl BuildTreeModelControllerServices for DefaultBuildTreeModelControllerServices {
    #[instrument(skip_all, fields(build_type = %requirements.build_type()))]
    fn services_for_build_tree(
        &self,
        requirements: ModelRequirements,
    ) -> Result<ServicesSupplier, ControllerError> {
        let start = requirements.start_parameters();
        validate_start_parameters(start)?;

        let flags = ResolvedFlags::resolve(start);
        let parameters = compute_model_parameters(&requirements, flags);
        let notices = incubating_features(&parameters, start.configuration_cache_quiet);
        self.announce(notices);

        let bundle = select_bundle(&parameters);
        info!(
            bundle = %bundle.kind(),
            configuration_cache = parameters.is_configuration_cache(),
            isolated_projects = parameters.is_isolated_projects(),
            "Build tree configured"
        );
        debug!(?flags, ?parameters, "Resolved build model parameters");

        Ok(ServicesSupplier { parameters, requirements, bundle, notices })
    }

    #[instrument(skip_all)]
    fn services_for_nested_build_tree(&self, start: StartParameters) -> ServicesSupplier {
        let parameters = nested_model_parameters(start.configure_on_demand.get());
        debug!(?parameters, "Nested build tree configured");

        ServicesSupplier {
            parameters,
            requirements: ModelRequirements::RunTasks(start),
            bundle: Box::new(LegacyBundle),
            notices: IncubatingFeatures::empty(),
        }
    }
}
