//! Bundle selection and service registration for a build tree.
//!
//! Exactly one [`ServiceBundle`] is registered per build tree, chosen from the
//! computed [`BuildModelParameters`]. Collaborators depend on the registered
//! services (and on [`BundleKind`] at most), never on the concrete bundle.

pub mod access;
pub mod caching;
pub mod legacy;
pub mod lifecycle;
pub mod work_graph;

use crate::error::ControllerError;
use access::register_access_checker;
use arbor_domain::{BuildModelParameters, ModelRequirements};
use arbor_kernel::registry::ServiceRegistry;
use caching::CachingBundle;
use legacy::LegacyBundle;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Which bundle a build tree runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleKind {
    Caching,
    Legacy,
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Caching => "caching",
            Self::Legacy => "legacy",
        })
    }
}

/// Injected-classpath instrumentation variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentationStrategy {
    Caching,
    Vintage,
}

/// A disjoint set of collaborators registered together.
pub trait ServiceBundle: Send + Sync + fmt::Debug {
    fn kind(&self) -> BundleKind;

    /// # Errors
    /// Fails if one of the bundle's services is already registered.
    fn register(&self, registry: &mut ServiceRegistry) -> Result<(), ControllerError>;
}

/// The caching bundle whenever the configuration cache is on, the legacy one otherwise.
#[must_use]
pub fn select_bundle(parameters: &BuildModelParameters) -> Box<dyn ServiceBundle> {
    if parameters.is_configuration_cache() {
        Box::new(CachingBundle)
    } else {
        Box::new(LegacyBundle)
    }
}

/// Registers everything a build tree needs from this slice.
///
/// Always registers the parameters, the requirements and the derived
/// [`arbor_domain::BuildType`], then the selected bundle, its [`BundleKind`] and
/// the lazy [`access::TaskExecutionAccessChecker`] factory.
///
/// Registration is all or nothing: on error `registry` is left as it was.
///
/// # Errors
/// [`ControllerError::Registry`] if any of these services is already registered.
pub fn register_services(
    registry: &mut ServiceRegistry,
    parameters: BuildModelParameters,
    requirements: ModelRequirements,
) -> Result<BundleKind, ControllerError> {
    let bundle = select_bundle(&parameters);
    register_with_bundle(registry, parameters, requirements, bundle.as_ref())
}

pub(crate) fn register_with_bundle(
    registry: &mut ServiceRegistry,
    parameters: BuildModelParameters,
    requirements: ModelRequirements,
    bundle: &dyn ServiceBundle,
) -> Result<BundleKind, ControllerError> {
    let kind = bundle.kind();
    debug!(bundle = %kind, build_type = %requirements.build_type(), "Registering build tree services");

    let mut staged = ServiceRegistry::new();
    staged.add(parameters)?.add(requirements.build_type())?.add(requirements)?;
    bundle.register(&mut staged)?;
    staged.add(kind)?;
    register_access_checker(&mut staged, parameters)?;

    registry.merge(staged)?;
    Ok(kind)
}
