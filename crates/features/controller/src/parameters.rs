//! Derivation of [`BuildModelParameters`] from the requirements and resolved flags.

use crate::options::ResolvedFlags;
use arbor_domain::{BuildModelParameters, ConfigurationMode, IncubatingFeatures, ModelRequirements};

/// Computes the parameters for a build tree. Pure: same inputs, same output.
///
/// Model creation only switches features on through isolated projects, with the
/// intermediate model cache always on. Task runs honour the user's configuration
/// cache and configure-on-demand settings, each also implied by isolated projects.
#[must_use]
pub fn compute_model_parameters(
    requirements: &ModelRequirements,
    flags: ResolvedFlags,
) -> BuildModelParameters {
    let start = requirements.start_parameters();
    let isolated = start.isolated_projects.get();
    let parallel_tooling =
        (isolated || start.parallel_project_execution.get()) && flags.parallel_tooling;
    let invalidate_coupled = isolated && flags.invalidate_coupled_projects;

    let params = if requirements.is_creates_model() {
        BuildModelParameters::new(ConfigurationMode::from_flags(isolated, isolated))
            .with_configure_on_demand(isolated)
            .with_intermediate_model_cache(true)
            .with_parallel_configuration(isolated)
    } else {
        let cache = start.configuration_cache.get() || isolated;
        BuildModelParameters::new(ConfigurationMode::from_flags(cache, isolated))
            .with_configure_on_demand(start.configure_on_demand.get() || isolated)
    };

    params
        .with_parallel_tooling_actions(parallel_tooling)
        .with_invalidate_coupled_projects(invalidate_coupled)
}

/// Incubating features to announce for these parameters.
///
/// Isolated projects is announced instead of (not in addition to) the configuration
/// cache, and neither is announced when the user asked for quiet output.
/// Configure on demand is announced only outside isolated projects.
#[must_use]
pub fn incubating_features(params: &BuildModelParameters, quiet: bool) -> IncubatingFeatures {
    let mut features = IncubatingFeatures::empty();
    if !quiet {
        if params.is_isolated_projects() {
            features |= IncubatingFeatures::ISOLATED_PROJECTS;
        } else if params.is_configuration_cache() {
            features |= IncubatingFeatures::CONFIGURATION_CACHE;
        }
    }
    if !params.is_isolated_projects() && params.is_configure_on_demand() {
        features |= IncubatingFeatures::CONFIGURE_ON_DEMAND;
    }
    features
}

/// Fixed parameters for a nested build tree: never cached, never isolated.
#[must_use]
pub const fn nested_model_parameters(configure_on_demand: bool) -> BuildModelParameters {
    BuildModelParameters::new(ConfigurationMode::Vintage)
        .with_configure_on_demand(configure_on_demand)
        .with_intermediate_model_cache(true)
}
