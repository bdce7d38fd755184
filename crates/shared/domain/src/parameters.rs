use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// How far configuration caching goes for a build tree.
///
/// Isolated projects always includes the configuration cache, so the two
/// switches are folded into one value and the forbidden combination
/// (isolated without cache) cannot be represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConfigurationMode {
    #[default]
    Vintage,
    Cached,
    Isolated,
}

impl ConfigurationMode {
    #[must_use]
    pub const fn from_flags(configuration_cache: bool, isolated_projects: bool) -> Self {
        if isolated_projects {
            Self::Isolated
        } else if configuration_cache {
            Self::Cached
        } else {
            Self::Vintage
        }
    }
}

/// The feature set a build tree runs with. Built once, then only read.
///
/// ```rust
/// use arbor_domain::{BuildModelParameters, ConfigurationMode};
///
/// let params = BuildModelParameters::new(ConfigurationMode::Isolated)
///     .with_configure_on_demand(true);
/// assert!(params.is_configuration_cache());
/// assert!(params.is_isolated_projects());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BuildModelParameters {
    mode: ConfigurationMode,
    configure_on_demand: bool,
    intermediate_model_cache: bool,
    parallel_configuration: bool,
    parallel_tooling_actions: bool,
    invalidate_coupled_projects: bool,
}

impl BuildModelParameters {
    /// Parameters with the given caching mode and every other feature off.
    #[must_use]
    pub const fn new(mode: ConfigurationMode) -> Self {
        Self {
            mode,
            configure_on_demand: false,
            intermediate_model_cache: false,
            parallel_configuration: false,
            parallel_tooling_actions: false,
            invalidate_coupled_projects: false,
        }
    }

    #[must_use]
    pub const fn with_configure_on_demand(mut self, enabled: bool) -> Self {
        self.configure_on_demand = enabled;
        self
    }

    #[must_use]
    pub const fn with_intermediate_model_cache(mut self, enabled: bool) -> Self {
        self.intermediate_model_cache = enabled;
        self
    }

    #[must_use]
    pub const fn with_parallel_configuration(mut self, enabled: bool) -> Self {
        self.parallel_configuration = enabled;
        self
    }

    #[must_use]
    pub const fn with_parallel_tooling_actions(mut self, enabled: bool) -> Self {
        self.parallel_tooling_actions = enabled;
        self
    }

    #[must_use]
    pub const fn with_invalidate_coupled_projects(mut self, enabled: bool) -> Self {
        self.invalidate_coupled_projects = enabled;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> ConfigurationMode {
        self.mode
    }

    #[must_use]
    pub const fn is_configure_on_demand(&self) -> bool {
        self.configure_on_demand
    }

    #[must_use]
    pub const fn is_configuration_cache(&self) -> bool {
        !matches!(self.mode, ConfigurationMode::Vintage)
    }

    #[must_use]
    pub const fn is_isolated_projects(&self) -> bool {
        matches!(self.mode, ConfigurationMode::Isolated)
    }

    #[must_use]
    pub const fn is_intermediate_model_cache(&self) -> bool {
        self.intermediate_model_cache
    }

    #[must_use]
    pub const fn is_parallel_configuration(&self) -> bool {
        self.parallel_configuration
    }

    #[must_use]
    pub const fn is_parallel_tooling_actions(&self) -> bool {
        self.parallel_tooling_actions
    }

    #[must_use]
    pub const fn is_invalidate_coupled_projects(&self) -> bool {
        self.invalidate_coupled_projects
    }
}

impl Serialize for BuildModelParameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BuildModelParameters", 7)?;
        state.serialize_field("configure_on_demand", &self.configure_on_demand)?;
        state.serialize_field("configuration_cache", &self.is_configuration_cache())?;
        state.serialize_field("isolated_projects", &self.is_isolated_projects())?;
        state.serialize_field("intermediate_model_cache", &self.intermediate_model_cache)?;
        state.serialize_field("parallel_configuration", &self.parallel_configuration)?;
        state.serialize_field("parallel_tooling_actions", &self.parallel_tooling_actions)?;
        state.serialize_field("invalidate_coupled_projects", &self.invalidate_coupled_projects)?;
        state.end()
    }
}
