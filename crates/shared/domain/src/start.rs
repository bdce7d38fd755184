use crate::option::BuildOption;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Already-parsed user settings for one build invocation.
///
/// Every field has a default, so a partial settings source is enough:
///
/// ```toml
/// isolated_projects = true
/// task_names = ["assemble"]
///
/// [system_properties]
/// "org.gradle.internal.tooling.parallel" = "false"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartParameters {
    #[serde(skip_serializing_if = "BuildOption::is_unset")]
    pub isolated_projects: BuildOption,
    #[serde(skip_serializing_if = "BuildOption::is_unset")]
    pub configuration_cache: BuildOption,
    #[serde(skip_serializing_if = "BuildOption::is_unset")]
    pub configure_on_demand: BuildOption,
    #[serde(skip_serializing_if = "BuildOption::is_unset")]
    pub parallel_project_execution: BuildOption,
    /// Suppresses the isolated-projects / configuration-cache incubation notice.
    pub configuration_cache_quiet: bool,
    /// `-Dkey=value` style properties; also the override source for internal flags.
    pub system_properties: BTreeMap<String, String>,
    pub task_names: Vec<String>,
}

impl StartParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_isolated_projects(mut self, enabled: bool) -> Self {
        self.isolated_projects = BuildOption::explicit(enabled);
        self
    }

    #[must_use]
    pub fn with_configuration_cache(mut self, enabled: bool) -> Self {
        self.configuration_cache = BuildOption::explicit(enabled);
        self
    }

    #[must_use]
    pub fn with_configure_on_demand(mut self, enabled: bool) -> Self {
        self.configure_on_demand = BuildOption::explicit(enabled);
        self
    }

    #[must_use]
    pub fn with_parallel_project_execution(mut self, enabled: bool) -> Self {
        self.parallel_project_execution = BuildOption::explicit(enabled);
        self
    }

    #[must_use]
    pub fn with_configuration_cache_quiet(mut self, quiet: bool) -> Self {
        self.configuration_cache_quiet = quiet;
        self
    }

    #[must_use]
    pub fn with_system_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.system_properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_task_names<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.task_names.extend(tasks.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn system_property(&self, key: &str) -> Option<&str> {
        self.system_properties.get(key).map(String::as_str)
    }
}
