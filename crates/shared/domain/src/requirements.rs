use crate::start::StartParameters;
use serde::Serialize;
use std::fmt;

/// What a build invocation has to deliver.
///
/// Tooling clients ask for a model; command-line builds run tasks. The two are
/// exclusive, so `is_creates_model` and `is_runs_tasks` are always opposite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "start_parameters", rename_all = "snake_case")]
pub enum ModelRequirements {
    RunTasks(StartParameters),
    CreateModel(StartParameters),
}

impl ModelRequirements {
    #[must_use]
    pub const fn start_parameters(&self) -> &StartParameters {
        match self {
            Self::RunTasks(start) | Self::CreateModel(start) => start,
        }
    }

    #[must_use]
    pub const fn is_creates_model(&self) -> bool {
        matches!(self, Self::CreateModel(_))
    }

    #[must_use]
    pub const fn is_runs_tasks(&self) -> bool {
        matches!(self, Self::RunTasks(_))
    }

    #[must_use]
    pub const fn build_type(&self) -> BuildType {
        if self.is_runs_tasks() { BuildType::Tasks } else { BuildType::Model }
    }
}

/// The kind of build running in this build tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildType {
    Tasks,
    Model,
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tasks => "TASKS",
            Self::Model => "MODEL",
        })
    }
}
