use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings file looked up (optionally) when no explicit path is given.
pub const DEFAULT_SETTINGS: &str = "arbor";

/// Environment prefix; nested keys are separated by `__` (`ARBOR__CONFIGURATION_CACHE`).
pub const ENV_PREFIX: &str = "ARBOR";

#[arbor_derive::arbor_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a settings file overlaid with `ARBOR__*` environment variables.
///
/// * With `Some(path)` the file must exist.
/// * With `None`, `./arbor.{toml,json,yaml,..}` is used when present, otherwise
///   only the environment (and `T`'s serde defaults) contribute.
///
/// List-valued `task_names` may be given in the environment as a comma separated
/// string (`ARBOR__TASK_NAMES=clean,assemble`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if a required file is missing or the merged
/// values do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use arbor_domain::StartParameters;
/// use arbor_kernel::config::load_config;
///
/// let start: StartParameters = load_config(None::<&str>).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective = path.map_or_else(|| PathBuf::from(DEFAULT_SETTINGS), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("task_names"),
        );

    if required {
        info!(path = %effective.display(), "Loading settings");
    } else {
        debug!(path = %effective.display(), "Loading optional settings");
    }

    let settings = builder
        .build()
        .context("Failed to build settings")?
        .try_deserialize::<T>()
        .context("Failed to deserialize settings")?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_domain::{BuildOption, StartParameters};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_values_become_explicit_options() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("settings.toml");
        fs::write(
            &file,
            "isolated_projects = true\nconfiguration_cache = false\ntask_names = [\"build\"]\n",
        )?;

        let start: StartParameters = load_config(Some(&file))?;

        assert_eq!(start.isolated_projects, BuildOption::explicit(true));
        assert_eq!(start.configuration_cache, BuildOption::explicit(false));
        assert!(start.configure_on_demand.is_unset());
        assert_eq!(start.task_names, vec!["build"]);
        Ok(())
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");

        let err = load_config::<StartParameters>(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Config { context: Some(_), .. }));
    }

    #[test]
    fn malformed_values_are_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file = dir.path().join("settings.toml");
        fs::write(&file, "configuration_cache = \"sometimes\"\n")?;

        assert!(load_config::<StartParameters>(Some(&file)).is_err());
        Ok(())
    }
}
