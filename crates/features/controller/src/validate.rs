use crate::error::ControllerError;
use arbor_domain::StartParameters;

/// Rejects isolated projects combined with an explicitly disabled configuration cache.
///
/// Leaving the configuration cache at its default is fine: isolated projects
/// turns it on implicitly.
///
/// # Errors
/// [`ControllerError::Configuration`] for the incompatible combination.
pub fn validate_start_parameters(start: &StartParameters) -> Result<(), ControllerError> {
    let cache = start.configuration_cache;
    if start.isolated_projects.get() && !cache.get() && cache.is_explicit() {
        return Err(ControllerError::Configuration {
            message: "The configuration cache cannot be disabled when isolated projects is enabled."
                .into(),
            context: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_with_explicitly_disabled_cache_fails() {
        let start = StartParameters::new().with_isolated_projects(true).with_configuration_cache(false);

        let err = validate_start_parameters(&start).unwrap_err();
        assert!(matches!(err, ControllerError::Configuration { .. }));
        assert!(err.to_string().contains("cannot be disabled when isolated projects is enabled"));
    }

    #[test]
    fn isolation_with_defaulted_cache_passes() {
        let start = StartParameters::new().with_isolated_projects(true);
        assert!(validate_start_parameters(&start).is_ok());
    }

    #[test]
    fn disabled_cache_without_isolation_passes() {
        let start = StartParameters::new().with_configuration_cache(false);
        assert!(validate_start_parameters(&start).is_ok());

        let start = start.with_isolated_projects(false);
        assert!(validate_start_parameters(&start).is_ok());
    }
}
