//! Internal feature flags and their resolution against system-property overrides.

use arbor_domain::StartParameters;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A named boolean with a compiled-in default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternalFlag {
    name: &'static str,
    default: bool,
}

impl InternalFlag {
    #[must_use]
    pub const fn new(name: &'static str, default: bool) -> Self {
        Self { name, default }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn default_value(&self) -> bool {
        self.default
    }
}

pub const PARALLEL_TOOLING: InternalFlag =
    InternalFlag::new("org.gradle.internal.tooling.parallel", true);

pub const INVALIDATE_COUPLED_PROJECTS: InternalFlag =
    InternalFlag::new("org.gradle.internal.invalidate-coupled-projects", true);

pub const TASK_EXECUTION_ACCESS_PRE_STABLE: InternalFlag = InternalFlag::new(
    "org.gradle.configuration-cache.internal.task-execution-access-pre-stable",
    false,
);

/// A read-only source of raw flag values, queried by exact name.
pub trait OptionOverrides {
    fn override_for(&self, name: &str) -> Option<&str>;
}

impl OptionOverrides for StartParameters {
    fn override_for(&self, name: &str) -> Option<&str> {
        self.system_property(name)
    }
}

impl OptionOverrides for BTreeMap<String, String> {
    fn override_for(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<S: std::hash::BuildHasher> OptionOverrides for HashMap<String, String, S> {
    fn override_for(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Resolves [`InternalFlag`]s: an override wins over the default.
///
/// A bare `-Dflag` (empty value) and `true` in any case enable the flag; every
/// other value disables it.
#[derive(Debug, Clone, Copy)]
pub struct InternalOptions<'a, O: ?Sized> {
    overrides: &'a O,
}

impl<'a, O: OptionOverrides + ?Sized> InternalOptions<'a, O> {
    pub const fn new(overrides: &'a O) -> Self {
        Self { overrides }
    }

    #[must_use]
    pub fn resolve(&self, flag: InternalFlag) -> bool {
        match self.overrides.override_for(flag.name) {
            Some(raw) => {
                let value = raw.is_empty() || raw.eq_ignore_ascii_case("true");
                debug!(flag = flag.name, raw, value, "Internal flag overridden");
                value
            },
            None => flag.default,
        }
    }
}

/// The flags the model parameter calculation depends on, resolved once per build tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedFlags {
    pub parallel_tooling: bool,
    pub invalidate_coupled_projects: bool,
}

impl ResolvedFlags {
    pub fn resolve<O: OptionOverrides + ?Sized>(overrides: &O) -> Self {
        let options = InternalOptions::new(overrides);
        Self {
            parallel_tooling: options.resolve(PARALLEL_TOOLING),
            invalidate_coupled_projects: options.resolve(INVALIDATE_COUPLED_PROJECTS),
        }
    }
}

impl Default for ResolvedFlags {
    fn default() -> Self {
        Self {
            parallel_tooling: PARALLEL_TOOLING.default_value(),
            invalidate_coupled_projects: INVALIDATE_COUPLED_PROJECTS.default_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let empty: BTreeMap<String, String> = BTreeMap::new();
        assert_eq!(ResolvedFlags::resolve(&empty), ResolvedFlags::default());
        assert!(!InternalOptions::new(&empty).resolve(TASK_EXECUTION_ACCESS_PRE_STABLE));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let source = overrides(&[
            ("org.gradle.internal.tooling.parallel", "false"),
            ("org.gradle.configuration-cache.internal.task-execution-access-pre-stable", "TRUE"),
        ]);
        let options = InternalOptions::new(&source);

        assert!(!options.resolve(PARALLEL_TOOLING));
        assert!(options.resolve(INVALIDATE_COUPLED_PROJECTS));
        assert!(options.resolve(TASK_EXECUTION_ACCESS_PRE_STABLE));
    }

    #[test]
    fn empty_value_enables_and_garbage_disables() {
        let source = overrides(&[
            ("org.gradle.internal.tooling.parallel", ""),
            ("org.gradle.internal.invalidate-coupled-projects", "yes"),
        ]);

        let flags = ResolvedFlags::resolve(&source);
        assert!(flags.parallel_tooling);
        assert!(!flags.invalidate_coupled_projects);
    }

    #[test]
    fn names_must_match_exactly() {
        let source = overrides(&[("org.gradle.internal.tooling.Parallel", "false")]);
        assert!(InternalOptions::new(&source).resolve(PARALLEL_TOOLING));
    }

    #[test]
    fn start_parameters_are_an_override_source() {
        let start = StartParameters::new()
            .with_system_property("org.gradle.internal.invalidate-coupled-projects", "false");

        assert!(!ResolvedFlags::resolve(&start).invalidate_coupled_projects);
    }
}
