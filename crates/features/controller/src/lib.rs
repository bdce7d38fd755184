//! # Build-tree model controller
//!
//! Reconciles the feature toggles of one build invocation into a single
//! [`arbor_domain::BuildModelParameters`] value and picks the service bundle
//! the build tree runs with.
//!
//! The pipeline runs once per build tree:
//! 1. [`validate::validate_start_parameters`] rejects impossible combinations.
//! 2. [`options::ResolvedFlags`] resolves internal flags from system properties.
//! 3. [`parameters::compute_model_parameters`] derives the parameters.
//! 4. [`services::register_services`] registers them with the selected bundle.
//!
//! [`DefaultBuildTreeModelControllerServices`] chains these steps and reports
//! incubating features to a [`NoticeSink`].

mod controller;
mod error;
pub mod notice;
pub mod options;
pub mod parameters;
pub mod services;
pub mod validate;

pub use controller::{
    BuildTreeModelControllerServices, DefaultBuildTreeModelControllerServices, ServicesSupplier,
};
pub use error::{ControllerError, ControllerErrorExt};
pub use notice::{NoticeSink, RecordingNoticeSink, TracingNoticeSink};
pub use services::access::{ConfigurationTimeBarrier, TaskExecutionAccessChecker};
pub use services::{BundleKind, InstrumentationStrategy, ServiceBundle};
