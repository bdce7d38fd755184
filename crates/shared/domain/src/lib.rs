//! # Domain Models
//!
//! Plain data shared by every Arbor crate: what the user asked for
//! ([`StartParameters`], [`ModelRequirements`]) and what the build tree decided
//! ([`BuildModelParameters`], [`BuildType`]).
//! Keep it lean: `serde` and `bitflags` only, no I/O.

pub mod features;
pub mod option;
pub mod parameters;
pub mod requirements;
pub mod start;

pub use features::IncubatingFeatures;
pub use option::BuildOption;
pub use parameters::{BuildModelParameters, ConfigurationMode};
pub use requirements::{BuildType, ModelRequirements};
pub use start::StartParameters;
