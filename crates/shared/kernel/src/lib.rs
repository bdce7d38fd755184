//! Kernel utilities shared by the Arbor slices.
//!
//! * [`config`]: layered settings loading (file + `ARBOR__` environment).
//! * [`registry`]: the append-only service registry a build tree is wired into.
//!
//! ```rust
//! use arbor_kernel::registry::ServiceRegistry;
//!
//! let mut registry = ServiceRegistry::new();
//! registry.add(42_u32).unwrap();
//! assert_eq!(*registry.get::<u32>().unwrap(), 42);
//! ```

pub mod config;
mod error;
pub mod registry;

pub use arbor_domain as domain;
pub use error::{RegistryError, RegistryErrorExt};
