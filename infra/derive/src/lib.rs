#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Arbor crates.
//!
//! Consumers only need a regular dependency on this crate plus `thiserror`,
//! because the generated code derives `thiserror::Error`.
//!
//! ```toml
//! [dependencies]
//! arbor-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a plain enum into a crate error type with context support.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless those derives are already present.
/// * A companion `<Name>Ext` trait whose `.context(..)` attaches a human readable
///   hint to a `Result<T, Name>` (and to `Result<T, Source>` for every variant
///   that wraps a foreign error).
/// * `From<Source>` for every variant with a `source` field (or a field marked
///   `#[source]` / `#[from]`), so `?` works on upstream errors.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A module-private `format_context` helper used by the `#[error(..)]` strings.
///
/// # Rules
///
/// 1. Only enums with named-field variants are accepted.
/// 2. A `context` field must be typed `Option<Cow<'static, str>>`.
/// 3. Variants wrapping a source error must carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[arbor_derive::arbor_error]
/// pub enum ConfigError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal config error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Settings, ConfigError> {
///     builder.build().context("Reading settings")?.try_deserialize().map_err(Into::into)
/// }
/// ```
#[proc_macro_attribute]
pub fn arbor_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
