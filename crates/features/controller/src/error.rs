use arbor_kernel::RegistryError;
use std::borrow::Cow;

/// Errors raised while initializing a build tree.
#[arbor_derive::arbor_error]
pub enum ControllerError {
    /// The user asked for an impossible combination of options.
    #[error("Invalid build configuration{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A collaborator that the selected bundle should have registered is absent.
    #[error("Missing service dependency{}: {message}", format_context(.context))]
    MissingDependency { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Service registry error{}: {source}", format_context(.context))]
    Registry { source: RegistryError, context: Option<Cow<'static, str>> },
}
