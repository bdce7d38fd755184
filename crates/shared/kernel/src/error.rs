use std::borrow::Cow;

/// Failures of the service registry.
#[arbor_derive::arbor_error]
pub enum RegistryError {
    /// A service of this type was already registered; the registry never overwrites.
    #[error("Service already registered{}: {message}", format_context(.context))]
    Duplicate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Nothing is registered for the requested type.
    #[error("Service not registered{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A registered entry held a value of a different type than its key.
    #[error("Service type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A lazy factory failed; the context names the service being created.
    #[error("Service factory failed{}: {source}", format_context(.context))]
    Factory {
        source: Box<dyn std::error::Error + Send + Sync>,
        context: Option<Cow<'static, str>>,
    },
}
