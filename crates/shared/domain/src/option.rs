use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A boolean start option that remembers whether the user set it.
///
/// Unset options carry the compiled-in default. Deserializing a value always
/// produces an explicit option, so a key present in a settings file or the
/// environment counts as user intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BuildOption {
    value: bool,
    explicit: bool,
}

impl BuildOption {
    /// An option left at `default`.
    #[must_use]
    pub const fn unset(default: bool) -> Self {
        Self { value: default, explicit: false }
    }

    /// An option the user set to `value`.
    #[must_use]
    pub const fn explicit(value: bool) -> Self {
        Self { value, explicit: true }
    }

    #[must_use]
    pub const fn get(self) -> bool {
        self.value
    }

    #[must_use]
    pub const fn is_explicit(self) -> bool {
        self.explicit
    }

    #[must_use]
    pub const fn is_unset(&self) -> bool {
        !self.explicit
    }
}

impl From<bool> for BuildOption {
    fn from(value: bool) -> Self {
        Self::explicit(value)
    }
}

impl Serialize for BuildOption {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(self.value)
    }
}

impl<'de> Deserialize<'de> for BuildOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(Self::explicit)
    }
}
