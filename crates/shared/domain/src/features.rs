use bitflags::bitflags;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

pub const ISOLATED_PROJECTS: &str = "Isolated projects";
pub const CONFIGURATION_CACHE: &str = "Configuration cache";
pub const CONFIGURE_ON_DEMAND: &str = "Configuration on demand";

bitflags! {
    /// Incubating features a build tree has announced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct IncubatingFeatures: u8 {
        const ISOLATED_PROJECTS = 1 << 0;
        const CONFIGURATION_CACHE = 1 << 1;
        const CONFIGURE_ON_DEMAND = 1 << 2;
    }
}

impl Default for IncubatingFeatures {
    fn default() -> Self {
        Self::empty()
    }
}

impl IncubatingFeatures {
    /// User-facing name of a single feature; `None` for empty or combined sets.
    #[must_use]
    pub fn display_name(self) -> Option<&'static str> {
        if self == Self::ISOLATED_PROJECTS {
            Some(ISOLATED_PROJECTS)
        } else if self == Self::CONFIGURATION_CACHE {
            Some(CONFIGURATION_CACHE)
        } else if self == Self::CONFIGURE_ON_DEMAND {
            Some(CONFIGURE_ON_DEMAND)
        } else {
            None
        }
    }

    /// Names of all contained features, in flag order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(Self::display_name)
    }
}

impl From<&str> for IncubatingFeatures {
    fn from(name: &str) -> Self {
        match name {
            ISOLATED_PROJECTS => Self::ISOLATED_PROJECTS,
            CONFIGURATION_CACHE => Self::CONFIGURATION_CACHE,
            CONFIGURE_ON_DEMAND => Self::CONFIGURE_ON_DEMAND,
            _ => Self::empty(),
        }
    }
}

impl Serialize for IncubatingFeatures {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.iter().count()))?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}
