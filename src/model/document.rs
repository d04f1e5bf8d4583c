use super::{Catalog, Floor, TemplateRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two parallel geometry snapshots of a retrofit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Before,
    After,
}

impl Version {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry and photovoltaic selection of one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionData {
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub photovoltaics: Vec<TemplateRef>,
}

impl VersionData {
    #[must_use]
    pub fn new(floors: Vec<Floor>) -> Self {
        Self {
            floors,
            photovoltaics: Vec::new(),
        }
    }

    #[must_use]
    pub fn total_zones(&self) -> usize {
        self.floors.iter().map(|f| f.zones.len()).sum()
    }

    #[must_use]
    pub fn total_surfaces(&self) -> usize {
        self.floors.iter().map(|f| f.surfaces().count()).sum()
    }
}

/// The whole saved application state.
///
/// A version that has never been initialized is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub before: Option<VersionData>,
    #[serde(default)]
    pub after: Option<VersionData>,
    #[serde(default)]
    pub catalog: Catalog,
}

impl Document {
    #[must_use]
    pub fn version(&self, version: Version) -> Option<&VersionData> {
        match version {
            Version::Before => self.before.as_ref(),
            Version::After => self.after.as_ref(),
        }
    }

    pub fn version_mut(&mut self, version: Version) -> &mut Option<VersionData> {
        match version {
            Version::Before => &mut self.before,
            Version::After => &mut self.after,
        }
    }
}
