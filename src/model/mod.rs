pub mod catalog;
pub mod document;
pub mod floor;

pub use catalog::{
    Catalog, FenestrationTemplate, LightingTemplate, PhotovoltaicTemplate, TemplateRef,
};
pub use document::{Document, Version, VersionData};
pub use floor::{all_surfaces, all_zones, Floor, Surface, SurfaceType, Zone};

use serde::{Deserialize, Deserializer};

/// Weak references arrive as `""` when cleared; treat that as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
