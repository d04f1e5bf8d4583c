use super::{empty_as_none, TemplateRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of a zone boundary surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceType {
    Wall,
    Floor,
    Ceiling,
}

impl SurfaceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
        }
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storey. Owns its zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub floor_id: String,
    /// Signed storey number, negative below grade.
    pub floor_number: i32,
    pub floor_name: String,
    #[serde(default)]
    pub zones: Vec<Arc<Zone>>,
    #[serde(rename = "isCopied", default, skip_serializing_if = "Option::is_none")]
    pub is_copied: Option<bool>,
}

/// A thermal zone. Owns its surfaces; system ids are weak references into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub infiltration: f64,
    #[serde(default)]
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_density: Option<f64>,
    #[serde(rename = "lightning", default)]
    pub lighting: Vec<TemplateRef>,
    #[serde(default)]
    pub surfaces: Vec<Arc<Surface>>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub ventilation_system_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub supply_system_heating_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub supply_system_cooling_id: Option<String>,
    #[serde(rename = "isCopied", default, skip_serializing_if = "Option::is_none")]
    pub is_copied: Option<bool>,
}

/// A boundary surface of a zone.
///
/// The three `adjacent_*` fields are weak back-references by id. They never
/// own their target and are revalidated by every structural change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub surface_type: SurfaceType,
    #[serde(default)]
    pub area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(default)]
    pub boundary_condition: String,
    #[serde(default)]
    pub construction_id: String,
    /// Stored as a 0-1 ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coolroof_reflectance: Option<f64>,
    #[serde(default)]
    pub fenestrations: Vec<TemplateRef>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjacent_zone_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjacent_surface_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjacent_from: Option<String>,
    #[serde(rename = "isGenerated", default, skip_serializing_if = "is_false")]
    pub is_generated: bool,
    #[serde(rename = "isCopied", default, skip_serializing_if = "Option::is_none")]
    pub is_copied: Option<bool>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl Floor {
    #[must_use]
    pub fn new(floor_id: impl Into<String>, floor_number: i32, floor_name: impl Into<String>) -> Self {
        Self {
            floor_id: floor_id.into(),
            floor_number,
            floor_name: floor_name.into(),
            zones: Vec::new(),
            is_copied: None,
        }
    }

    #[must_use]
    pub fn with_zones(mut self, zones: impl IntoIterator<Item = Zone>) -> Self {
        self.zones.extend(zones.into_iter().map(Arc::new));
        self
    }

    #[must_use]
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().map(AsRef::as_ref).find(|z| z.id == zone_id)
    }

    /// Iterates every surface of every zone on this floor.
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.zones
            .iter()
            .flat_map(|z| z.surfaces.iter().map(AsRef::as_ref))
    }
}

impl Zone {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            height: 0.0,
            infiltration: 0.0,
            profile: String::new(),
            light_density: None,
            lighting: Vec::new(),
            surfaces: Vec::new(),
            ventilation_system_id: None,
            supply_system_heating_id: None,
            supply_system_cooling_id: None,
            is_copied: None,
        }
    }

    #[must_use]
    pub fn with_surfaces(mut self, surfaces: impl IntoIterator<Item = Surface>) -> Self {
        self.surfaces.extend(surfaces.into_iter().map(Arc::new));
        self
    }

    #[must_use]
    pub fn surface(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces
            .iter()
            .map(AsRef::as_ref)
            .find(|s| s.id == surface_id)
    }
}

impl Surface {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, surface_type: SurfaceType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            surface_type,
            area: 0.0,
            azimuth: None,
            boundary_condition: "outdoors".to_string(),
            construction_id: String::new(),
            coolroof_reflectance: None,
            fenestrations: Vec::new(),
            adjacent_zone_id: None,
            adjacent_surface_id: None,
            adjacent_from: None,
            is_generated: false,
            is_copied: None,
        }
    }

    /// Marks this surface as the generated mirror of `origin_id`.
    #[must_use]
    pub fn generated_from(mut self, origin_id: impl Into<String>) -> Self {
        self.adjacent_from = Some(origin_id.into());
        self.is_generated = true;
        self
    }

    #[must_use]
    pub fn adjacent_to(mut self, zone_id: impl Into<String>, surface_id: impl Into<String>) -> Self {
        self.adjacent_zone_id = Some(zone_id.into());
        self.adjacent_surface_id = Some(surface_id.into());
        self
    }

    #[must_use]
    pub fn is_generated_from(&self, surface_id: &str) -> bool {
        self.is_generated && self.adjacent_from.as_deref() == Some(surface_id)
    }
}

/// Iterates every surface in a tree, floor-major.
pub fn all_surfaces(tree: &[Floor]) -> impl Iterator<Item = &Surface> {
    tree.iter().flat_map(Floor::surfaces)
}

/// Iterates every zone in a tree, floor-major.
pub fn all_zones(tree: &[Floor]) -> impl Iterator<Item = &Zone> {
    tree.iter()
        .flat_map(|f| f.zones.iter().map(AsRef::as_ref))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_adjacency_strings_deserialize_as_none() {
        let json = r#"{
            "id": "s1", "name": "North", "type": "wall", "area": 12.5,
            "boundary_condition": "outdoors", "construction_id": "c1",
            "fenestrations": [], "adjacent_zone_id": "", "adjacent_from": "s0",
            "isGenerated": true
        }"#;
        let surface: Surface = serde_json::from_str(json).unwrap();

        assert_eq!(surface.adjacent_zone_id, None);
        assert_eq!(surface.adjacent_surface_id, None);
        assert_eq!(surface.adjacent_from.as_deref(), Some("s0"));
        assert!(surface.is_generated_from("s0"));
    }

    #[test]
    fn cleared_fields_are_not_serialized() {
        let surface = Surface::new("s1", "North", SurfaceType::Ceiling);
        let json = serde_json::to_value(&surface).unwrap();

        assert_eq!(json["type"], "ceiling");
        assert!(json.get("adjacent_from").is_none());
        assert!(json.get("isGenerated").is_none());
        assert!(json.get("isCopied").is_none());
    }

    #[test]
    fn zone_lighting_uses_wire_name() {
        let json = r#"{"id": "z1", "name": "Office", "lightning": [{"id": "l1", "count": 2}]}"#;
        let zone: Zone = serde_json::from_str(json).unwrap();

        assert_eq!(zone.lighting.len(), 1);
        assert_eq!(zone.lighting[0].count.get(), 2);
    }
}
