//! Adjacency linking: surface lookup and linked-pair updates.

use crate::model::{all_surfaces, Floor, Surface, SurfaceType, TemplateRef};
use crate::tree::{rewrite_surfaces, SurfaceEdit};
use tracing::debug;

/// Field updates for a surface. `None` leaves the field as is.
///
/// `adjacent_zone_id: Some("")` is the explicit unlink signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfacePatch {
    pub name: Option<String>,
    pub surface_type: Option<SurfaceType>,
    pub area: Option<f64>,
    pub azimuth: Option<f64>,
    pub boundary_condition: Option<String>,
    pub construction_id: Option<String>,
    /// Percentage in `0..=100`; stored as a ratio.
    pub coolroof_reflectance: Option<f64>,
    pub fenestrations: Option<Vec<TemplateRef>>,
    pub adjacent_zone_id: Option<String>,
    pub adjacent_surface_id: Option<String>,
    pub adjacent_from: Option<String>,
}

impl SurfacePatch {
    #[must_use]
    pub fn is_unlink(&self) -> bool {
        self.adjacent_zone_id.as_deref() == Some("")
    }

    /// Merges every field over `surface`.
    fn apply(&self, surface: &mut Surface) {
        self.apply_shared(surface);
        if let Some(name) = &self.name {
            surface.name.clone_from(name);
        }
        if let Some(zone_id) = &self.adjacent_zone_id {
            surface.adjacent_zone_id = non_empty(zone_id);
        }
    }

    /// Merges the fields a linked partner shares; `name` and
    /// `adjacent_zone_id` stay per-surface.
    fn apply_shared(&self, surface: &mut Surface) {
        if let Some(surface_type) = self.surface_type {
            surface.surface_type = surface_type;
        }
        if let Some(area) = self.area {
            surface.area = area;
        }
        if let Some(azimuth) = self.azimuth {
            surface.azimuth = Some(azimuth);
        }
        if let Some(condition) = &self.boundary_condition {
            surface.boundary_condition.clone_from(condition);
        }
        if let Some(construction_id) = &self.construction_id {
            surface.construction_id.clone_from(construction_id);
        }
        if let Some(percent) = self.coolroof_reflectance {
            surface.coolroof_reflectance = Some(percent / 100.0);
        }
        if let Some(fenestrations) = &self.fenestrations {
            surface.fenestrations.clone_from(fenestrations);
        }
        if let Some(surface_id) = &self.adjacent_surface_id {
            surface.adjacent_surface_id = non_empty(surface_id);
        }
        if let Some(from) = &self.adjacent_from {
            surface.adjacent_from = non_empty(from);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Finds a surface by id.
///
/// With `zone_id`, only zones with that id are searched (first match across
/// floors, no fallback). Without it the whole tree is searched floor-major.
#[must_use]
pub fn find_surface<'a>(
    tree: &'a [Floor],
    surface_id: &str,
    zone_id: Option<&str>,
) -> Option<&'a Surface> {
    match zone_id {
        Some(zone_id) => tree
            .iter()
            .flat_map(|f| f.zones.iter())
            .filter(|z| z.id == zone_id)
            .find_map(|z| z.surface(surface_id)),
        None => all_surfaces(tree).find(|s| s.id == surface_id),
    }
}

/// Applies `patch` to a surface and, when `adjacent_surface_id` is given, to
/// its linked partner.
///
/// The partner is the surface with id `adjacent_surface_id` or any surface
/// whose `adjacent_surface_id` points at `surface_id`. It receives every
/// field except `name` and `adjacent_zone_id`. An unlink patch additionally
/// clears `adjacent_from` tree-wide wherever it names `surface_id`.
#[must_use]
pub fn update_surface(
    tree: &[Floor],
    surface_id: &str,
    patch: &SurfacePatch,
    adjacent_surface_id: Option<&str>,
) -> Vec<Floor> {
    let unlink = patch.is_unlink();
    let mut touched = 0usize;

    let updated = rewrite_surfaces(tree, |surface| {
        let is_main = surface.id == surface_id;
        let is_partner = !is_main
            && adjacent_surface_id.is_some_and(|adjacent| {
                surface.id == adjacent
                    || surface.adjacent_surface_id.as_deref() == Some(surface_id)
            });
        let dangles = unlink && surface.adjacent_from.as_deref() == Some(surface_id);

        if !(is_main || is_partner || dangles) {
            return SurfaceEdit::Keep;
        }
        touched += 1;

        SurfaceEdit::modify(surface, |s| {
            if is_main {
                patch.apply(s);
            } else if is_partner {
                patch.apply_shared(s);
            }
            if unlink && s.adjacent_from.as_deref() == Some(surface_id) {
                s.adjacent_from = None;
            }
        })
    });

    debug!(surface_id, ?adjacent_surface_id, unlink, touched, "updated surface");
    updated
}

/// Whether the surface sits on the floor with the highest `floor_number`.
#[must_use]
pub fn is_max_floor_by_surface_id(tree: &[Floor], surface_id: &str) -> bool {
    tree.iter()
        .map(|f| f.floor_number)
        .max()
        .is_some_and(|top| on_floor_numbered(tree, surface_id, top))
}

/// Whether the surface sits on the floor with the lowest `floor_number`.
#[must_use]
pub fn is_min_floor_by_surface_id(tree: &[Floor], surface_id: &str) -> bool {
    tree.iter()
        .map(|f| f.floor_number)
        .min()
        .is_some_and(|bottom| on_floor_numbered(tree, surface_id, bottom))
}

fn on_floor_numbered(tree: &[Floor], surface_id: &str, floor_number: i32) -> bool {
    tree.iter()
        .filter(|f| f.floor_number == floor_number)
        .any(|f| f.surfaces().any(|s| s.id == surface_id))
}
