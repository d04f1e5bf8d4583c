//! Node removal with adjacency repair, zone copy and floor overwrite.
//!
//! Removals run in two phases: excise the target node, then repair every
//! surviving surface whose adjacency fields name an excised id. Generated
//! mirrors of an excised surface are deleted with it; everything else only
//! has the reference cleared.

use crate::model::{all_surfaces, all_zones, Floor, Surface, Zone};
use crate::tree::{clear_if, rewrite_surfaces, with_zones, SurfaceEdit};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name suffix given to copied zones.
const COPY_SUFFIX: &str = "복사";

/// Ids excised from the tree in phase one.
#[derive(Debug, Default)]
struct Removed {
    zones: HashSet<String>,
    surfaces: HashSet<String>,
}

impl Removed {
    fn from_zones<'a>(zones: impl IntoIterator<Item = &'a Zone>) -> Self {
        let mut removed = Self::default();
        for zone in zones {
            removed.zones.insert(zone.id.clone());
            removed
                .surfaces
                .extend(zone.surfaces.iter().map(|s| s.id.clone()));
        }
        removed
    }
}

/// Phase two: delete generated mirrors of removed surfaces and clear every
/// reference to a removed id.
///
/// Ids that still exist elsewhere in `tree` (duplicated by an overwrite) are
/// not treated as removed. Mirrors of the deleted mirrors are not deleted;
/// their `adjacent_from` is cleared instead.
fn repair(tree: &[Floor], mut removed: Removed) -> Vec<Floor> {
    let live_surfaces: HashSet<&str> = all_surfaces(tree).map(|s| s.id.as_str()).collect();
    let live_zones: HashSet<&str> = all_zones(tree).map(|z| z.id.as_str()).collect();
    removed.surfaces.retain(|id| !live_surfaces.contains(id.as_str()));
    removed.zones.retain(|id| !live_zones.contains(id.as_str()));

    let mirrors: HashSet<String> = all_surfaces(tree)
        .filter(|s| is_mirror_of(s, &removed.surfaces))
        .map(|s| s.id.clone())
        .collect();

    let gone = |id: &str| removed.surfaces.contains(id) || mirrors.contains(id);
    let repaired = rewrite_surfaces(tree, |surface| {
        if mirrors.contains(&surface.id) {
            return SurfaceEdit::Remove;
        }
        SurfaceEdit::modify(surface, |s| {
            clear_if(&mut s.adjacent_from, gone);
            clear_if(&mut s.adjacent_surface_id, gone);
            clear_if(&mut s.adjacent_zone_id, |id| removed.zones.contains(id));
        })
    });

    debug!(
        zones = removed.zones.len(),
        surfaces = removed.surfaces.len(),
        mirrors = mirrors.len(),
        "repaired adjacency after removal"
    );
    repaired
}

fn is_mirror_of(surface: &Surface, removed: &HashSet<String>) -> bool {
    surface.is_generated
        && surface
            .adjacent_from
            .as_deref()
            .is_some_and(|from| removed.contains(from))
}

/// Removes a floor with all its zones and surfaces.
#[must_use]
pub fn remove_floor(tree: &[Floor], floor_id: &str) -> Vec<Floor> {
    let Some(floor) = tree.iter().find(|f| f.floor_id == floor_id) else {
        warn!(floor_id, "floor not found, nothing removed");
        return tree.to_vec();
    };

    let removed = Removed::from_zones(floor.zones.iter().map(AsRef::as_ref));
    let remaining: Vec<Floor> = tree
        .iter()
        .filter(|f| f.floor_id != floor_id)
        .cloned()
        .collect();

    debug!(floor_id, "removed floor");
    repair(&remaining, removed)
}

/// Removes a zone with all its surfaces.
#[must_use]
pub fn remove_zone(tree: &[Floor], zone_id: &str) -> Vec<Floor> {
    let targets: Vec<&Zone> = all_zones(tree).filter(|z| z.id == zone_id).collect();
    if targets.is_empty() {
        warn!(zone_id, "zone not found, nothing removed");
        return tree.to_vec();
    }

    let removed = Removed::from_zones(targets);
    let remaining: Vec<Floor> = tree
        .iter()
        .map(|floor| {
            let zones = floor
                .zones
                .iter()
                .filter(|z| z.id != zone_id)
                .cloned()
                .collect();
            with_zones(floor, zones)
        })
        .collect();

    debug!(zone_id, "removed zone");
    repair(&remaining, removed)
}

/// Removes one surface from a zone.
#[must_use]
pub fn remove_surface(tree: &[Floor], zone_id: &str, surface_id: &str) -> Vec<Floor> {
    let exists = all_zones(tree).any(|z| z.id == zone_id && z.surface(surface_id).is_some());
    if !exists {
        warn!(zone_id, surface_id, "surface not found, nothing removed");
        return tree.to_vec();
    }

    let remaining: Vec<Floor> = tree
        .iter()
        .map(|floor| {
            let zones = floor
                .zones
                .iter()
                .map(|zone| {
                    if zone.id != zone_id {
                        return Arc::clone(zone);
                    }
                    let surfaces = zone
                        .surfaces
                        .iter()
                        .filter(|s| s.id != surface_id)
                        .cloned()
                        .collect();
                    Arc::new(Zone {
                        surfaces,
                        ..Zone::clone(zone)
                    })
                })
                .collect();
            with_zones(floor, zones)
        })
        .collect();

    let mut removed = Removed::default();
    removed.surfaces.insert(surface_id.to_string());

    debug!(zone_id, surface_id, "removed surface");
    repair(&remaining, removed)
}

/// Breaks the adjacency of a surface without deleting any real surface.
///
/// Generated mirrors of `surface_id` are deleted. The surface loses its
/// `adjacent_surface_id` and `adjacent_zone_id`. Its partner (the surface it
/// points at, or any surface pointing back at it) loses `adjacent_zone_id`
/// and `adjacent_from`, plus any `adjacent_surface_id` naming `surface_id`.
#[must_use]
pub fn remove_adjacent_link(tree: &[Floor], surface_id: &str) -> Vec<Floor> {
    let Some(main) = all_surfaces(tree).find(|s| s.id == surface_id) else {
        warn!(surface_id, "surface not found, no link removed");
        return tree.to_vec();
    };

    let partner_id = main.adjacent_surface_id.clone();
    let mirrors: HashSet<String> = all_surfaces(tree)
        .filter(|s| s.is_generated_from(surface_id))
        .map(|s| s.id.clone())
        .collect();

    let points_back = |id: &str| id == surface_id || mirrors.contains(id);
    let unlinked = rewrite_surfaces(tree, |surface| {
        if mirrors.contains(&surface.id) {
            return SurfaceEdit::Remove;
        }
        let is_main = surface.id == surface_id;
        let is_partner = !is_main
            && (partner_id.as_deref() == Some(surface.id.as_str())
                || surface.adjacent_surface_id.as_deref() == Some(surface_id));

        SurfaceEdit::modify(surface, |s| {
            if is_main {
                s.adjacent_surface_id = None;
                s.adjacent_zone_id = None;
            } else if is_partner {
                s.adjacent_zone_id = None;
                s.adjacent_from = None;
            }
            clear_if(&mut s.adjacent_from, points_back);
            clear_if(&mut s.adjacent_surface_id, points_back);
        })
    });

    debug!(surface_id, mirrors = mirrors.len(), "removed adjacent link");
    unlinked
}

/// Appends a copy of a zone to every target floor.
///
/// The copy's id is `{floor_id}_zone{n}`, with `n` the first free index from
/// the floor's zone count, and its name gets a `-복사(n+1)` suffix. Surface ids
/// are rederived as `{zone_id}_{type}{index}`. Adjacency fields are copied
/// verbatim and still point at the source zone's surfaces.
#[must_use]
pub fn copy_zone(tree: &[Floor], zone_id: &str, target_floor_ids: &[&str]) -> Vec<Floor> {
    let Some(source) = all_zones(tree).find(|z| z.id == zone_id) else {
        warn!(zone_id, "zone not found, nothing copied");
        return tree.to_vec();
    };

    tree.iter()
        .map(|floor| {
            if !target_floor_ids.contains(&floor.floor_id.as_str()) {
                return floor.clone();
            }
            let mut zones = floor.zones.clone();
            zones.push(Arc::new(clone_zone_into(source, floor)));
            with_zones(floor, zones)
        })
        .collect()
}

fn clone_zone_into(source: &Zone, floor: &Floor) -> Zone {
    let mut n = floor.zones.len();
    let mut id = format!("{}_zone{n}", floor.floor_id);
    while floor.zone(&id).is_some() {
        n += 1;
        id = format!("{}_zone{n}", floor.floor_id);
    }

    let surfaces = source
        .surfaces
        .iter()
        .enumerate()
        .map(|(index, surface)| {
            Arc::new(Surface {
                id: format!("{id}_{}{index}", surface.surface_type),
                ..Surface::clone(surface)
            })
        })
        .collect();

    debug!(source = %source.id, copy = %id, floor_id = %floor.floor_id, "copied zone");
    Zone {
        name: format!("{}-{COPY_SUFFIX}({})", source.name, n + 1),
        id,
        surfaces,
        ..source.clone()
    }
}

/// Replaces the zones of every target floor with the source floor's zones.
///
/// The zone `Arc`s are shared, not deep-copied. Later edits go through
/// copy-on-write rewrites, so editing one floor never changes the other,
/// but the zone and surface ids now occur more than once in the tree.
#[must_use]
pub fn overwrite_floor(tree: &[Floor], source_floor_id: &str, target_floor_ids: &[&str]) -> Vec<Floor> {
    let Some(source) = tree.iter().find(|f| f.floor_id == source_floor_id) else {
        warn!(source_floor_id, "floor not found, nothing overwritten");
        return tree.to_vec();
    };

    tree.iter()
        .map(|floor| {
            if floor.floor_id != source_floor_id
                && target_floor_ids.contains(&floor.floor_id.as_str())
            {
                debug!(source_floor_id, target = %floor.floor_id, "overwrote floor");
                with_zones(floor, source.zones.clone())
            } else {
                floor.clone()
            }
        })
        .collect()
}

/// Which adjacency field holds a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacencyField {
    AdjacentFrom,
    AdjacentSurface,
    AdjacentZone,
}

impl fmt::Display for AdjacencyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AdjacentFrom => "adjacent_from",
            Self::AdjacentSurface => "adjacent_surface_id",
            Self::AdjacentZone => "adjacent_zone_id",
        })
    }
}

/// A weak reference whose target is missing from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub surface_id: String,
    pub field: AdjacencyField,
    pub target: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.surface_id, self.field, self.target)
    }
}

/// Lists every adjacency reference to a surface or zone that does not exist.
#[must_use]
pub fn dangling_references(tree: &[Floor]) -> Vec<DanglingReference> {
    let surfaces: HashSet<&str> = all_surfaces(tree).map(|s| s.id.as_str()).collect();
    let zones: HashSet<&str> = all_zones(tree).map(|z| z.id.as_str()).collect();

    let mut dangling = Vec::new();
    for surface in all_surfaces(tree) {
        let checks = [
            (AdjacencyField::AdjacentFrom, &surface.adjacent_from, &surfaces),
            (AdjacencyField::AdjacentSurface, &surface.adjacent_surface_id, &surfaces),
            (AdjacencyField::AdjacentZone, &surface.adjacent_zone_id, &zones),
        ];
        for (field, value, known) in checks {
            if let Some(target) = value.as_deref().filter(|t| !known.contains(t)) {
                dangling.push(DanglingReference {
                    surface_id: surface.id.clone(),
                    field,
                    target: target.to_string(),
                });
            }
        }
    }
    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::find_surface;
    use crate::model::SurfaceType;
    use pretty_assertions::assert_eq;

    /// z1 ceiling s1 links up to z2 floor s3, which is the generated mirror of
    /// s1. s5 on the roof is a mirror of mirror s3.
    fn building() -> Vec<Floor> {
        vec![
            Floor::new("f3", 3, "Roof").with_zones([Zone::new("z3", "Attic").with_surfaces([
                Surface::new("s5", "Attic floor", SurfaceType::Floor).generated_from("s3"),
            ])]),
            Floor::new("f2", 2, "2F").with_zones([Zone::new("z2", "Upper").with_surfaces([
                Surface::new("s3", "Upper floor", SurfaceType::Floor)
                    .adjacent_to("z1", "s1")
                    .generated_from("s1"),
                Surface::new("s4", "Upper wall", SurfaceType::Wall),
            ])]),
            Floor::new("f1", 1, "1F").with_zones([Zone::new("z1", "Lower").with_surfaces([
                Surface::new("s1", "Lower ceiling", SurfaceType::Ceiling).adjacent_to("z2", "s3"),
                Surface::new("s2", "Lower wall", SurfaceType::Wall),
            ])]),
        ]
    }

    fn ids(tree: &[Floor]) -> Vec<&str> {
        all_surfaces(tree).map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn remove_surface_deletes_its_mirror() {
        let result = remove_surface(&building(), "z1", "s1");

        assert_eq!(ids(&result), vec!["s5", "s4", "s2"]);
        assert_eq!(find_surface(&result, "s5", None).unwrap().adjacent_from, None);
        assert!(dangling_references(&result).is_empty());
    }

    #[test]
    fn remove_surface_in_wrong_zone_is_noop() {
        let tree = building();

        assert_eq!(remove_surface(&tree, "z2", "s1"), tree);
    }

    #[test]
    fn remove_floor_repairs_references() {
        let result = remove_floor(&building(), "f2");

        // s5 mirrors the removed s3 and goes with it.
        assert_eq!(ids(&result), vec!["s1", "s2"]);
        let s1 = find_surface(&result, "s1", None).unwrap();
        assert_eq!(s1.adjacent_surface_id, None);
        assert_eq!(s1.adjacent_zone_id, None);
        assert!(dangling_references(&result).is_empty());
    }

    #[test]
    fn remove_floor_deletes_mirrors_on_other_floors() {
        let result = remove_floor(&building(), "f1");

        assert_eq!(ids(&result), vec!["s5", "s4"]);
        assert_eq!(find_surface(&result, "s5", None).unwrap().adjacent_from, None);
    }

    #[test]
    fn remove_zone_clears_zone_references() {
        let result = remove_zone(&building(), "z2");

        assert_eq!(result.len(), 3);
        assert!(result[1].zones.is_empty());
        let s1 = find_surface(&result, "s1", None).unwrap();
        assert_eq!(s1.adjacent_zone_id, None);
        assert!(dangling_references(&result).is_empty());
    }

    #[test]
    fn unknown_ids_are_noops() {
        let tree = building();

        assert_eq!(remove_floor(&tree, "nope"), tree);
        assert_eq!(remove_zone(&tree, "nope"), tree);
        assert_eq!(remove_adjacent_link(&tree, "nope"), tree);
        assert_eq!(copy_zone(&tree, "nope", &["f1"]), tree);
        assert_eq!(overwrite_floor(&tree, "nope", &["f1"]), tree);
    }

    #[test]
    fn remove_adjacent_link_keeps_real_surfaces() {
        let mut tree = building();
        tree.push(Floor::new("f0", 0, "GF").with_zones([Zone::new("z0", "Ground")
            .with_surfaces([Surface::new("s6", "Ground ceiling", SurfaceType::Ceiling)
                .adjacent_to("z1", "s2")])]));

        let result = remove_adjacent_link(&tree, "s1");

        assert!(find_surface(&result, "s3", None).is_none());
        let s1 = find_surface(&result, "s1", None).unwrap();
        assert_eq!(s1.adjacent_surface_id, None);
        assert_eq!(s1.adjacent_zone_id, None);
        assert_eq!(
            find_surface(&result, "s6", None).unwrap().adjacent_surface_id.as_deref(),
            Some("s2")
        );
        assert!(dangling_references(&result).is_empty());
    }

    #[test]
    fn remove_adjacent_link_clears_reverse_partner() {
        let tree = vec![Floor::new("f1", 1, "1F").with_zones([
            Zone::new("za", "A").with_surfaces([Surface::new("a", "A wall", SurfaceType::Wall)]),
            Zone::new("zb", "B").with_surfaces([
                Surface::new("b", "B wall", SurfaceType::Wall).adjacent_to("za", "a"),
            ]),
        ])];

        let result = remove_adjacent_link(&tree, "a");
        let b = find_surface(&result, "b", None).unwrap();

        assert_eq!(b.adjacent_zone_id, None);
        assert_eq!(b.adjacent_surface_id, None);
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn remove_adjacent_link_clears_partner_origin() {
        let tree = vec![Floor::new("f1", 1, "1F").with_zones([
            Zone::new("za", "A").with_surfaces([
                Surface::new("a", "A wall", SurfaceType::Wall).adjacent_to("zb", "b"),
                Surface::new("c", "A floor", SurfaceType::Floor),
            ]),
            Zone::new("zb", "B").with_surfaces([
                Surface::new("b", "B wall", SurfaceType::Wall).generated_from("c"),
            ]),
        ])];

        let result = remove_adjacent_link(&tree, "a");
        let b = find_surface(&result, "b", None).unwrap();

        assert_eq!(b.adjacent_from, None);
        assert!(b.is_generated);
        assert_eq!(ids(&result), vec!["a", "c", "b"]);
        let c = find_surface(&result, "c", None).unwrap();
        assert!(Arc::ptr_eq(&result[0].zones[0].surfaces[1], &tree[0].zones[0].surfaces[1]));
        assert_eq!(c.adjacent_from, None);
    }

    #[test]
    fn copy_zone_derives_ids_without_remapping_adjacency() {
        let result = copy_zone(&building(), "z1", &["f2", "f3"]);

        let copy = result[1].zones.last().unwrap();
        assert_eq!(copy.id, "f2_zone1");
        assert_eq!(copy.name, "Lower-복사(2)");
        let surface_ids: Vec<&str> = copy.surfaces.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(surface_ids, vec!["f2_zone1_ceiling0", "f2_zone1_wall1"]);
        // Copied adjacency still names the source zone's partner.
        assert_eq!(copy.surfaces[0].adjacent_surface_id.as_deref(), Some("s3"));
        assert_eq!(result[0].zones.last().unwrap().id, "f3_zone1");
        assert_eq!(result[2].zones.len(), 1);
    }

    #[test]
    fn copy_zone_skips_taken_ids() {
        let tree = vec![Floor::new("f1", 1, "1F").with_zones([
            Zone::new("f1_zone2", "Taken"),
            Zone::new("src", "Source"),
        ])];

        let result = copy_zone(&tree, "src", &["f1"]);

        assert_eq!(result[0].zones[2].id, "f1_zone3");
        assert_eq!(result[0].zones[2].name, "Source-복사(4)");
    }

    #[test]
    fn overwrite_floor_shares_zones() {
        let tree = building();
        let result = overwrite_floor(&tree, "f1", &["f2", "f1"]);

        assert!(Arc::ptr_eq(&result[1].zones[0], &tree[2].zones[0]));
        assert_eq!(result[1].floor_id, "f2");
        assert_eq!(result[2], tree[2]);
    }

    #[test]
    fn dangling_references_reports_each_field() {
        let tree = vec![Floor::new("f1", 1, "1F").with_zones([Zone::new("z1", "A")
            .with_surfaces([Surface::new("s1", "w", SurfaceType::Wall)
                .adjacent_to("zx", "sx")
                .generated_from("sy")])])];

        let dangling = dangling_references(&tree);

        assert_eq!(dangling.len(), 3);
        assert_eq!(dangling[0].to_string(), "s1.adjacent_from -> sy");
        assert_eq!(dangling[2].field, AdjacencyField::AdjacentZone);
    }
}
