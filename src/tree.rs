//! Copy-on-write traversal of the floor tree.
//!
//! Every rewrite returns a new `Vec<Floor>`. A zone is rebuilt only when at
//! least one of its surfaces changed; otherwise its `Arc` is shared with the
//! input tree. Surfaces that did not change are shared the same way.

use crate::model::{Floor, Surface, Zone};
use std::sync::Arc;

/// What to do with one surface during a rewrite.
#[derive(Debug)]
pub(crate) enum SurfaceEdit {
    Keep,
    Replace(Surface),
    Remove,
}

impl SurfaceEdit {
    /// Applies `f` to a copy of `surface`, yielding `Keep` if nothing changed.
    pub(crate) fn modify(surface: &Surface, f: impl FnOnce(&mut Surface)) -> Self {
        let mut copy = surface.clone();
        f(&mut copy);
        if copy == *surface {
            Self::Keep
        } else {
            Self::Replace(copy)
        }
    }
}

pub(crate) fn rewrite_surfaces<F>(tree: &[Floor], mut edit: F) -> Vec<Floor>
where
    F: FnMut(&Surface) -> SurfaceEdit,
{
    tree.iter()
        .map(|floor| {
            let zones = floor
                .zones
                .iter()
                .map(|zone| rewrite_zone(zone, &mut edit))
                .collect();
            with_zones(floor, zones)
        })
        .collect()
}

fn rewrite_zone<F>(zone: &Arc<Zone>, edit: &mut F) -> Arc<Zone>
where
    F: FnMut(&Surface) -> SurfaceEdit,
{
    let mut changed = false;
    let mut surfaces = Vec::with_capacity(zone.surfaces.len());

    for surface in &zone.surfaces {
        match edit(surface) {
            SurfaceEdit::Keep => surfaces.push(Arc::clone(surface)),
            SurfaceEdit::Replace(updated) => {
                changed = true;
                surfaces.push(Arc::new(updated));
            }
            SurfaceEdit::Remove => changed = true,
        }
    }

    if changed {
        Arc::new(Zone {
            surfaces,
            ..Zone::clone(zone)
        })
    } else {
        Arc::clone(zone)
    }
}

/// A new floor record with the given zone list and the same header.
pub(crate) fn with_zones(floor: &Floor, zones: Vec<Arc<Zone>>) -> Floor {
    Floor {
        floor_id: floor.floor_id.clone(),
        floor_number: floor.floor_number,
        floor_name: floor.floor_name.clone(),
        zones,
        is_copied: floor.is_copied,
    }
}

/// Clears `field` when it names one of the removed ids.
pub(crate) fn clear_if(field: &mut Option<String>, removed: impl Fn(&str) -> bool) {
    if field.as_deref().is_some_and(removed) {
        *field = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SurfaceType;

    fn tree() -> Vec<Floor> {
        vec![Floor::new("f1", 1, "1F").with_zones([
            Zone::new("z1", "A").with_surfaces([Surface::new("s1", "w", SurfaceType::Wall)]),
            Zone::new("z2", "B").with_surfaces([Surface::new("s2", "w", SurfaceType::Wall)]),
        ])]
    }

    #[test]
    fn untouched_zones_are_shared() {
        let before = tree();
        let after = rewrite_surfaces(&before, |s| {
            if s.id == "s1" {
                SurfaceEdit::modify(s, |s| s.area = 3.0)
            } else {
                SurfaceEdit::Keep
            }
        });

        assert!(!Arc::ptr_eq(&before[0].zones[0], &after[0].zones[0]));
        assert!(Arc::ptr_eq(&before[0].zones[1], &after[0].zones[1]));
        assert!((before[0].zones[0].surfaces[0].area - 0.0).abs() < f64::EPSILON);
        assert!((after[0].zones[0].surfaces[0].area - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn modify_without_change_keeps() {
        let surface = Surface::new("s1", "w", SurfaceType::Wall);
        let edit = SurfaceEdit::modify(&surface, |s| s.name = "w".to_string());

        assert!(matches!(edit, SurfaceEdit::Keep));
    }
}
