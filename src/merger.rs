//! Cross-version remodeling merge and tri-state selection.
//!
//! A [`Selection`] holds ids picked from the origin version: floor, zone and
//! surface ids plus photovoltaic catalog ids. [`merge_remodeling_data`] copies
//! the selected subtrees into the target version; [`compute_tri_state`]
//! reports the checkbox state of any node of the picker tree.

use crate::model::{Floor, Surface, TemplateRef, VersionData, Zone};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Node kinds of the copy picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// The whole geometry of a version.
    Building,
    Floor,
    Zone,
    Surface,
    Photovoltaic,
    /// Every photovoltaic reference of a version.
    PhotovoltaicAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checked => "checked",
            Self::Indeterminate => "indeterminate",
            Self::Unchecked => "unchecked",
        })
    }
}

/// Ids selected for copying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Flips a picker node.
    ///
    /// A fully checked node is deselected together with its descendants;
    /// ancestors stay selected. Otherwise the node, all its descendants and
    /// all its ancestors are selected. Ids unknown to `data` are ignored.
    pub fn toggle(&mut self, item_id: &str, item_type: ItemType, data: &VersionData) {
        let checked = compute_tri_state(item_id, item_type, data, self) == TriState::Checked;

        let (node, ancestors): (Vec<String>, Vec<String>) = match item_type {
            ItemType::Building => (geometry_ids(data).map(str::to_string).collect(), Vec::new()),
            ItemType::PhotovoltaicAll => (
                data.photovoltaics.iter().map(|r| r.id.clone()).collect(),
                Vec::new(),
            ),
            ItemType::Photovoltaic => {
                if !data.photovoltaics.iter().any(|r| r.id == item_id) {
                    return;
                }
                (vec![item_id.to_string()], Vec::new())
            }
            ItemType::Floor => match data.floors.iter().find(|f| f.floor_id == item_id) {
                Some(floor) => (floor_ids(floor).map(str::to_string).collect(), Vec::new()),
                None => return,
            },
            ItemType::Zone => match locate_zone(data, item_id) {
                Some((floor, zone)) => (
                    zone_ids(zone).map(str::to_string).collect(),
                    vec![floor.floor_id.clone()],
                ),
                None => return,
            },
            ItemType::Surface => match locate_surface(data, item_id) {
                Some((floor, zone, _)) => (
                    vec![item_id.to_string()],
                    vec![floor.floor_id.clone(), zone.id.clone()],
                ),
                None => return,
            },
        };

        if checked {
            for id in &node {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(node);
            self.ids.extend(ancestors);
        }
        debug!(item_id, ?item_type, selected = !checked, total = self.len(), "toggled selection");
    }
}

fn floor_ids(floor: &Floor) -> impl Iterator<Item = &str> {
    std::iter::once(floor.floor_id.as_str())
        .chain(floor.zones.iter().flat_map(|z| zone_ids(z)))
}

fn zone_ids(zone: &Zone) -> impl Iterator<Item = &str> {
    std::iter::once(zone.id.as_str()).chain(zone.surfaces.iter().map(|s| s.id.as_str()))
}

fn geometry_ids(data: &VersionData) -> impl Iterator<Item = &str> {
    data.floors.iter().flat_map(floor_ids)
}

fn locate_zone<'a>(data: &'a VersionData, zone_id: &str) -> Option<(&'a Floor, &'a Zone)> {
    data.floors
        .iter()
        .find_map(|f| f.zone(zone_id).map(|z| (f, z)))
}

fn locate_surface<'a>(
    data: &'a VersionData,
    surface_id: &str,
) -> Option<(&'a Floor, &'a Zone, &'a Surface)> {
    data.floors.iter().find_map(|f| {
        f.zones
            .iter()
            .find_map(|z| z.surface(surface_id).map(|s| (f, z.as_ref(), s)))
    })
}

/// Unchecked for an empty selection. Checked when the selection covers every
/// floor, zone and surface id; a building without geometry is never checked.
/// Any other non-empty selection is indeterminate, even one holding only
/// photovoltaic ids.
fn building_state(data: &VersionData, selection: &Selection) -> TriState {
    if selection.is_empty() {
        return TriState::Unchecked;
    }
    let mut ids = geometry_ids(data).peekable();
    if ids.peek().is_some() && ids.all(|id| selection.contains(id)) {
        TriState::Checked
    } else {
        TriState::Indeterminate
    }
}

/// A node selected but not fully propagated downwards is indeterminate.
fn subtree_state<'a>(
    node_id: &str,
    mut descendants: impl Iterator<Item = &'a str>,
    selection: &Selection,
) -> TriState {
    if !selection.contains(node_id) {
        return TriState::Unchecked;
    }
    if descendants.all(|id| selection.contains(id)) {
        TriState::Checked
    } else {
        TriState::Indeterminate
    }
}

fn binary(selected: bool) -> TriState {
    if selected {
        TriState::Checked
    } else {
        TriState::Unchecked
    }
}

/// Checkbox state of a picker node. Ids missing from `data` are unchecked.
#[must_use]
pub fn compute_tri_state(
    item_id: &str,
    item_type: ItemType,
    data: &VersionData,
    selection: &Selection,
) -> TriState {
    match item_type {
        ItemType::Building => building_state(data, selection),
        ItemType::Floor => data
            .floors
            .iter()
            .find(|f| f.floor_id == item_id)
            .map_or(TriState::Unchecked, |floor| {
                subtree_state(item_id, floor_ids(floor).skip(1), selection)
            }),
        ItemType::Zone => locate_zone(data, item_id).map_or(TriState::Unchecked, |(_, zone)| {
            subtree_state(item_id, zone_ids(zone).skip(1), selection)
        }),
        ItemType::Surface => binary(
            locate_surface(data, item_id).is_some() && selection.contains(item_id),
        ),
        ItemType::Photovoltaic => binary(
            data.photovoltaics.iter().any(|r| r.id == item_id) && selection.contains(item_id),
        ),
        // An empty panel list has nothing to copy and stays unchecked.
        ItemType::PhotovoltaicAll => binary(
            !data.photovoltaics.is_empty()
                && data.photovoltaics.iter().all(|r| selection.contains(&r.id)),
        ),
    }
}

/// A photovoltaic reference tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedTemplateRef {
    #[serde(flatten)]
    pub reference: TemplateRef,
    #[serde(rename = "isCopied")]
    pub is_copied: bool,
}

/// Target geometry with selected origin subtrees merged in.
///
/// Every floor, zone and surface carries `is_copied`: `Some(true)` when it
/// came from the origin, `Some(false)` when it was already in the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedData {
    pub floors: Vec<Floor>,
    pub photovoltaics: Vec<MergedTemplateRef>,
}

impl MergedData {
    /// The merged result as the target version's new data.
    #[must_use]
    pub fn into_version_data(self) -> VersionData {
        VersionData {
            floors: self.floors,
            photovoltaics: self
                .photovoltaics
                .into_iter()
                .map(|merged| merged.reference)
                .collect(),
        }
    }
}

fn flag_surface(surface: &Surface, copied: bool) -> Arc<Surface> {
    Arc::new(Surface {
        is_copied: Some(copied),
        ..surface.clone()
    })
}

fn flag_zone<'a>(zone: &Zone, surfaces: impl Iterator<Item = &'a Arc<Surface>>, copied: bool) -> Arc<Zone> {
    Arc::new(Zone {
        surfaces: surfaces.map(|s| flag_surface(s, copied)).collect(),
        is_copied: Some(copied),
        ..zone.clone()
    })
}

fn flag_floor(floor: &Floor, zones: Vec<Arc<Zone>>, copied: bool) -> Floor {
    Floor {
        floor_id: floor.floor_id.clone(),
        floor_number: floor.floor_number,
        floor_name: floor.floor_name.clone(),
        zones,
        is_copied: Some(copied),
    }
}

/// Selected origin floors, pruned to selected zones and surfaces.
fn extract_selected(origin: &VersionData, selection: &Selection) -> Vec<Floor> {
    origin
        .floors
        .iter()
        .filter(|f| selection.contains(&f.floor_id))
        .map(|floor| {
            let zones = floor
                .zones
                .iter()
                .filter(|z| selection.contains(&z.id))
                .map(|zone| {
                    let surfaces = zone.surfaces.iter().filter(|s| selection.contains(&s.id));
                    flag_zone(zone, surfaces, true)
                })
                .collect();
            flag_floor(floor, zones, true)
        })
        .collect()
}

/// Copies the selected origin subtrees into the target.
///
/// Selected origin floors whose `floor_number` matches a target floor have
/// their zones appended to it; the rest are added as new floors. Floors come
/// out sorted by descending `floor_number`. Ids are kept as they are.
#[must_use]
pub fn merge_remodeling_data(
    selection: &Selection,
    origin: &VersionData,
    target: &VersionData,
) -> MergedData {
    let copied = extract_selected(origin, selection);
    let target_numbers: HashSet<i32> = target.floors.iter().map(|f| f.floor_number).collect();

    let mut floors: Vec<Floor> = target
        .floors
        .iter()
        .map(|floor| {
            let mut zones: Vec<Arc<Zone>> = floor
                .zones
                .iter()
                .map(|z| flag_zone(z, z.surfaces.iter(), false))
                .collect();
            for source in copied.iter().filter(|c| c.floor_number == floor.floor_number) {
                zones.extend(source.zones.iter().cloned());
            }
            flag_floor(floor, zones, false)
        })
        .collect();

    floors.extend(
        copied
            .into_iter()
            .filter(|c| !target_numbers.contains(&c.floor_number)),
    );
    floors.sort_by(|a, b| b.floor_number.cmp(&a.floor_number));

    let photovoltaics = target
        .photovoltaics
        .iter()
        .map(|r| (r, false))
        .chain(
            origin
                .photovoltaics
                .iter()
                .filter(|r| selection.contains(&r.id))
                .map(|r| (r, true)),
        )
        .map(|(reference, is_copied)| MergedTemplateRef {
            reference: reference.clone(),
            is_copied,
        })
        .collect();

    debug!(
        selected = selection.len(),
        floors = floors.len(),
        "merged remodeling data"
    );
    MergedData {
        floors,
        photovoltaics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SurfaceType;
    use pretty_assertions::assert_eq;
    use std::num::NonZeroU32;

    fn origin() -> VersionData {
        VersionData {
            floors: vec![
                Floor::new("o1", 1, "1F").with_zones([
                    Zone::new("oz1", "Lobby").with_surfaces([
                        Surface::new("os1", "N", SurfaceType::Wall),
                        Surface::new("os2", "S", SurfaceType::Wall),
                    ]),
                    Zone::new("oz2", "Hall"),
                ]),
                Floor::new("o2", -1, "B1").with_zones([Zone::new("oz3", "Parking")
                    .with_surfaces([Surface::new("os3", "Slab", SurfaceType::Floor)])]),
            ],
            photovoltaics: vec![
                TemplateRef::new("p1", NonZeroU32::MIN),
                TemplateRef::new("p2", NonZeroU32::MIN),
            ],
        }
    }

    fn target() -> VersionData {
        VersionData {
            floors: vec![Floor::new("t1", 1, "1F").with_zones([Zone::new("tz1", "Lobby")
                .with_surfaces([Surface::new("ts1", "N", SurfaceType::Wall)])])],
            photovoltaics: vec![TemplateRef::new("p9", NonZeroU32::MIN)],
        }
    }

    #[test]
    fn floor_states() {
        let data = origin();
        let mut selection: Selection = ["o1", "oz1", "os1"].into_iter().collect();

        assert_eq!(compute_tri_state("o1", ItemType::Floor, &data, &selection), TriState::Indeterminate);
        assert_eq!(compute_tri_state("oz1", ItemType::Zone, &data, &selection), TriState::Indeterminate);
        assert_eq!(compute_tri_state("o2", ItemType::Floor, &data, &selection), TriState::Unchecked);

        selection.insert("os2");
        selection.insert("oz2");
        assert_eq!(compute_tri_state("o1", ItemType::Floor, &data, &selection), TriState::Checked);
        assert_eq!(compute_tri_state("oz2", ItemType::Zone, &data, &selection), TriState::Checked);
    }

    #[test]
    fn building_state_tracks_coverage() {
        let data = origin();
        let mut selection = Selection::new();

        assert_eq!(compute_tri_state("", ItemType::Building, &data, &selection), TriState::Unchecked);
        selection.insert("os3");
        assert_eq!(compute_tri_state("", ItemType::Building, &data, &selection), TriState::Indeterminate);
        selection.toggle("", ItemType::Building, &data);
        assert_eq!(compute_tri_state("", ItemType::Building, &data, &selection), TriState::Checked);
        selection.toggle("", ItemType::Building, &data);
        assert!(selection.is_empty());
    }

    #[test]
    fn building_with_only_panels_selected_is_indeterminate() {
        let data = origin();
        let selection: Selection = ["p1"].into_iter().collect();

        assert_eq!(compute_tri_state("", ItemType::Building, &data, &selection), TriState::Indeterminate);
        assert_eq!(
            compute_tri_state("", ItemType::Building, &VersionData::default(), &selection),
            TriState::Indeterminate
        );

        let mut selection = selection;
        selection.toggle("", ItemType::Building, &data);
        assert_eq!(compute_tri_state("", ItemType::Building, &data, &selection), TriState::Checked);
        assert!(selection.contains("p1"));
    }

    #[test]
    fn photovoltaic_states_are_binary() {
        let data = origin();
        let mut selection: Selection = ["p1"].into_iter().collect();

        assert_eq!(compute_tri_state("p1", ItemType::Photovoltaic, &data, &selection), TriState::Checked);
        assert_eq!(compute_tri_state("", ItemType::PhotovoltaicAll, &data, &selection), TriState::Unchecked);
        selection.toggle("", ItemType::PhotovoltaicAll, &data);
        assert_eq!(compute_tri_state("", ItemType::PhotovoltaicAll, &data, &selection), TriState::Checked);
        assert_eq!(compute_tri_state("", ItemType::PhotovoltaicAll, &VersionData::default(), &selection), TriState::Unchecked);
    }

    #[test]
    fn toggling_a_surface_selects_ancestors() {
        let data = origin();
        let mut selection = Selection::new();

        selection.toggle("os2", ItemType::Surface, &data);
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["o1", "os2", "oz1"]);

        selection.toggle("oz1", ItemType::Zone, &data);
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["o1", "os1", "os2", "oz1"]);

        selection.toggle("oz1", ItemType::Zone, &data);
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["o1"]);

        selection.toggle("missing", ItemType::Zone, &data);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn merge_appends_zones_and_new_floors() {
        let selection: Selection = ["o1", "oz1", "os2", "o2", "oz3", "os3", "p2"]
            .into_iter()
            .collect();

        let merged = merge_remodeling_data(&selection, &origin(), &target());

        let floors: Vec<(&str, i32, Option<bool>)> = merged
            .floors
            .iter()
            .map(|f| (f.floor_id.as_str(), f.floor_number, f.is_copied))
            .collect();
        assert_eq!(floors, vec![("t1", 1, Some(false)), ("o2", -1, Some(true))]);

        let lobby = &merged.floors[0];
        let zones: Vec<(&str, Option<bool>)> =
            lobby.zones.iter().map(|z| (z.id.as_str(), z.is_copied)).collect();
        assert_eq!(zones, vec![("tz1", Some(false)), ("oz1", Some(true))]);
        assert_eq!(lobby.zones[1].surfaces.len(), 1);
        assert_eq!(lobby.zones[1].surfaces[0].is_copied, Some(true));
        assert_eq!(lobby.zones[0].surfaces[0].is_copied, Some(false));

        let pv: Vec<(&str, bool)> = merged
            .photovoltaics
            .iter()
            .map(|m| (m.reference.id.as_str(), m.is_copied))
            .collect();
        assert_eq!(pv, vec![("p9", false), ("p2", true)]);
    }

    #[test]
    fn empty_selection_returns_flagged_target() {
        let merged = merge_remodeling_data(&Selection::new(), &origin(), &target());
        let data = merged.into_version_data();

        assert_eq!(data.floors.len(), 1);
        assert_eq!(data.floors[0].zones.len(), 1);
        assert_eq!(data.photovoltaics, target().photovoltaics);
    }
}
