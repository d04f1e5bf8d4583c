//! Template-instance mapping.
//!
//! A zone's lighting, a surface's fenestrations and a version's photovoltaic
//! panels are stored as `{id, count}` references into a master catalog. These
//! helpers flatten references into enumerable rows and fold rows back into
//! references. None of them fail: references to ids missing from the catalog
//! contribute nothing.

use crate::model::TemplateRef;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use uuid::Uuid;

/// Anything addressable by a catalog id.
pub trait Catalogued {
    fn catalog_id(&self) -> &str;
}

/// How [`expand`] identifies the copies it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMode {
    /// Each copy gets a random instance id.
    #[default]
    Fresh,
    /// Each copy reuses the catalog id.
    Preserve,
}

/// One concrete use of a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance<T> {
    pub instance_id: String,
    #[serde(flatten)]
    pub item: T,
}

impl<T: Catalogued> Catalogued for Instance<T> {
    fn catalog_id(&self) -> &str {
        self.item.catalog_id()
    }
}

/// A catalog entry annotated with how many times it is used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counted<T> {
    #[serde(flatten)]
    pub item: T,
    pub count: NonZeroU32,
}

/// Expands references into `count` copies of their catalog entry each.
#[must_use]
pub fn expand<T>(master: &[T], refs: &[TemplateRef], mode: IdMode) -> Vec<Instance<T>>
where
    T: Catalogued + Clone,
{
    let mut instances = Vec::new();

    for reference in refs {
        let Some(entry) = master.iter().find(|m| m.catalog_id() == reference.id) else {
            tracing::debug!(id = %reference.id, "template reference not in catalog, dropped");
            continue;
        };

        for _ in 0..reference.count.get() {
            let instance_id = match mode {
                IdMode::Fresh => Uuid::new_v4().to_string(),
                IdMode::Preserve => entry.catalog_id().to_string(),
            };
            instances.push(Instance {
                instance_id,
                item: entry.clone(),
            });
        }
    }

    instances
}

/// Groups items by catalog id, ordered by first occurrence.
#[must_use]
pub fn collapse<T: Catalogued>(instances: &[T]) -> Vec<TemplateRef> {
    let mut refs: Vec<TemplateRef> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for instance in instances {
        let id = instance.catalog_id();
        if let Some(&pos) = positions.get(id) {
            refs[pos].count = refs[pos].count.saturating_add(1);
        } else {
            positions.insert(id, refs.len());
            refs.push(TemplateRef::new(id, NonZeroU32::MIN));
        }
    }

    refs
}

/// Annotates each referenced catalog entry with its count.
#[must_use]
pub fn merge_counts<T>(master: &[T], refs: &[TemplateRef]) -> Vec<Counted<T>>
where
    T: Catalogued + Clone,
{
    refs.iter()
        .filter_map(|reference| {
            master
                .iter()
                .find(|m| m.catalog_id() == reference.id)
                .map(|entry| Counted {
                    item: entry.clone(),
                    count: reference.count,
                })
        })
        .collect()
}
