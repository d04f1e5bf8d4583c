//! State container holding the current geometry of both versions.
//!
//! Core functions are pure `tree -> tree'` transforms. The store reads the
//! current tree, runs a transform and installs the result in one step, so a
//! version is never left half-updated. Observers are told after every write.

use crate::error::GeometryError;
use crate::merger::{merge_remodeling_data, Selection};
use crate::model::{Document, Floor, Version, VersionData};
use std::fmt;
use tracing::info;

/// Callback run after a version is replaced.
pub type Observer = Box<dyn FnMut(Version, &VersionData)>;

pub struct GeometryStore {
    document: Document,
    revision: u64,
    observers: Vec<Observer>,
}

impl fmt::Debug for GeometryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryStore")
            .field("document", &self.document.name)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GeometryStore {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            revision: 0,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Number of writes since the store was created.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Current data of a version.
    pub fn read(&self, version: Version) -> Result<&VersionData, GeometryError> {
        self.document
            .version(version)
            .ok_or(GeometryError::Uninitialized { version })
    }

    /// Current floor tree of a version.
    pub fn floors(&self, version: Version) -> Result<&[Floor], GeometryError> {
        self.read(version).map(|data| data.floors.as_slice())
    }

    /// Replaces a version wholesale, initializing it if needed.
    pub fn write(&mut self, version: Version, data: VersionData) {
        *self.document.version_mut(version) = Some(data);
        self.revision += 1;
        info!(%version, revision = self.revision, "geometry replaced");

        if let Some(current) = self.document.version(version) {
            for observer in &mut self.observers {
                observer(version, current);
            }
        }
    }

    /// Runs a tree transform against a version and installs its result.
    pub fn apply<F>(&mut self, version: Version, transform: F) -> Result<(), GeometryError>
    where
        F: FnOnce(&[Floor]) -> Vec<Floor>,
    {
        let current = self.read(version)?;
        let data = VersionData {
            floors: transform(&current.floors),
            photovoltaics: current.photovoltaics.clone(),
        };
        self.write(version, data);
        Ok(())
    }

    /// Like [`apply`](Self::apply) for adjacency-linker transforms, which
    /// also require the tree to hold at least one floor.
    pub fn apply_linked<F>(&mut self, version: Version, transform: F) -> Result<(), GeometryError>
    where
        F: FnOnce(&[Floor]) -> Vec<Floor>,
    {
        if self.floors(version)?.is_empty() {
            return Err(GeometryError::EmptyTree { version });
        }
        self.apply(version, transform)
    }

    /// Copies the selected parts of `origin` into `target`.
    pub fn merge_into(
        &mut self,
        origin: Version,
        target: Version,
        selection: &Selection,
    ) -> Result<(), GeometryError> {
        let merged = merge_remodeling_data(selection, self.read(origin)?, self.read(target)?);
        self.write(target, merged.into_version_data());
        Ok(())
    }
}
