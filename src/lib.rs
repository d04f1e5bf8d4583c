//! # Remodel Geometry
//!
//! Building geometry for retrofit studies: the same building described
//! "before" and "after" as floors → zones → surfaces, cross-linked by
//! surface adjacency and by `{id, count}` references into shared catalogs.
//!
//! ## Features
//!
//! - Linked-pair surface updates that keep adjacent surfaces in sync
//! - Floor, zone and surface removal that repairs every dangling adjacency
//! - Zone copy and floor overwrite within a version
//! - Copying selected subtrees from one version into the other, with
//!   tri-state selection for hierarchical pickers
//! - Template reference expansion for lighting, photovoltaics and fenestration
//!
//! Every tree operation is a pure function returning a new tree that shares
//! untouched zones and surfaces with its input.
//!
//! ## Example
//!
//! ```no_run
//! use remodel_geometry::cascade::remove_surface;
//! use remodel_geometry::io::load_document;
//! use remodel_geometry::model::Version;
//! use remodel_geometry::store::GeometryStore;
//!
//! let mut store = GeometryStore::new(load_document("project.json")?);
//! store.apply(Version::Before, |tree| remove_surface(tree, "zone1", "zone1_wall0"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cascade;
pub mod error;
pub mod export;
pub mod io;
pub mod linker;
pub mod merger;
pub mod model;
pub mod store;
pub mod template;
mod tree;
pub mod ui;
