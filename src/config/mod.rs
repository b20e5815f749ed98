//! Catalog loading from disk (spec §6): parsing cube-catalog files discovered
//! on a directory scan into a [`crate::model::CubeCatalog`]. Kept outside the
//! `core` compiler by design -- spec §1 treats configuration loading as an
//! external collaborator, not part of the compiler proper.

mod loader;

pub use loader::{load_catalog_dir, load_catalog_file, load_first_catalog_dir, LoadError};
