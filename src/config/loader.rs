//! Scan a directory for cube-catalog files and parse each into a
//! [`CubeCatalog`], ported from `original_source/dotml/cube.py`: `load_cubes`
//! reads and YAML-parses a single file, `load_cube_configs` lists a directory
//! and parses every recognized file independently (no merging -- each file is
//! a complete, self-contained catalog).

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::model::CubeCatalog;

/// Errors raised while loading catalog files from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read catalog directory '{0}': {1}")]
    ReadDir(String, std::io::Error),

    #[error("failed to read catalog file '{0}': {1}")]
    ReadFile(String, std::io::Error),

    #[error("failed to parse catalog file '{0}': {1}")]
    Parse(String, serde_yaml::Error),

    #[error("invalid catalog in '{0}': {1}")]
    Invalid(String, crate::error::CompileError),
}

/// Extensions recognized as cube-catalog files. The original Python exists in
/// two versions, one scanning for `.yml` (`original_source/cube.py`) and one
/// for `.yaml` (`original_source/dotml/cube.py`); this loader accepts both.
const CATALOG_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Parse one cube-catalog file and validate catalog-level invariants (spec
/// §3, §7 `InvalidCatalog`).
pub fn load_catalog_file(path: &Path) -> Result<CubeCatalog, LoadError> {
    let text =
        fs::read_to_string(path).map_err(|e| LoadError::ReadFile(path.display().to_string(), e))?;
    let catalog: CubeCatalog =
        serde_yaml::from_str(&text).map_err(|e| LoadError::Parse(path.display().to_string(), e))?;
    catalog
        .validate()
        .map_err(|e| LoadError::Invalid(path.display().to_string(), e))?;
    Ok(catalog)
}

/// Scan `dir` for recognized catalog files and parse each independently, in
/// filename order for determinism (`os.listdir` order is platform-dependent;
/// `load_cube_configs` does not sort, this loader does).
pub fn load_catalog_dir(dir: &Path) -> Result<Vec<CubeCatalog>, LoadError> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|e| LoadError::ReadDir(dir.display().to_string(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| CATALOG_EXTENSIONS.contains(&ext))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    paths.iter().map(|path| load_catalog_file(path)).collect()
}

/// The first catalog found scanning `dir`, or `None` if it holds no
/// recognized catalog file. Ports `original_source/dotml/cli.py::get_first_cubes`,
/// which every CLI command builds its cube list from.
pub fn load_first_catalog_dir(dir: &Path) -> Result<Option<CubeCatalog>, LoadError> {
    let mut catalogs = load_catalog_dir(dir)?;
    Ok(if catalogs.is_empty() {
        None
    } else {
        Some(catalogs.remove(0))
    })
}
