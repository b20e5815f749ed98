//! Compile a [`Query`] against a [`CubeCatalog`], dispatching to the
//! single-cube or multi-cube path depending on how many cubes it touches
//! (spec §4.4 steps 6-7, §4.2).

pub mod emit;
pub mod multi;
pub mod single;

use crate::alias::AliasSource;
use crate::error::CompileResult;
use crate::model::{CubeCatalog, Query};
use crate::resolver::resolve;

/// Resolve `query` against `catalog` and compile it to a single SQL string.
///
/// A query touching exactly one cube takes the flat single-cube path
/// (§4.5); a query touching more than one takes the fan-out-safe
/// dimension/metric-CTE path (§4.6).
pub fn compile_query(
    catalog: &CubeCatalog,
    query: &Query,
    alias_source: &mut dyn AliasSource,
) -> CompileResult<String> {
    catalog.validate()?;
    let resolution = resolve(catalog, query)?;

    if resolution.needed_cubes.len() == 1 {
        let cube = catalog
            .cube(&resolution.needed_cubes[0])
            .expect("resolver only names cubes present in the catalog");
        single::compile(cube, query, alias_source)
    } else {
        let cubes: Vec<_> = resolution
            .needed_cubes
            .iter()
            .map(|name| {
                catalog
                    .cube(name)
                    .expect("resolver only names cubes present in the catalog")
            })
            .collect();
        multi::compile(catalog, &cubes, query, &resolution.all_query_fields, alias_source)
    }
}
