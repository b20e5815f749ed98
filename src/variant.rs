//! Expand a field declaration carrying *variants* into a family of concrete
//! fields by cross-product over variant values (spec §4.2).
//!
//! Multiple [`VariantSpec`]s on one field are applied by concatenation --
//! each spec's values emit fields independently, not a cross product --
//! matching the source behavior (spec §4.2).

use crate::error::CompileResult;
use crate::model::{scalar_to_string, FieldDecl, FieldKind, VariantValue};
use crate::template::{substitute, VarMap};

/// A field after variant expansion, tagged with the [`FieldKind`] of the
/// list it came from. This is the per-compilation, mutable counterpart to
/// [`FieldDecl`] recommended by spec §9.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub sql: String,
    pub kind: FieldKind,
    pub primary_key: bool,
}

/// The alias suffix and substituted text carried by one variant value.
fn variant_parts(value: &VariantValue) -> (String, String) {
    match value {
        VariantValue::Scalar(v) => {
            let s = scalar_to_string(v);
            (s.clone(), s)
        }
        VariantValue::Aliased { alias, value } => (alias.clone(), scalar_to_string(value)),
    }
}

/// The field names a declaration expands into, without running the template
/// engine. Used by the field resolver to enumerate fields cheaply, and
/// relied on by the *variant enumeration law* (spec §8): these names must
/// exactly equal the names [`expand_variants`] actually produces.
pub fn variant_field_names(decl: &FieldDecl) -> Vec<String> {
    if decl.variants.is_empty() {
        return vec![decl.name.clone()];
    }
    let mut names = Vec::new();
    for spec in &decl.variants {
        for value in &spec.values {
            let (alias_suffix, _) = variant_parts(value);
            names.push(format!("{}_{}", decl.name, alias_suffix));
        }
    }
    names
}

/// Expand every declaration in `decls` (all of the same `kind`) into
/// [`ResolvedField`]s, expanding variants along the way. Expanding twice is
/// a no-op: a [`ResolvedField`] never carries variants of its own, so a
/// second pass over already-expanded output leaves it unchanged (spec §8,
/// §9: "`expand_variants` over an already-expanded map is a no-op").
pub fn expand_variants(kind: FieldKind, decls: &[FieldDecl]) -> CompileResult<Vec<ResolvedField>> {
    let mut out = Vec::with_capacity(decls.len());
    for decl in decls {
        if decl.variants.is_empty() {
            out.push(ResolvedField {
                name: decl.name.clone(),
                sql: decl.sql.clone(),
                kind,
                primary_key: decl.primary_key,
            });
            continue;
        }
        for spec in &decl.variants {
            for value in &spec.values {
                let (alias_suffix, subst) = variant_parts(value);
                let mut vars = VarMap::new();
                vars.insert(spec.placeholder.clone(), subst);
                let sql = substitute(&decl.sql, &vars, false)?;
                out.push(ResolvedField {
                    name: format!("{}_{}", decl.name, alias_suffix),
                    sql,
                    kind,
                    primary_key: decl.primary_key,
                });
            }
        }
    }
    Ok(out)
}
