//! `${name}` substitution, recursive and depth-bounded (spec §4.1).
//!
//! Placeholders match `${NAME}` where `NAME` is letters, digits,
//! underscores and dots. Unknown placeholders are left intact (safe
//! substitution, matching Python's `Template.safe_substitute`). The
//! engine is purely textual: it never parses the SQL it substitutes into.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CompileError, CompileResult};

/// Recursion depth cap (spec §4.1: "depth cap of 10").
const MAX_DEPTH: usize = 10;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([a-zA-Z0-9_.]+)\}").unwrap());

/// Variables available to the substitution engine: placeholder name -> text.
pub type VarMap = HashMap<String, String>;

/// Substitute every `${name}` occurrence in `template` using `vars`.
///
/// If `recursive` is `false`, a single pass is performed regardless of any
/// residual placeholders. If `recursive` is `true`, the result is re-scanned
/// until no placeholder remains or [`MAX_DEPTH`] passes have run, at which
/// point substitution fails with [`CompileError::RecursionLimit`].
pub fn substitute(template: &str, vars: &VarMap, recursive: bool) -> CompileResult<String> {
    if !PLACEHOLDER.is_match(template) {
        return Ok(template.to_string());
    }

    let mut current = substitute_once(template, vars);
    if !recursive {
        return Ok(current);
    }

    let mut depth = 0;
    while PLACEHOLDER.is_match(&current) {
        depth += 1;
        if depth > MAX_DEPTH {
            return Err(CompileError::RecursionLimit(current));
        }
        current = substitute_once(&current, vars);
    }
    Ok(current)
}

/// A single substitution pass. Placeholders absent from `vars` are left
/// intact, exactly as `string.Template.safe_substitute` behaves.
fn substitute_once(template: &str, vars: &VarMap) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Extract the set of placeholder names (`${x.y}` -> `"x.y"`) referenced in
/// `template`, in order of first appearance. Used by the field resolver to
/// pull field references out of filter templates (spec §4.4 step 2).
pub fn referenced_names(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// Replace every dot inside a `${...}` placeholder with `__`, leaving dots
/// elsewhere in the template untouched. `${orders.country_id}` becomes
/// `${orders__country_id}` so it resolves through the `<cube>__<field>`
/// variables [`crate::cube_view::CubeView`] builds (spec §4.5 step 4). This
/// is scoped to placeholders rather than the whole string, fixing the
/// prefix-ambiguity the source's naive `str.replace('.', '__')` has (spec §9).
pub fn rewrite_dotted_placeholders(template: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            format!("${{{}}}", caps[1].replace('.', "__"))
        })
        .into_owned()
}
