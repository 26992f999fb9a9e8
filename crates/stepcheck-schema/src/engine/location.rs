//! Conversion of `jsonschema` locations into `#`-rooted fragment pointers.
//!
//! The crate reports the keyword path it walked, `$ref` hops included
//! (`/properties/website/$ref/pattern`). Issues point at the keyword where it
//! is written instead (`#/definitions/URL/pattern`), so rules keyed on a
//! definition match wherever that definition is used.

use jsonschema::paths::Location;
use serde_json::Value;

use crate::pointer::{self, ROOT};

/// Instance location as a fragment pointer (`#/inputs/0/opts`).
pub(super) fn instance_pointer(location: &Location) -> String {
    format!("{ROOT}{}", location.as_str())
}

/// Keyword location resolved through every `$ref` on the way.
///
/// Only fragment pointers are followed. A reference the document cannot
/// resolve (an anchor, say) keeps its `$ref` token in the walked path.
pub(super) fn absolute_keyword_pointer(root: &Value, keyword_path: &Location) -> String {
    let mut pointer = ROOT.to_string();
    let mut node = Some(root);

    for token in keyword_path.as_str().split('/').skip(1) {
        let token = unescape(token);
        if token == "$ref" {
            if let Some((fragment, target)) = node.and_then(|n| follow(root, n)) {
                pointer = format!("{ROOT}{fragment}");
                node = Some(target);
                continue;
            }
        }
        node = node.and_then(|n| child(n, &token));
        pointer = pointer::join(&pointer, &token);
    }
    pointer
}

/// Resolve the `$ref` of `schema` against the document root.
fn follow<'a>(root: &'a Value, schema: &Value) -> Option<(String, &'a Value)> {
    let reference = schema.get("$ref")?.as_str()?;
    let fragment = match reference.split_once('#') {
        Some((_, fragment)) => fragment,
        None => "",
    };
    if !fragment.is_empty() && !fragment.starts_with('/') {
        return None;
    }
    let target = root.pointer(fragment)?;
    Some((fragment.to_string(), target))
}

fn child<'a>(node: &'a Value, token: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
