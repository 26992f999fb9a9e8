//! Fragment pointers (`#/inputs/0/opts`) used for both instance and schema
//! locations.

/// Pointer to the document or schema root.
pub const ROOT: &str = "#";

/// Append one reference token, escaping `~` and `/` as in RFC 6901.
pub fn join(base: &str, token: &str) -> String {
    let mut out = String::with_capacity(base.len() + token.len() + 1);
    out.push_str(base);
    out.push('/');
    for c in token.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            other => out.push(other),
        }
    }
    out
}

/// Append an array index.
pub fn join_index(base: &str, index: usize) -> String {
    format!("{base}/{index}")
}
