//! Data model path handling.
//!
//! Paths are slash-delimited (`/user/addresses/0/city`). Dots also separate
//! segments and bracketed indices are rewritten, so `user.addresses[0].city`
//! addresses the same value.

/// Split a path into its non-empty segments
pub fn segments(path: &str) -> Vec<String> {
    expand_brackets(path)
        .split(|c: char| c == '/' || c == '.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical absolute form of `path`: `/a/0/b`, or `/` for the root
pub fn normalize_path(path: &str) -> String {
    format!("/{}", segments(path).join("/"))
}

/// Join a binding path onto a node's data context.
///
/// Absolute paths are returned unchanged. `.` and the empty string name the
/// context itself.
pub fn resolve_path(path: &str, data_context_path: &str) -> String {
    if path.is_empty() || path == "." {
        return if data_context_path.is_empty() {
            "/".to_string()
        } else {
            data_context_path.to_string()
        };
    }

    if path.starts_with('/') {
        return path.to_string();
    }

    if !data_context_path.is_empty() && data_context_path != "/" {
        return if data_context_path.ends_with('/') {
            format!("{}{}", data_context_path, path)
        } else {
            format!("{}/{}", data_context_path, path)
        };
    }

    format!("/{}", path)
}

/// Strip the `/item`, `/text` and `/label` roots that agents emit for values
/// already scoped to a template item, then the leading slash, leaving a path
/// relative to the item's data context.
pub fn strip_item_prefix(path: &str) -> String {
    let mut rest = path;
    for root in ["/item", "/text", "/label"] {
        rest = strip_root(rest, root);
    }
    rest.strip_prefix("./")
        .or_else(|| rest.strip_prefix('/'))
        .unwrap_or(rest)
        .to_string()
}

fn strip_root<'a>(path: &'a str, root: &str) -> &'a str {
    let body = path.strip_prefix('.').unwrap_or(path);
    match body.strip_prefix(root) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Parse a list index segment (ASCII digits only)
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Numeric segments of a data context path, outermost first
pub fn index_segments(data_context_path: &str) -> Vec<&str> {
    data_context_path
        .split('/')
        .filter(|segment| parse_index(segment).is_some())
        .collect()
}

fn expand_brackets(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(open) = rest.find('[') {
        let (before, from_open) = rest.split_at(open);
        out.push_str(before);

        let inner = &from_open[1..];
        match inner.find(']') {
            Some(close) if parse_index(&inner[..close]).is_some() => {
                out.push('.');
                out.push_str(&inner[..close]);
                rest = &inner[close + 1..];
            }
            _ => {
                out.push('[');
                rest = inner;
            }
        }
    }

    out.push_str(rest);
    out
}
