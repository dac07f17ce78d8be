/// Split a navigation target into its path and query, dropping any fragment.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    let without_fragment = match target.find('#') {
        Some(idx) => &target[..idx],
        None => target,
    };
    match without_fragment.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path, Some(query)),
        Some((path, _)) => (path, None),
        None => (without_fragment, None),
    }
}

/// The path portion of a navigation target.
pub fn path_of(target: &str) -> &str {
    split_target(target).0
}

/// Append a raw query string to a target, merging with any existing query.
pub fn append_query(target: &str, query: &str) -> String {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return target.to_string();
    }
    if target.contains('?') {
        format!("{}&{}", target, query)
    } else {
        format!("{}?{}", target, query)
    }
}
