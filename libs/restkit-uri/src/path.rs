//! Endpoint path assembly.
//!
//! Segments are joined with exactly one `/`. Leading and trailing slashes of
//! every segment are stripped and blank segments are skipped, so the result is
//! the same whether or not callers already normalised their input.

/// Join path segments into one endpoint path.
///
/// - blank segments are skipped;
/// - each segment loses its leading and trailing `/` before joining;
/// - segments that start with a prefixed template operator (`{/`, `{?`, `{&`,
///   `{#`) or with `?`/`#` are appended without a separator;
/// - a relative result starts with `/`; a result that begins with a URI scheme
///   (`http://...`) is left as is.
///
/// Joining is idempotent: `join_paths([join_paths(xs)]) == join_paths(xs)`.
///
/// ```
/// use restkit_uri::join_paths;
///
/// assert_eq!(join_paths(["http://my.api.com/", "/users/", "{id}"]), "http://my.api.com/users/{id}");
/// assert_eq!(join_paths(["", "api", "/v1/", "/items{?page}"]), "/api/v1/items{?page}");
/// ```
#[must_use]
pub fn join_paths<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();

    for segment in segments {
        let stripped = segment.as_ref().trim().trim_matches('/');
        if stripped.is_empty() {
            continue;
        }
        if !joined.is_empty() && needs_separator(stripped) {
            joined.push('/');
        }
        joined.push_str(stripped);
    }

    if !joined.is_empty() && !has_scheme(&joined) && needs_separator(&joined) {
        joined.insert(0, '/');
    }

    joined
}

/// True when `path` starts with a URI scheme followed by `://`.
#[must_use]
pub fn has_scheme(path: &str) -> bool {
    let Some(index) = path.find("://") else {
        return false;
    };
    let scheme = &path[..index];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn needs_separator(segment: &str) -> bool {
    const SELF_PREFIXED: [&str; 6] = ["{/", "{?", "{&", "{#", "?", "#"];
    !SELF_PREFIXED
        .iter()
        .any(|prefix| segment.starts_with(prefix))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_base_is_preserved() {
        assert_eq!(
            join_paths(["http://my.api.com", "/{id}"]),
            "http://my.api.com/{id}"
        );
        assert_eq!(
            join_paths(["https://my.api.com/", "users", "/{id}/"]),
            "https://my.api.com/users/{id}"
        );
    }

    #[test]
    fn test_relative_paths_get_single_leading_slash() {
        assert_eq!(join_paths(["api", "users"]), "/api/users");
        assert_eq!(join_paths(["//api//", "//users//"]), "/api/users");
    }

    #[test]
    fn test_blank_segments_skipped() {
        assert_eq!(join_paths(["", "  ", "/", "api", ""]), "/api");
        assert_eq!(join_paths(Vec::<String>::new()), "");
        assert_eq!(join_paths(["/", ""]), "");
    }

    #[test]
    fn test_operator_segments_are_not_separated() {
        assert_eq!(join_paths(["/api", "{/id}"]), "/api{/id}");
        assert_eq!(join_paths(["/api", "{?page}"]), "/api{?page}");
        assert_eq!(join_paths(["/api", "?age=1{&name}"]), "/api?age=1{&name}");
        assert_eq!(join_paths(["{/id}"]), "{/id}");
    }

    #[test]
    fn test_join_is_idempotent() {
        let inputs: [&[&str]; 5] = [
            &["http://h.com/", "/a/", "/b/"],
            &["a", "b", "c"],
            &["///a", "b///", ""],
            &["/x", "{/id}", "{?q}"],
            &[""],
        ];
        for input in inputs {
            let once = join_paths(input.iter());
            assert_eq!(join_paths([once.as_str()]), once, "input {input:?}");
            let normalized: Vec<&str> = input.iter().map(|s| s.trim_matches('/')).collect();
            assert_eq!(join_paths(normalized), once, "input {input:?}");
            assert!(!once.contains("//") || has_scheme(&once));
        }
    }

    #[test]
    fn test_scheme_detection() {
        assert!(has_scheme("http://x"));
        assert!(has_scheme("git+ssh://x"));
        assert!(!has_scheme("/http://x"));
        assert!(!has_scheme("://x"));
        assert!(!has_scheme("/api/users"));
    }
}
