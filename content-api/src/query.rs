use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::error::{ContentApiError, Result};

/// Escape a single value for use inside a query string.
///
/// Spaces become `+` and every reserved character, including `,`, is
/// percent-encoded, so the result can be safely comma-joined.
pub fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Build `base` + `segments` + `params` into a URL.
///
/// Each path segment and each parameter value is percent-encoded; callers
/// pass raw values. Existing path segments of `base` are kept.
pub fn build_url(base: &str, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| ContentApiError::malformed_url(base, e))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| ContentApiError::malformed_url(base, "URL cannot be a base"))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Append `key=value` to the query of `url`.
///
/// Existing parameters keep their encoding and order; a duplicate `key` is
/// appended rather than replaced.
pub fn inject_param(url: &str, key: &str, value: &str) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(|e| ContentApiError::malformed_url(url, e))?;
    parsed.query_pairs_mut().append_pair(key, value);
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_segments_and_params() {
        let url = build_url(
            "https://contentapi.example.org",
            &["tags", "crime and justice.json"],
            &[("parent_id", "a&b"), ("type", "section")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://contentapi.example.org/tags/crime%20and%20justice.json?parent_id=a%26b&type=section"
        );
    }

    #[test]
    fn test_build_url_keeps_base_path() {
        let url = build_url("http://localhost:3000/api/", &["artefacts.json"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/artefacts.json");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_build_url_escapes_slashes_in_segments() {
        let url = build_url("http://localhost", &["tags", "a/b.json"], &[]).unwrap();
        assert_eq!(url.path(), "/tags/a%2Fb.json");
    }

    #[test]
    fn test_build_url_malformed_base() {
        let err = build_url("not a url", &["x"], &[]).unwrap_err();
        assert!(matches!(err, ContentApiError::MalformedUrl { .. }));
    }

    #[test]
    fn test_inject_param_into_existing_query() {
        let url = inject_param("http://localhost/artefacts.json?a=1", "role", "editor").unwrap();
        assert_eq!(url, "http://localhost/artefacts.json?a=1&role=editor");
    }

    #[test]
    fn test_inject_param_without_query() {
        let url = inject_param("http://localhost/artefacts.json", "role", "editor").unwrap();
        assert_eq!(url, "http://localhost/artefacts.json?role=editor");
    }

    #[test]
    fn test_inject_param_preserves_order_and_duplicates() {
        let url = inject_param("http://localhost/x?b=2&a=1&role=x", "role", "editor").unwrap();
        assert_eq!(url, "http://localhost/x?b=2&a=1&role=x&role=editor");
    }

    #[test]
    fn test_inject_param_keeps_comma_joined_values_and_fragment() {
        let url = inject_param("http://localhost/x?ids=a,b%2Cc#top", "role", "editor").unwrap();
        assert_eq!(url, "http://localhost/x?ids=a,b%2Cc&role=editor#top");
    }

    #[test]
    fn test_inject_param_malformed_url() {
        let err = inject_param("/relative/path", "role", "editor").unwrap_err();
        assert!(matches!(err, ContentApiError::MalformedUrl { .. }));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("plain"), "plain");
        assert_eq!(encode_component("a b,c"), "a+b%2Cc");
        assert_eq!(encode_component("é/?"), "%C3%A9%2F%3F");
    }
}
