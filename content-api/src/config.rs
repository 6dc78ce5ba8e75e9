/// URL length at or above which the batch coalescer splits a request.
pub const DEFAULT_MAX_URL_LENGTH: usize = 2000;

/// Field name treated as a displayable web URL by default.
pub const DEFAULT_WEB_URL_FIELD: &str = "web_url";

/// Configuration for the content API client.
///
/// Use [`ContentApiConfig::new`] for defaults, then set the optional fields
/// before passing it to [`crate::ContentApi::new`].
#[derive(Debug, Clone)]
pub struct ContentApiConfig {
    /// Base URL of the content API (e.g. `https://contentapi.example.org`).
    pub endpoint: String,
    /// Bearer token sent as `Authorization` header; gates privileged parameters.
    pub bearer_token: Option<String>,
    /// Injected as `role=<value>` into every outgoing URL.
    pub role: Option<String>,
    /// Web URLs on this origin are rewritten to host-relative paths.
    pub web_urls_relative_to: Option<String>,
    /// Field names holding web URLs subject to rewriting.
    pub web_url_fields: Vec<String>,
    /// Batched requests are kept strictly shorter than this many characters.
    pub max_url_length: usize,
}

impl ContentApiConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            bearer_token: None,
            role: None,
            web_urls_relative_to: None,
            web_url_fields: vec![DEFAULT_WEB_URL_FIELD.to_string()],
            max_url_length: DEFAULT_MAX_URL_LENGTH,
        }
    }
}
