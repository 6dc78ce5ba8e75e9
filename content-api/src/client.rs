use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::batch::BatchCoalescer;
use crate::config::ContentApiConfig;
use crate::error::{ContentApiError, Result};
use crate::list::ListResponse;
use crate::query::{build_url, inject_param};
use crate::response::Response;
use crate::rest::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::rewrite::WebUrlRewrite;

const ROLE_PARAM: &str = "role";
const USER_AGENT: &str = concat!("content-api/", env!("CARGO_PKG_VERSION"));

/// How a failed request is reported to the caller.
trait FailurePolicy {
    type Output<R>;

    fn settle<R>(url: &str, outcome: Result<R>) -> Result<Self::Output<R>>;
}

/// Non-2xx and transport failures are errors.
struct Strict;

/// Non-2xx and transport failures mean "resource absent".
struct Lenient;

impl FailurePolicy for Strict {
    type Output<R> = R;

    fn settle<R>(_url: &str, outcome: Result<R>) -> Result<Self::Output<R>> {
        outcome
    }
}

impl FailurePolicy for Lenient {
    type Output<R> = Option<R>;

    fn settle<R>(url: &str, outcome: Result<R>) -> Result<Self::Output<R>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(e @ (ContentApiError::Http { .. } | ContentApiError::Transport(_))) => {
                warn!(url = %url, error = %e, "treating failed request as absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Client for the content API.
///
/// Strict methods (`get_*`, `post_json`) fail on non-2xx statuses and
/// transport errors; lenient methods (`find_*`) return `Ok(None)` for them
/// instead. Both fail on malformed URLs, malformed bodies and missing
/// credentials.
#[derive(Debug, Clone)]
pub struct ContentApi<T = HttpTransport> {
    transport: T,
    endpoint: String,
    bearer_token: Option<String>,
    role: Option<String>,
    rewrite: Option<WebUrlRewrite>,
    coalescer: BatchCoalescer,
}

impl ContentApi<HttpTransport> {
    /// Create a client backed by a default `reqwest` transport.
    pub fn new(config: ContentApiConfig) -> Result<Self> {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> ContentApi<T> {
    pub fn with_transport(config: ContentApiConfig, transport: T) -> Result<Self> {
        Url::parse(&config.endpoint)
            .map_err(|e| ContentApiError::malformed_url(&config.endpoint, e))?;
        let rewrite = config
            .web_urls_relative_to
            .as_deref()
            .map(|origin| WebUrlRewrite::new(origin, &config.web_url_fields))
            .transpose()?;

        Ok(Self {
            transport,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token,
            role: config.role,
            rewrite,
            coalescer: BatchCoalescer::new(config.max_url_length),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn coalescer(&self) -> &BatchCoalescer {
        &self.coalescer
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Guard for call sites that set a privileged parameter.
    pub fn require_bearer_token(&self) -> Result<()> {
        if self.has_bearer_token() {
            Ok(())
        } else {
            Err(ContentApiError::MissingCredential)
        }
    }

    /// Build a URL under the configured endpoint.
    pub fn url(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<String> {
        build_url(&self.endpoint, segments, params).map(String::from)
    }

    // --- Strict ---

    pub async fn get_json(&self, url: &str) -> Result<Response> {
        self.retrieve::<Strict, _>(HttpMethod::Get, url, None, |_, resp| Ok(resp))
            .await
    }

    pub async fn get_list(&self, url: &str) -> Result<ListResponse> {
        self.retrieve::<Strict, _>(HttpMethod::Get, url, None, ListResponse::new)
            .await
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Response> {
        self.retrieve::<Strict, _>(HttpMethod::Post, url, Some(body), |_, resp| Ok(resp))
            .await
    }

    // --- Lenient ---

    pub async fn find_json(&self, url: &str) -> Result<Option<Response>> {
        self.retrieve::<Lenient, _>(HttpMethod::Get, url, None, |_, resp| Ok(resp))
            .await
    }

    pub async fn find_list(&self, url: &str) -> Result<Option<ListResponse>> {
        self.retrieve::<Lenient, _>(HttpMethod::Get, url, None, ListResponse::new)
            .await
    }

    // --- Batched ---

    /// Fetch a list keyed by `key=<id>,<id>,...`, split across as many
    /// requests as the URL length limit requires and merged in order.
    pub async fn get_batched_list<S: AsRef<str>>(
        &self,
        segments: &[&str],
        key: &str,
        ids: &[S],
    ) -> Result<ListResponse> {
        self.coalescer.fetch(self, segments, key, ids).await
    }

    /// Characters the role parameter adds when injected into `url`.
    pub(crate) fn role_overhead(&self, url: &str) -> Result<usize> {
        match &self.role {
            Some(role) => Ok(inject_param(url, ROLE_PARAM, role)?
                .len()
                .saturating_sub(url.len())),
            None => Ok(0),
        }
    }

    async fn retrieve<P, R>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        build: impl FnOnce(&str, Response) -> Result<R>,
    ) -> Result<P::Output<R>>
    where
        P: FailurePolicy,
    {
        let request = self.request(method, url, body)?;
        let outcome = self.execute(request, build).await;
        P::settle(url, outcome)
    }

    fn request(&self, method: HttpMethod, url: &str, body: Option<&Value>) -> Result<HttpRequest> {
        let url = match &self.role {
            Some(role) => inject_param(url, ROLE_PARAM, role)?,
            None => Url::parse(url)
                .map_err(|e| ContentApiError::malformed_url(url, e))?
                .into(),
        };

        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("user-agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(token) = &self.bearer_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        let body = match body {
            Some(body) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(body)?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    async fn execute<R>(
        &self,
        request: HttpRequest,
        build: impl FnOnce(&str, Response) -> Result<R>,
    ) -> Result<R> {
        let url = request.url.clone();
        debug!(method = %request.method, url = %url, "sending request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ContentApiError::Transport(e.to_string()))?;

        if !response.is_success() {
            debug!(url = %url, status = response.status, "request failed");
            return Err(http_error(response));
        }

        let decoded = Response::from_http(&url, &response, self.rewrite.as_ref())?;
        build(&url, decoded)
    }
}

fn http_error(response: HttpResponse) -> ContentApiError {
    let body = serde_json::from_str(&response.body).ok();
    ContentApiError::Http {
        status: response.status,
        message: response.body,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(config: ContentApiConfig) -> ContentApi {
        ContentApi::new(config).unwrap()
    }

    #[test]
    fn test_endpoint_trailing_slash_is_stripped() {
        let api = api(ContentApiConfig::new("http://localhost:3000/"));
        assert_eq!(api.endpoint(), "http://localhost:3000");
        assert_eq!(
            api.url(&["artefacts.json"], &[]).unwrap(),
            "http://localhost:3000/artefacts.json"
        );
    }

    #[test]
    fn test_malformed_endpoint() {
        let err = ContentApi::new(ContentApiConfig::new("localhost:3000")).unwrap_err();
        assert!(matches!(err, ContentApiError::MalformedUrl { .. }));
    }

    #[test]
    fn test_malformed_relative_to_origin() {
        let mut config = ContentApiConfig::new("http://localhost");
        config.web_urls_relative_to = Some("www.example.gov".into());
        let err = ContentApi::new(config).unwrap_err();
        assert!(matches!(err, ContentApiError::MalformedUrl { .. }));
    }

    #[test]
    fn test_require_bearer_token() {
        let without = api(ContentApiConfig::new("http://localhost"));
        assert!(matches!(
            without.require_bearer_token(),
            Err(ContentApiError::MissingCredential)
        ));

        let mut config = ContentApiConfig::new("http://localhost");
        config.bearer_token = Some("secret".into());
        assert!(api(config).require_bearer_token().is_ok());
    }

    #[test]
    fn test_request_injects_role_and_headers() {
        let mut config = ContentApiConfig::new("http://localhost");
        config.role = Some("editor".into());
        config.bearer_token = Some("secret".into());
        let api = api(config);

        let req = api
            .request(HttpMethod::Get, "http://localhost/tags.json?type=section", None)
            .unwrap();
        assert_eq!(req.url, "http://localhost/tags.json?type=section&role=editor");
        assert!(req
            .headers
            .contains(&("authorization".to_string(), "Bearer secret".to_string())));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_post_request_carries_json_body() {
        let api = api(ContentApiConfig::new("http://localhost"));
        let body = serde_json::json!({ "slug": "vat" });
        let req = api
            .request(HttpMethod::Post, "http://localhost/artefacts", Some(&body))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some(r#"{"slug":"vat"}"#));
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        assert!(!req.headers.iter().any(|(k, _)| k == "authorization"));
    }

    #[test]
    fn test_role_overhead() {
        let plain = api(ContentApiConfig::new("http://localhost"));
        assert_eq!(plain.role_overhead("http://localhost/x?ids=").unwrap(), 0);

        let mut config = ContentApiConfig::new("http://localhost");
        config.role = Some("editor".into());
        let with_role = api(config);
        assert_eq!(
            with_role.role_overhead("http://localhost/x?ids=").unwrap(),
            "&role=editor".len()
        );
    }

    #[test]
    fn test_http_error_keeps_json_body() {
        let err = http_error(HttpResponse {
            status: 422,
            headers: Vec::new(),
            body: r#"{"error":"bad edition"}"#.to_string(),
        });
        match err {
            ContentApiError::Http { status, body, .. } => {
                assert_eq!(status, 422);
                assert_eq!(body.unwrap()["error"], "bad edition");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
