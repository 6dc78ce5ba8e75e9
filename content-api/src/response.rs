use std::ops::Index;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{ContentApiError, Result};
use crate::rest::HttpResponse;
use crate::rewrite::WebUrlRewrite;

/// Links to neighbouring pages of a paginated response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl PageLinks {
    /// Read links from an RFC 8288 `Link` header, falling back to the
    /// `next_page_url` / `previous_page_url` body fields.
    pub fn from_response(link_header: Option<&str>, body: &Value) -> Self {
        let mut links = link_header.map(parse_link_header).unwrap_or_default();
        if links.next.is_none() {
            links.next = string_field(body, "next_page_url");
        }
        if links.previous.is_none() {
            links.previous = string_field(body, "previous_page_url");
        }
        links
    }

    /// Resolve relative links against `base`, the URL that was requested.
    pub fn resolve_against(self, base: &Url) -> std::result::Result<Self, url::ParseError> {
        let resolve =
            |link: Option<String>| link.map(|href| base.join(&href).map(String::from)).transpose();
        Ok(Self {
            next: resolve(self.next)?,
            previous: resolve(self.previous)?,
        })
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parse `<url>; rel="next", <url>; rel="previous"` style headers.
///
/// Targets are delimited by angle brackets, so commas inside URLs survive.
fn parse_link_header(header: &str) -> PageLinks {
    let mut links = PageLinks::default();
    let mut rest = header;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            break;
        };
        let href = &after[..close];
        let tail = &after[close + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());
        for param in tail[..params_end].split(';') {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if !name.trim().eq_ignore_ascii_case("rel") {
                continue;
            }
            let value = value.trim().trim_end_matches(',').trim().trim_matches('"');
            for rel in value.split_whitespace() {
                match rel {
                    "next" => links.next = Some(href.to_string()),
                    "previous" | "prev" => links.previous = Some(href.to_string()),
                    _ => {}
                }
            }
        }
        rest = &tail[params_end..];
    }
    links
}

/// Read-only view of a decoded JSON response.
///
/// Web URL rewriting happens once, here; reads never transform again.
#[derive(Debug, Clone)]
pub struct Response {
    body: Value,
    links: PageLinks,
}

impl Response {
    pub fn new(mut body: Value, links: PageLinks, rewrite: Option<&WebUrlRewrite>) -> Self {
        if let Some(rewrite) = rewrite {
            rewrite.apply(&mut body);
        }
        Self { body, links }
    }

    /// Decode a successful HTTP response. An empty body decodes to `null`.
    pub fn from_http(
        url: &str,
        response: &HttpResponse,
        rewrite: Option<&WebUrlRewrite>,
    ) -> Result<Self> {
        let body = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body)
                .map_err(|e| ContentApiError::malformed_response(url, e))?
        };
        let base = Url::parse(url).map_err(|e| ContentApiError::malformed_url(url, e))?;
        let links = PageLinks::from_response(response.header("link"), &body)
            .resolve_against(&base)
            .map_err(|e| ContentApiError::malformed_response(url, e))?;
        Ok(Self::new(body, links, rewrite))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.body
    }

    pub fn into_value(self) -> Value {
        self.body
    }

    /// Deserialize the whole body into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.body).map_err(ContentApiError::Json)
    }

    pub fn page_links(&self) -> &PageLinks {
        &self.links
    }

    pub(crate) fn body_mut(&mut self) -> &mut Value {
        &mut self.body
    }
}

impl Index<&str> for Response {
    type Output = Value;

    /// Missing keys index to `Value::Null`, as with `serde_json::Value`.
    fn index(&self, key: &str) -> &Value {
        &self.body[key]
    }
}
