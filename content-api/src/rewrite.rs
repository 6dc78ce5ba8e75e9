use serde_json::Value;
use url::Url;

use crate::error::{ContentApiError, Result};

/// Rewrites absolute web URLs on one origin into host-relative paths.
///
/// A field qualifies when its name is in `fields`; its value is replaced when
/// it is an absolute URL with the same scheme, host and port as `origin`.
#[derive(Debug, Clone)]
pub struct WebUrlRewrite {
    origin: Url,
    fields: Vec<String>,
}

impl WebUrlRewrite {
    pub fn new(relative_to: &str, fields: &[String]) -> Result<Self> {
        let origin =
            Url::parse(relative_to).map_err(|e| ContentApiError::malformed_url(relative_to, e))?;
        Ok(Self {
            origin,
            fields: fields.to_vec(),
        })
    }

    /// Rewrite every qualifying field in `value`, at any depth.
    pub fn apply(&self, value: &mut Value) {
        rewrite_fields(
            value,
            &|name: &str| self.fields.iter().any(|f| f == name),
            &|url: &str| self.relative_to_origin(url),
        );
    }

    fn relative_to_origin(&self, candidate: &str) -> Option<String> {
        let url = Url::parse(candidate).ok()?;
        if url.scheme() != self.origin.scheme()
            || url.host_str() != self.origin.host_str()
            || url.port_or_known_default() != self.origin.port_or_known_default()
        {
            return None;
        }

        let mut relative = url.path().to_string();
        if let Some(query) = url.query() {
            relative.push('?');
            relative.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            relative.push('#');
            relative.push_str(fragment);
        }
        Some(relative)
    }
}

/// Recursive descent over objects and arrays.
///
/// String values of fields accepted by `is_url_field` are passed to
/// `rewrite`; a `Some` result replaces the value. Matched fields are not
/// descended into.
pub fn rewrite_fields<P, R>(value: &mut Value, is_url_field: &P, rewrite: &R)
where
    P: Fn(&str) -> bool,
    R: Fn(&str) -> Option<String>,
{
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_url_field(key.as_str()) {
                    if let Value::String(url) = field {
                        if let Some(relative) = rewrite(url.as_str()) {
                            *url = relative;
                        }
                    }
                } else {
                    rewrite_fields(field, is_url_field, rewrite);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_fields(item, is_url_field, rewrite);
            }
        }
        _ => {}
    }
}
