pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod list;
pub mod query;
pub mod response;
pub mod rest;
pub mod rewrite;

// ---- Top-level re-exports for ergonomic usage ----

// Client + config
pub use client::ContentApi;
pub use config::{ContentApiConfig, DEFAULT_MAX_URL_LENGTH, DEFAULT_WEB_URL_FIELD};
pub use error::{ContentApiError, Result};

// Transport
pub use rest::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};

// Responses
pub use list::ListResponse;
pub use response::{PageLinks, Response};
pub use rewrite::WebUrlRewrite;

// Batching
pub use batch::BatchCoalescer;

// Endpoint parameters
pub use rest::endpoints::{ArtefactParams, SortOrder};
