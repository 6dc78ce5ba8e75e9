use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no endpoint: pass --endpoint or set CONTENT_API_ENDPOINT")]
    MissingEndpoint,

    #[error(transparent)]
    Api(#[from] content_api::ContentApiError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
