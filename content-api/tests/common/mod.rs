//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use content_api::{
    ContentApi, ContentApiConfig, HttpRequest, HttpResponse, Transport, TransportError,
};
use serde_json::Value;

pub const ENDPOINT: &str = "http://content.test";

/// Transport that records every request and replays queued responses.
///
/// When the queue is empty it answers with the fallback response, or with a
/// transport error if none was set.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<HttpRequest>,
    responses: VecDeque<Result<HttpResponse, TransportError>>,
    fallback: Option<HttpResponse>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(&self, status: u16, body: Value) -> &Self {
        self.respond(status, &body.to_string())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.state.lock().unwrap().responses.push_back(Ok(HttpResponse {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(TransportError(message.to_string())));
        self
    }

    pub fn fallback_json(&self, status: u16, body: Value) -> &Self {
        self.state.lock().unwrap().fallback = Some(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        match state.responses.pop_front() {
            Some(response) => response,
            None => state
                .fallback
                .clone()
                .ok_or_else(|| TransportError("no response queued".to_string())),
        }
    }
}

pub fn config() -> ContentApiConfig {
    ContentApiConfig::new(ENDPOINT)
}

pub fn api_with(config: ContentApiConfig) -> (ContentApi<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let api = ContentApi::with_transport(config, transport.clone()).unwrap();
    (api, transport)
}

pub fn api() -> (ContentApi<MockTransport>, MockTransport) {
    api_with(config())
}
