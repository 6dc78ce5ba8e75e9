use tracing::debug;

use crate::client::ContentApi;
use crate::config::DEFAULT_MAX_URL_LENGTH;
use crate::error::{ContentApiError, Result};
use crate::list::ListResponse;
use crate::query::{build_url, encode_component};
use crate::rest::Transport;

/// Splits identifier lists across requests whose URLs stay under a length
/// limit, and merges the list responses back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCoalescer {
    max_url_length: usize,
}

impl Default for BatchCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_URL_LENGTH)
    }
}

impl BatchCoalescer {
    pub fn new(max_url_length: usize) -> Self {
        Self { max_url_length }
    }

    pub fn max_url_length(&self) -> usize {
        self.max_url_length
    }

    /// Greedily pack `ids` into batch URLs of the form `prefix` + `a,b,c`.
    ///
    /// Each identifier is encoded on its own before joining. `overhead` is
    /// the length added to every URL after partitioning (an injected role
    /// parameter). A batch is closed as soon as adding the next identifier
    /// would make the URL reach `max_url_length`; an identifier too long to
    /// fit even alone still gets a batch of its own.
    pub fn partition<S: AsRef<str>>(
        &self,
        prefix: &str,
        ids: &[S],
        overhead: usize,
    ) -> Result<Vec<String>> {
        let mut encoded = ids.iter().map(|id| encode_component(id.as_ref()));
        let Some(first) = encoded.next() else {
            return Err(ContentApiError::EmptyIdentifiers);
        };

        let mut batches = Vec::new();
        let mut current = format!("{prefix}{first}");
        for id in encoded {
            let candidate_len = current.len() + 1 + id.len() + overhead;
            if candidate_len >= self.max_url_length {
                batches.push(std::mem::replace(&mut current, format!("{prefix}{id}")));
            } else {
                current.push(',');
                current.push_str(&id);
            }
        }
        batches.push(current);
        Ok(batches)
    }

    /// Fetch `segments?key=<ids>` in as few requests as the limit allows.
    ///
    /// Batches are sent one after another through the strict retrieval path;
    /// the first failure aborts the rest and is returned as-is. A single
    /// batch is returned untouched, otherwise totals are summed and results
    /// concatenated in batch order.
    pub async fn fetch<T: Transport, S: AsRef<str>>(
        &self,
        api: &ContentApi<T>,
        segments: &[&str],
        key: &str,
        ids: &[S],
    ) -> Result<ListResponse> {
        let prefix = String::from(build_url(api.endpoint(), segments, &[(key, "")])?);
        let overhead = api.role_overhead(&prefix)?;
        let urls = self.partition(&prefix, ids, overhead)?;
        debug!(
            batches = urls.len(),
            identifiers = ids.len(),
            max_url_length = self.max_url_length,
            "fetching batched list"
        );

        let mut merged: Option<ListResponse> = None;
        for (index, url) in urls.iter().enumerate() {
            debug!(batch = index, url_length = url.len(), "fetching batch");
            let batch = api.get_list(url).await?;
            match merged.as_mut() {
                Some(merged) => merged.merge(batch),
                None => merged = Some(batch),
            }
        }
        merged.ok_or(ContentApiError::EmptyIdentifiers)
    }
}
