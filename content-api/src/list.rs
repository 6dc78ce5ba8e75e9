use std::ops::Index;

use futures_util::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::client::ContentApi;
use crate::error::{ContentApiError, Result};
use crate::response::{PageLinks, Response};
use crate::rest::Transport;

const TOTAL: &str = "total";
const RESULTS: &str = "results";
const GROUPED_RESULTS: &str = "grouped_results";

/// A list-shaped response: an object with an integer `total` and a
/// `results` array.
///
/// `results` holds one page; `total` is the API's count for the whole
/// listing, so the two need not agree. When the API groups a listing,
/// `grouped_results` takes the place of `results`.
///
/// Neighbouring pages are fetched at most once and kept alongside this one,
/// so a held page never changes under the caller.
#[derive(Debug, Clone)]
pub struct ListResponse {
    inner: Response,
    next: OnceCell<Box<ListResponse>>,
    previous: OnceCell<Box<ListResponse>>,
}

impl ListResponse {
    /// Wrap `response`, failing with `MalformedResponse` unless it is list-shaped.
    pub fn new(url: &str, response: Response) -> Result<Self> {
        let body = response.as_value();
        if !body.is_object() {
            return Err(ContentApiError::malformed_response(
                url,
                "expected a JSON object",
            ));
        }
        if body.get(TOTAL).and_then(Value::as_u64).is_none() {
            return Err(ContentApiError::malformed_response(
                url,
                "missing integer `total`",
            ));
        }
        if !body.get(RESULTS).is_some_and(Value::is_array)
            && !body.get(GROUPED_RESULTS).is_some_and(Value::is_array)
        {
            return Err(ContentApiError::malformed_response(
                url,
                "missing `results` array",
            ));
        }
        Ok(Self {
            inner: response,
            next: OnceCell::new(),
            previous: OnceCell::new(),
        })
    }

    pub fn total(&self) -> u64 {
        self.inner[TOTAL].as_u64().unwrap_or_default()
    }

    /// Items of the current page, in API order.
    pub fn results(&self) -> &[Value] {
        self.inner
            .get(self.results_key())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Deserialize every item of the current page into `T`.
    pub fn results_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.results()
            .iter()
            .map(|item| T::deserialize(item).map_err(ContentApiError::Json))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.results().iter()
    }

    pub fn response(&self) -> &Response {
        &self.inner
    }

    pub fn into_response(self) -> Response {
        self.inner
    }

    pub fn page_links(&self) -> &PageLinks {
        self.inner.page_links()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_links().next.is_some()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_links().previous.is_some()
    }

    /// The page after this one, if the API linked one.
    ///
    /// Fetched on first call; later calls return the same page.
    pub async fn next_page<T: Transport>(
        &self,
        api: &ContentApi<T>,
    ) -> Result<Option<&ListResponse>> {
        linked_page(api, self.page_links().next.as_deref(), &self.next).await
    }

    /// The page before this one, if the API linked one.
    ///
    /// Fetched on first call; later calls return the same page.
    pub async fn previous_page<T: Transport>(
        &self,
        api: &ContentApi<T>,
    ) -> Result<Option<&ListResponse>> {
        linked_page(api, self.page_links().previous.as_deref(), &self.previous).await
    }

    /// Stream every item of this page, then of each following page.
    ///
    /// Pages already fetched are re-read from memory on every call; the
    /// network is only used when the stream crosses into a page not fetched
    /// before. The stream ends at the first page without a next link, and a
    /// failed page fetch ends it with that error.
    pub fn with_each_item<'a, T: Transport>(
        &'a self,
        api: &'a ContentApi<T>,
    ) -> impl Stream<Item = Result<Value>> + 'a {
        let cursor = PageCursor { page: self, pos: 0 };
        stream::try_unfold(cursor, move |cursor| advance(api, cursor))
    }

    /// Fold `other` into this response: totals add up, results append.
    pub(crate) fn merge(&mut self, other: ListResponse) {
        let total = self.total() + other.total();
        let key = self.results_key();
        let body = self.inner.body_mut();
        body[TOTAL] = Value::from(total);
        if let Some(results) = body.get_mut(key).and_then(Value::as_array_mut) {
            results.extend(other.results().iter().cloned());
        }
    }

    fn results_key(&self) -> &'static str {
        if self.inner.get(GROUPED_RESULTS).is_some_and(Value::is_array) {
            GROUPED_RESULTS
        } else {
            RESULTS
        }
    }
}

async fn linked_page<'a, T: Transport>(
    api: &ContentApi<T>,
    link: Option<&str>,
    cell: &'a OnceCell<Box<ListResponse>>,
) -> Result<Option<&'a ListResponse>> {
    let Some(url) = link else {
        return Ok(None);
    };
    let page = cell
        .get_or_try_init(|| async move {
            debug!(url = %url, "fetching linked page");
            api.get_list(url).await.map(Box::new)
        })
        .await?;
    Ok(Some(page.as_ref()))
}

struct PageCursor<'a> {
    page: &'a ListResponse,
    pos: usize,
}

async fn advance<'a, T: Transport>(
    api: &'a ContentApi<T>,
    mut cursor: PageCursor<'a>,
) -> Result<Option<(Value, PageCursor<'a>)>> {
    loop {
        if let Some(item) = cursor.page.results().get(cursor.pos) {
            let item = item.clone();
            cursor.pos += 1;
            return Ok(Some((item, cursor)));
        }
        match cursor.page.next_page(api).await? {
            Some(next) => cursor = PageCursor { page: next, pos: 0 },
            None => return Ok(None),
        }
    }
}

impl Index<&str> for ListResponse {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.inner[key]
    }
}

impl<'a> IntoIterator for &'a ListResponse {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
