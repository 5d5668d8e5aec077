//! HTTP access to the remote OData service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::entities::table::{ColumnSpec, PageResult, Record, ViewState};
use crate::infra::odata::query::translate;
use crate::usecase::ports::source::{PageSource, SourceError};

/// Upper bound on continuation-link hops; a server that keeps handing out
/// cursors past this is treated as misbehaving.
pub const MAX_CONTINUATION_HOPS: usize = 64;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ODataEnvelope {
    #[serde(default)]
    value: Vec<Record>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

pub struct ODataClient {
    http: Client,
    base_url: Url,
    columns: Vec<ColumnSpec>,
}

impl ODataClient {
    pub fn new(base_url: Url, columns: Vec<ColumnSpec>) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| SourceError::Transport(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            columns,
        })
    }

    /// Fetch the entire record set, following `@odata.nextLink` continuation
    /// links until the server stops returning one. Any failing hop discards
    /// everything accumulated so far.
    pub async fn fetch_all(&self) -> Result<Vec<Record>, SourceError> {
        let mut records = Vec::new();
        let mut next = Some(self.base_url.clone());
        let mut hops = 0usize;

        while let Some(url) = next.take() {
            hops += 1;
            if hops > MAX_CONTINUATION_HOPS {
                tracing::warn!(hops, url = %self.base_url, "continuation chain exceeded the hop cap");
                return Err(SourceError::Transport(format!(
                    "continuation chain exceeded {MAX_CONTINUATION_HOPS} hops"
                )));
            }

            let envelope = self.get_envelope(url).await?;
            records.extend(envelope.value);
            next = match envelope.next_link {
                Some(link) => Some(Url::parse(&link).map_err(|err| {
                    SourceError::Decode(format!("continuation link {link} is not a valid url: {err}"))
                })?),
                None => None,
            };
        }

        Ok(records)
    }

    /// Fetch one page plus the filtered total, issuing both requests
    /// concurrently. A data failure is fatal; a count failure degrades the
    /// total to zero so the page stays usable.
    pub async fn fetch_page(&self, query: &str) -> Result<PageResult, SourceError> {
        let mut data_url = self.base_url.clone();
        data_url.set_query(Some(query));
        let count_url = self.count_url(query)?;

        let (envelope, total_rows) =
            tokio::join!(self.get_envelope(data_url), self.fetch_count(count_url));
        let envelope = envelope?;

        Ok(PageResult {
            rows: envelope.value,
            total_rows,
        })
    }

    async fn get_envelope(&self, url: Url) -> Result<ODataEnvelope, SourceError> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| SourceError::Transport(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!(
                "request to {url} returned status {status}"
            )));
        }

        response.json::<ODataEnvelope>().await.map_err(|err| {
            SourceError::Decode(format!("response from {url} is not a valid envelope: {err}"))
        })
    }

    // `<base>/$count`, carrying only the filter expression from the page
    // query so the total reflects the filtered set.
    fn count_url(&self, query: &str) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SourceError::Transport(format!("base url {} cannot carry path segments", self.base_url))
            })?
            .pop_if_empty()
            .push("$count");

        let filter = url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == "$filter")
            .map(|(_, value)| value.into_owned());
        if let Some(filter) = filter {
            url.query_pairs_mut().append_pair("$filter", &filter);
        }

        Ok(url)
    }

    async fn fetch_count(&self, url: Url) -> i64 {
        tracing::debug!(%url, "GET count");
        let response = match self.http.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%url, %err, "count request failed, degrading total to zero");
                return 0;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "count request rejected, degrading total to zero");
            return 0;
        }

        match response.text().await {
            Ok(body) => match body.trim().parse::<i64>() {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(%url, %err, "count body not an integer, degrading total to zero");
                    0
                }
            },
            Err(err) => {
                tracing::warn!(%url, %err, "count body unreadable, degrading total to zero");
                0
            }
        }
    }
}

#[async_trait]
impl PageSource for ODataClient {
    async fn fetch_page(&self, state: &ViewState) -> Result<PageResult, SourceError> {
        let query = translate(state, &self.columns);
        ODataClient::fetch_page(self, &query).await
    }

    async fn fetch_all(&self) -> Result<Vec<Record>, SourceError> {
        ODataClient::fetch_all(self).await
    }
}
