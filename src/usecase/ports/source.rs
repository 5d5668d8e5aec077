use async_trait::async_trait;

use crate::domain::entities::table::{PageResult, Record, ViewState};

/// Failure surfaced by a page source. The UI collaborator renders a generic
/// failure state either way; the split exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("decode failure: {0}")]
    Decode(String),
}

/// The seam between the state controller and the remote service. The
/// controller never sees query strings or wire envelopes.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page described by `state`, delegating filter/sort/paginate
    /// to the backing service.
    async fn fetch_page(&self, state: &ViewState) -> Result<PageResult, SourceError>;

    /// Fetch the entire record set, following server continuation links.
    /// All-or-nothing: a failing hop discards everything accumulated.
    async fn fetch_all(&self) -> Result<Vec<Record>, SourceError>;
}
