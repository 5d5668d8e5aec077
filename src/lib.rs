//! Remote tabular data engine: owns paging/filter/sort view state, runs the
//! processing either locally over a cached dataset or by delegating to an
//! OData-style remote service, and emits `{rows, total_rows, is_loading,
//! error}` updates for a UI collaborator to render.
//!
//! Typical server-mode wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use odata_grid::{ColumnSpec, DataType, ODataClient, TableConfig, TableController};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let columns = vec![
//!     ColumnSpec::new("UserName", "User Name", DataType::String).filterable().sortable(),
//!     ColumnSpec::new("Age", "Age", DataType::Number).sortable(),
//! ];
//! let base_url = url::Url::parse("https://services.example.org/People")?;
//! let client = ODataClient::new(base_url, columns.clone())?;
//!
//! let controller = TableController::remote(
//!     TableConfig::new(columns).with_key_column("UserName"),
//!     Arc::new(client),
//! );
//! let mut updates = controller.subscribe();
//! controller.refresh().await;
//! println!("{} rows", updates.borrow_and_update().rows.len());
//! # Ok(())
//! # }
//! ```
//!
//! In local mode the engine holds the full dataset itself; fetch it once
//! (for example with [`ODataClient::fetch_all`]) and hand it to
//! [`TableController::load_all`].

pub mod domain;
pub mod infra;
pub mod usecase;

pub use domain::entities::table::{
    cell_text, ColumnSpec, DataType, FilterClause, FilterRelation, PageResult, Record, SortClause,
    SortDirection, TableConfig, TableRequest, TableUpdate, ViewState,
};
pub use domain::process::process;
pub use infra::odata::client::{ODataClient, MAX_CONTINUATION_HOPS};
pub use infra::odata::query::translate;
pub use usecase::ports::source::{PageSource, SourceError};
pub use usecase::services::table_controller::{ControlError, TableController};

/// Default rows per page when the configuration does not say otherwise.
pub const DEFAULT_PAGE_SIZE: i64 = 8;
