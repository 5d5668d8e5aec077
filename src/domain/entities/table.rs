use serde_json::Value;

/// One row of the table: an opaque mapping from column id to scalar value.
/// Replaced wholesale on refresh, never edited in place.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub id: String,
    pub caption: String,
    pub data_type: DataType,
    pub filterable: bool,
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(id: &str, caption: &str, data_type: DataType) -> Self {
        Self {
            id: id.to_string(),
            caption: caption.to_string(),
            data_type,
            filterable: false,
            sortable: false,
        }
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRelation {
    Equals,
    Contains,
    StartsWith,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub column: String,
    pub relation: FilterRelation,
    pub value: String,
}

impl FilterClause {
    pub fn new(column: &str, relation: FilterRelation, value: &str) -> Self {
        Self {
            column: column.to_string(),
            relation,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub column: String,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self {
            column: column.to_string(),
            direction,
        }
    }
}

/// The page/filter/sort selection driving what is displayed. Owned
/// exclusively by the controller; every field always holds a legal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page: i64,
    pub page_size: i64,
    pub filters: Vec<FilterClause>,
    pub sorters: Vec<SortClause>,
}

impl ViewState {
    pub fn new(page_size: i64) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            filters: Vec::new(),
            sorters: Vec::new(),
        }
    }
}

/// One page of results. `total_rows` counts the full filtered set, not just
/// the returned slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    pub rows: Vec<Record>,
    pub total_rows: i64,
}

/// Outbound emission to the UI collaborator after every evaluation settles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableUpdate {
    pub rows: Vec<Record>,
    pub total_rows: i64,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Inbound operations from the UI collaborator, as a closed set of variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRequest {
    PageChange(i64),
    FilterChange(Vec<FilterClause>),
    SortChange(Vec<SortClause>),
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub columns: Vec<ColumnSpec>,
    pub page_size: i64,
    pub key_column: Option<String>,
}

impl TableConfig {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            page_size: crate::DEFAULT_PAGE_SIZE,
            key_column: None,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_key_column(mut self, key_column: &str) -> Self {
        self.key_column = Some(key_column.to_string());
        self
    }

    pub fn data_type_of(&self, column_id: &str) -> Option<DataType> {
        self.columns
            .iter()
            .find(|column| column.id == column_id)
            .map(|column| column.data_type)
    }

    /// Identity of a row: the configured key column, falling back to a
    /// generic `id` field.
    pub fn record_key(&self, record: &Record) -> Option<String> {
        let key_column = self.key_column.as_deref().unwrap_or("id");
        let key = cell_text(record, key_column);
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

/// Stringify a field for display and comparison. Missing and null fields are
/// empty, never a match-all.
pub fn cell_text(record: &Record, column_id: &str) -> String {
    match record.get(column_id) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().expect("fixture should be an object").clone()
    }

    #[test]
    fn cell_text_stringifies_scalars_and_blanks_missing_fields() {
        let row = record(json!({ "Name": "Scott", "Age": 25, "MiddleName": null }));

        assert_eq!(cell_text(&row, "Name"), "Scott");
        assert_eq!(cell_text(&row, "Age"), "25");
        assert_eq!(cell_text(&row, "MiddleName"), "");
        assert_eq!(cell_text(&row, "Missing"), "");
    }

    #[test]
    fn record_key_prefers_configured_column_and_falls_back_to_id() {
        let config = TableConfig::new(Vec::new()).with_key_column("UserName");
        let row = record(json!({ "UserName": "scottketchum", "id": "42" }));
        assert_eq!(config.record_key(&row), Some("scottketchum".to_string()));

        let fallback = TableConfig::new(Vec::new());
        let row = record(json!({ "id": "42" }));
        assert_eq!(fallback.record_key(&row), Some("42".to_string()));

        let row = record(json!({ "Other": "x" }));
        assert_eq!(fallback.record_key(&row), None);
    }
}
