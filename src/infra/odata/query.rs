//! View state → OData v4 query string.

use url::form_urlencoded;

use crate::domain::entities::table::{
    ColumnSpec, DataType, FilterClause, FilterRelation, SortClause, SortDirection, ViewState,
};

/// Translate the view state into a percent-encoded query string. The base
/// resource path is the caller's concern and is never altered here.
pub fn translate(state: &ViewState, columns: &[ColumnSpec]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("$count", "true");
    serializer.append_pair("$top", &state.page_size.to_string());
    serializer.append_pair("$skip", &((state.page - 1) * state.page_size).to_string());

    if let Some(order_by) = order_by(&state.sorters) {
        serializer.append_pair("$orderby", &order_by);
    }
    if let Some(filter) = filter_expression(&state.filters, columns) {
        serializer.append_pair("$filter", &filter);
    }

    serializer.finish()
}

fn order_by(sorters: &[SortClause]) -> Option<String> {
    if sorters.is_empty() {
        return None;
    }
    let clauses: Vec<String> = sorters
        .iter()
        .map(|sorter| {
            let direction = match sorter.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            format!("{} {direction}", sorter.column)
        })
        .collect();
    Some(clauses.join(","))
}

fn filter_expression(filters: &[FilterClause], columns: &[ColumnSpec]) -> Option<String> {
    let clauses: Vec<String> = filters
        .iter()
        .filter_map(|clause| render_clause(clause, columns))
        .filter(|clause| !clause.is_empty())
        .collect();
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}

fn render_clause(clause: &FilterClause, columns: &[ColumnSpec]) -> Option<String> {
    // Columns missing from the map translate as strings, matching local
    // mode's stringify-everything semantics.
    let data_type = columns
        .iter()
        .find(|column| column.id == clause.column)
        .map(|column| column.data_type)
        .unwrap_or(DataType::String);

    match data_type {
        DataType::Number => {
            let value = clause.value.trim();
            if clause.relation != FilterRelation::Equals || value.parse::<f64>().is_err() {
                tracing::debug!(
                    column = %clause.column,
                    value = %clause.value,
                    "dropping non-equality or non-numeric filter on numeric column"
                );
                return None;
            }
            Some(format!("{} eq {value}", clause.column))
        }
        DataType::String => {
            // Protocol string-literal convention: single quotes double.
            let literal = clause.value.replace('\'', "''");
            let rendered = match clause.relation {
                FilterRelation::Equals => {
                    format!("tolower({}) eq tolower('{literal}')", clause.column)
                }
                FilterRelation::Contains => {
                    format!("contains(tolower({}), tolower('{literal}'))", clause.column)
                }
                FilterRelation::StartsWith => {
                    format!("startswith(tolower({}), tolower('{literal}'))", clause.column)
                }
            };
            Some(rendered)
        }
    }
}
