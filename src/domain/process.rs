//! Local-mode filter/sort/paginate over an in-memory record set.

use std::cmp::Ordering;

use serde_json::Value;

use crate::domain::entities::table::{
    cell_text, FilterClause, FilterRelation, PageResult, Record, SortClause, SortDirection,
};

/// Apply filters, sorters, and pagination to `records`. Pure and
/// deterministic; `page` is clamped into the valid range and `page_size` is
/// floored at 1, so every input yields a well-formed page.
pub fn process(
    records: &[Record],
    filters: &[FilterClause],
    sorters: &[SortClause],
    page: i64,
    page_size: i64,
) -> PageResult {
    let page_size = page_size.max(1);

    let mut filtered: Vec<&Record> = records
        .iter()
        .filter(|record| filters.iter().all(|clause| matches_clause(record, clause)))
        .collect();

    if !sorters.is_empty() {
        filtered.sort_by(|a, b| compare_records(a, b, sorters));
    }

    let total_rows = filtered.len() as i64;
    let page_count = ((total_rows + page_size - 1) / page_size).max(1);
    let page = page.clamp(1, page_count);

    let start = ((page - 1) * page_size) as usize;
    let end = (start + page_size as usize).min(filtered.len());
    let rows = if start < filtered.len() {
        filtered[start..end].iter().map(|record| (*record).clone()).collect()
    } else {
        Vec::new()
    };

    PageResult { rows, total_rows }
}

fn matches_clause(record: &Record, clause: &FilterClause) -> bool {
    let field = cell_text(record, &clause.column).to_lowercase();
    let term = clause.value.to_lowercase();
    match clause.relation {
        FilterRelation::Equals => field == term,
        FilterRelation::Contains => field.contains(&term),
        FilterRelation::StartsWith => field.starts_with(&term),
    }
}

fn compare_records(a: &Record, b: &Record, sorters: &[SortClause]) -> Ordering {
    for sorter in sorters {
        let ordering = compare_values(a.get(&sorter.column), b.get(&sorter.column));
        let ordering = match sorter.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// Numeric comparison when both operands are numbers, lexical otherwise.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if let (Some(Value::Number(a)), Some(Value::Number(b))) = (a, b) {
        let a = a.as_f64().unwrap_or(0.0);
        let b = b.as_f64().unwrap_or(0.0);
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    value_text(a).cmp(&value_text(b))
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
