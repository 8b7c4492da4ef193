use crate::error::DataError;
use crate::ranking::{SortDirection, SortKey, sort_table};
use crate::table::{ColumnKind, Table};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// User-driven view over a report: search, optional sort override, pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub search: Option<String>,
    pub sort_column: Option<String>,
    /// Ignored unless `sort_column` is set.
    pub sort_direction: SortDirection,
    pub page_size: usize,
    /// 1-based; clamped to the last page.
    pub page: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            search: None,
            sort_column: None,
            sort_direction: SortDirection::Descending,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage {
    /// Rows of the requested page.
    pub rows: Table,
    /// Filtered and sorted, unpaged. This is what gets exported.
    pub full: Table,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Page(ViewPage),
    /// Nothing matched (or the report had no rows). `full` carries the columns.
    Empty { full: Table },
}

impl ViewOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ViewOutcome::Empty { .. })
    }

    pub fn total_pages(&self) -> usize {
        match self {
            ViewOutcome::Page(p) => p.total_pages,
            ViewOutcome::Empty { .. } => 1,
        }
    }

    pub fn page_rows(&self) -> &Table {
        match self {
            ViewOutcome::Page(p) => &p.rows,
            ViewOutcome::Empty { full } => full,
        }
    }

    pub fn full(&self) -> &Table {
        match self {
            ViewOutcome::Page(p) => &p.full,
            ViewOutcome::Empty { full } => full,
        }
    }
}

/// ceil(rows / page_size), never less than 1.
pub fn page_count(rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    rows.div_ceil(page_size).max(1)
}

fn search_filter(table: &Table, needle: &str) -> Table {
    let needle = needle.to_lowercase();
    let cols: Vec<usize> = if table.search_columns.is_empty() {
        table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ColumnKind::Text)
            .map(|(idx, _)| idx)
            .collect()
    } else {
        table
            .search_columns
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect()
    };

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            cols.iter().any(|idx| {
                row.get(*idx)
                    .and_then(|c| c.as_text())
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Filter, sort, then paginate `table`. Filtering and sorting always see the whole table;
/// pagination only slices. A sort override keeps the report's own ordering keys as
/// tie-breakers, then the current row order.
pub fn apply_view(table: &Table, params: &ViewParams) -> Result<ViewOutcome, DataError> {
    if params.page_size == 0 {
        return Err(DataError::invalid("page size must be at least 1"));
    }
    if params.page == 0 {
        return Err(DataError::invalid("page numbers start at 1"));
    }
    if let Some(col) = params.sort_column.as_deref()
        && table.column_index(col).is_none()
    {
        return Err(DataError::invalid(format!(
            "unknown sort column {col:?} (expected one of {})",
            table.column_names().join(", ")
        )));
    }

    let filtered = match params.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => search_filter(table, needle),
        _ => table.clone(),
    };
    if filtered.is_empty() {
        return Ok(ViewOutcome::Empty { full: filtered });
    }

    let full = match params.sort_column.as_deref() {
        Some(col) => {
            let mut keys = vec![SortKey {
                column: col.to_string(),
                direction: params.sort_direction,
            }];
            keys.extend(
                table
                    .default_order
                    .iter()
                    .filter(|k| k.column != col)
                    .cloned(),
            );
            sort_table(&filtered, &keys)?
        }
        None => filtered,
    };

    let total_pages = page_count(full.len(), params.page_size);
    let page = params.page.min(total_pages);
    let start = (page - 1) * params.page_size;
    let end = (start + params.page_size).min(full.len());
    let rows = full.with_rows(full.rows[start..end].to_vec());

    Ok(ViewOutcome::Page(ViewPage {
        rows,
        full,
        page,
        total_pages,
    }))
}
