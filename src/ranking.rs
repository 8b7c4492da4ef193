use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::table::{Cell, Column, Table, compare_cells};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = DataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "up" => Ok(SortDirection::Ascending),
            "desc" | "descending" | "down" => Ok(SortDirection::Descending),
            other => Err(DataError::invalid(format!("unknown sort direction {other:?}"))),
        }
    }
}

/// Ordering key over a materialized table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Ordering key over typed rows: an extractor plus a direction.
pub struct OrderKey<'a, T> {
    extract: Box<dyn Fn(&T) -> Cell + 'a>,
    direction: SortDirection,
}

impl<'a, T> OrderKey<'a, T> {
    pub fn new(direction: SortDirection, extract: impl Fn(&T) -> Cell + 'a) -> Self {
        Self {
            extract: Box::new(extract),
            direction,
        }
    }

    pub fn asc(extract: impl Fn(&T) -> Cell + 'a) -> Self {
        Self::new(SortDirection::Ascending, extract)
    }

    pub fn desc(extract: impl Fn(&T) -> Cell + 'a) -> Self {
        Self::new(SortDirection::Descending, extract)
    }
}

pub fn compare_by<T>(a: &T, b: &T, keys: &[OrderKey<'_, T>]) -> Ordering {
    for key in keys {
        let ord = key
            .direction
            .apply(compare_cells(&(key.extract)(a), &(key.extract)(b)));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Stable multi-key sort: rows equal on every key keep their input order.
pub fn sort_stable<T>(rows: &mut [T], keys: &[OrderKey<'_, T>]) {
    rows.sort_by(|a, b| compare_by(a, b, keys));
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub rank: usize,
    pub row: T,
}

/// Partition `rows` by `group_key`, order each partition by `keys`, and number the rows
/// 1, 2, 3... within each partition. Rows tied on every key get distinct numbers in
/// input order. Partitions come out in order of first appearance.
pub fn partition_rank<T, G>(
    rows: Vec<T>,
    group_key: impl Fn(&T) -> G,
    keys: &[OrderKey<'_, T>],
) -> Vec<Ranked<T>>
where
    G: Eq + Hash,
{
    let mut slots: HashMap<G, usize> = HashMap::new();
    let mut groups: Vec<Vec<T>> = Vec::new();
    for row in rows {
        let slot = *slots.entry(group_key(&row)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }

    let mut out = Vec::new();
    for mut group in groups {
        sort_stable(&mut group, keys);
        out.extend(
            group
                .into_iter()
                .enumerate()
                .map(|(idx, row)| Ranked { rank: idx + 1, row }),
        );
    }
    out
}

/// Rows holding position `rank` (1-based) in their partition.
pub fn rows_at_rank<T, G>(
    rows: Vec<T>,
    group_key: impl Fn(&T) -> G,
    keys: &[OrderKey<'_, T>],
    rank: usize,
) -> Vec<T>
where
    G: Eq + Hash,
{
    partition_rank(rows, group_key, keys)
        .into_iter()
        .filter(|r| r.rank == rank)
        .map(|r| r.row)
        .collect()
}

/// Best row per partition.
pub fn top_per_group<T, G>(
    rows: Vec<T>,
    group_key: impl Fn(&T) -> G,
    keys: &[OrderKey<'_, T>],
) -> Vec<T>
where
    G: Eq + Hash,
{
    rows_at_rank(rows, group_key, keys, 1)
}

fn resolve_keys<'a>(table: &Table, keys: &[SortKey]) -> Result<Vec<OrderKey<'a, Vec<Cell>>>, DataError> {
    keys.iter()
        .map(|key| {
            let idx = table
                .column_index(&key.column)
                .ok_or_else(|| DataError::invalid(format!("unknown column {:?}", key.column)))?;
            Ok(OrderKey::new(key.direction, move |row: &Vec<Cell>| {
                row.get(idx).cloned().unwrap_or(Cell::Null)
            }))
        })
        .collect()
}

/// Stable sort of a table's rows by column keys.
pub fn sort_table(table: &Table, keys: &[SortKey]) -> Result<Table, DataError> {
    let order = resolve_keys(table, keys)?;
    let mut rows = table.rows.clone();
    sort_stable(&mut rows, &order);
    Ok(table.with_rows(rows))
}

/// Table form of [`partition_rank`]: appends a `rank` column, and keeps only rows at
/// `only_rank` when given.
// Partition key for a cell. Text and numbers never share a group, and numbers group by
// value, so Int(1) and Float(1.0) land together as they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Null,
    Int(i64),
    Float(u64),
    Text(String),
}

impl GroupKey {
    fn of(cell: &Cell) -> Self {
        match cell {
            Cell::Null => GroupKey::Null,
            Cell::Int(v) => GroupKey::Int(*v),
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => GroupKey::Int(*v as i64),
            Cell::Float(v) => GroupKey::Float(v.to_bits()),
            Cell::Text(v) => GroupKey::Text(v.clone()),
        }
    }
}

pub fn rank_table(
    table: &Table,
    group_column: &str,
    keys: &[SortKey],
    only_rank: Option<usize>,
) -> Result<Table, DataError> {
    let group_idx = table
        .column_index(group_column)
        .ok_or_else(|| DataError::invalid(format!("unknown column {group_column:?}")))?;
    let order = resolve_keys(table, keys)?;
    let ranked = partition_rank(
        table.rows.clone(),
        |row| GroupKey::of(row.get(group_idx).unwrap_or(&Cell::Null)),
        &order,
    );

    let mut columns = table.columns.clone();
    columns.push(Column::int("rank"));
    let mut out = Table::new(columns);
    out.default_order = table.default_order.clone();
    out.search_columns = table.search_columns.clone();
    for Ranked { rank, mut row } in ranked {
        if only_rank.is_some_and(|n| n != rank) {
            continue;
        }
        row.push(Cell::from(rank));
        out.push_row(row);
    }
    Ok(out)
}
