use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::info;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::DataError;
use crate::reports::ReportKind;
use crate::table::{Cell, Table};

/// CSV text with a header row of the column names. Nulls are empty fields.
pub fn to_csv_string(table: &Table) -> Result<String, DataError> {
    encode_csv(table).map_err(|err| DataError::Export(format!("{err:#}")))
}

fn encode_csv(table: &Table) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .context("write csv header")?;
    for (idx, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(|c| c.to_string()))
            .with_context(|| format!("write csv row {idx}"))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("flush csv: {}", err.error()))?;
    String::from_utf8(bytes).context("csv is not utf-8")
}

pub fn write_csv(path: &Path, table: &Table) -> Result<(), DataError> {
    let body = to_csv_string(table)?;
    fs::write(path, body)
        .map_err(|err| DataError::Export(format!("write {}: {err}", path.display())))?;
    info!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write each report as `<dir>/<report file name>`.
pub fn write_csv_dir(dir: &Path, tables: &[(ReportKind, Table)]) -> Result<usize, DataError> {
    fs::create_dir_all(dir)
        .map_err(|err| DataError::Export(format!("create {}: {err}", dir.display())))?;
    for (kind, table) in tables {
        write_csv(&dir.join(kind.file_name()), table)?;
    }
    Ok(tables.len())
}

/// One worksheet per table. Sheet names are truncated to Excel's 31 characters.
pub fn write_workbook(path: &Path, sheets: &[(String, &Table)]) -> Result<(), DataError> {
    build_workbook(path, sheets).map_err(|err| DataError::Export(format!("{err:#}")))?;
    info!("wrote {} sheets to {}", sheets.len(), path.display());
    Ok(())
}

fn build_workbook(path: &Path, sheets: &[(String, &Table)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, table) in sheets {
        let sheet = workbook.add_worksheet();
        let name: String = name.chars().take(31).collect();
        sheet
            .set_name(&name)
            .with_context(|| format!("sheet name {name:?}"))?;
        write_table(sheet, table)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col_idx, name) in table.column_names().into_iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, name)
            .with_context(|| format!("write header {col_idx}"))?;
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let row_idx = (idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_idx = col_idx as u16;
            match cell {
                Cell::Text(s) => worksheet.write_string(row_idx, col_idx, s).map(|_| ()),
                Cell::Int(v) => worksheet.write_number(row_idx, col_idx, *v as f64).map(|_| ()),
                Cell::Float(v) => worksheet.write_number(row_idx, col_idx, *v).map(|_| ()),
                Cell::Null => Ok(()),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
