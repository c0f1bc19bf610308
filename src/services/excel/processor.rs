use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;

use super::types::{ColumnKind, LoadedSheet};
use super::utils::*;
use crate::error::AppError;
use crate::services::columns::{normalize_headers, NormalizeStyle};

/// Reads one worksheet into a typed DataFrame with normalized headers.
pub struct ExcelProcessor {
    style: NormalizeStyle,
}

impl ExcelProcessor {
    pub fn new(style: NormalizeStyle) -> Self {
        Self { style }
    }

    pub fn load(&self, path: &Path, sheet: Option<&str>) -> Result<LoadedSheet, AppError> {
        tracing::info!("Loading {}", path.display());
        let start = std::time::Instant::now();

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            AppError::FileRead(format!("{}: {}", path.display(), e))
        })?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        tracing::debug!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

        let sheet_name = match sheet {
            Some(wanted) => sheet_names
                .iter()
                .find(|name| name.as_str() == wanted)
                .cloned()
                .ok_or_else(|| {
                    AppError::FileRead(format!(
                        "sheet '{}' not found in {}. Available sheets: {}",
                        wanted,
                        path.display(),
                        sheet_names.join(", ")
                    ))
                })?,
            None => sheet_names.first().cloned().ok_or_else(|| {
                AppError::FileRead(format!("no sheets found in {}", path.display()))
            })?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| AppError::FileRead(format!("sheet '{}': {}", sheet_name, e)))?;
        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();

        let raw_headers: Vec<String> = rows
            .first()
            .map(|row| row.iter().map(cell_to_string).collect())
            .unwrap_or_default();
        if raw_headers.is_empty() {
            return Err(AppError::EmptySheet(sheet_name));
        }

        let headers = normalize_headers(&raw_headers, self.style);
        for (raw, normalized) in raw_headers.iter().zip(&headers) {
            tracing::debug!("Header {:?} -> '{}'", raw, normalized);
        }
        let dataframe = self.create_dataframe(&rows[1..], &headers)?;
        let string_cells = string_cell_masks(&rows[1..], &headers);
        tracing::info!(
            "Loaded sheet '{}': {} rows x {} columns in {:?}",
            sheet_name,
            dataframe.height(),
            dataframe.width(),
            start.elapsed()
        );

        Ok(LoadedSheet {
            sheet_name,
            dataframe,
            string_cells,
        })
    }

    /// `rows` excludes the header row. Zero rows yields a zero-height frame.
    pub fn create_dataframe(&self, rows: &[Vec<Data>], headers: &[String]) -> Result<DataFrame, AppError> {
        let mut columns = Vec::with_capacity(headers.len());

        for (col_idx, header) in headers.iter().enumerate() {
            let values: Vec<Data> = rows
                .iter()
                .map(|row| row.get(col_idx).cloned().unwrap_or(Data::Empty))
                .collect();

            let series = match detect_column_kind(&values) {
                ColumnKind::Numeric => {
                    let nums: Vec<Option<f64>> = values.iter().map(cell_to_f64).collect();
                    Series::new(header, nums)
                }
                ColumnKind::Boolean => {
                    let flags: Vec<Option<bool>> = values.iter().map(cell_to_bool).collect();
                    Series::new(header, flags)
                }
                ColumnKind::Text => {
                    let strings: Vec<Option<String>> = values.iter().map(cell_to_text).collect();
                    Series::new(header, strings)
                }
            };
            tracing::debug!("Column '{}' typed as {:?}", header, series.dtype());
            columns.push(series);
        }

        DataFrame::new(columns)
            .map_err(|e| AppError::DataFrame(format!("Failed to create DataFrame: {}", e)))
    }
}

/// Marks, per column, the rows whose cell is a string in the sheet itself.
pub fn string_cell_masks(rows: &[Vec<Data>], headers: &[String]) -> HashMap<String, Vec<bool>> {
    headers
        .iter()
        .enumerate()
        .map(|(col_idx, header)| {
            let mask = rows
                .iter()
                .map(|row| matches!(row.get(col_idx), Some(Data::String(_))))
                .collect();
            (header.clone(), mask)
        })
        .collect()
}
