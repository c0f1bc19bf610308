use std::path::{Path, PathBuf};

use polars::prelude::*;
use umya_spreadsheet::Worksheet;

use crate::error::AppError;

/// Writes a DataFrame as a single-sheet xlsx workbook.
pub struct ExcelWriter {
    sheet_name: String,
}

impl ExcelWriter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    /// The workbook is written next to `path` first and renamed into place,
    /// so an existing file is either fully replaced or left untouched.
    pub fn save(&self, df: &DataFrame, path: &Path) -> Result<(), AppError> {
        tracing::info!("Writing {} rows x {} columns to {}", df.height(), df.width(), path.display());

        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        if !self.sheet_name.is_empty() {
            sheet.set_name(self.sheet_name.clone());
        }
        fill_sheet(sheet, df)?;

        let staging = staging_path(path);
        umya_spreadsheet::writer::xlsx::write(&book, &staging).map_err(|e| {
            tracing::error!("Failed to write {}: {}", staging.display(), e);
            AppError::FileWrite(format!("{}: {}", path.display(), e))
        })?;
        std::fs::rename(&staging, path).map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            AppError::FileWrite(format!("{}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

fn fill_sheet(sheet: &mut Worksheet, df: &DataFrame) -> Result<(), AppError> {
    for (col_idx, series) in df.get_columns().iter().enumerate() {
        let col = col_idx as u32 + 1;
        sheet.get_cell_mut((col, 1)).set_value_string(series.name());

        match series.dtype() {
            DataType::Float64 => {
                for (row_idx, value) in series.f64()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        sheet.get_cell_mut((col, row_idx as u32 + 2)).set_value_number(v);
                    }
                }
            }
            DataType::Boolean => {
                for (row_idx, value) in series.bool()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        sheet.get_cell_mut((col, row_idx as u32 + 2)).set_value_bool(v);
                    }
                }
            }
            _ => {
                let strings = series.cast(&DataType::String)?;
                for (row_idx, value) in strings.str()?.into_iter().enumerate() {
                    if let Some(v) = value {
                        sheet.get_cell_mut((col, row_idx as u32 + 2)).set_value_string(v);
                    }
                }
            }
        }
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.xlsx".to_string());
    path.with_file_name(format!(".{}.partial", file_name))
}
