use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::types::ColumnKind;

/// Header and text cells as strings; empty cells become "".
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(d) => excel_serial_to_datetime(d.as_f64())
            .map(|dt| format_datetime(&dt))
            .unwrap_or_else(|| d.as_f64().to_string()),
        other => other.to_string(),
    }
}

pub fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => Some(cell_to_string(other)),
    }
}

pub fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

pub fn cell_to_bool(cell: &Data) -> Option<bool> {
    match cell {
        Data::Bool(b) => Some(*b),
        _ => None,
    }
}

/// A column is numeric or boolean only when every non-empty cell is.
pub fn detect_column_kind(values: &[Data]) -> ColumnKind {
    let mut numeric_count = 0;
    let mut bool_count = 0;
    let mut total_count = 0;

    for value in values.iter().filter(|v| !matches!(v, Data::Empty)) {
        total_count += 1;
        match value {
            Data::Float(_) | Data::Int(_) => numeric_count += 1,
            Data::Bool(_) => bool_count += 1,
            _ => {}
        }
    }

    match () {
        _ if total_count == 0 => ColumnKind::Text,
        _ if numeric_count == total_count => ColumnKind::Numeric,
        _ if bool_count == total_count => ColumnKind::Boolean,
        _ => ColumnKind::Text,
    }
}

/// Excel serial day number (1900 date system) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
