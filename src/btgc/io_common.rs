use std::path::Path;

use bid_timing::{CellValue, GenerationRules, HEADER_ROW};
use log::warn;

use crate::btgc::workbook::Sheet;

/// `responses.xlsx` -> `responses_timings.xlsx`, in the same directory.
pub fn default_output_path(input: &str) -> String {
    let p = Path::new(input);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("responses");
    p.with_file_name(format!("{}_timings.xlsx", stem))
        .display()
        .to_string()
}

pub fn is_csv(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

pub fn read_cell_calamine(cell: &calamine::DataType) -> CellValue {
    match cell {
        calamine::DataType::String(s) => CellValue::String(s.clone()),
        calamine::DataType::Float(f) => CellValue::Number(*f),
        calamine::DataType::Int(i) => CellValue::Number(*i as f64),
        calamine::DataType::Bool(b) => CellValue::Bool(*b),
        // Serial date numbers, as stored in the sheet.
        calamine::DataType::DateTime(f) => CellValue::Number(*f),
        calamine::DataType::Empty => CellValue::Empty,
        #[allow(unreachable_patterns)]
        _ => {
            warn!("read_cell_calamine: could not understand cell {:?}", cell);
            CellValue::Empty
        }
    }
}

/// A template with the timeslot labels in the first column and
/// `template_columns` columns for the days.
pub fn default_template(rules: &GenerationRules, template_columns: u32) -> Sheet {
    let mut sheet = Sheet::new(&rules.template_sheet);
    sheet.set(HEADER_ROW, 1, CellValue::String("Timeslot".to_string()));
    for (label, row) in rules.timeslots.entries() {
        sheet.set(*row, 1, CellValue::String(label.clone()));
    }
    sheet.width = sheet.width.max(template_columns);
    sheet.capacity = template_columns;
    sheet
}
