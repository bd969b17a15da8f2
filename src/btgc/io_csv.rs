// Form responses exported as CSV.

use bid_timing::CellValue;
use log::debug;
use snafu::prelude::*;

use crate::btgc::workbook::Sheet;
use crate::btgc::*;

/// Reads all the records of a CSV file into a sheet. The header is kept as
/// the first row.
pub fn read_csv_sheet(path: &str, sheet_name: &str) -> BtgcResult<Sheet> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut sheet = Sheet::new(sheet_name);
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        debug!("read_csv_sheet: lineno: {:?} fields: {:?}", lineno, line.len());
        for (col, field) in line.iter().enumerate() {
            sheet.set(
                lineno as u32,
                col as u32 + 1,
                CellValue::String(field.to_string()),
            );
        }
    }
    Ok(sheet)
}
