// Reading and writing Excel workbooks.

use bid_timing::CellValue;
use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::{debug, info};
use rust_xlsxwriter::Format;
use snafu::prelude::*;

use crate::btgc::io_common::read_cell_calamine;
use crate::btgc::workbook::{Sheet, Workbook};
use crate::btgc::*;

/// Reads all the sheets of a workbook.
pub fn read_workbook(path: &str) -> BtgcResult<Workbook> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let names: Vec<String> = workbook.sheet_names().to_owned();
    debug!("read_workbook: path: {:?} sheets: {:?}", path, names);

    let mut book = Workbook::new();
    for name in names.iter() {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingSheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        book.add_sheet(range_to_sheet(name, &wrange));
    }
    book.active = names.first().cloned();
    Ok(book)
}

/// Reads one sheet of a workbook: the sheet with the given name, or else the
/// only sheet of the workbook.
pub fn read_sheet(path: &str, name: &str) -> BtgcResult<Sheet> {
    let mut book = read_workbook(path)?;
    if let Some(pos) = book.sheets.iter().position(|s| s.name == name) {
        return Ok(book.sheets.swap_remove(pos));
    }
    match book.sheets.len() {
        1 => {
            let mut sheet = book.sheets.remove(0);
            debug!("read_sheet: using {:?} as {:?}", sheet.name, name);
            sheet.name = name.to_string();
            Ok(sheet)
        }
        _ => MissingSheetSnafu { name, path }.fail(),
    }
}

fn range_to_sheet(name: &str, wrange: &Range<DataType>) -> Sheet {
    let mut sheet = Sheet::new(name);
    // Ranges start at the first filled cell, not at A1.
    let (row0, col0) = wrange.start().unwrap_or((0, 0));
    let (_, width) = wrange.get_size();
    for (r_idx, row) in wrange.rows().enumerate() {
        for (c_idx, cell) in row.iter().enumerate() {
            let value = read_cell_calamine(cell);
            if !value.is_blank() {
                sheet.set(row0 + r_idx as u32 + 1, col0 + c_idx as u32 + 1, value);
            }
        }
    }
    sheet.width = sheet.width.max(col0 + width as u32);
    sheet
}

/// Writes the workbook. Cells spanning several lines are wrapped.
pub fn write_workbook(book: &Workbook, path: &str) -> BtgcResult<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let wrap = Format::new().set_text_wrap();

    for sheet in book.sheets.iter() {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .context(SavingExcelSnafu { path })?;
        for ((row, col), value) in sheet.cells.iter() {
            let (r, c) = (row - 1, (col - 1) as u16);
            match value {
                CellValue::String(s) if s.contains('\n') => {
                    worksheet.write_string_with_format(r, c, s, &wrap)
                }
                CellValue::String(s) => worksheet.write_string(r, c, s),
                CellValue::Number(n) => worksheet.write_number(r, c, *n),
                CellValue::Bool(b) => worksheet.write_boolean(r, c, *b),
                CellValue::Empty => continue,
            }
            .context(SavingExcelSnafu { path })?;
        }
        for col in sheet.hidden_columns.iter() {
            worksheet
                .set_column_hidden((col - 1) as u16)
                .context(SavingExcelSnafu { path })?;
        }
        if book.active.as_deref() == Some(sheet.name.as_str()) {
            worksheet.set_active(true);
        }
    }

    workbook.save(path).context(SavingExcelSnafu { path })?;
    info!("Wrote {} sheets to {:?}", book.sheets.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bid_timing::GridSink;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx").display().to_string();

        let mut book = Workbook::new();
        let mut responses = Sheet::new("Form Responses");
        responses.set(1, 3, CellValue::String("Company".to_string()));
        responses.set(2, 3, CellValue::String("Acme".to_string()));
        responses.set(2, 4, CellValue::Number(30.0));
        book.add_sheet(responses);
        let mut out = Sheet::new("Cookhouse Timings");
        out.write_cell(8, 3, "Acme (30)\nBravo (12)");
        out.hide_column(5);
        book.add_sheet(out);
        book.active = Some("Cookhouse Timings".to_string());

        write_workbook(&book, &path).unwrap();
        let read = read_workbook(&path).unwrap();

        let names: Vec<&str> = read.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Form Responses", "Cookhouse Timings"]);
        let responses = read.sheet("Form Responses").unwrap();
        assert_eq!(responses.get(2, 3).map(|c| c.to_string()), Some("Acme".to_string()));
        assert_eq!(responses.get(2, 4).map(|c| c.to_string()), Some("30".to_string()));
        let out = read.sheet("Cookhouse Timings").unwrap();
        assert_eq!(
            out.get(8, 3).map(|c| c.to_string()),
            Some("Acme (30)\nBravo (12)".to_string())
        );
    }

    #[test]
    fn missing_workbook() {
        let res = read_workbook("/nonexistent/book.xlsx");
        assert!(matches!(res, Err(BtgcError::OpeningExcel { .. })));
    }
}
