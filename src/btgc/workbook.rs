// An in-memory spreadsheet document.

use std::collections::{BTreeMap, BTreeSet};

use bid_timing::{CellValue, GridSink, Spreadsheet, TimingErrors};
use log::debug;

/// One sheet. Rows and columns are 1-indexed.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: BTreeMap<(u32, u32), CellValue>,
    pub hidden_columns: BTreeSet<u32>,
    /// The index of the last column. It may be larger than the last filled column.
    pub width: u32,
    /// The number of columns that can be written, even if they are blank.
    pub capacity: u32,
}

impl Sheet {
    pub fn new(name: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            ..Sheet::default()
        }
    }

    pub fn set(&mut self, row: u32, column: u32, value: CellValue) {
        self.width = self.width.max(column);
        if value.is_blank() {
            self.cells.remove(&(row, column));
        } else {
            self.cells.insert((row, column), value);
        }
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.cells.get(&(row, column))
    }

    pub fn height(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }

    /// All the rows up to the last filled one, each padded to the width of the sheet.
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        (1..=self.height())
            .map(|r| {
                (1..=self.width)
                    .map(|c| self.get(r, c).cloned().unwrap_or(CellValue::Empty))
                    .collect()
            })
            .collect()
    }
}

impl GridSink for Sheet {
    fn write_cell(&mut self, row: u32, column: u32, value: &str) {
        self.set(row, column, CellValue::String(value.to_string()));
    }

    fn hide_column(&mut self, column: u32) {
        self.hidden_columns.insert(column);
    }

    fn last_column(&self) -> u32 {
        self.width
    }

    fn max_columns(&self) -> u32 {
        self.capacity.max(self.width)
    }
}

/// The sheets of a document, in display order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub active: Option<String>,
}

impl Workbook {
    pub fn new() -> Workbook {
        Workbook::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Adds a sheet, replacing the sheet with the same name if there is one.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        match self.sheet_mut(&sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }
}

impl Spreadsheet for Workbook {
    fn sheet_rows(&self, name: &str) -> Option<Vec<Vec<CellValue>>> {
        self.sheet(name).map(|s| s.rows())
    }

    fn insert_sheet(&mut self, name: &str, header: &[&str]) {
        let mut sheet = Sheet::new(name);
        for (idx, h) in header.iter().enumerate() {
            sheet.set(1, idx as u32 + 1, CellValue::String(h.to_string()));
        }
        self.add_sheet(sheet);
    }

    fn delete_sheet(&mut self, name: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.name != name);
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        before != self.sheets.len()
    }

    fn clone_sheet(&mut self, template: &str, name: &str) -> Result<(), TimingErrors> {
        let mut sheet = self
            .sheet(template)
            .cloned()
            .ok_or_else(|| TimingErrors::MissingTemplate(template.to_string()))?;
        debug!("clone_sheet: {:?} -> {:?}", template, name);
        sheet.name = name.to_string();
        self.add_sheet(sheet);
        Ok(())
    }

    fn grid(&mut self, name: &str) -> Option<&mut dyn GridSink> {
        self.sheet_mut(name).map(|s| s as &mut dyn GridSink)
    }

    fn activate_sheet(&mut self, name: &str) {
        self.active = Some(name.to_string());
    }
}
