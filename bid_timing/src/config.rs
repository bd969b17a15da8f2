// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

/// The number of consecutive days in a bidding week.
pub const DAYS_PER_WEEK: usize = 7;

/// The value held by one cell of a spreadsheet row.
///
/// This is the library's view of a cell, independent of the file format it
/// was read from.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    String(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// True for cells that carry no bid: empty cells and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => write!(f, "{}", s),
            // Spreadsheets store every number as a float. Whole numbers are
            // displayed without their fractional part.
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// A fixed time range, such as `0530 - 0610`.
pub type TimeslotLabel = String;

/// The identifier of a bidding week. It starts with a DDMMYY date.
pub type WeekKey = String;

/// One bidder's claim on a timeslot for one day.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Bid {
    /// `<company> (<eating strength>)`
    pub info: String,
    pub timeslot: TimeslotLabel,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Day {
    pub bids: Vec<Bid>,
}

/// Seven consecutive days of bids.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Week {
    pub days: [Day; DAYS_PER_WEEK],
}

/// What to do with rows that miss their company or eating strength.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RowStrictness {
    /// The missing values are rendered as `undefined`.
    Placeholder,
    /// The run fails before anything is written.
    Reject,
}

// ******** Output data structures *********

/// Text compiled for one day: the occupants of each timeslot, in the order
/// in which the timeslots were first seen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CompiledTimeslot {
    pub(crate) entries: Vec<(TimeslotLabel, String)>,
}

impl CompiledTimeslot {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, info)| info.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, i)| (l.as_str(), i.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The contents written for one day.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DayColumn {
    pub column: u32,
    pub date: NaiveDate,
    pub header: String,
    /// (label, row, text) for every written timeslot, sorted by row.
    pub slots: Vec<(TimeslotLabel, u32, String)>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TimingSheet {
    pub sheet_name: String,
    pub week_keys: Vec<WeekKey>,
    pub columns: Vec<DayColumn>,
    pub hidden_columns: Vec<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AbortReason {
    MissingInput,
    EmptyInput,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GenerationOutcome {
    Generated(TimingSheet),
    /// Nothing was generated. The user has been notified.
    Aborted(AbortReason),
}

/// Errors that prevent a timing sheet from being generated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TimingErrors {
    /// No week could be built out of the entries.
    NoWeeks,
    InvalidWeekKey(WeekKey),
    MalformedRow { lineno: usize, reason: String },
    DuplicateTimeslot(TimeslotLabel),
    DuplicateRow(u32),
    InvalidTimeslotRow(TimeslotLabel, u32),
    InvalidLayout(String),
    MissingTemplate(String),
    MissingOutput(String),
    GridTooNarrow { needed: u32, available: u32 },
}

impl Error for TimingErrors {}

impl Display for TimingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingErrors::NoWeeks => write!(f, "no week found in the bidding entries"),
            TimingErrors::InvalidWeekKey(k) => {
                write!(f, "week {:?} does not start with a DDMMYY date", k)
            }
            TimingErrors::MalformedRow { lineno, reason } => {
                write!(f, "malformed entry on line {}: {}", lineno, reason)
            }
            TimingErrors::DuplicateTimeslot(l) => {
                write!(f, "timeslot {:?} is mapped more than once", l)
            }
            TimingErrors::DuplicateRow(r) => {
                write!(f, "row {} is used by more than one timeslot", r)
            }
            TimingErrors::InvalidTimeslotRow(l, r) => {
                write!(f, "timeslot {:?} cannot be written to row {}", l, r)
            }
            TimingErrors::InvalidLayout(msg) => write!(f, "invalid layout: {}", msg),
            TimingErrors::MissingTemplate(name) => {
                write!(f, "template sheet {:?} does not exist", name)
            }
            TimingErrors::MissingOutput(name) => {
                write!(f, "output sheet {:?} could not be created", name)
            }
            TimingErrors::GridTooNarrow { needed, available } => write!(
                f,
                "the output sheet needs {} columns but the template only has {}",
                needed, available
            ),
        }
    }
}

// ********* Configuration **********

// 1-indexed
const STANDARD_TIMESLOT_ROWS: [(&str, u32); 18] = [
    ("0530 Collection Time", 4),
    ("0750 Collection Time", 5),
    ("0530 - 0610", 8),
    ("0610 - 0650", 9),
    ("0650 - 0730", 10),
    ("1130 Collection Time", 12),
    ("1350 Collection Time", 13),
    ("1130 - 1210", 16),
    ("1210 - 1250", 17),
    ("1250 - 1330", 18),
    ("1730 Collection Time", 20),
    ("1950 Collection Time", 21),
    ("1730 - 1810", 24),
    ("1810 - 1850", 25),
    ("1850 - 1930", 26),
    ("2030 - 2050", 28),
    ("2050 - 2110", 29),
    ("2110 - 2130", 30),
];

/// The mapping from timeslot labels to the rows of the output sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TimeslotTable {
    rows: Vec<(TimeslotLabel, u32)>,
}

impl TimeslotTable {
    /// The table of the cookhouse timings template.
    pub fn standard() -> TimeslotTable {
        TimeslotTable {
            rows: STANDARD_TIMESLOT_ROWS
                .iter()
                .map(|(l, r)| (l.to_string(), *r))
                .collect(),
        }
    }

    pub fn new(rows: Vec<(TimeslotLabel, u32)>) -> TimeslotTable {
        TimeslotTable { rows }
    }

    /// Checks that every label maps to exactly one row, and that no row is
    /// claimed twice or overlaps the day headers.
    pub fn validate(&self) -> Result<(), TimingErrors> {
        if self.rows.is_empty() {
            return Err(TimingErrors::InvalidLayout(
                "the timeslot table is empty".to_string(),
            ));
        }
        let mut labels: HashSet<&str> = HashSet::new();
        let mut rows: HashSet<u32> = HashSet::new();
        for (label, row) in self.rows.iter() {
            if label.trim().is_empty() || *row <= HEADER_ROW {
                return Err(TimingErrors::InvalidTimeslotRow(label.clone(), *row));
            }
            if !labels.insert(label.as_str()) {
                return Err(TimingErrors::DuplicateTimeslot(label.clone()));
            }
            if !rows.insert(*row) {
                return Err(TimingErrors::DuplicateRow(*row));
            }
        }
        Ok(())
    }

    pub fn row_of(&self, label: &str) -> Option<u32> {
        self.rows.iter().find(|(l, _)| l == label).map(|(_, r)| *r)
    }

    pub fn entries(&self) -> &[(TimeslotLabel, u32)] {
        &self.rows
    }
}

/// The row receiving the day headers.
pub const HEADER_ROW: u32 = 1;
/// The column of the first day. Each day takes two columns.
pub const FIRST_DAY_COLUMN: u32 = 3;
pub const COLUMNS_PER_DAY: u32 = 2;

/// Everything that controls one generation run.
#[derive(PartialEq, Debug, Clone)]
pub struct GenerationRules {
    pub input_sheet: String,
    pub template_sheet: String,
    pub output_sheet: String,
    /// The number of timeslot cells per day in an entry.
    pub day_timeslot_columns: usize,
    pub strictness: RowStrictness,
    pub timeslots: TimeslotTable,
}

impl GenerationRules {
    pub fn default_rules() -> GenerationRules {
        GenerationRules {
            input_sheet: "Form Responses".to_string(),
            template_sheet: "Cookhouse Timings Template".to_string(),
            output_sheet: "Cookhouse Timings".to_string(),
            day_timeslot_columns: 7,
            strictness: RowStrictness::Placeholder,
            timeslots: TimeslotTable::standard(),
        }
    }

    pub fn validate(&self) -> Result<(), TimingErrors> {
        if self.day_timeslot_columns == 0 {
            return Err(TimingErrors::InvalidLayout(
                "a day needs at least one timeslot column".to_string(),
            ));
        }
        if self.input_sheet == self.output_sheet || self.template_sheet == self.output_sheet {
            return Err(TimingErrors::InvalidLayout(format!(
                "the output sheet {:?} would overwrite an input",
                self.output_sheet
            )));
        }
        self.timeslots.validate()
    }
}

// ********* Collaborators **********

/// A cell-addressable output surface. Rows and columns are 1-indexed.
pub trait GridSink {
    fn write_cell(&mut self, row: u32, column: u32, value: &str);
    fn hide_column(&mut self, column: u32);
    /// The index of the last used column of the grid.
    fn last_column(&self) -> u32;
    /// The number of columns the grid can hold, used or not.
    fn max_columns(&self) -> u32;
}

/// The document holding the form responses and the output sheets.
pub trait Spreadsheet {
    /// All the rows of a sheet, header included. None if the sheet does not exist.
    fn sheet_rows(&self, name: &str) -> Option<Vec<Vec<CellValue>>>;
    fn insert_sheet(&mut self, name: &str, header: &[&str]);
    /// Returns true if a sheet was deleted.
    fn delete_sheet(&mut self, name: &str) -> bool;
    fn clone_sheet(&mut self, template: &str, name: &str) -> Result<(), TimingErrors>;
    fn grid(&mut self, name: &str) -> Option<&mut dyn GridSink>;
    fn activate_sheet(&mut self, name: &str);
}

/// Receives the messages that must reach the user.
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// The collaborators of a generation run.
pub struct Workspace<'a> {
    pub spreadsheet: &'a mut dyn Spreadsheet,
    pub notifier: &'a mut dyn Notifier,
}
