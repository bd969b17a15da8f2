pub use crate::config::*;

use log::debug;
use std::collections::HashMap;

/// The weeks built from the entries, by week key.
pub type WeekMap = HashMap<WeekKey, Week>;

/// The header written to a freshly created input sheet.
pub const ENTRY_HEADER: [&str; 6] = [
    "Timestamp",
    "Contact No",
    "Company",
    "Eating Strength",
    "Remarks",
    "Week",
];

// 0-indexed positions of the fields of an entry.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum EntryColumn {
    Timestamp = 0,
    ContactNo,
    Company,
    EatingStrength,
    Remarks,
    Week,
    TimeslotStart,
}

const PLACEHOLDER: &str = "undefined";

/// One row of the form responses, decoded.
#[derive(PartialEq, Debug, Clone)]
pub struct BidEntry {
    pub timestamp: CellValue,
    pub contact: CellValue,
    pub company: String,
    pub eating_strength: String,
    pub remarks: CellValue,
    pub week: WeekKey,
    /// All the cells from the first timeslot column to the end of the row.
    pub timeslots: Vec<CellValue>,
}

impl BidEntry {
    /// Decodes a row.
    ///
    /// With [RowStrictness::Placeholder], fields that are absent from the row
    /// are replaced by `undefined`. With [RowStrictness::Reject], the company,
    /// the eating strength and the week must all be filled.
    pub fn decode(
        row: &[CellValue],
        lineno: usize,
        strictness: RowStrictness,
    ) -> Result<BidEntry, TimingErrors> {
        let text = |col: EntryColumn| -> Result<String, TimingErrors> {
            match (row.get(col as usize), strictness) {
                (Some(c), RowStrictness::Placeholder) => Ok(c.to_string()),
                (None, RowStrictness::Placeholder) => Ok(PLACEHOLDER.to_string()),
                (Some(c), RowStrictness::Reject) if !c.is_blank() => Ok(c.to_string()),
                (_, RowStrictness::Reject) => Err(TimingErrors::MalformedRow {
                    lineno,
                    reason: format!("missing {:?}", col),
                }),
            }
        };
        let cell = |col: EntryColumn| row.get(col as usize).cloned().unwrap_or(CellValue::Empty);

        Ok(BidEntry {
            timestamp: cell(EntryColumn::Timestamp),
            contact: cell(EntryColumn::ContactNo),
            company: text(EntryColumn::Company)?,
            eating_strength: text(EntryColumn::EatingStrength)?,
            remarks: cell(EntryColumn::Remarks),
            week: text(EntryColumn::Week)?,
            timeslots: row
                .get(EntryColumn::TimeslotStart as usize..)
                .map(|s| s.to_vec())
                .unwrap_or_default(),
        })
    }

    pub fn info(&self) -> String {
        format!("{} ({})", self.company, self.eating_strength)
    }
}

/// Accumulates the entries of a run into weeks.
///
/// ```
/// use bid_timing::builder::Builder;
/// use bid_timing::{CellValue, GenerationRules};
/// # use bid_timing::TimingErrors;
///
/// let s = |x: &str| CellValue::String(x.to_string());
/// let mut builder = Builder::new(&GenerationRules::default_rules())?;
/// builder.add_row(
///     &[s(""), s(""), s("Acme"), s("30"), s(""), s("150324A"), s("0530 - 0610")],
///     2,
/// )?;
/// assert_eq!(builder.weeks().len(), 1);
/// # Ok::<(), TimingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: GenerationRules,
    pub(crate) _weeks: WeekMap,
}

impl Builder {
    pub fn new(rules: &GenerationRules) -> Result<Builder, TimingErrors> {
        rules.validate()?;
        Ok(Builder {
            _rules: rules.clone(),
            _weeks: HashMap::new(),
        })
    }

    /// Decodes and adds one row of the form responses.
    ///
    /// lineno: the 1-indexed line of the row in the sheet, for error messages.
    pub fn add_row(&mut self, row: &[CellValue], lineno: usize) -> Result<(), TimingErrors> {
        let entry = BidEntry::decode(row, lineno, self._rules.strictness)?;
        self.add_entry(&entry, lineno)
    }

    pub fn add_entry(&mut self, entry: &BidEntry, lineno: usize) -> Result<(), TimingErrors> {
        let week = crate::parse_week_from_entry(entry, &self._rules, lineno)?;
        debug!(
            "add_entry: line {}: week {:?}: {} bids",
            lineno,
            entry.week,
            week.days.iter().map(|d| d.bids.len()).sum::<usize>()
        );
        self.add_week(entry.week.clone(), week);
        Ok(())
    }

    /// Merges the week into the week with the same key, or inserts it.
    pub fn add_week(&mut self, key: WeekKey, week: Week) {
        if let Some(existing) = self._weeks.get_mut(&key) {
            crate::merge_weeks(&week, existing);
        } else {
            self._weeks.insert(key, week);
        }
    }

    pub fn num_weeks(&self) -> usize {
        self._weeks.len()
    }

    pub fn weeks(self) -> WeekMap {
        self._weeks
    }
}
