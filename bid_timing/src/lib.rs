mod config;
pub mod builder;
pub mod manual;

use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};

pub use crate::builder::{BidEntry, Builder, WeekMap, ENTRY_HEADER};
pub use crate::config::*;

/// The days of all the weeks, in chronological order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DaySequence {
    /// The calendar date of the first day.
    pub start: NaiveDate,
    /// The week keys, sorted.
    pub week_keys: Vec<WeekKey>,
    pub days: Vec<Day>,
}

impl DaySequence {
    pub fn date_of(&self, day_index: usize) -> NaiveDate {
        self.start + Duration::days(day_index as i64)
    }
}

/// Builds the week of bids of one entry.
///
/// The timeslot cells are read in order, `day_timeslot_columns` cells per day.
/// Each filled cell becomes a bid for the timeslot it names.
pub fn parse_week_from_entry(
    entry: &BidEntry,
    rules: &GenerationRules,
    lineno: usize,
) -> Result<Week, TimingErrors> {
    let mut week = Week::default();
    let info = entry.info();
    for (pos, cell) in entry.timeslots.iter().enumerate() {
        if cell.is_blank() {
            continue;
        }
        let day_index = pos / rules.day_timeslot_columns;
        match week.days.get_mut(day_index) {
            Some(day) => day.bids.push(Bid {
                info: info.clone(),
                timeslot: cell.to_string(),
            }),
            None if rules.strictness == RowStrictness::Reject => {
                return Err(TimingErrors::MalformedRow {
                    lineno,
                    reason: format!("timeslot {:?} is past the last day of the week", cell),
                });
            }
            None => {
                warn!(
                    "parse_week_from_entry: line {}: dropping timeslot {:?} past the last day of the week",
                    lineno, cell
                );
            }
        }
    }
    Ok(week)
}

/// Appends the bids of the source week after the bids of the target week, day by day.
pub fn merge_weeks(source: &Week, target: &mut Week) {
    for (target_day, source_day) in target.days.iter_mut().zip(source.days.iter()) {
        target_day.bids.extend(source_day.bids.iter().cloned());
    }
}

/// Reads the DDMMYY date at the start of a week key.
pub fn parse_ddmmyy(text: &str) -> Result<NaiveDate, TimingErrors> {
    let invalid = || TimingErrors::InvalidWeekKey(text.to_string());
    let field = |range: std::ops::Range<usize>| -> Result<u32, TimingErrors> {
        let s = text.get(range).ok_or_else(invalid)?;
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<u32>().map_err(|_| invalid())
    };
    let day = field(0..2)?;
    let month = field(2..4)?;
    let year = 2000 + field(4..6)? as i32;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Orders the weeks by key and lays out all their days one after the other.
///
/// The first day falls on the date that starts the smallest week key.
pub fn sequence_days(weeks: WeekMap) -> Result<DaySequence, TimingErrors> {
    let mut sorted: Vec<(WeekKey, Week)> = weeks.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let first_key = sorted.first().map(|p| p.0.clone()).ok_or(TimingErrors::NoWeeks)?;
    let start = parse_ddmmyy(&first_key)?;
    debug!("sequence_days: weeks: {:?} start: {}", sorted.iter().map(|p| &p.0).collect::<Vec<_>>(), start);

    let mut week_keys: Vec<WeekKey> = Vec::new();
    let mut days: Vec<Day> = Vec::new();
    for (key, week) in sorted {
        week_keys.push(key);
        days.extend(week.days);
    }
    Ok(DaySequence {
        start,
        week_keys,
        days,
    })
}

/// Groups the bids of a day by timeslot. The occupants of a timeslot are
/// joined with newlines.
pub fn compile_timeslots(day: &Day) -> CompiledTimeslot {
    let mut compiled = CompiledTimeslot::default();
    for bid in day.bids.iter() {
        match compiled.entries.iter_mut().find(|(l, _)| *l == bid.timeslot) {
            Some((_, text)) => {
                text.push('\n');
                text.push_str(&bid.info);
            }
            None => compiled
                .entries
                .push((bid.timeslot.clone(), bid.info.clone())),
        }
    }
    compiled
}

/// The output column of a day (0-indexed).
pub fn day_column(day_index: usize) -> u32 {
    FIRST_DAY_COLUMN + day_index as u32 * COLUMNS_PER_DAY
}

/// `Friday (150324)`
pub fn format_day_header(date: NaiveDate) -> String {
    date.format("%A (%d%m%y)").to_string()
}

/// Writes all the days onto the grid, then hides the template columns that
/// were not used.
///
/// Timeslots that have no row in the table are not written.
pub fn render_days(
    sequence: &DaySequence,
    grid: &mut dyn GridSink,
    timeslots: &TimeslotTable,
    sheet_name: &str,
) -> Result<TimingSheet, TimingErrors> {
    let available = grid.max_columns();
    if let Some(last_day) = sequence.days.len().checked_sub(1) {
        let needed = day_column(last_day);
        if needed > available {
            return Err(TimingErrors::GridTooNarrow { needed, available });
        }
    }

    let mut columns: Vec<DayColumn> = Vec::new();
    for (idx, day) in sequence.days.iter().enumerate() {
        let column = day_column(idx);
        let date = sequence.date_of(idx);
        let compiled = compile_timeslots(day);
        debug!(
            "render_days: day {} ({}): {} bids in {} timeslots",
            idx,
            date,
            day.bids.len(),
            compiled.len()
        );

        let mut slots: Vec<(TimeslotLabel, u32, String)> = Vec::new();
        for (label, text) in compiled.iter() {
            match timeslots.row_of(label) {
                Some(row) => {
                    grid.write_cell(row, column, text);
                    slots.push((label.to_string(), row, text.to_string()));
                }
                None => {
                    warn!(
                        "render_days: {}: no row for timeslot {:?}, dropping {:?}",
                        date, label, text
                    );
                }
            }
        }
        slots.sort_by_key(|s| s.1);

        let header = format_day_header(date);
        grid.write_cell(HEADER_ROW, column, &header);
        columns.push(DayColumn {
            column,
            date,
            header,
            slots,
        });
    }

    let first_unused = day_column(sequence.days.len());
    let hidden_columns: Vec<u32> = (first_unused..=grid.last_column()).collect();
    for col in hidden_columns.iter() {
        grid.hide_column(*col);
    }
    debug!("render_days: hid {} columns", hidden_columns.len());

    Ok(TimingSheet {
        sheet_name: sheet_name.to_string(),
        week_keys: sequence.week_keys.clone(),
        columns,
        hidden_columns,
    })
}

/// Regenerates the output sheet from the bidding entries of the input sheet.
///
/// A missing or empty input sheet is reported to the notifier and nothing is
/// generated. The entries are all read before the output sheet is touched:
/// once the output sheet is replaced, any failure leaves it incomplete.
pub fn generate_timing_sheet(
    workspace: &mut Workspace,
    rules: &GenerationRules,
) -> Result<GenerationOutcome, TimingErrors> {
    let mut builder = Builder::new(rules)?;

    let rows = match workspace.spreadsheet.sheet_rows(&rules.input_sheet) {
        Some(rows) => rows,
        None => {
            warn!("generate_timing_sheet: sheet {:?} is missing", rules.input_sheet);
            workspace
                .spreadsheet
                .insert_sheet(&rules.input_sheet, &ENTRY_HEADER);
            workspace.notifier.alert(&format!(
                "[ERROR]: No {:?} sheet found! Generating input sheet.",
                rules.input_sheet
            ));
            return Ok(GenerationOutcome::Aborted(AbortReason::MissingInput));
        }
    };

    // The first row is the header. Lines are 1-indexed.
    let entries: Vec<(usize, &Vec<CellValue>)> = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !row.iter().all(|c| c.is_blank()))
        .map(|(idx, row)| (idx + 1, row))
        .collect();
    if entries.is_empty() {
        workspace
            .notifier
            .alert(&format!("No timings in {}!", rules.input_sheet));
        return Ok(GenerationOutcome::Aborted(AbortReason::EmptyInput));
    }

    info!("Processing {} entries from {:?}", entries.len(), rules.input_sheet);
    for (lineno, row) in entries {
        builder.add_row(row, lineno)?;
    }
    info!("Found {} weeks", builder.num_weeks());
    let sequence = sequence_days(builder.weeks())?;

    if workspace.spreadsheet.delete_sheet(&rules.output_sheet) {
        debug!("generate_timing_sheet: deleted previous {:?}", rules.output_sheet);
    }
    workspace
        .spreadsheet
        .clone_sheet(&rules.template_sheet, &rules.output_sheet)?;
    let grid = workspace
        .spreadsheet
        .grid(&rules.output_sheet)
        .ok_or_else(|| TimingErrors::MissingOutput(rules.output_sheet.clone()))?;
    let sheet = render_days(&sequence, grid, &rules.timeslots, &rules.output_sheet)?;
    workspace.spreadsheet.activate_sheet(&rules.output_sheet);

    info!(
        "Generated {:?}: {} days starting {}",
        rules.output_sheet,
        sheet.columns.len(),
        sequence.start
    );
    Ok(GenerationOutcome::Generated(sheet))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: &str) -> CellValue {
        CellValue::String(x.to_string())
    }

    fn bid(info: &str, timeslot: &str) -> Bid {
        Bid {
            info: info.to_string(),
            timeslot: timeslot.to_string(),
        }
    }

    fn entry_row(company: &str, strength: f64, week: &str, cells: &[&str]) -> Vec<CellValue> {
        let mut row = vec![
            s("15/03/2024 10:00:00"),
            s("91234567"),
            s(company),
            CellValue::Number(strength),
            s(""),
            s(week),
        ];
        row.extend(cells.iter().map(|c| s(c)));
        row
    }

    fn week_with(day: usize, bids: Vec<Bid>) -> Week {
        let mut week = Week::default();
        week.days[day].bids = bids;
        week
    }

    #[test]
    fn parse_single_bid() {
        let mut cells = vec!["0530-0610"];
        cells.extend(std::iter::repeat("").take(48));
        let row = entry_row("Acme", 30.0, "150324A", &cells);
        let entry = BidEntry::decode(&row, 2, RowStrictness::Placeholder).unwrap();
        let week = parse_week_from_entry(&entry, &GenerationRules::default_rules(), 2).unwrap();
        assert_eq!(week.days[0].bids, vec![bid("Acme (30)", "0530-0610")]);
        assert!(week.days[1..].iter().all(|d| d.bids.is_empty()));
    }

    #[test]
    fn parse_day_index_from_position() {
        let mut cells = vec![""; 14];
        cells[6] = "0650 - 0730";
        cells[7] = "1130 - 1210";
        cells[13] = "2110 - 2130";
        let row = entry_row("Bravo", 12.0, "150324A", &cells);
        let entry = BidEntry::decode(&row, 2, RowStrictness::Placeholder).unwrap();
        let week = parse_week_from_entry(&entry, &GenerationRules::default_rules(), 2).unwrap();
        assert_eq!(week.days[0].bids, vec![bid("Bravo (12)", "0650 - 0730")]);
        assert_eq!(
            week.days[1].bids,
            vec![bid("Bravo (12)", "1130 - 1210"), bid("Bravo (12)", "2110 - 2130")]
        );
    }

    #[test]
    fn parse_short_row_uses_placeholders() {
        let row = vec![s("15/03/2024"), s("9123")];
        let entry = BidEntry::decode(&row, 3, RowStrictness::Placeholder).unwrap();
        assert_eq!(entry.info(), "undefined (undefined)");
        assert_eq!(entry.week, "undefined");
        assert!(entry.timeslots.is_empty());
    }

    #[test]
    fn parse_short_row_rejected() {
        let row = vec![s("15/03/2024"), s("9123"), s("Acme")];
        let res = BidEntry::decode(&row, 3, RowStrictness::Reject);
        assert!(matches!(res, Err(TimingErrors::MalformedRow { lineno: 3, .. })));
    }

    #[test]
    fn parse_cells_past_the_week() {
        let mut cells = vec![""; 50];
        cells[49] = "0530 - 0610";
        let row = entry_row("Acme", 30.0, "150324A", &cells);
        let mut rules = GenerationRules::default_rules();

        let entry = BidEntry::decode(&row, 2, rules.strictness).unwrap();
        let week = parse_week_from_entry(&entry, &rules, 2).unwrap();
        assert!(week.days.iter().all(|d| d.bids.is_empty()));

        rules.strictness = RowStrictness::Reject;
        assert!(parse_week_from_entry(&entry, &rules, 2).is_err());
    }

    #[test]
    fn merge_appends_source_after_target() {
        let source = week_with(0, vec![bid("X (1)", "0530 - 0610")]);
        let mut target = week_with(0, vec![bid("Y (2)", "0530 - 0610")]);
        target.days[3].bids.push(bid("Z (3)", "1130 - 1210"));
        merge_weeks(&source, &mut target);
        assert_eq!(
            target.days[0].bids,
            vec![bid("Y (2)", "0530 - 0610"), bid("X (1)", "0530 - 0610")]
        );
        assert_eq!(target.days[3].bids, vec![bid("Z (3)", "1130 - 1210")]);
        assert_eq!(source.days[0].bids, vec![bid("X (1)", "0530 - 0610")]);
    }

    #[test]
    fn sequence_sorts_by_week_key() {
        for order in [["020124A", "010124A"], ["010124A", "020124A"]] {
            let mut weeks = WeekMap::new();
            for key in order {
                weeks.insert(key.to_string(), week_with(0, vec![bid(key, "0530 - 0610")]));
            }
            let seq = sequence_days(weeks).unwrap();
            assert_eq!(seq.week_keys, vec!["010124A", "020124A"]);
            assert_eq!(seq.days.len(), 14);
            assert_eq!(seq.days[0].bids[0].info, "010124A");
            assert_eq!(seq.days[7].bids[0].info, "020124A");
        }
    }

    #[test]
    fn sequence_start_date() {
        let mut weeks = WeekMap::new();
        weeks.insert("150324B".to_string(), Week::default());
        let seq = sequence_days(weeks).unwrap();
        assert_eq!(seq.start, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(seq.date_of(3), NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
        assert_eq!(seq.date_of(17), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn sequence_empty() {
        assert_eq!(sequence_days(WeekMap::new()), Err(TimingErrors::NoWeeks));
    }

    #[test]
    fn invalid_week_keys() {
        for key in ["", "1503", "320124", "15ab24", "undefined"] {
            assert_eq!(
                parse_ddmmyy(key),
                Err(TimingErrors::InvalidWeekKey(key.to_string()))
            );
        }
    }

    #[test]
    fn compile_joins_with_newlines() {
        let day = Day {
            bids: vec![
                bid("A (1)", "1130-1210"),
                bid("Q (9)", "0530 - 0610"),
                bid("B (2)", "1130-1210"),
                bid("C (3)", "1130-1210"),
            ],
        };
        let compiled = compile_timeslots(&day);
        assert_eq!(compiled.get("1130-1210"), Some("A (1)\nB (2)\nC (3)"));
        assert_eq!(compiled.get("0530 - 0610"), Some("Q (9)"));
        let labels: Vec<&str> = compiled.iter().map(|p| p.0).collect();
        assert_eq!(labels, vec!["1130-1210", "0530 - 0610"]);
    }

    #[test]
    fn header_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(format_day_header(date), "Friday (150324)");
    }

    #[test]
    fn day_columns() {
        assert_eq!(day_column(0), 3);
        assert_eq!(day_column(1), 5);
        assert_eq!(day_column(13), 29);
    }

    #[test]
    fn standard_table_is_valid() {
        let table = TimeslotTable::standard();
        table.validate().unwrap();
        assert_eq!(table.row_of("0530 - 0610"), Some(8));
        assert_eq!(table.row_of("2110 - 2130"), Some(30));
        assert_eq!(table.row_of("0530-0610"), None);
    }

    #[test]
    fn invalid_tables() {
        let t = |rows: &[(&str, u32)]| {
            TimeslotTable::new(rows.iter().map(|(l, r)| (l.to_string(), *r)).collect()).validate()
        };
        assert_eq!(
            t(&[("a", 4), ("a", 5)]),
            Err(TimingErrors::DuplicateTimeslot("a".to_string()))
        );
        assert_eq!(t(&[("a", 4), ("b", 4)]), Err(TimingErrors::DuplicateRow(4)));
        assert_eq!(
            t(&[("a", 1)]),
            Err(TimingErrors::InvalidTimeslotRow("a".to_string(), 1))
        );
        assert!(t(&[]).is_err());
    }

    #[test]
    fn cell_display() {
        assert_eq!(CellValue::Number(30.0).to_string(), "30");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert!(s("").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }
}
