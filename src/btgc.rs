use log::{debug, error, info, warn};

use bid_timing::*;
use snafu::prelude::*;

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod menu;
pub mod workbook;

use crate::args::Args;
use crate::btgc::config_reader::*;
use crate::btgc::menu::Action;
use crate::btgc::workbook::Workbook;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BtgcError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No sheet {name:?} in {path}"))]
    MissingSheet { name: String, path: String },
    #[snafu(display("Error writing file {path}"))]
    SavingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unknown action {label:?}"))]
    UnknownAction { label: String },
    #[snafu(display("No input file given (use --input)"))]
    MissingInputPath {},
    #[snafu(display("{source}"))]
    Generation { source: TimingErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BtgcResult<T> = Result<T, BtgcError>;

/// Shows the alerts on the console.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    pub alerts: Vec<String>,
}

impl Notifier for ConsoleNotifier {
    fn alert(&mut self, message: &str) {
        error!("{}", message);
        self.alerts.push(message.to_string());
    }
}

/// Loads the input workbook and makes sure it contains a template sheet.
fn load_workbook(
    input: &str,
    template_path: Option<&str>,
    rules: &GenerationRules,
    template_columns: u32,
) -> BtgcResult<Workbook> {
    info!("Attempting to read responses file {:?}", input);
    let mut book = if io_common::is_csv(input) {
        let mut book = Workbook::new();
        book.add_sheet(io_csv::read_csv_sheet(input, &rules.input_sheet)?);
        book
    } else {
        io_xlsx::read_workbook(input)?
    };

    if let Some(p) = template_path {
        info!("Attempting to read template file {:?}", p);
        book.add_sheet(io_xlsx::read_sheet(p, &rules.template_sheet)?);
    } else if book.sheet(&rules.template_sheet).is_none() {
        info!(
            "No sheet {:?} found, using the default template",
            rules.template_sheet
        );
        book.add_sheet(io_common::default_template(rules, template_columns));
    }
    if let Some(template) = book.sheet_mut(&rules.template_sheet) {
        template.capacity = template_columns;
    }
    Ok(book)
}

fn build_summary_js(rules: &GenerationRules, sheet: &TimingSheet) -> JSValue {
    let days: Vec<JSValue> = sheet
        .columns
        .iter()
        .map(|dc| {
            let timeslots: Vec<JSValue> = dc
                .slots
                .iter()
                .map(|(label, row, text)| {
                    let bids: Vec<&str> = text.split('\n').collect();
                    json!({"timeslot": label, "row": row, "bids": bids})
                })
                .collect();
            json!({
                "column": dc.column,
                "date": dc.date.to_string(),
                "header": dc.header,
                "timeslots": timeslots
            })
        })
        .collect();
    json!({
        "config": {
            "inputSheet": rules.input_sheet,
            "outputSheet": sheet.sheet_name,
        },
        "weeks": sheet.week_keys,
        "days": days,
        "hiddenColumns": sheet.hidden_columns
    })
}

fn write_summary(path: &str, pretty_js: &str) -> BtgcResult<()> {
    if path == "stdout" {
        println!("{}", pretty_js);
        Ok(())
    } else {
        info!("Writing summary to {:?}", path);
        fs::write(path, pretty_js).context(WritingSummarySnafu { path })
    }
}

fn check_reference(reference_path: &str, pretty_js: &str) -> BtgcResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_ref.as_str(), pretty_js, "\n");
        whatever!("Difference detected between the generated sheet and the reference summary")
    }
    info!("The generated sheet matches the reference summary");
    Ok(())
}

/// Runs "Generate Timing Sheet From Bids" on the workbook.
pub fn generate(
    book: &mut Workbook,
    notifier: &mut ConsoleNotifier,
    rules: &GenerationRules,
) -> BtgcResult<GenerationOutcome> {
    let mut workspace = Workspace {
        spreadsheet: book,
        notifier,
    };
    generate_timing_sheet(&mut workspace, rules).context(GenerationSnafu {})
}

pub fn run(args: &Args) -> BtgcResult<()> {
    let menu = menu::on_open();
    if args.list_actions {
        print!("{}", menu);
        return Ok(());
    }
    let action = match args.action.as_deref() {
        Some(label) => menu.find(label).context(UnknownActionSnafu { label })?,
        None => Action::GenerateTimingSheet,
    };
    debug!("run: action: {:?}", action);

    let config = match args.config.as_deref() {
        Some(p) => read_config(p)?,
        None => BtgcConfig::default(),
    };
    let rules = validate_rules(&config, args.reject_malformed)?;
    info!("rules: {:?}", rules);

    let input = args.input.as_deref().context(MissingInputPathSnafu {})?;
    let template_path = args
        .template
        .as_deref()
        .or(config.template_path.as_deref());
    let out_path = args
        .out
        .clone()
        .or_else(|| config.output_path.clone())
        .unwrap_or_else(|| io_common::default_output_path(input));

    let mut book = load_workbook(input, template_path, &rules, config.template_columns())?;
    let mut notifier = ConsoleNotifier::default();

    match action {
        Action::GenerateTimingSheet => {
            match generate(&mut book, &mut notifier, &rules)? {
                GenerationOutcome::Generated(sheet) => {
                    io_xlsx::write_workbook(&book, &out_path)?;
                    let summary_js = build_summary_js(&rules, &sheet);
                    let pretty_js =
                        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
                    if let Some(p) = args.summary.as_deref() {
                        write_summary(p, &pretty_js)?;
                    }
                    if let Some(p) = args.reference.as_deref() {
                        check_reference(p, &pretty_js)?;
                    }
                }
                GenerationOutcome::Aborted(AbortReason::MissingInput) => {
                    // The workbook now has an empty input sheet to fill in.
                    io_xlsx::write_workbook(&book, &out_path)?;
                }
                GenerationOutcome::Aborted(AbortReason::EmptyInput) => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btgc::workbook::Sheet;
    use std::io::Write;

    fn s(x: &str) -> CellValue {
        CellValue::String(x.to_string())
    }

    fn responses(rows: &[Vec<CellValue>]) -> Sheet {
        let mut sheet = Sheet::new("Form Responses");
        for (col, h) in ENTRY_HEADER.iter().enumerate() {
            sheet.set(1, col as u32 + 1, s(h));
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                sheet.set(r as u32 + 2, c as u32 + 1, v.clone());
            }
        }
        sheet
    }

    fn response(company: &str, strength: f64, week: &str, slots: &[(usize, &str)]) -> Vec<CellValue> {
        let mut row = vec![
            CellValue::Number(45366.5),
            s("91234567"),
            s(company),
            CellValue::Number(strength),
            CellValue::Empty,
            s(week),
        ];
        row.extend(std::iter::repeat(CellValue::Empty).take(49));
        for (pos, label) in slots {
            row[6 + pos] = s(label);
        }
        row
    }

    #[test]
    fn generate_with_default_template() {
        let rules = GenerationRules::default_rules();
        let mut book = Workbook::new();
        book.add_sheet(responses(&[
            response("Alpha", 30.0, "150324A", &[(0, "0530 - 0610"), (8, "1130 - 1210")]),
            response("Bravo", 12.0, "150324A", &[(0, "0530 - 0610")]),
        ]));
        book.add_sheet(io_common::default_template(&rules, 37));

        let mut notifier = ConsoleNotifier::default();
        let outcome = generate(&mut book, &mut notifier, &rules).unwrap();
        let sheet = match outcome {
            GenerationOutcome::Generated(sheet) => sheet,
            x => panic!("unexpected outcome {:?}", x),
        };
        let out = book.sheet("Cookhouse Timings").unwrap();
        assert_eq!(out.get(8, 3), Some(&s("Alpha (30)\nBravo (12)")));
        assert_eq!(out.get(16, 5), Some(&s("Alpha (30)")));
        assert_eq!(out.get(1, 3), Some(&s("Friday (150324)")));
        assert_eq!(out.get(1, 15), Some(&s("Thursday (210324)")));
        assert_eq!(out.hidden_columns.len(), 37 - 17 + 1);
        assert_eq!(book.active.as_deref(), Some("Cookhouse Timings"));

        let js = build_summary_js(&rules, &sheet);
        assert_eq!(js["weeks"], json!(["150324A"]));
        assert_eq!(js["days"][0]["date"], json!("2024-03-15"));
        assert_eq!(
            js["days"][0]["timeslots"][0],
            json!({"timeslot": "0530 - 0610", "row": 8, "bids": ["Alpha (30)", "Bravo (12)"]})
        );
        assert_eq!(js["hiddenColumns"][0], json!(17));
    }

    #[test]
    fn empty_responses_write_nothing() {
        let rules = GenerationRules::default_rules();
        let mut book = Workbook::new();
        book.add_sheet(responses(&[]));
        book.add_sheet(io_common::default_template(&rules, 37));
        let before = book.clone();

        let mut notifier = ConsoleNotifier::default();
        let outcome = generate(&mut book, &mut notifier, &rules).unwrap();
        assert_eq!(outcome, GenerationOutcome::Aborted(AbortReason::EmptyInput));
        assert_eq!(notifier.alerts.len(), 1);
        assert_eq!(book, before);
    }

    #[test]
    fn run_csv_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("responses.csv");
        let mut f = fs::File::create(&csv_path).unwrap();
        writeln!(f, "Timestamp,Contact,Company,Strength,Remarks,Week,Slot 1").unwrap();
        writeln!(f, "t,9123,Acme,30,,150324A,0530 - 0610").unwrap();
        writeln!(f, "t,9124,Bravo,12,,150324A,0530 - 0610").unwrap();
        drop(f);
        let out_path = dir.path().join("out.xlsx").display().to_string();
        let summary_path = dir.path().join("summary.json").display().to_string();

        let args = Args {
            input: Some(csv_path.display().to_string()),
            out: Some(out_path.clone()),
            summary: Some(summary_path.clone()),
            ..Args::default()
        };
        run(&args).unwrap();

        let read = io_xlsx::read_workbook(&out_path).unwrap();
        let out = read.sheet("Cookhouse Timings").unwrap();
        assert_eq!(out.get(8, 3), Some(&s("Acme (30)\nBravo (12)")));

        // The summary is its own reference.
        let args = Args {
            reference: Some(summary_path),
            ..args
        };
        run(&args).unwrap();
    }

    #[test]
    fn sparse_template_file() {
        let rules = GenerationRules::default_rules();
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.xlsx").display().to_string();
        let input_path = dir.path().join("responses.xlsx").display().to_string();

        let mut template = Workbook::new();
        let mut sheet = Sheet::new(&rules.template_sheet);
        sheet.set(8, 1, s("0530 - 0610"));
        sheet.set(8, 2, s("Lunch"));
        template.add_sheet(sheet);
        io_xlsx::write_workbook(&template, &template_path).unwrap();

        let mut input = Workbook::new();
        input.add_sheet(responses(&[response(
            "Alpha",
            30.0,
            "150324A",
            &[(42, "0530 - 0610")],
        )]));
        io_xlsx::write_workbook(&input, &input_path).unwrap();

        let mut book = load_workbook(&input_path, Some(&template_path), &rules, 37).unwrap();
        let loaded = book.sheet(&rules.template_sheet).unwrap();
        assert_eq!(loaded.last_column(), 2);
        assert_eq!(loaded.max_columns(), 37);

        let mut notifier = ConsoleNotifier::default();
        let outcome = generate(&mut book, &mut notifier, &rules).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Generated(_)));
        let out = book.sheet("Cookhouse Timings").unwrap();
        assert_eq!(out.get(8, 15), Some(&s("Alpha (30)")));
        assert!(out.hidden_columns.is_empty());
    }

    #[test]
    fn alerts_are_recorded_once() {
        let mut notifier = ConsoleNotifier::default();
        notifier.alert("No timings in Form Responses!");
        assert_eq!(notifier.alerts, vec!["No timings in Form Responses!"]);
    }

    #[test]
    fn reference_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ref_path = dir.path().join("ref.json").display().to_string();
        fs::write(&ref_path, r#"{"weeks": []}"#).unwrap();
        let res = check_reference(&ref_path, "{\n  \"weeks\": [\n    \"150324A\"\n  ]\n}");
        assert!(matches!(res, Err(BtgcError::Whatever { .. })));
    }

    #[test]
    fn unknown_action() {
        let args = Args {
            action: Some("Delete Timing Sheet".to_string()),
            ..Args::default()
        };
        assert!(matches!(run(&args), Err(BtgcError::UnknownAction { .. })));
    }

    #[test]
    fn missing_input_path() {
        assert!(matches!(
            run(&Args::default()),
            Err(BtgcError::MissingInputPath {})
        ));
    }
}
