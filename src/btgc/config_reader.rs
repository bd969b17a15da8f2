use std::fs;

use bid_timing::{GenerationRules, RowStrictness, TimeslotTable};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::btgc::*;

/// The width of the cookhouse timings template: two weeks and a half of days.
pub const DEFAULT_TEMPLATE_COLUMNS: u32 = 35 + 2;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TimeslotRow {
    pub label: String,
    pub row: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BtgcConfig {
    #[serde(rename = "inputSheet")]
    pub input_sheet: Option<String>,
    #[serde(rename = "templateSheet")]
    pub template_sheet: Option<String>,
    #[serde(rename = "outputSheet")]
    pub output_sheet: Option<String>,
    #[serde(rename = "dayTimeslotColumns")]
    pub day_timeslot_columns: Option<usize>,
    #[serde(rename = "templateColumns")]
    pub template_columns: Option<u32>,
    #[serde(rename = "rejectMalformedRows")]
    pub reject_malformed_rows: Option<bool>,
    #[serde(rename = "templatePath")]
    pub template_path: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "timeslotRows")]
    pub timeslot_rows: Option<Vec<TimeslotRow>>,
}

impl BtgcConfig {
    pub fn template_columns(&self) -> u32 {
        self.template_columns.unwrap_or(DEFAULT_TEMPLATE_COLUMNS)
    }
}

pub fn read_config(path: &str) -> BtgcResult<BtgcConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: BtgcConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> BtgcResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Builds the rules of a run from the configuration. The rules are checked
/// before any file is read.
pub fn validate_rules(config: &BtgcConfig, reject_malformed: bool) -> BtgcResult<GenerationRules> {
    let defaults = GenerationRules::default_rules();
    let rules = GenerationRules {
        input_sheet: config.input_sheet.clone().unwrap_or(defaults.input_sheet),
        template_sheet: config
            .template_sheet
            .clone()
            .unwrap_or(defaults.template_sheet),
        output_sheet: config.output_sheet.clone().unwrap_or(defaults.output_sheet),
        day_timeslot_columns: config
            .day_timeslot_columns
            .unwrap_or(defaults.day_timeslot_columns),
        strictness: match (config.reject_malformed_rows, reject_malformed) {
            (Some(true), _) | (_, true) => RowStrictness::Reject,
            _ => RowStrictness::Placeholder,
        },
        timeslots: match config.timeslot_rows.as_ref() {
            Some(rows) => TimeslotTable::new(
                rows.iter()
                    .map(|tr| (tr.label.clone(), tr.row))
                    .collect(),
            ),
            None => defaults.timeslots,
        },
    };
    if config.template_columns() < bid_timing::FIRST_DAY_COLUMN {
        whatever!(
            "templateColumns must be at least {}, got {}",
            bid_timing::FIRST_DAY_COLUMN,
            config.template_columns()
        );
    }
    rules.validate().context(GenerationSnafu {})?;
    Ok(rules)
}
