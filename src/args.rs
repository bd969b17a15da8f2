use clap::Parser;

/// Generates the cookhouse timing sheet from the timeslot bids collected with a form.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the configuration of the sheets and timeslots.
    /// See the manual for all the options.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The workbook (.xlsx) containing the form responses, or the form responses
    /// exported as a CSV file.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) A workbook containing the template of the timing sheet. If not
    /// provided, the template is taken from the input workbook, or a plain template is used.
    #[clap(short, long, value_parser)]
    pub template: Option<String>,

    /// (file path, optional) Where to write the resulting workbook. Defaults to
    /// <input>_timings.xlsx next to the input.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a summary of the timing sheet is written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, btgc checks that the
    /// generated timing sheet matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// The menu action to run (default "Generate Timing Sheet From Bids").
    #[clap(long, value_parser)]
    pub action: Option<String>,

    /// Prints the menu actions and exits.
    #[clap(long, takes_value = false)]
    pub list_actions: bool,

    /// Stops with an error on responses missing their company, eating strength or week,
    /// instead of writing 'undefined'.
    #[clap(long, takes_value = false)]
    pub reject_malformed: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
