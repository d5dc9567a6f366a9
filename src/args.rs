use clap::Parser;

/// Draws secret santa assignments: everyone gives to someone else, and nobody
/// gives to the same person as in the previous rounds.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the roster, the history files, the output and the rules.
    /// Paths inside the file are relative to its directory. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The roster of this round, in CSV format with the columns Employee_Name and Employee_EmailID.
    /// Setting this option overrides the roster that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, may be repeated) The assignments of a previous round, in the output format. Nobody will be
    /// assigned a person they already had in any of these files.
    #[clap(long, value_parser)]
    pub history: Vec<String>,

    /// (file path, 'stdout' or empty) If specified, the assignments will be written in CSV format to the given
    /// location. Otherwise a preview table is printed.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (number, optional) Seed for the random draws. The same inputs and seed always give the same assignments.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (default 1000) How many shuffles to try before declaring that no valid assignment exists.
    #[clap(long, value_parser)]
    pub max_attempts: Option<u32>,

    /// (port, optional) Serve the web page on this port instead of running once. Files given with
    /// --input and --history are preloaded.
    #[clap(long, value_parser)]
    pub serve: Option<u16>,

    /// (default 127.0.0.1) The address to listen on with --serve.
    #[clap(long, value_parser, default_value = "127.0.0.1")]
    pub bind: String,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
