use log::{debug, info, warn};

use secret_santa::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::santa::config_reader::*;
use crate::santa::session::Session;

pub mod config_reader;
mod io_common;
pub mod io_csv;
pub mod session;
pub mod web;

/// Suggested name of the downloaded assignments.
pub const EXPORT_FILE_NAME: &str = "secret_santa_assignments.csv";

/// The two kinds of files a user provides.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Upload {
    Roster,
    History,
}

impl Display for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Upload::Roster => write!(f, "roster"),
            Upload::History => write!(f, "history"),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SantaError {
    #[snafu(display("Please upload the current employees file first."))]
    RosterMissing {},
    #[snafu(display("No assignments to download"))]
    NothingToExport {},

    #[snafu(display("Error parsing the {upload} file at line {lineno}: {source}"))]
    CsvParse {
        upload: Upload,
        lineno: u64,
        source: csv::Error,
    },
    #[snafu(display("Error parsing the {upload} file: missing column {column}"))]
    MissingColumn { upload: Upload, column: String },
    #[snafu(display("Error parsing the {upload} file: line {lineno} has no {column}"))]
    MissingField {
        upload: Upload,
        lineno: u64,
        column: String,
    },
    #[snafu(display("Error parsing the {upload} file: {email} appears again at line {lineno}"))]
    DuplicateEmail {
        upload: Upload,
        lineno: u64,
        email: String,
    },

    #[snafu(display(
        "Could not find a valid assignment after {attempts} attempts. Some participants may have nobody left to gift with this history."
    ))]
    Infeasible { attempts: u32 },
    #[snafu(display("Cannot draw the assignments: {source}"))]
    Assignment { source: AssignmentErrors },

    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the assignments"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error writing the assignments"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("The assignments are not valid text"))]
    Utf8 { source: std::string::FromUtf8Error },

    #[snafu(display("Error opening the configuration {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(display("Error running the web server on {address}"))]
    Serve {
        source: std::io::Error,
        address: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl SantaError {
    /// True when the content of an uploaded file could not be understood.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            SantaError::CsvParse { .. }
                | SantaError::MissingColumn { .. }
                | SantaError::MissingField { .. }
                | SantaError::DuplicateEmail { .. }
        )
    }
}

impl From<AssignmentErrors> for SantaError {
    fn from(e: AssignmentErrors) -> Self {
        match e {
            AssignmentErrors::EmptyRoster => SantaError::RosterMissing {},
            AssignmentErrors::Infeasible { attempts } => SantaError::Infeasible { attempts },
            source => SantaError::Assignment { source },
        }
    }
}

pub type SantaResult<T> = Result<T, SantaError>;

fn read_file(path: &str) -> SantaResult<Vec<u8>> {
    info!("Attempting to read file {:?}", path);
    fs::read(path).context(OpeningFileSnafu { path })
}

/// Loads the roster and the history files named in the settings.
pub fn load_session(settings: &RunSettings) -> SantaResult<Session> {
    let mut session = Session::new(&settings.rules);
    if let Some(roster_p) = &settings.roster_file {
        session.load_roster(&read_file(roster_p)?)?;
    }
    for history_p in settings.history_files.iter() {
        session.append_history(&read_file(history_p)?)?;
    }
    Ok(session)
}

/// Draws the assignments for the files in the settings and writes them out.
pub fn run_assignment(settings: &RunSettings) -> SantaResult<Session> {
    let mut session = load_session(settings)?;
    let assignment = session.generate()?.clone();
    info!(
        "Drew {} assignments in {} attempt(s)",
        assignment.len(),
        assignment.attempts
    );

    match settings.output.as_deref() {
        None => {
            println!("{}", format_preview(&assignment));
        }
        Some("stdout") => {
            let text = session.export()?;
            print!("{}", text);
        }
        Some(path) => {
            let text = session.export()?;
            fs::write(path, text).context(WritingFileSnafu { path })?;
            info!("Wrote the assignments to {}", path);
        }
    }
    Ok(session)
}

/// A two-column text table of the assignment, for a quick look in a terminal.
pub fn format_preview(assignment: &Assignment) -> String {
    let cells: Vec<(String, String)> = assignment
        .pairs()
        .iter()
        .map(|p| {
            (
                format!("{} ({})", p.giver.name, p.giver.email),
                format!("{} ({})", p.recipient.name, p.recipient.email),
            )
        })
        .collect();
    let santa_header = "Secret Santa";
    let width = cells
        .iter()
        .map(|(g, _)| g.chars().count())
        .chain(std::iter::once(santa_header.len()))
        .max()
        .unwrap_or(0);
    let mut lines: Vec<String> = vec![format!(
        "{:width$} | Gift Recipient",
        santa_header,
        width = width
    )];
    for (giver, recipient) in cells {
        lines.push(format!("{:width$} | {}", giver, recipient, width = width));
    }
    lines.join("\n")
}

/// Entry point of the program.
pub fn run(args: &Args) -> SantaResult<()> {
    let settings = build_settings(args)?;
    if let Some(port) = args.serve {
        let session = load_session(&settings)?;
        let address = format!("{}:{}", args.bind, port);
        info!("Starting the web server on http://{}", address);
        return actix_web::rt::System::new()
            .block_on(web::start_server(args.bind.clone(), port, session))
            .context(ServeSnafu { address });
    }
    run_assignment(&settings)?;
    Ok(())
}

/// Prints an error the way the command line reports it.
pub fn report_error(e: &SantaError) {
    eprintln!("An error occured: {}", e);
    if let Some(source) = std::error::Error::source(e) {
        eprintln!("caused by: {}", source);
    }
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}
