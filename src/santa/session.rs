use crate::santa::{
    io_csv::{read_history, read_roster, write_assignment},
    *,
};

/// Everything a user has uploaded or produced so far.
///
/// The roster and the history stay as they are until a new upload succeeds. A
/// failed upload only updates the error text. The assignment is dropped whenever
/// the inputs change or a draw fails, so that the preview always matches the
/// current inputs.
#[derive(Debug, Clone)]
pub struct Session {
    rules: AssignmentRules,
    roster: Vec<Participant>,
    history: Vec<PriorPairing>,
    assignment: Option<Assignment>,
    error: Option<String>,
}

impl Session {
    pub fn new(rules: &AssignmentRules) -> Session {
        Session {
            rules: rules.clone(),
            roster: Vec::new(),
            history: Vec::new(),
            assignment: None,
            error: None,
        }
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn history(&self) -> &[PriorPairing] {
        &self.history
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// The message to show to the user about the last action, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the roster. Returns the number of participants read.
    pub fn load_roster(&mut self, content: &[u8]) -> SantaResult<usize> {
        let res = read_roster(content, self.rules.duplicate_email_mode);
        let roster = self.record(res)?;
        self.roster = roster;
        self.assignment = None;
        Ok(self.roster.len())
    }

    /// Replaces the history. Returns the number of prior pairings read.
    pub fn load_history(&mut self, content: &[u8]) -> SantaResult<usize> {
        let res = read_history(content);
        let history = self.record(res)?;
        self.history = history;
        self.assignment = None;
        Ok(self.history.len())
    }

    /// Adds the pairings of one more previous round to the history.
    pub fn append_history(&mut self, content: &[u8]) -> SantaResult<usize> {
        let res = read_history(content);
        let mut history = self.record(res)?;
        let count = history.len();
        self.history.append(&mut history);
        self.assignment = None;
        Ok(count)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.assignment = None;
        self.error = None;
    }

    /// Draws a new assignment, replacing the previous one.
    pub fn generate(&mut self) -> SantaResult<&Assignment> {
        match self.draw() {
            Ok(a) => {
                self.error = None;
                let a: &Assignment = self.assignment.insert(a);
                Ok(a)
            }
            Err(e) => {
                warn!("generate: {}", e);
                self.assignment = None;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The current assignment in CSV form.
    pub fn export(&mut self) -> SantaResult<String> {
        let res = match &self.assignment {
            Some(a) => write_assignment(a),
            None => NothingToExportSnafu {}.fail(),
        };
        self.record(res)
    }

    fn draw(&self) -> SantaResult<Assignment> {
        ensure!(!self.roster.is_empty(), RosterMissingSnafu {});
        assign(&self.roster, &self.history, &self.rules).map_err(SantaError::from)
    }

    fn record<T>(&mut self, res: SantaResult<T>) -> SantaResult<T> {
        match &res {
            Ok(_) => self.error = None,
            Err(e) => {
                warn!("{}", e);
                self.error = Some(e.to_string());
            }
        }
        res
    }
}
