pub use crate::config::*;

/// A builder for assembling a roster and its history.
///
/// ```
/// pub use secret_santa::builder::Builder;
/// pub use secret_santa::{AssignmentRules, RandomSource};
/// # use secret_santa::AssignmentErrors;
///
/// let rules = AssignmentRules {
///     random_source: RandomSource::Seeded(7),
///     ..AssignmentRules::DEFAULT_RULES
/// };
/// let mut builder = Builder::new(&rules)?
///     .participant("Alice", "alice@example.com")?
///     .participant("Bob", "bob@example.com")?
///     .participant("Carol", "carol@example.com")?;
///
/// builder.add_prior_pairing("alice@example.com", "bob@example.com")?;
///
/// let assignment = builder.assign()?;
/// assert_eq!(
///     assignment.recipient_of("alice@example.com").map(|p| p.name.as_str()),
///     Some("Carol")
/// );
///
/// # Ok::<(), AssignmentErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AssignmentRules,
    pub(crate) _roster: Vec<Participant>,
    pub(crate) _history: Vec<PriorPairing>,
}

impl Builder {
    pub fn new(rules: &AssignmentRules) -> Result<Builder, AssignmentErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _roster: Vec::new(),
            _history: Vec::new(),
        })
    }

    /// Appends a participant at the end of the roster.
    pub fn participant(mut self, name: &str, email: &str) -> Result<Builder, AssignmentErrors> {
        self.add_participant(&Participant::new(name, email))?;
        Ok(self)
    }

    pub fn add_participant(&mut self, participant: &Participant) -> Result<(), AssignmentErrors> {
        if self._rules.duplicate_email_mode == DuplicateEmailMode::Reject
            && self._roster.contains(participant)
        {
            return Err(AssignmentErrors::DuplicateParticipant(
                participant.email.clone(),
            ));
        }
        self._roster.push(participant.clone());
        Ok(())
    }

    /// Same as [Builder::add_prior_pairing], for chaining.
    pub fn prior_pairing(
        mut self,
        giver_email: &str,
        recipient_email: &str,
    ) -> Result<Builder, AssignmentErrors> {
        self.add_prior_pairing(giver_email, recipient_email)?;
        Ok(self)
    }

    /// Records that `giver_email` already gave to `recipient_email` in an
    /// earlier round.
    pub fn add_prior_pairing(
        &mut self,
        giver_email: &str,
        recipient_email: &str,
    ) -> Result<(), AssignmentErrors> {
        let pairing = PriorPairing::from_emails(giver_email, recipient_email);
        self.add_prior_pairing_record(&pairing)
    }

    /// Records a full prior pairing, names included.
    pub fn add_prior_pairing_record(
        &mut self,
        pairing: &PriorPairing,
    ) -> Result<(), AssignmentErrors> {
        self._history.push(pairing.clone());
        Ok(())
    }

    pub fn assign(&self) -> Result<Assignment, AssignmentErrors> {
        crate::assign(&self._roster, &self._history, &self._rules)
    }
}
