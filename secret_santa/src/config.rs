// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A member of the group, identified by their email address.
///
/// Two participants are equal if and only if their email addresses match. The
/// display name is carried along for presentation.
#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub email: String,
}

impl Participant {
    pub fn new(name: &str, email: &str) -> Participant {
        Participant {
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Eq for Participant {}

impl std::hash::Hash for Participant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.email.hash(state);
    }
}

/// A giver -> recipient record from an earlier round.
///
/// Only the emails take part in the exclusion rules. The names are kept so that
/// a history can be written back out unchanged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PriorPairing {
    pub giver_name: String,
    pub giver_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
}

impl PriorPairing {
    /// A prior pairing known only by the emails.
    pub fn from_emails(giver_email: &str, recipient_email: &str) -> PriorPairing {
        PriorPairing {
            giver_name: String::new(),
            giver_email: giver_email.to_string(),
            recipient_name: String::new(),
            recipient_email: recipient_email.to_string(),
        }
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Pairing {
    pub giver: Participant,
    pub recipient: Participant,
}

/// The outcome of a successful draw.
///
/// The pairs follow the order of the roster: the n-th pair has the n-th roster
/// entry as its giver.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Assignment {
    pub pairs: Vec<Pairing>,
    /// Number of shuffles that were needed, including the successful one.
    pub attempts: u32,
}

impl Assignment {
    pub fn pairs(&self) -> &[Pairing] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The participant that the given giver has to gift, if the giver is part of
    /// this assignment.
    pub fn recipient_of(&self, giver_email: &str) -> Option<&Participant> {
        self.pairs
            .iter()
            .find(|p| p.giver.email == giver_email)
            .map(|p| &p.recipient)
    }

    /// Turns this round into an exclusion history for the next one.
    pub fn to_prior_pairings(&self) -> Vec<PriorPairing> {
        self.pairs
            .iter()
            .map(|p| PriorPairing {
                giver_name: p.giver.name.clone(),
                giver_email: p.giver.email.clone(),
                recipient_name: p.recipient.name.clone(),
                recipient_email: p.recipient.email.clone(),
            })
            .collect()
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AssignmentErrors {
    /// The roster has no participant. Nothing was computed.
    EmptyRoster,
    /// The same email appears more than once in the roster and the rules
    /// reject duplicates.
    DuplicateParticipant(String),
    /// No valid assignment was found within the allowed number of attempts.
    Infeasible { attempts: u32 },
}

impl Error for AssignmentErrors {}

impl Display for AssignmentErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentErrors::EmptyRoster => write!(f, "the roster is empty"),
            AssignmentErrors::DuplicateParticipant(email) => {
                write!(f, "the email {} appears more than once in the roster", email)
            }
            AssignmentErrors::Infeasible { attempts } => write!(
                f,
                "no valid assignment could be found after {} attempts",
                attempts
            ),
        }
    }
}

// ********* Configuration **********

/// Where the shuffles draw their randomness from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RandomSource {
    /// Seeded from the operating system. Every draw is different.
    Entropy,
    /// Deterministic draws: the same roster, history and seed always give the
    /// same assignment.
    Seeded(u64),
}

/// How to treat a roster in which the same email shows up several times.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicateEmailMode {
    /// Refuse to draw.
    Reject,
    /// Every occurrence is a distinct entry. Each entry receives exactly one
    /// gift, and an entry never gifts an entry with the same email.
    AllowDistinct,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AssignmentRules {
    /// Upper bound on the number of shuffles before giving up.
    pub max_attempts: u32,
    pub random_source: RandomSource,
    pub duplicate_email_mode: DuplicateEmailMode,
}

impl AssignmentRules {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

    pub const DEFAULT_RULES: AssignmentRules = AssignmentRules {
        max_attempts: AssignmentRules::DEFAULT_MAX_ATTEMPTS,
        random_source: RandomSource::Entropy,
        duplicate_email_mode: DuplicateEmailMode::Reject,
    };
}

impl Default for AssignmentRules {
    fn default() -> Self {
        AssignmentRules::DEFAULT_RULES
    }
}
