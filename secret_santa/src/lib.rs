mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;

// **** Private structures ****

// Position of a participant in the roster.
type EntryId = usize;

/// The exclusions that apply to each giver, by email.
struct PriorIndex<'a> {
    excluded: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> PriorIndex<'a> {
    fn new(history: &'a [PriorPairing]) -> PriorIndex<'a> {
        let mut excluded: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
        for p in history.iter() {
            excluded
                .entry(p.giver_email.as_str())
                .or_default()
                .insert(p.recipient_email.as_str());
        }
        PriorIndex { excluded }
    }

    fn is_excluded(&self, giver: &str, recipient: &str) -> bool {
        self.excluded
            .get(giver)
            .map(|rs| rs.contains(recipient))
            .unwrap_or(false)
    }
}

/// Draws a secret santa assignment for the roster.
///
/// Arguments:
/// * `roster` the participants, in the order the pairs should be reported
/// * `history` the pairings of previous rounds that must not be repeated. Entries
/// that do not match anyone in the roster are ignored.
/// * `rules` the retry budget, the random source and the duplicate policy
///
/// Each giver picks, in roster order, the first acceptable entry of a shuffled
/// copy of the roster. When a giver is left without any acceptable entry, the
/// whole draw is discarded and started again with a new shuffle, up to
/// `rules.max_attempts` times.
pub fn assign(
    roster: &[Participant],
    history: &[PriorPairing],
    rules: &AssignmentRules,
) -> Result<Assignment, AssignmentErrors> {
    match rules.random_source {
        RandomSource::Entropy => {
            assign_with_rng(roster, history, rules, &mut StdRng::from_entropy())
        }
        RandomSource::Seeded(seed) => {
            assign_with_rng(roster, history, rules, &mut StdRng::seed_from_u64(seed))
        }
    }
}

/// Same as [assign], drawing from the provided generator instead of the one
/// described by `rules.random_source`.
pub fn assign_with_rng<R: Rng + ?Sized>(
    roster: &[Participant],
    history: &[PriorPairing],
    rules: &AssignmentRules,
    rng: &mut R,
) -> Result<Assignment, AssignmentErrors> {
    info!(
        "Processing {:?} participants, {:?} prior pairings, rules: {:?}",
        roster.len(),
        history.len(),
        rules
    );
    checks(roster, rules)?;

    // Nobody to gift: no need to shuffle.
    if roster.len() < 2 {
        info!("assign: a single participant cannot be assigned");
        return Err(AssignmentErrors::Infeasible { attempts: 0 });
    }

    let priors = PriorIndex::new(history);
    let mut pool: Vec<EntryId> = (0..roster.len()).collect();

    for attempt in 1..=rules.max_attempts {
        pool.shuffle(rng);
        if let Some(recipients) = draw_once(roster, &pool, &priors) {
            info!("assign: found an assignment after {} attempt(s)", attempt);
            let pairs = roster
                .iter()
                .zip(recipients)
                .map(|(giver, rid)| Pairing {
                    giver: giver.clone(),
                    recipient: roster[rid].clone(),
                })
                .collect();
            return Ok(Assignment {
                pairs,
                attempts: attempt,
            });
        }
        debug!("assign: attempt {} failed, reshuffling", attempt);
    }

    info!("assign: giving up after {} attempts", rules.max_attempts);
    Err(AssignmentErrors::Infeasible {
        attempts: rules.max_attempts,
    })
}

// One greedy pass over the shuffled pool.
// Returns the recipient of each giver, in roster order, or None if some giver
// was left without a valid candidate.
fn draw_once(
    roster: &[Participant],
    pool: &[EntryId],
    priors: &PriorIndex,
) -> Option<Vec<EntryId>> {
    let mut used: Vec<bool> = vec![false; roster.len()];
    let mut recipients: Vec<EntryId> = Vec::with_capacity(roster.len());
    for giver in roster.iter() {
        let chosen = pool.iter().copied().find(|&cid| {
            let candidate = &roster[cid];
            !used[cid]
                && candidate.email != giver.email
                && !priors.is_excluded(&giver.email, &candidate.email)
        })?;
        used[chosen] = true;
        recipients.push(chosen);
    }
    Some(recipients)
}

fn checks(roster: &[Participant], rules: &AssignmentRules) -> Result<(), AssignmentErrors> {
    if roster.is_empty() {
        return Err(AssignmentErrors::EmptyRoster);
    }
    if rules.duplicate_email_mode == DuplicateEmailMode::Reject {
        let mut seen: HashSet<&str> = HashSet::new();
        for p in roster.iter() {
            if !seen.insert(p.email.as_str()) {
                return Err(AssignmentErrors::DuplicateParticipant(p.email.clone()));
            }
        }
    }
    debug!("checks: roster of {} entries is valid", roster.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn roster(emails: &[&str]) -> Vec<Participant> {
        emails
            .iter()
            .map(|e| Participant::new(&e.to_uppercase(), e))
            .collect()
    }

    fn seeded(seed: u64) -> AssignmentRules {
        AssignmentRules {
            random_source: RandomSource::Seeded(seed),
            ..AssignmentRules::DEFAULT_RULES
        }
    }

    // Checks every invariant of a successful draw.
    fn check_valid(roster: &[Participant], history: &[PriorPairing], a: &Assignment) {
        assert_eq!(a.len(), roster.len());
        let mut received: HashSet<&str> = HashSet::new();
        for (p, giver) in a.pairs().iter().zip(roster) {
            assert_eq!(p.giver.email, giver.email);
            assert_ne!(p.giver.email, p.recipient.email);
            assert!(!history
                .iter()
                .any(|h| h.giver_email == p.giver.email && h.recipient_email == p.recipient.email));
            received.insert(p.recipient.email.as_str());
        }
        let expected: HashSet<&str> = roster.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn three_participants_no_history() {
        init();
        let r = roster(&["a@x", "b@x", "c@x"]);
        let a = assign(&r, &[], &AssignmentRules::DEFAULT_RULES).unwrap();
        check_valid(&r, &[], &a);
        assert_eq!(a.pairs()[0].giver.name, "A@X");
    }

    #[test]
    fn two_participants_with_history_is_infeasible() {
        init();
        let r = roster(&["a@x", "b@x"]);
        let h = vec![PriorPairing::from_emails("a@x", "b@x")];
        let res = assign(&r, &h, &seeded(3));
        assert_eq!(
            res,
            Err(AssignmentErrors::Infeasible {
                attempts: AssignmentRules::DEFAULT_MAX_ATTEMPTS
            })
        );
    }

    #[test]
    fn two_participants_both_directions_is_infeasible() {
        let r = roster(&["a@x", "b@x"]);
        let h = vec![
            PriorPairing::from_emails("a@x", "b@x"),
            PriorPairing::from_emails("b@x", "a@x"),
        ];
        let rules = AssignmentRules {
            max_attempts: 50,
            ..seeded(1)
        };
        assert_eq!(
            assign(&r, &h, &rules),
            Err(AssignmentErrors::Infeasible { attempts: 50 })
        );
    }

    #[test]
    fn two_participants_swap() {
        let r = roster(&["a@x", "b@x"]);
        for seed in 0..20 {
            let a = assign(&r, &[], &seeded(seed)).unwrap();
            assert_eq!(a.recipient_of("a@x").unwrap().email, "b@x");
            assert_eq!(a.recipient_of("b@x").unwrap().email, "a@x");
        }
    }

    #[test]
    fn single_participant_is_infeasible() {
        let r = roster(&["a@x"]);
        for seed in 0..5 {
            assert_eq!(
                assign(&r, &[], &seeded(seed)),
                Err(AssignmentErrors::Infeasible { attempts: 0 })
            );
        }
    }

    #[test]
    fn empty_roster() {
        assert_eq!(
            assign(&[], &[], &AssignmentRules::DEFAULT_RULES),
            Err(AssignmentErrors::EmptyRoster)
        );
    }

    #[test]
    fn duplicates_rejected_by_default() {
        let r = roster(&["a@x", "b@x", "a@x"]);
        assert_eq!(
            assign(&r, &[], &AssignmentRules::DEFAULT_RULES),
            Err(AssignmentErrors::DuplicateParticipant("a@x".to_string()))
        );
    }

    #[test]
    fn duplicates_allowed_as_distinct_entries() {
        let r = roster(&["a@x", "b@x", "a@x", "c@x"]);
        let rules = AssignmentRules {
            duplicate_email_mode: DuplicateEmailMode::AllowDistinct,
            ..seeded(11)
        };
        let a = assign(&r, &[], &rules).unwrap();
        assert_eq!(a.len(), 4);
        for p in a.pairs() {
            assert_ne!(p.giver.email, p.recipient.email);
        }
        // Both a@x entries receive a gift.
        let to_a = a
            .pairs()
            .iter()
            .filter(|p| p.recipient.email == "a@x")
            .count();
        assert_eq!(to_a, 2);
    }

    #[test]
    fn invariants_hold_over_many_draws() {
        init();
        let emails: Vec<String> = (0..30).map(|i| format!("p{}@x", i)).collect();
        for size in 2..30 {
            let refs: Vec<&str> = emails[..size].iter().map(|s| s.as_str()).collect();
            let r = roster(&refs);
            // Last year everyone gave to the next person.
            let h: Vec<PriorPairing> = (0..size)
                .map(|i| PriorPairing::from_emails(refs[i], refs[(i + 1) % size]))
                .collect();
            for seed in 0..10 {
                let res = assign(&r, &h, &seeded(seed * 31 + size as u64));
                if size == 2 {
                    // a->b and b->a are both excluded.
                    assert!(matches!(res, Err(AssignmentErrors::Infeasible { .. })));
                } else {
                    check_valid(&r, &h, &res.unwrap());
                }
            }
        }
    }

    #[test]
    fn several_rounds_of_history() {
        let r = roster(&["a@x", "b@x", "c@x", "d@x"]);
        // a already gave to b and c: only d remains.
        let h = vec![
            PriorPairing::from_emails("a@x", "b@x"),
            PriorPairing::from_emails("a@x", "c@x"),
        ];
        for seed in 0..20 {
            let a = assign(&r, &h, &seeded(seed)).unwrap();
            check_valid(&r, &h, &a);
            assert_eq!(a.recipient_of("a@x").unwrap().email, "d@x");
        }
    }

    #[test]
    fn unknown_history_entries_are_ignored() {
        let r = roster(&["a@x", "b@x"]);
        let h = vec![
            PriorPairing::from_emails("zed@x", "a@x"),
            PriorPairing::from_emails("a@x", "nobody@x"),
        ];
        let a = assign(&r, &h, &seeded(2)).unwrap();
        check_valid(&r, &h, &a);
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let r = roster(&["a@x", "b@x", "c@x", "d@x", "e@x", "f@x"]);
        let first = assign(&r, &[], &seeded(42)).unwrap();
        let second = assign(&r, &[], &seeded(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn next_year_history() {
        let r = roster(&["a@x", "b@x", "c@x", "d@x", "e@x"]);
        let year1 = assign(&r, &[], &seeded(5)).unwrap();
        let h = year1.to_prior_pairings();
        assert_eq!(h.len(), 5);
        assert_eq!(h[0].giver_name, "A@X");
        let year2 = assign(&r, &h, &seeded(6)).unwrap();
        check_valid(&r, &h, &year2);
    }
}
