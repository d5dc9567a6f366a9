// Reading rosters and histories, writing assignments.

use std::collections::HashSet;
use std::io::Read;

use crate::santa::{
    io_common::{error_line, field, find_column, get_records, is_blank, line_of},
    *,
};

pub const NAME_COLUMN: &str = "Employee_Name";
pub const EMAIL_COLUMN: &str = "Employee_EmailID";
pub const RECIPIENT_NAME_COLUMN: &str = "Secret_Child_Name";
pub const RECIPIENT_EMAIL_COLUMN: &str = "Secret_Child_EmailID";

pub fn read_roster<R: Read>(
    input: R,
    duplicates: DuplicateEmailMode,
) -> SantaResult<Vec<Participant>> {
    let upload = Upload::Roster;
    let (headers, records) = get_records(input, upload)?;
    let name_idx = find_column(&headers, NAME_COLUMN, upload)?;
    let email_idx = find_column(&headers, EMAIL_COLUMN, upload)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<Participant> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let fallback = idx as u64 + 2;
        let line = line_r.map_err(|source| SantaError::CsvParse {
            lineno: error_line(&source, fallback),
            upload,
            source,
        })?;
        let lineno = line_of(&line, fallback);
        if is_blank(&line) {
            debug!("read_roster: skipping blank line {}", lineno);
            continue;
        }
        let email = field(&line, email_idx);
        ensure!(
            !email.is_empty(),
            MissingFieldSnafu {
                upload,
                lineno,
                column: EMAIL_COLUMN,
            }
        );
        if duplicates == DuplicateEmailMode::Reject && !seen.insert(email.to_string()) {
            return DuplicateEmailSnafu {
                upload,
                lineno,
                email,
            }
            .fail();
        }
        res.push(Participant::new(field(&line, name_idx), email));
    }
    info!("read_roster: {} participants", res.len());
    Ok(res)
}

/// Reads the pairings of a previous round.
///
/// Rows without a giver or a recipient email cannot exclude anything and are
/// skipped.
pub fn read_history<R: Read>(input: R) -> SantaResult<Vec<PriorPairing>> {
    let upload = Upload::History;
    let (headers, records) = get_records(input, upload)?;
    let giver_name_idx = find_column(&headers, NAME_COLUMN, upload)?;
    let giver_email_idx = find_column(&headers, EMAIL_COLUMN, upload)?;
    let recipient_name_idx = find_column(&headers, RECIPIENT_NAME_COLUMN, upload)?;
    let recipient_email_idx = find_column(&headers, RECIPIENT_EMAIL_COLUMN, upload)?;

    let mut res: Vec<PriorPairing> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let fallback = idx as u64 + 2;
        let line = line_r.map_err(|source| SantaError::CsvParse {
            lineno: error_line(&source, fallback),
            upload,
            source,
        })?;
        let lineno = line_of(&line, fallback);
        if is_blank(&line) {
            continue;
        }
        let pp = PriorPairing {
            giver_name: field(&line, giver_name_idx).to_string(),
            giver_email: field(&line, giver_email_idx).to_string(),
            recipient_name: field(&line, recipient_name_idx).to_string(),
            recipient_email: field(&line, recipient_email_idx).to_string(),
        };
        if pp.giver_email.is_empty() || pp.recipient_email.is_empty() {
            warn!(
                "read_history: line {}: missing email, ignoring {:?}",
                lineno, pp
            );
            continue;
        }
        res.push(pp);
    }
    info!("read_history: {} prior pairings", res.len());
    Ok(res)
}

/// Serializes the assignment in the history format, so that it can be fed
/// back as next round's history.
pub fn write_assignment(assignment: &Assignment) -> SantaResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(&[
        NAME_COLUMN,
        EMAIL_COLUMN,
        RECIPIENT_NAME_COLUMN,
        RECIPIENT_EMAIL_COLUMN,
    ])
    .context(CsvWriteSnafu {})?;
    for p in assignment.pairs() {
        wtr.write_record(&[
            p.giver.name.as_str(),
            p.giver.email.as_str(),
            p.recipient.name.as_str(),
            p.recipient.email.as_str(),
        ])
        .context(CsvWriteSnafu {})?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(CsvFlushSnafu {})?;
    String::from_utf8(bytes).context(Utf8Snafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
Employee_Name,Employee_EmailID
Alice,a@x
Bob,b@x
Carol,c@x
";

    #[test]
    fn roster_basic() {
        let r = read_roster(ROSTER.as_bytes(), DuplicateEmailMode::Reject).unwrap();
        assert_eq!(
            r,
            vec![
                Participant::new("Alice", "a@x"),
                Participant::new("Bob", "b@x"),
                Participant::new("Carol", "c@x"),
            ]
        );
        assert_eq!(r[1].name, "Bob");
    }

    #[test]
    fn roster_column_order_and_extra_columns() {
        let text = "Department, Employee_EmailID ,Employee_Name\nSales,  a@x , Alice \n,,\nIT,b@x,Bob\n";
        let r = read_roster(text.as_bytes(), DuplicateEmailMode::Reject).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].name, "Alice");
        assert_eq!(r[0].email, "a@x");
        assert_eq!(r[1].email, "b@x");
    }

    #[test]
    fn roster_header_only() {
        let text = "Employee_Name,Employee_EmailID\n";
        let r = read_roster(text.as_bytes(), DuplicateEmailMode::Reject).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn roster_missing_column() {
        let text = "Name,Email\nAlice,a@x\n";
        let err = read_roster(text.as_bytes(), DuplicateEmailMode::Reject).unwrap_err();
        assert!(matches!(
            err,
            SantaError::MissingColumn {
                upload: Upload::Roster,
                ref column
            } if column == NAME_COLUMN
        ));
        assert!(err.is_parse_failure());
    }

    #[test]
    fn roster_missing_email() {
        let text = "Employee_Name,Employee_EmailID\nAlice,a@x\nBob,\n";
        let err = read_roster(text.as_bytes(), DuplicateEmailMode::Reject).unwrap_err();
        assert!(matches!(err, SantaError::MissingField { lineno: 3, .. }));
    }

    #[test]
    fn roster_ragged_row() {
        let text = "Employee_Name,Employee_EmailID\nAlice,a@x\nBob,b@x,extra\n";
        let err = read_roster(text.as_bytes(), DuplicateEmailMode::Reject).unwrap_err();
        assert!(matches!(
            err,
            SantaError::CsvParse {
                upload: Upload::Roster,
                ..
            }
        ));
        assert!(err.to_string().contains("roster"));
    }

    #[test]
    fn roster_bad_utf8() {
        let text: &[u8] = b"Employee_Name,Employee_EmailID\nA\xff,c@x\n";
        let err = read_roster(text, DuplicateEmailMode::Reject).unwrap_err();
        assert!(matches!(
            err,
            SantaError::CsvParse {
                upload: Upload::Roster,
                ..
            }
        ));
        assert!(err.is_parse_failure());
    }

    #[test]
    fn roster_duplicates() {
        let text = "Employee_Name,Employee_EmailID\nAlice,a@x\nAlicia,a@x\n";
        let err = read_roster(text.as_bytes(), DuplicateEmailMode::Reject).unwrap_err();
        assert!(matches!(
            err,
            SantaError::DuplicateEmail { lineno: 3, ref email, .. } if email == "a@x"
        ));
        let r = read_roster(text.as_bytes(), DuplicateEmailMode::AllowDistinct).unwrap();
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn history_skips_incomplete_rows() {
        let text = "\
Employee_Name,Employee_EmailID,Secret_Child_Name,Secret_Child_EmailID
Alice,a@x,Bob,b@x
Bob,b@x,,
,,Carol,c@x
Carol,c@x,Alice,a@x
";
        let h = read_history(text.as_bytes()).unwrap();
        assert_eq!(
            h,
            vec![
                PriorPairing {
                    giver_name: "Alice".to_string(),
                    giver_email: "a@x".to_string(),
                    recipient_name: "Bob".to_string(),
                    recipient_email: "b@x".to_string(),
                },
                PriorPairing {
                    giver_name: "Carol".to_string(),
                    giver_email: "c@x".to_string(),
                    recipient_name: "Alice".to_string(),
                    recipient_email: "a@x".to_string(),
                },
            ]
        );
    }

    #[test]
    fn history_needs_recipient_columns() {
        let err = read_history(ROSTER.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SantaError::MissingColumn {
                upload: Upload::History,
                ..
            }
        ));
    }

    #[test]
    fn export_reads_back_as_history() {
        let roster = vec![
            Participant::new("Alice", "a@x"),
            Participant::new("Bob \"Bobby\" Jones", "b@x"),
            Participant::new("Carol, Jr.", "c@x"),
        ];
        let rules = AssignmentRules {
            random_source: RandomSource::Seeded(9),
            ..AssignmentRules::DEFAULT_RULES
        };
        let a = assign(&roster, &[], &rules).unwrap();
        let text = write_assignment(&a).unwrap();
        assert!(text.starts_with(
            "Employee_Name,Employee_EmailID,Secret_Child_Name,Secret_Child_EmailID\n"
        ));
        let h = read_history(text.as_bytes()).unwrap();
        assert_eq!(h, a.to_prior_pairings());
    }
}
