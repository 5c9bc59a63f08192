use std::collections::HashMap;

use tracing::warn;

use crate::decode::decode_row;
use crate::models::{GroupRecord, Participant, PersonRecord, RejectedRow};

const YES: &str = "Yes";

/// Data rows split into decoded participants (sheet order) and the rows
/// that failed to decode.
#[derive(Debug, Default)]
pub struct DecodedRows {
    pub participants: Vec<Participant>,
    pub rejected: Vec<RejectedRow>,
}

/// Decodes every row after the header. Rejected rows are logged and kept
/// aside; they never reach the rankings.
pub fn decode_rows(rows: &[Vec<String>]) -> DecodedRows {
    let mut decoded = DecodedRows::default();

    for (index, cells) in rows.iter().enumerate().skip(1) {
        match decode_row(cells) {
            Ok(participant) => decoded.participants.push(participant),
            Err(errors) => {
                let row = index + 1;
                let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
                warn!(row, errors = %details.join("; "), "Skipping malformed row");
                decoded.rejected.push(RejectedRow { row, errors });
            }
        }
    }

    decoded
}

pub fn person_record(participant: &Participant) -> PersonRecord {
    PersonRecord {
        name: participant.name.clone(),
        email: participant.email.clone(),
        score: participant.score,
        is_finished: participant.total_completion == YES,
        has_redeemed: participant.redemption_status == YES,
        group: participant.group.clone(),
    }
}

/// Person records sorted by score, highest first. Ties keep sheet order.
pub fn leaderboard(participants: &[Participant]) -> Vec<PersonRecord> {
    let mut records: Vec<PersonRecord> = participants.iter().map(person_record).collect();
    records.sort_by(|a, b| b.score.cmp(&a.score));
    records
}

/// Per-group score totals sorted highest first. Ties keep the order in
/// which each group first appears in the sheet. A member whose score would
/// overflow the group total is logged and left out of it.
pub fn group_scores(participants: &[Participant]) -> Vec<GroupRecord> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupRecord> = Vec::new();

    for participant in participants {
        let position = *positions
            .entry(participant.group.as_str())
            .or_insert_with(|| {
                groups.push(GroupRecord {
                    group: participant.group.clone(),
                    score: 0,
                });
                groups.len() - 1
            });

        let entry = &mut groups[position];
        match entry.score.checked_add(participant.score) {
            Some(score) => entry.score = score,
            None => warn!(
                group = %entry.group,
                name = %participant.name,
                "Group score overflows, leaving row out of the group total"
            ),
        }
    }

    groups.sort_by(|a, b| b.score.cmp(&a.score));
    groups
}
