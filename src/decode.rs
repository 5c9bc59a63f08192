//! Positional row decoding.
//!
//! The leaderboard sheet has a fixed column layout. This module is the only
//! place that knows which position holds which field; everything downstream
//! works with [`Participant`].

use thiserror::Error;

use crate::models::Participant;

pub const NAME: usize = 0;
pub const EMAIL: usize = 1;
pub const INSTITUTION: usize = 2;
pub const ENROL_DATE: usize = 3;
pub const ENROL_STATUS: usize = 4;
pub const SKILLBOOST_LINK: usize = 5;
pub const COURSES_COMPLETED: usize = 6;
pub const SKILL_BADGES_COMPLETED: usize = 7;
pub const GEN_AI_GAME_COMPLETED: usize = 8;
pub const TOTAL_COMPLETION: usize = 9;
pub const REDEMPTION_STATUS: usize = 10;
pub const GROUP: usize = 11;

pub const COLUMN_COUNT: usize = 12;

/// Cells up to and including the last count column must be present. The
/// Sheets API drops trailing empty cells, so the columns after it may be
/// absent and read as empty text.
pub const REQUIRED_CELLS: usize = GEN_AI_GAME_COMPLETED + 1;

pub const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "name",
    "email",
    "institution",
    "enrolDate",
    "enrolStatus",
    "skillboostLink",
    "coursesCompleted",
    "skillBadgesCompleted",
    "genAIGameCompleted",
    "totalCompletion",
    "redemptionStatus",
    "group",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{column}: missing cell")]
    Missing { column: &'static str },

    #[error("{column}: {value:?} is not a number")]
    NotANumber { column: &'static str, value: String },

    #[error("{column}: {value:?} is out of range")]
    OutOfRange { column: &'static str, value: String },

    #[error("expected at most {expected} cells, found {found}")]
    UnexpectedCells { expected: usize, found: usize },

    #[error("score overflows")]
    ScoreOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountError {
    NotANumber,
    OutOfRange,
}

/// Base-10 integer from the leading part of a cell: optional leading
/// whitespace, optional sign, then digits. Anything after the digits is
/// ignored, so `"12 courses"` reads as 12.
fn parse_count(raw: &str) -> Result<i64, CountError> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    if digits.is_empty() {
        return Err(CountError::NotANumber);
    }

    // Only overflow can fail here, the slice is all digits.
    let magnitude: i64 = digits.parse().map_err(|_| CountError::OutOfRange)?;
    Ok(if negative { -magnitude } else { magnitude })
}

pub fn decode_row(cells: &[String]) -> Result<Participant, Vec<FieldError>> {
    let mut errors = Vec::new();

    if cells.len() > COLUMN_COUNT {
        errors.push(FieldError::UnexpectedCells {
            expected: COLUMN_COUNT,
            found: cells.len(),
        });
    }

    for index in cells.len()..REQUIRED_CELLS {
        errors.push(FieldError::Missing {
            column: COLUMN_NAMES[index],
        });
    }

    let text = |index: usize| cells.get(index).cloned().unwrap_or_default();

    let mut count = |index: usize| -> i64 {
        let Some(raw) = cells.get(index) else {
            return 0;
        };

        match parse_count(raw) {
            Ok(value) => value,
            Err(CountError::NotANumber) => {
                errors.push(FieldError::NotANumber {
                    column: COLUMN_NAMES[index],
                    value: raw.clone(),
                });
                0
            }
            Err(CountError::OutOfRange) => {
                errors.push(FieldError::OutOfRange {
                    column: COLUMN_NAMES[index],
                    value: raw.clone(),
                });
                0
            }
        }
    };

    let courses_completed = count(COURSES_COMPLETED);
    let skill_badges_completed = count(SKILL_BADGES_COMPLETED);
    let gen_ai_game_completed = count(GEN_AI_GAME_COMPLETED);

    let score = courses_completed
        .checked_add(skill_badges_completed)
        .and_then(|sum| sum.checked_add(gen_ai_game_completed));

    let score = match score {
        Some(score) => score,
        None => {
            errors.push(FieldError::ScoreOverflow);
            0
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Participant {
        name: text(NAME),
        email: text(EMAIL),
        institution: text(INSTITUTION),
        enrol_date: text(ENROL_DATE),
        enrol_status: text(ENROL_STATUS),
        skillboost_link: text(SKILLBOOST_LINK),
        courses_completed,
        skill_badges_completed,
        gen_ai_game_completed,
        total_completion: text(TOTAL_COMPLETION),
        redemption_status: text(REDEMPTION_STATUS),
        group: text(GROUP),
        score,
    })
}
