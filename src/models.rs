use serde::Serialize;

use crate::decode::FieldError;

/// One decoded data row of the leaderboard sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub institution: String,
    pub enrol_date: String,
    pub enrol_status: String,
    pub skillboost_link: String,
    pub courses_completed: i64,
    pub skill_badges_completed: i64,
    pub gen_ai_game_completed: i64,
    pub total_completion: String,
    pub redemption_status: String,
    pub group: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub name: String,
    pub email: String,
    pub score: i64,
    pub is_finished: bool,
    pub has_redeemed: bool,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub group: String,
    pub score: i64,
}

/// A data row that failed to decode. `row` is the 1-based sheet row,
/// counting the header as row 1.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub row: usize,
    pub errors: Vec<FieldError>,
}
