use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{GroupRecord, PersonRecord};
use crate::scoring::{self, DecodedRows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    pub participants: usize,
    pub finished: usize,
    pub redeemed: usize,
}

pub fn summarize_completion(records: &[PersonRecord]) -> CompletionSummary {
    CompletionSummary {
        participants: records.len(),
        finished: records.iter().filter(|record| record.is_finished).count(),
        redeemed: records.iter().filter(|record| record.has_redeemed).count(),
    }
}

fn group_label(group: &str) -> &str {
    if group.is_empty() { "(no group)" } else { group }
}

pub fn format_person(position: usize, record: &PersonRecord) -> String {
    let mut flags = Vec::new();
    if record.is_finished {
        flags.push("finished");
    }
    if record.has_redeemed {
        flags.push("redeemed");
    }

    let mut line = format!(
        "{}. {} ({}, {}) score {}",
        position,
        record.name,
        record.email,
        group_label(&record.group),
        record.score
    );
    if !flags.is_empty() {
        let _ = write!(line, " [{}]", flags.join(", "));
    }
    line
}

pub fn format_group(position: usize, record: &GroupRecord) -> String {
    format!(
        "{}. {} score {}",
        position,
        group_label(&record.group),
        record.score
    )
}

/// Console listing printed by the `score` command.
pub fn score_listing(source_label: &str, limit: usize, decoded: &DecodedRows) -> String {
    let people = scoring::leaderboard(&decoded.participants);
    let mut output = String::new();

    if people.is_empty() {
        let _ = writeln!(output, "No participants found in {source_label}.");
        return output;
    }

    let _ = writeln!(output, "Top participants by score:");
    for (index, record) in people.iter().take(limit).enumerate() {
        let _ = writeln!(output, "{}", format_person(index + 1, record));
    }

    if !decoded.rejected.is_empty() {
        let _ = writeln!(output, "Skipped {} malformed rows.", decoded.rejected.len());
    }

    output
}

/// Console listing printed by the `groups` command.
pub fn group_listing(source_label: &str, decoded: &DecodedRows) -> String {
    let groups = scoring::group_scores(&decoded.participants);
    let mut output = String::new();

    if groups.is_empty() {
        let _ = writeln!(output, "No groups found in {source_label}.");
        return output;
    }

    let _ = writeln!(output, "Group standings:");
    for (index, record) in groups.iter().enumerate() {
        let _ = writeln!(output, "{}", format_group(index + 1, record));
    }

    output
}

pub fn build_report(
    source_label: &str,
    limit: usize,
    generated_on: NaiveDate,
    decoded: &DecodedRows,
) -> String {
    let people = scoring::leaderboard(&decoded.participants);
    let groups = scoring::group_scores(&decoded.participants);
    let summary = summarize_completion(&people);

    let mut output = String::new();

    let _ = writeln!(output, "# Study Jam Leaderboard Report");
    let _ = writeln!(output, "Generated on {} from {}", generated_on, source_label);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Progress");
    let _ = writeln!(output, "- Participants: {}", summary.participants);
    let _ = writeln!(output, "- Finished: {}", summary.finished);
    let _ = writeln!(output, "- Redeemed: {}", summary.redeemed);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Participants");

    if people.is_empty() {
        let _ = writeln!(output, "No participants recorded.");
    } else {
        for (index, record) in people.iter().take(limit).enumerate() {
            let _ = writeln!(output, "{}", format_person(index + 1, record));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Group Standings");

    if groups.is_empty() {
        let _ = writeln!(output, "No groups recorded.");
    } else {
        for (index, record) in groups.iter().enumerate() {
            let _ = writeln!(output, "{}", format_group(index + 1, record));
        }
    }

    if !decoded.rejected.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Skipped Rows");

        for rejected in decoded.rejected.iter() {
            let errors: Vec<String> = rejected.errors.iter().map(ToString::to_string).collect();
            let _ = writeln!(output, "- Row {}: {}", rejected.row, errors.join("; "));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::scoring::decode_rows;
    use crate::source::{CsvRowSource, LEADERBOARD_RANGE, RowSource};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        let mut all = vec![vec!["header".to_string()]];
        all.extend(
            data.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>()),
        );
        all
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    #[test]
    fn report_lists_people_groups_and_progress() {
        let decoded = decode_rows(&rows(&[
            &["Avery", "avery@x", "U", "d", "s", "l", "4", "4", "1", "Yes", "Yes", "Cloud"],
            &["Jules", "jules@x", "U", "d", "s", "l", "2", "1", "0", "No", "No", "Cloud"],
            &["Kiara", "kiara@x", "U", "d", "s", "l", "5", "0", "0", "Yes", "No", ""],
        ]));

        let report = build_report("sheet sheet-123", 2, date(), &decoded);

        assert!(report.starts_with("# Study Jam Leaderboard Report\n"));
        assert!(report.contains("Generated on 2026-02-02 from sheet sheet-123"));
        assert!(report.contains("- Participants: 3\n- Finished: 2\n- Redeemed: 1"));
        assert!(report.contains("1. Avery (avery@x, Cloud) score 9 [finished, redeemed]"));
        assert!(report.contains("2. Kiara (kiara@x, (no group)) score 5 [finished]"));
        assert!(!report.contains("Jules (jules@x"));
        assert!(report.contains("1. Cloud score 12\n2. (no group) score 5"));
        assert!(!report.contains("## Skipped Rows"));
    }

    #[test]
    fn report_lists_skipped_rows() {
        let decoded = decode_rows(&rows(&[
            &["Avery", "avery@x", "U", "d", "s", "l", "4", "x", "1", "Yes", "Yes", "Cloud"],
        ]));

        let report = build_report("export.csv", 10, date(), &decoded);

        assert!(report.contains("No participants recorded."));
        assert!(report.contains("No groups recorded."));
        assert!(report.contains("- Row 2: skillBadgesCompleted: \"x\" is not a number"));
    }

    #[test]
    fn completion_summary_counts_flags() {
        let record = |finished, redeemed| PersonRecord {
            name: "A".to_string(),
            email: "a@x".to_string(),
            score: 1,
            is_finished: finished,
            has_redeemed: redeemed,
            group: "G".to_string(),
        };

        let summary =
            summarize_completion(&[record(true, true), record(true, false), record(false, false)]);

        assert_eq!(
            summary,
            CompletionSummary {
                participants: 3,
                finished: 2,
                redeemed: 1
            }
        );
    }

    #[test]
    fn formats_person_and_group_lines() {
        let person = PersonRecord {
            name: "Jules".to_string(),
            email: "jules@x".to_string(),
            score: 3,
            is_finished: false,
            has_redeemed: true,
            group: String::new(),
        };
        let group = GroupRecord {
            group: "Cloud".to_string(),
            score: 12,
        };

        assert_eq!(
            format_person(4, &person),
            "4. Jules (jules@x, (no group)) score 3 [redeemed]"
        );
        assert_eq!(format_group(1, &group), "1. Cloud score 12");
        assert_eq!(
            format_group(2, &GroupRecord { group: String::new(), score: 0 }),
            "2. (no group) score 0"
        );
    }

    #[test]
    fn listings_report_empty_sources() {
        let decoded = decode_rows(&rows(&[]));

        assert_eq!(
            score_listing("export.csv", 10, &decoded),
            "No participants found in export.csv.\n"
        );
        assert_eq!(
            group_listing("export.csv", &decoded),
            "No groups found in export.csv.\n"
        );
    }

    #[tokio::test]
    async fn csv_export_lists_scores_and_groups() {
        let path = std::env::temp_dir().join(format!(
            "studyjam-listing-{}.csv",
            std::process::id()
        ));
        fs::write(
            &path,
            "Name,Email,Institution,Enrol Date,Enrol Status,Profile,Courses,Badges,Game,Completion,Redemption,Group\n\
             Avery,avery@x,U,d,s,l,4,4,1,Yes,Yes,Cloud\n\
             Jules,jules@x,U,d,s,l,2,1,0,No,No,Cloud\n\
             Kiara,kiara@x,U,d,s,l,5,0,0,Yes,No,Data\n\
             Broken,broken@x,U,d,s,l,n/a,0,0,No,No,Data\n",
        )
        .unwrap();

        let rows = CsvRowSource::new(&path)
            .fetch_rows(LEADERBOARD_RANGE)
            .await
            .unwrap();
        fs::remove_file(&path).unwrap();
        let decoded = decode_rows(&rows);

        assert_eq!(
            score_listing("export.csv", 2, &decoded),
            "Top participants by score:\n\
             1. Avery (avery@x, Cloud) score 9 [finished, redeemed]\n\
             2. Kiara (kiara@x, Data) score 5 [finished]\n\
             Skipped 1 malformed rows.\n"
        );
        assert_eq!(
            group_listing("export.csv", &decoded),
            "Group standings:\n1. Cloud score 12\n2. Data score 5\n"
        );
    }
}
