//! Report rendering
//!
//! Renders a [`Summary`] and [`Ranking`] into the text report, the JSON
//! report and the plain username list.

use super::{OutputError, OutputResult};
use crate::downloader::job::StopReason;
use crate::identifier::ResourceId;
use crate::tally::{Ranking, Summary, UserTally};
use serde::Serialize;
use std::fmt::Write as _;

/// Context printed above the counts
#[derive(Debug, Clone)]
pub struct ReportHeader<'a> {
    /// Studio the report covers
    pub resource: &'a ResourceId,
    /// Window length in hours
    pub window_hours: i64,
    /// Why collection stopped
    pub stop: StopReason,
}

/// Render the human-readable report
pub fn render_report(header: &ReportHeader<'_>, summary: &Summary, ranking: &Ranking) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "==== Activity in the last {} hours (studio {}) ====",
        header.window_hours, header.resource
    );
    let _ = writeln!(out, "Comments: {}", summary.total_primary);
    let _ = writeln!(out, "Replies: {}", summary.total_secondary);
    let _ = writeln!(out, "Active users: {}", summary.distinct_users);

    if !header.stop.is_complete() {
        let _ = writeln!(out, "Status: PARTIAL - {}", header.stop);
    } else if header.stop.ended_on_failure() {
        let _ = writeln!(out, "Status: ENDED ON FAILED REQUEST - {}", header.stop);
    }

    out.push('\n');
    if ranking.is_empty() {
        out.push_str("No activity in this window.\n");
    }
    for (index, user) in ranking.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} : total {} (comments {} / replies {})",
            index + 1,
            user.username,
            user.total(),
            user.primary_count,
            user.secondary_count
        );
    }

    out
}

/// Render the username list, one name per line in ranking order
pub fn render_usernames(ranking: &Ranking) -> String {
    ranking
        .iter()
        .map(|user| format!("{}\n", user.username))
        .collect()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    resource: &'a str,
    window_hours: i64,
    complete: bool,
    stop: StopReason,
    summary: &'a Summary,
    ranking: Vec<JsonRankEntry<'a>>,
}

#[derive(Serialize)]
struct JsonRankEntry<'a> {
    rank: usize,
    #[serde(flatten)]
    user: &'a UserTally,
    total: u64,
}

/// Render the report as pretty-printed JSON
pub fn render_json_report(
    header: &ReportHeader<'_>,
    summary: &Summary,
    ranking: &Ranking,
) -> OutputResult<String> {
    let report = JsonReport {
        resource: header.resource.as_str(),
        window_hours: header.window_hours,
        complete: header.stop.is_complete(),
        stop: header.stop,
        summary,
        ranking: ranking
            .iter()
            .enumerate()
            .map(|(index, user)| JsonRankEntry {
                rank: index + 1,
                user,
                total: user.total(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report)
        .map_err(|e| OutputError::SerializationError(e.to_string()))
}
