//! JSON rendering of results; durations are whole seconds

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use common::models::PrStats;
use serde_json::{json, Value};

pub fn pr_stats(stats: &PrStats) -> Value {
    let reviewers: Vec<Value> = stats
        .users()
        .iter()
        .filter_map(|login| stats.reviewer_stats(login))
        .map(|r| {
            json!({
                "reviewer": r.reviewer,
                "initial_response_secs": r.initial_response_time.map(|d| d.num_seconds()),
                "approval_secs": r.approval_time.map(|d| d.num_seconds()),
                "comments": {
                    "issue": r.comments.issue_comment,
                    "code_review": r.comments.code_review_comment,
                    "review_submission": r.comments.pr_review_submission_comment,
                    "total": r.comments.all_comments(),
                },
            })
        })
        .collect();

    json!({
        "pull_request": stats.pull_request,
        "ready_for_review_at": stats.ready_for_review_at,
        "merged_at": stats.merged_at,
        "open_to_merge_secs": stats.open_to_merge().num_seconds(),
        "reviewers": reviewers,
    })
}

pub fn working_time(start: DateTime<Utc>, end: DateTime<Utc>, zone: Tz, working: Duration) -> Value {
    json!({
        "start": start,
        "end": end,
        "zone": zone.name(),
        "working_secs": working.num_seconds(),
    })
}
