//! Tests using recorded GitHub payloads
//!
//! Reviewers have no configured zone, so everything is measured on the
//! default New York clock (EDT, UTC-4, in September 2022).

use chrono::Duration;
use common::models::PullRequest;
use github::{timeline, GitHubPullRequest, GitHubReviewComment, TimelineEvent};

use crate::aggregate::{author_stats, reviewer_stats};
use crate::analyzer::{PrStatsEvaluator, StatsError};
use crate::timezone::UserTimeZone;

fn load_pr() -> PullRequest {
    let json = include_str!("fixtures/pr_7415.json");
    let pr: GitHubPullRequest = serde_json::from_str(json).expect("Invalid PR JSON");
    pr.into()
}

fn load_timeline() -> Vec<TimelineEvent> {
    timeline::parse_timeline(include_str!("fixtures/pr_7415_timeline.json")).expect("Invalid timeline JSON")
}

fn load_comments() -> Vec<GitHubReviewComment> {
    serde_json::from_str(include_str!("fixtures/pr_7415_comments.json")).expect("Invalid comments JSON")
}

fn evaluator() -> PrStatsEvaluator<UserTimeZone> {
    PrStatsEvaluator::new(UserTimeZone::default(), ["github-actions[bot]"])
}

/// PR #7415: opened Monday 09:40, review requested from yschimke at 09:41.
///
/// - yschimke comments at 12:10 Monday and approves at 10:00 Tuesday
/// - JakeWharton approves unrequested at 15:30 Tuesday
/// - merged at 16:00 Tuesday
#[test]
fn test_pr_7415_review_times() {
    let pr = load_pr();
    let events = load_timeline();
    let comments = load_comments();

    assert_eq!(pr.author, "swankjesse");
    assert!(pr.merged);
    assert_eq!(events.len(), 9, "Should have 9 timeline entries");

    let stats = evaluator().evaluate(&pr, &events, &comments).unwrap();

    assert_eq!(
        stats.initial_response_time["yschimke"],
        Duration::hours(2) + Duration::minutes(29),
        "Requested at 09:41, first review at 12:10"
    );
    assert_eq!(
        stats.approval_time["yschimke"],
        Duration::hours(8) + Duration::minutes(19),
        "7h19m on Monday plus one hour on Tuesday"
    );
    assert_eq!(
        stats.approval_time["JakeWharton"],
        Duration::hours(13) + Duration::minutes(50),
        "Unrequested reviewer is measured from PR creation"
    );
    assert_eq!(stats.initial_response_time["JakeWharton"], stats.approval_time["JakeWharton"]);
    assert!(!stats.approval_time.contains_key("swankjesse"));
    assert_eq!(stats.open_to_merge(), Duration::hours(30) + Duration::minutes(20));
}

#[test]
fn test_pr_7415_comment_counts() {
    let stats = evaluator()
        .evaluate(&load_pr(), &load_timeline(), &load_comments())
        .unwrap();

    let yschimke = &stats.comments["yschimke"];
    assert_eq!(yschimke.issue_comment, 1);
    assert_eq!(yschimke.code_review_comment, 2);
    assert_eq!(yschimke.pr_review_submission_comment, 1);

    assert_eq!(stats.comments["swankjesse"].code_review_comment, 1);
    assert!(
        !stats.comments.contains_key("JakeWharton"),
        "Approving without comments leaves no comment entry"
    );
}

#[test]
fn test_pr_7415_aggregates() {
    let stats = vec![evaluator()
        .evaluate(&load_pr(), &load_timeline(), &load_comments())
        .unwrap()];

    let yschimke = reviewer_stats("yschimke", &stats);
    assert_eq!(yschimke.total_reviews, 1);
    assert_eq!(yschimke.reviewed_for["swankjesse"], vec![7415]);
    assert_eq!(yschimke.reviewed_prs[0].pr_comments.all_comments(), 4);

    let author = author_stats("swankjesse", &stats);
    assert_eq!(author.pr_stats.total_prs_created, 1);
    assert_eq!(author.pr_stats.total_code_review_comments, 2, "Own diff reply excluded");
    assert_eq!(author.review_stats.len(), 2);
}

#[test]
fn test_pr_7415_ignored_reviewer() {
    let evaluator = PrStatsEvaluator::new(UserTimeZone::default(), ["JakeWharton", "yschimke"]);
    let result = evaluator.evaluate(&load_pr(), &load_timeline(), &load_comments());
    assert_eq!(result, Err(StatsError::NoReviewers { number: 7415 }));
}
