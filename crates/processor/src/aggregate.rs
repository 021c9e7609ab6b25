//! Cross-PR statistics per reviewer and per author

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::Duration;
use common::models::{
    AuthorPrStats, AuthorReviewStats, AuthorStats, PrStats, ReviewStats, ReviewerReviewStats,
    UserId, UserPrComment,
};
use tracing::debug;

/// `reviewer`'s stats on one PR, if they approved it
pub fn review_stats(reviewer: &str, stats: &PrStats) -> Option<ReviewStats> {
    let review_completion = *stats.approval_time.get(reviewer)?;

    Some(ReviewStats {
        reviewer: reviewer.to_string(),
        pull_request: stats.pull_request.clone(),
        review_completion,
        initial_response_time: stats
            .initial_response_time
            .get(reviewer)
            .copied()
            .unwrap_or_else(Duration::zero),
        pr_comments: stats
            .comments
            .get(reviewer)
            .cloned()
            .unwrap_or_else(|| UserPrComment::no_comments(reviewer)),
        pr_ready_on: stats.ready_for_review_at,
        pr_merged_on: stats.merged_at,
    })
}

/// Mean approval time, zero for no reviews
pub fn average_review_time(reviews: &[ReviewStats]) -> Duration {
    if reviews.is_empty() {
        return Duration::zero();
    }
    let total = reviews
        .iter()
        .fold(Duration::zero(), |acc, r| acc + r.review_completion);
    total / reviews.len() as i32
}

/// Everything `reviewer` approved across `prs`
pub fn reviewer_stats(reviewer: &str, prs: &[PrStats]) -> ReviewerReviewStats {
    let reviewed_prs: Vec<ReviewStats> = prs.iter().filter_map(|pr| review_stats(reviewer, pr)).collect();

    let mut reviewed_for: BTreeMap<UserId, Vec<i64>> = BTreeMap::new();
    for review in &reviewed_prs {
        reviewed_for
            .entry(review.pull_request.author.clone())
            .or_default()
            .push(review.pull_request.number);
    }

    debug!(
        "{} approved {} of {} PRs for {} authors",
        reviewer,
        reviewed_prs.len(),
        prs.len(),
        reviewed_for.len()
    );

    ReviewerReviewStats {
        reviewer: reviewer.to_string(),
        average: average_review_time(&reviewed_prs),
        total_reviews: reviewed_prs.len(),
        reviewed_prs,
        reviewed_for,
    }
}

/// `author`'s PRs among `prs`: comment totals received from others and
/// approvals grouped per reviewer, busiest reviewer first
pub fn author_stats(author: &str, prs: &[PrStats]) -> AuthorStats {
    let authored: Vec<&PrStats> = prs
        .iter()
        .filter(|pr| pr.pull_request.author == author)
        .collect();

    let mut pr_stats = AuthorPrStats {
        author: author.to_string(),
        total_prs_created: authored.len(),
        ..AuthorPrStats::default()
    };
    let mut by_reviewer: BTreeMap<&str, Vec<ReviewStats>> = BTreeMap::new();

    for pr in &authored {
        for comment in pr.comments.values().filter(|c| c.user != author) {
            pr_stats.total_issue_comments += comment.issue_comment;
            pr_stats.total_pr_submission_comments += comment.pr_review_submission_comment;
            pr_stats.total_code_review_comments += comment.code_review_comment;
        }
        for reviewer in pr.approval_time.keys() {
            if let Some(review) = review_stats(reviewer, pr) {
                by_reviewer.entry(reviewer.as_str()).or_default().push(review);
            }
        }
    }

    let mut review_stats: Vec<AuthorReviewStats> = by_reviewer
        .into_iter()
        .map(|(reviewer, stats)| AuthorReviewStats {
            author: author.to_string(),
            reviewer: reviewer.to_string(),
            average: average_review_time(&stats),
            total_reviews: stats.len(),
            total_comments: stats.iter().map(|s| s.pr_comments.all_comments()).sum(),
            stats,
        })
        .collect();
    review_stats.sort_by_key(|s| Reverse(s.total_reviews));

    AuthorStats {
        pr_stats,
        review_stats,
    }
}
