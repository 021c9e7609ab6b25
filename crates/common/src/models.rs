//! Domain models

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// GitHub login used to key every per-user statistic
pub type UserId = String;

/// A pull request, reduced to what review statistics need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    pub number: i64,
    pub title: String,
    pub html_url: String,
    pub author: UserId,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merged: bool,
}

/// Comment counts made by one user on one PR
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPrComment {
    pub user: UserId,
    /// Plain conversation comments, not attached to any diff
    pub issue_comment: u32,
    /// Comments anchored to a portion of the diff
    pub code_review_comment: u32,
    /// Review submissions in the commented or changes-requested state
    pub pr_review_submission_comment: u32,
}

impl UserPrComment {
    /// Empty comment stats for `user`
    pub fn no_comments(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            issue_comment: 0,
            code_review_comment: 0,
            pr_review_submission_comment: 0,
        }
    }

    pub fn all_comments(&self) -> u32 {
        self.issue_comment + self.code_review_comment + self.pr_review_submission_comment
    }

    pub fn is_empty(&self) -> bool {
        self.all_comments() == 0
    }
}

/// Review statistics for a single merged PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrStats {
    pub pull_request: PullRequest,
    /// Reviewer -> working time until their first approve/request-changes/comment
    pub initial_response_time: BTreeMap<UserId, Duration>,
    /// Reviewer -> working time until they approved
    pub approval_time: BTreeMap<UserId, Duration>,
    /// User -> comments made on the PR (any user, including the author)
    pub comments: BTreeMap<UserId, UserPrComment>,
    pub ready_for_review_at: DateTime<Utc>,
    pub merged_at: DateTime<Utc>,
}

/// One reviewer's slice of a [`PrStats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerReviewerStats {
    pub reviewer: UserId,
    pub initial_response_time: Option<Duration>,
    pub approval_time: Option<Duration>,
    pub comments: UserPrComment,
}

impl PrStats {
    /// Collect everything known about `reviewer` on this PR
    pub fn reviewer_stats(&self, reviewer: &str) -> Option<PerReviewerStats> {
        let initial_response_time = self.initial_response_time.get(reviewer).copied();
        let approval_time = self.approval_time.get(reviewer).copied();
        let comments = self.comments.get(reviewer).cloned();

        if initial_response_time.is_none() && approval_time.is_none() && comments.is_none() {
            return None;
        }

        Some(PerReviewerStats {
            reviewer: reviewer.to_string(),
            initial_response_time,
            approval_time,
            comments: comments.unwrap_or_else(|| UserPrComment::no_comments(reviewer)),
        })
    }

    /// Every user with at least one statistic on this PR, sorted by login
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .initial_response_time
            .keys()
            .chain(self.approval_time.keys())
            .chain(self.comments.keys())
            .cloned()
            .collect();
        users.sort();
        users.dedup();
        users
    }

    /// Wall-clock time from ready-for-review to merge
    pub fn open_to_merge(&self) -> Duration {
        self.merged_at - self.ready_for_review_at
    }
}

/// Review stats of one reviewer for one PR they approved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewStats {
    pub reviewer: UserId,
    pub pull_request: PullRequest,
    /// Working time until approval
    pub review_completion: Duration,
    /// Working time until first response, zero if none was recorded
    pub initial_response_time: Duration,
    pub pr_comments: UserPrComment,
    pub pr_ready_on: DateTime<Utc>,
    pub pr_merged_on: DateTime<Utc>,
}

/// Reviewer stats across many PRs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerReviewStats {
    pub reviewer: UserId,
    /// Average working time until approval
    pub average: Duration,
    pub total_reviews: usize,
    pub reviewed_prs: Vec<ReviewStats>,
    /// PR author -> numbers of their PRs this reviewer approved
    pub reviewed_for: BTreeMap<UserId, Vec<i64>>,
}

/// Totals over every PR created by one author
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPrStats {
    pub author: UserId,
    pub total_prs_created: usize,
    pub total_issue_comments: u32,
    pub total_pr_submission_comments: u32,
    pub total_code_review_comments: u32,
}

impl AuthorPrStats {
    pub fn is_empty(&self) -> bool {
        self.total_prs_created == 0
            && self.total_issue_comments == 0
            && self.total_pr_submission_comments == 0
            && self.total_code_review_comments == 0
    }
}

/// Reviews one reviewer gave on one author's PRs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorReviewStats {
    pub author: UserId,
    pub reviewer: UserId,
    pub average: Duration,
    pub total_reviews: usize,
    pub total_comments: u32,
    pub stats: Vec<ReviewStats>,
}

/// Author-centric view: their PRs and who reviewed them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorStats {
    pub pr_stats: AuthorPrStats,
    pub review_stats: Vec<AuthorReviewStats>,
}

impl AuthorStats {
    /// Average ready-to-merge wall-clock time over every reviewed PR
    pub fn avg_merge_time(&self) -> Duration {
        let stats: Vec<&ReviewStats> = self.review_stats.iter().flat_map(|s| &s.stats).collect();
        if stats.is_empty() {
            return Duration::zero();
        }
        let total = stats
            .iter()
            .fold(Duration::zero(), |acc, s| acc + (s.pr_merged_on - s.pr_ready_on));
        total / stats.len() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_pr() -> PullRequest {
        PullRequest {
            number: 42,
            title: "Test PR".to_string(),
            html_url: "https://github.com/owner/repo/pull/42".to_string(),
            author: "author".to_string(),
            created_at: Utc.with_ymd_and_hms(2022, 9, 5, 14, 0, 0).unwrap(),
            merged_at: Some(Utc.with_ymd_and_hms(2022, 9, 6, 14, 0, 0).unwrap()),
            merged: true,
        }
    }

    #[test]
    fn test_all_comments_sums_every_kind() {
        let comment = UserPrComment {
            user: "yschimke".to_string(),
            issue_comment: 9,
            code_review_comment: 21,
            pr_review_submission_comment: 14,
        };
        assert_eq!(comment.all_comments(), 44);
        assert!(!comment.is_empty());
        assert!(UserPrComment::no_comments("x").is_empty());
    }

    #[test]
    fn test_reviewer_stats_combines_maps() {
        let pr = make_pr();
        let mut stats = PrStats {
            ready_for_review_at: pr.created_at,
            merged_at: pr.merged_at.unwrap(),
            pull_request: pr,
            initial_response_time: BTreeMap::new(),
            approval_time: BTreeMap::new(),
            comments: BTreeMap::new(),
        };
        stats
            .initial_response_time
            .insert("alice".to_string(), Duration::hours(1));
        stats
            .comments
            .insert("bob".to_string(), UserPrComment::no_comments("bob"));

        let alice = stats.reviewer_stats("alice").unwrap();
        assert_eq!(alice.initial_response_time, Some(Duration::hours(1)));
        assert_eq!(alice.approval_time, None);
        assert!(alice.comments.is_empty());

        assert!(stats.reviewer_stats("bob").is_some());
        assert!(stats.reviewer_stats("carol").is_none());
        assert_eq!(stats.users(), vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(stats.open_to_merge(), Duration::hours(24));
    }
}
