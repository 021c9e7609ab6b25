//! PR timeline analysis
//!
//! Walks one merged PR's timeline to find, per reviewer, when the PR became
//! reviewable for them, when they first responded and when they approved.
//! Events are expected in chronological order; nothing here re-sorts them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use common::models::{PrStats, PullRequest, UserId, UserPrComment};
use github::timeline::{ReviewState, ReviewedEvent};
use github::{GitHubReviewComment, TimelineEvent};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calendar::{CalendarPolicy, StandardCalendar};
use crate::timezone::TimezoneResolver;
use crate::working_hours::{WorkingHoursCalculator, WorkingHoursError};

/// First occurrences of everything one login did on the timeline
#[derive(Debug, Default, Clone, Copy)]
struct Activity<'a> {
    first_request: Option<DateTime<Utc>>,
    first_review: Option<&'a ReviewedEvent>,
    first_response: Option<&'a ReviewedEvent>,
    first_approval: Option<&'a ReviewedEvent>,
}

/// One pass over a PR timeline, keyed by login
#[derive(Debug, Default, Clone)]
pub struct TimelineIndex<'a> {
    ready_for_review_at: Option<DateTime<Utc>>,
    requesters: BTreeSet<&'a str>,
    activity: BTreeMap<&'a str, Activity<'a>>,
    comments: BTreeMap<UserId, UserPrComment>,
}

impl<'a> TimelineIndex<'a> {
    pub fn from_events(events: &'a [TimelineEvent]) -> Self {
        events.iter().fold(Self::default(), Self::record)
    }

    /// Add diff comments to the per-user comment tally
    pub fn with_code_review_comments(self, comments: &[GitHubReviewComment]) -> Self {
        comments.iter().fold(self, |mut index, comment| {
            tally(&mut index.comments, &comment.user.login).code_review_comment += 1;
            index
        })
    }

    fn record(mut self, event: &'a TimelineEvent) -> Self {
        match event {
            TimelineEvent::ReadyForReview(e) => {
                self.ready_for_review_at.get_or_insert(e.created_at);
            }
            TimelineEvent::ReviewRequested(e) => {
                self.requesters.insert(e.actor.login.as_str());
                if let Some(login) = e.requested_login() {
                    let activity = self.activity.entry(login).or_default();
                    activity.first_request.get_or_insert(e.created_at);
                }
            }
            TimelineEvent::Reviewed(e) => {
                let activity = self.activity.entry(e.user.login.as_str()).or_default();
                activity.first_review.get_or_insert(e);
                if e.state.is_response() {
                    activity.first_response.get_or_insert(e);
                }
                if e.state == ReviewState::Approved {
                    activity.first_approval.get_or_insert(e);
                }
                if e.state.is_submission_comment() {
                    tally(&mut self.comments, &e.user.login).pr_review_submission_comment += 1;
                }
            }
            TimelineEvent::Commented(e) => {
                tally(&mut self.comments, &e.user.login).issue_comment += 1;
            }
            _ => {}
        }
        self
    }

    /// When the PR became available for review: the first ready-for-review
    /// transition for PRs opened as drafts, creation time otherwise.
    pub fn ready_for_review_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        self.ready_for_review_at.unwrap_or(created_at)
    }

    /// Everyone who requested a review or submitted one, minus the author
    pub fn reviewers(&self, author: &str) -> BTreeSet<UserId> {
        let submitters = self
            .activity
            .iter()
            .filter(|(_, activity)| activity.first_review.is_some())
            .map(|(login, _)| *login);

        self.requesters
            .iter()
            .copied()
            .chain(submitters)
            .filter(|login| *login != author)
            .map(str::to_string)
            .collect()
    }

    /// Instant from which `reviewer`'s response time is measured.
    ///
    /// A review request addressed to them starts their clock, unless they had
    /// already reviewed before being asked; then the PR-wide ready time applies.
    pub fn reviewer_ready_at(&self, reviewer: &str, pr_ready_at: DateTime<Utc>) -> DateTime<Utc> {
        let Some(activity) = self.activity.get(reviewer) else {
            return pr_ready_at;
        };
        match (activity.first_request, activity.first_review) {
            (Some(requested), Some(review)) if requested > review.submitted_at => pr_ready_at,
            (Some(requested), _) => requested,
            (None, _) => pr_ready_at,
        }
    }

    /// First approve, request-changes or comment review by `reviewer`
    pub fn first_response(&self, reviewer: &str) -> Option<&'a ReviewedEvent> {
        self.activity.get(reviewer).and_then(|a| a.first_response)
    }

    /// First approval by `reviewer`
    pub fn first_approval(&self, reviewer: &str) -> Option<&'a ReviewedEvent> {
        self.activity.get(reviewer).and_then(|a| a.first_approval)
    }

    /// Comment tally per user: conversation comments, diff comments and
    /// commented/changes-requested review submissions. The author is included.
    pub fn comments(&self) -> &BTreeMap<UserId, UserPrComment> {
        &self.comments
    }

    pub fn into_comments(self) -> BTreeMap<UserId, UserPrComment> {
        self.comments
    }
}

fn tally<'m>(comments: &'m mut BTreeMap<UserId, UserPrComment>, login: &str) -> &'m mut UserPrComment {
    comments
        .entry(login.to_string())
        .or_insert_with(|| UserPrComment::no_comments(login))
}

/// Turns a PR timeline into [`PrStats`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PrReviewTimelineAnalyzer<P = StandardCalendar> {
    calculator: WorkingHoursCalculator<P>,
}

impl PrReviewTimelineAnalyzer<StandardCalendar> {
    pub const fn standard() -> Self {
        Self {
            calculator: WorkingHoursCalculator::standard(),
        }
    }
}

impl<P: CalendarPolicy> PrReviewTimelineAnalyzer<P> {
    pub fn new(policy: P) -> Self {
        Self {
            calculator: WorkingHoursCalculator::new(policy),
        }
    }

    /// Compute review statistics for a merged PR.
    ///
    /// Only fails when a review precedes the instant its clock starts at
    /// (e.g. a review submitted while the PR was still a draft).
    pub fn analyze<R>(
        &self,
        pr: &PullRequest,
        events: &[TimelineEvent],
        code_review_comments: &[GitHubReviewComment],
        timezones: &R,
    ) -> Result<PrStats, WorkingHoursError>
    where
        R: TimezoneResolver + ?Sized,
    {
        let index =
            TimelineIndex::from_events(events).with_code_review_comments(code_review_comments);
        let ready_at = index.ready_for_review_at(pr.created_at);
        let merged_at = pr.merged_at.unwrap_or_else(|| {
            warn!("PR #{} has no merge time, using its ready time", pr.number);
            ready_at
        });

        let zoned: Vec<(UserId, _)> = index
            .reviewers(&pr.author)
            .into_iter()
            .map(|reviewer| {
                let zone = timezones.timezone_of(&reviewer);
                (reviewer, zone)
            })
            .collect();
        let elapsed = |reviewer: &str, zone, review: &ReviewedEvent| {
            self.calculator
                .diff(index.reviewer_ready_at(reviewer, ready_at), review.submitted_at, zone)
        };

        let initial_response_time = zoned
            .iter()
            .filter_map(|(reviewer, zone)| {
                let review = index.first_response(reviewer)?;
                Some(elapsed(reviewer, *zone, review).map(|d| (reviewer.clone(), d)))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let approval_time = zoned
            .iter()
            .filter_map(|(reviewer, zone)| {
                let approval = index.first_approval(reviewer)?;
                Some(elapsed(reviewer, *zone, approval).map(|d| (reviewer.clone(), d)))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        for (reviewer, took) in &approval_time {
            debug!(
                "PR #{} approved by {} after {} of working time, open to merge {}",
                pr.number,
                reviewer,
                format_duration(*took),
                format_duration(merged_at - ready_at)
            );
        }

        Ok(PrStats {
            pull_request: pr.clone(),
            initial_response_time,
            approval_time,
            comments: index.into_comments(),
            ready_for_review_at: ready_at,
            merged_at,
        })
    }
}

/// [`PrReviewTimelineAnalyzer::analyze`] under the standard calendar
pub fn analyze<R>(
    pr: &PullRequest,
    events: &[TimelineEvent],
    code_review_comments: &[GitHubReviewComment],
    timezones: &R,
) -> Result<PrStats, WorkingHoursError>
where
    R: TimezoneResolver + ?Sized,
{
    PrReviewTimelineAnalyzer::standard().analyze(pr, events, code_review_comments, timezones)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("PR #{number} is not merged")]
    NotMerged { number: i64 },

    #[error("PR #{number} was authored by ignored user {author}")]
    IgnoredAuthor { number: i64, author: UserId },

    #[error("PR #{number} has no reviewers")]
    NoReviewers { number: i64 },

    #[error(transparent)]
    InvalidInterval(#[from] WorkingHoursError),
}

/// Filters out PRs that should not produce statistics, then analyzes the rest
#[derive(Debug, Clone)]
pub struct PrStatsEvaluator<R, P = StandardCalendar> {
    timezones: R,
    ignored_users: BTreeSet<UserId>,
    analyzer: PrReviewTimelineAnalyzer<P>,
}

impl<R: TimezoneResolver> PrStatsEvaluator<R, StandardCalendar> {
    pub fn new<I, S>(timezones: R, ignored_users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        Self::with_analyzer(timezones, ignored_users, PrReviewTimelineAnalyzer::standard())
    }
}

impl<R: TimezoneResolver, P: CalendarPolicy> PrStatsEvaluator<R, P> {
    pub fn with_analyzer<I, S>(timezones: R, ignored_users: I, analyzer: PrReviewTimelineAnalyzer<P>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        Self {
            timezones,
            ignored_users: ignored_users.into_iter().map(Into::into).collect(),
            analyzer,
        }
    }

    pub fn is_ignored(&self, login: &str) -> bool {
        self.ignored_users.contains(login)
    }

    /// Statistics for `pr`, with ignored users stripped from every map
    pub fn evaluate(
        &self,
        pr: &PullRequest,
        events: &[TimelineEvent],
        code_review_comments: &[GitHubReviewComment],
    ) -> Result<PrStats, StatsError> {
        if !pr.merged || pr.merged_at.is_none() {
            return Err(StatsError::NotMerged { number: pr.number });
        }
        if self.is_ignored(&pr.author) {
            return Err(StatsError::IgnoredAuthor {
                number: pr.number,
                author: pr.author.clone(),
            });
        }
        if TimelineIndex::from_events(events)
            .reviewers(&pr.author)
            .iter()
            .all(|login| self.is_ignored(login))
        {
            return Err(StatsError::NoReviewers { number: pr.number });
        }

        let mut stats = self
            .analyzer
            .analyze(pr, events, code_review_comments, &self.timezones)?;

        stats.initial_response_time.retain(|login, _| !self.is_ignored(login));
        stats.approval_time.retain(|login, _| !self.is_ignored(login));
        stats.comments.retain(|login, _| !self.is_ignored(login));

        debug!(
            "PR #{}: {} responded, {} approved, {} commented",
            pr.number,
            stats.initial_response_time.len(),
            stats.approval_time.len(),
            stats.comments.len()
        );
        Ok(stats)
    }
}

fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    format!("{}h {}m", minutes / 60, minutes % 60)
}
