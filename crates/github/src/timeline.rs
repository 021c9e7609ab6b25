//! PR timeline events (`GET /repos/{owner}/{repo}/issues/{number}/timeline`)
//!
//! Only the events that matter for review statistics are modelled; every other
//! `event` discriminant deserializes to [`TimelineEvent::Unknown`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::GitHubUser;

/// A single entry of a PR timeline, tagged by GitHub's `event` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    ReviewRequested(ReviewRequestedEvent),
    Reviewed(ReviewedEvent),
    ReadyForReview(ReadyForReviewEvent),
    /// Plain conversation comment on the PR
    Commented(CommentedEvent),
    Closed(ClosedEvent),
    Merged(MergedEvent),
    #[serde(other)]
    Unknown,
}

/// Someone asked a user (or a team) to review the PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequestedEvent {
    pub actor: GitHubUser,
    /// `None` when a team was requested instead of a user
    #[serde(default)]
    pub requested_reviewer: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
}

/// A review was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedEvent {
    pub user: GitHubUser,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Draft PR was marked ready for review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyForReviewEvent {
    pub actor: GitHubUser,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentedEvent {
    pub user: GitHubUser,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedEvent {
    pub actor: GitHubUser,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedEvent {
    pub actor: GitHubUser,
    pub created_at: DateTime<Utc>,
}

/// Review states as reported on `reviewed` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl ReviewState {
    /// States that count as a reviewer responding to the PR
    pub fn is_response(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::ChangesRequested | Self::Commented
        )
    }

    /// States whose submission counts as a review-level comment
    pub fn is_submission_comment(self) -> bool {
        matches!(self, Self::ChangesRequested | Self::Commented)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::ChangesRequested => "changes_requested",
            Self::Commented => "commented",
            Self::Dismissed => "dismissed",
            Self::Pending => "pending",
        }
    }
}

impl TimelineEvent {
    /// GitHub's `event` discriminant
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ReviewRequested(_) => "review_requested",
            Self::Reviewed(_) => "reviewed",
            Self::ReadyForReview(_) => "ready_for_review",
            Self::Commented(_) => "commented",
            Self::Closed(_) => "closed",
            Self::Merged(_) => "merged",
            Self::Unknown => "unknown",
        }
    }

    /// When the event happened (`submitted_at` for reviews)
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::ReviewRequested(e) => Some(e.created_at),
            Self::Reviewed(e) => Some(e.submitted_at),
            Self::ReadyForReview(e) => Some(e.created_at),
            Self::Commented(e) => Some(e.created_at),
            Self::Closed(e) => Some(e.created_at),
            Self::Merged(e) => Some(e.created_at),
            Self::Unknown => None,
        }
    }

    /// The user who performed the event
    pub fn actor(&self) -> Option<&GitHubUser> {
        match self {
            Self::ReviewRequested(e) => Some(&e.actor),
            Self::Reviewed(e) => Some(&e.user),
            Self::ReadyForReview(e) => Some(&e.actor),
            Self::Commented(e) => Some(&e.user),
            Self::Closed(e) => Some(&e.actor),
            Self::Merged(e) => Some(&e.actor),
            Self::Unknown => None,
        }
    }

    pub fn as_reviewed(&self) -> Option<&ReviewedEvent> {
        match self {
            Self::Reviewed(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_review_requested(&self) -> Option<&ReviewRequestedEvent> {
        match self {
            Self::ReviewRequested(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_ready_for_review(&self) -> Option<&ReadyForReviewEvent> {
        match self {
            Self::ReadyForReview(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_commented(&self) -> Option<&CommentedEvent> {
        match self {
            Self::Commented(e) => Some(e),
            _ => None,
        }
    }
}

impl ReviewRequestedEvent {
    /// Login of the requested user, if a user (not a team) was requested
    pub fn requested_login(&self) -> Option<&str> {
        self.requested_reviewer.as_ref().map(|u| u.login.as_str())
    }
}

/// All `reviewed` events, in timeline order
pub fn reviewed_events(events: &[TimelineEvent]) -> impl Iterator<Item = &ReviewedEvent> {
    events.iter().filter_map(TimelineEvent::as_reviewed)
}

/// All `review_requested` events, in timeline order
pub fn review_requests(events: &[TimelineEvent]) -> impl Iterator<Item = &ReviewRequestedEvent> {
    events.iter().filter_map(TimelineEvent::as_review_requested)
}

/// All plain conversation comments, in timeline order
pub fn issue_comments(events: &[TimelineEvent]) -> impl Iterator<Item = &CommentedEvent> {
    events.iter().filter_map(TimelineEvent::as_commented)
}

/// Parse a timeline page as returned by the GitHub API
pub fn parse_timeline(json: &str) -> Result<Vec<TimelineEvent>, serde_json::Error> {
    let events: Vec<TimelineEvent> = serde_json::from_str(json)?;
    let unknown = events
        .iter()
        .filter(|e| matches!(e, TimelineEvent::Unknown))
        .count();
    tracing::debug!(
        "Parsed {} timeline events ({} ignored)",
        events.len(),
        unknown
    );
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMELINE: &str = r#"[
        {
            "id": 7416663789,
            "event": "review_requested",
            "created_at": "2022-09-19T20:10:38Z",
            "actor": { "login": "owaiskazi19", "type": "User" },
            "review_requester": { "login": "owaiskazi19" },
            "requested_reviewer": { "login": "reta", "type": "User" }
        },
        {
            "id": 7416663790,
            "event": "review_requested",
            "created_at": "2022-09-19T20:10:39Z",
            "actor": { "login": "owaiskazi19" },
            "requested_team": { "name": "opensearch-core", "slug": "opensearch-core" }
        },
        {
            "event": "labeled",
            "created_at": "2022-09-19T20:11:00Z",
            "actor": { "login": "owaiskazi19" },
            "label": { "name": "bug" }
        },
        {
            "event": "committed",
            "sha": "e2292c9b1d465794aeb0202da13a63f468ce8e79",
            "message": "Fix it"
        },
        {
            "id": 99064550,
            "user": { "login": "reta" },
            "body": null,
            "submitted_at": "2022-09-20T13:00:00Z",
            "state": "changes_requested",
            "html_url": "https://github.com/opensearch-project/OpenSearch/pull/4515#pullrequestreview-99064550",
            "event": "reviewed"
        },
        {
            "event": "commented",
            "id": 1,
            "actor": { "login": "reta" },
            "user": { "login": "reta" },
            "body": "LGTM after fixes",
            "created_at": "2022-09-20T13:05:00Z"
        },
        {
            "event": "ready_for_review",
            "id": 3252423176,
            "actor": { "login": "owaiskazi19" },
            "created_at": "2022-09-19T15:54:57Z"
        },
        {
            "event": "merged",
            "actor": { "login": "reta" },
            "created_at": "2022-09-21T10:00:00Z"
        },
        {
            "event": "closed",
            "actor": { "login": "reta" },
            "created_at": "2022-09-21T10:00:01Z",
            "state_reason": null
        }
    ]"#;

    #[test]
    fn test_parse_timeline_maps_each_event_type() {
        let events = parse_timeline(TIMELINE).unwrap();

        let kinds: Vec<&str> = events.iter().map(TimelineEvent::event_type).collect();
        assert_eq!(
            kinds,
            vec![
                "review_requested",
                "review_requested",
                "unknown",
                "unknown",
                "reviewed",
                "commented",
                "ready_for_review",
                "merged",
                "closed",
            ]
        );
    }

    #[test]
    fn test_team_review_request_has_no_requested_login() {
        let events = parse_timeline(TIMELINE).unwrap();
        let requests: Vec<_> = review_requests(&events).collect();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].requested_login(), Some("reta"));
        assert_eq!(requests[1].requested_login(), None);
        assert_eq!(requests[1].actor.login, "owaiskazi19");
    }

    #[test]
    fn test_reviewed_event_fields() {
        let events = parse_timeline(TIMELINE).unwrap();
        let reviews: Vec<_> = reviewed_events(&events).collect();

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].user.login, "reta");
        assert_eq!(reviews[0].state, ReviewState::ChangesRequested);
        assert_eq!(
            events[4].created_at().unwrap().to_rfc3339(),
            "2022-09-20T13:00:00+00:00"
        );
    }

    #[test]
    fn test_unknown_events_have_no_actor_or_time() {
        let events = parse_timeline(TIMELINE).unwrap();
        assert!(events[2].actor().is_none());
        assert!(events[3].created_at().is_none());
        assert_eq!(issue_comments(&events).count(), 1);
    }

    #[test]
    fn test_review_state_classification() {
        assert!(ReviewState::Approved.is_response());
        assert!(ReviewState::ChangesRequested.is_response());
        assert!(ReviewState::Commented.is_response());
        assert!(!ReviewState::Dismissed.is_response());
        assert!(!ReviewState::Pending.is_response());

        assert!(!ReviewState::Approved.is_submission_comment());
        assert!(ReviewState::Commented.is_submission_comment());
        assert!(ReviewState::ChangesRequested.is_submission_comment());
    }

    #[test]
    fn test_event_serializes_with_event_tag() {
        let event = TimelineEvent::ReadyForReview(ReadyForReviewEvent {
            actor: GitHubUser::new("octocat"),
            created_at: "2020-04-20T15:54:57Z".parse().unwrap(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ready_for_review");
        assert_eq!(json["actor"]["login"], "octocat");
    }
}
