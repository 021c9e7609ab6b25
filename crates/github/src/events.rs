//! GitHub REST payload types

use chrono::{DateTime, Utc};
use common::models::PullRequest;
use serde::{Deserialize, Serialize};

/// GitHub user (as appears in API payloads)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
}

impl GitHubUser {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            id: None,
            user_type: None,
        }
    }
}

/// Pull request as returned by `GET /repos/{owner}/{repo}/pulls/{number}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubPullRequest {
    pub number: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    pub user: GitHubUser,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged: Option<bool>,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        // The list endpoint omits `merged`; a merge timestamp is just as good
        let merged = pr.merged.unwrap_or(pr.merged_at.is_some());
        PullRequest {
            number: pr.number,
            title: pr.title,
            html_url: pr.html_url,
            author: pr.user.login,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
            merged,
        }
    }
}

/// Review comment anchored to a portion of the diff
/// (`GET /repos/{owner}/{repo}/pulls/{number}/comments`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubReviewComment {
    pub id: i64,
    pub user: GitHubUser,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pull_request_review_id: Option<i64>,
}
