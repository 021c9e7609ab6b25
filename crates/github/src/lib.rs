//! GitHub payload types consumed by the review statistics

pub mod events;
pub mod timeline;

pub use events::{GitHubPullRequest, GitHubReviewComment, GitHubUser};
pub use timeline::{ReviewState, TimelineEvent};
