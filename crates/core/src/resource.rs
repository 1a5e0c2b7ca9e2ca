//! Resource types fetched from the Stack Exchange API
//!
//! Each resource type fixes the endpoint, the sort key and the output file
//! name. The order of [`ResourceType::ALL`] is the order a full run processes
//! them in.

use std::fmt;
use std::str::FromStr;

/// Sort order sent with every request
pub const SORT_ORDER: &str = "desc";

/// Prefix of every output file name
pub const FILE_PREFIX: &str = "stackoverflow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Questions,
    Posts,
    Users,
    Tags,
    Comments,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Questions,
        ResourceType::Posts,
        ResourceType::Users,
        ResourceType::Tags,
        ResourceType::Comments,
    ];

    /// Lowercase identifier, also the endpoint path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Questions => "questions",
            ResourceType::Posts => "posts",
            ResourceType::Users => "users",
            ResourceType::Tags => "tags",
            ResourceType::Comments => "comments",
        }
    }

    /// Path of the endpoint relative to the API base
    pub fn endpoint(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Sort key requested for this resource type
    pub fn sort_key(&self) -> &'static str {
        match self {
            ResourceType::Users => "reputation",
            ResourceType::Tags => "popular",
            ResourceType::Questions | ResourceType::Posts | ResourceType::Comments => "votes",
        }
    }

    /// Output file name, e.g. `stackoverflow_questions.csv`
    pub fn file_name(&self) -> String {
        format!("{FILE_PREFIX}_{}.csv", self.as_str())
    }

    /// Fields returned by the API's default filter
    ///
    /// Only used as the header of a file written for zero records.
    pub fn default_columns(&self) -> &'static [&'static str] {
        match self {
            ResourceType::Questions => &[
                "tags",
                "owner",
                "is_answered",
                "view_count",
                "accepted_answer_id",
                "answer_count",
                "score",
                "last_activity_date",
                "creation_date",
                "last_edit_date",
                "question_id",
                "content_license",
                "link",
                "title",
            ],
            ResourceType::Posts => &[
                "owner",
                "score",
                "last_activity_date",
                "creation_date",
                "last_edit_date",
                "post_type",
                "post_id",
                "content_license",
                "link",
            ],
            ResourceType::Users => &[
                "badge_counts",
                "account_id",
                "is_employee",
                "last_modified_date",
                "last_access_date",
                "reputation_change_year",
                "reputation_change_quarter",
                "reputation_change_month",
                "reputation_change_week",
                "reputation_change_day",
                "reputation",
                "creation_date",
                "user_type",
                "user_id",
                "accept_rate",
                "location",
                "website_url",
                "link",
                "profile_image",
                "display_name",
            ],
            ResourceType::Tags => &[
                "has_synonyms",
                "is_moderator_only",
                "is_required",
                "count",
                "name",
            ],
            ResourceType::Comments => &[
                "owner",
                "edited",
                "score",
                "creation_date",
                "post_id",
                "comment_id",
                "content_license",
            ],
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("Invalid resource type: {s}. Valid types: questions, posts, users, tags, comments")
            })
    }
}
