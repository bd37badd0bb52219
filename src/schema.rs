use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys every generated report must carry, in template order.
pub const REPORT_FIELDS: [&str; 10] = [
    "client",
    "businessoverview",
    "instagramSummary",
    "facebookSummary",
    "instagramScore",
    "facebookScore",
    "overallScore",
    "businesssummary",
    "insights",
    "tips",
];

/// Required submission fields with every key they have been sent under.
pub const REQUIRED_SUBMISSION_FIELDS: [(&str, &[&str]); 3] = [
    ("url", &["url", "business_url", "website", "websiteUrl"]),
    ("email", &["email", "business_email"]),
    ("phone", &["phone", "business_phone"]),
];

/// Optional submission fields and their accepted keys.
pub const OPTIONAL_SUBMISSION_FIELDS: [(&str, &[&str]); 4] = [
    ("category", &["category", "business_category"]),
    ("owner", &["owner", "owner_name", "name"]),
    ("instagram", &["instagram", "instagram_handle"]),
    ("facebook", &["facebook", "facebook_handle"]),
];

/// Business details posted to `/submit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    #[serde(alias = "business_url", alias = "website", alias = "websiteUrl")]
    pub url: String,

    #[serde(alias = "business_email")]
    pub email: String,

    #[serde(alias = "business_phone")]
    pub phone: String,

    #[serde(default, alias = "business_category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, alias = "owner_name", alias = "name", skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, alias = "instagram_handle", skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,

    #[serde(default, alias = "facebook_handle", skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

/// One line of the submissions log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub submission: Submission,
    pub received_at: DateTime<Utc>,
}

/// A score as the model wrote it. Requested as a number, sometimes delivered as text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Score {
    Number(serde_json::Number),
    Text(String),
}

/// The ten-field audit produced for one submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub client: String,

    pub businessoverview: String,

    #[serde(rename = "instagramSummary")]
    pub instagram_summary: String,

    #[serde(rename = "facebookSummary")]
    pub facebook_summary: String,

    #[serde(rename = "instagramScore")]
    pub instagram_score: Score,

    #[serde(rename = "facebookScore")]
    pub facebook_score: Score,

    #[serde(rename = "overallScore")]
    pub overall_score: Score,

    pub businesssummary: String,

    pub insights: Vec<String>,

    pub tips: Vec<String>,
}

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct SuccessBody<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> SuccessBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
