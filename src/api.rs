//! HTTP client for the activities backend
//! Wraps the three endpoints the app consumes: the activity directory,
//! signup, and participant removal.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Activity name -> detail, as served by `GET /activities`.
/// BTreeMap keeps the card list and selector in name order.
pub type ActivityDirectory = BTreeMap<String, Activity>;

/// One activity as served by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    /// Remaining capacity. Signed so an over-filled roster shows as negative
    /// instead of wrapping.
    pub fn spots_left(&self) -> i64 {
        self.max_participants as i64 - self.participants.len() as i64
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-OK response. `detail` is the server's explanation, shown verbatim
    /// when present.
    #[error("server rejected the request ({status})")]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },
    /// Transport failure or an undecodable body.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Success body of the signup/removal endpoints.
#[derive(Debug, Default, Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    message: Option<String>,
}

/// Failure body of the signup/removal endpoints.
#[derive(Debug, Default, Deserialize)]
struct Rejection {
    #[serde(default)]
    detail: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn activities_url(&self) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("base url cannot be a base")
            .pop_if_empty()
            .push("activities");
        url
    }

    /// Signup endpoint for one (activity, email) pair. The activity name is
    /// percent-encoded as a path segment, the email as a query value.
    pub fn signup_url(&self, activity: &str, email: &str) -> Url {
        let mut url = self.activities_url();
        url.path_segments_mut()
            .expect("base url cannot be a base")
            .push(activity)
            .push("signup");
        url.query_pairs_mut().append_pair("email", email);
        url
    }

    /// Fetch the full activity directory. Any non-OK status or undecodable
    /// body is an error; the caller never sees a partial directory.
    pub async fn list_activities(&self) -> Result<ActivityDirectory, ApiError> {
        let url = self.activities_url();
        debug!(url = %url, "Fetching activities");
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json::<ActivityDirectory>().await?)
    }

    /// Sign `email` up for `activity`. Returns the server's message.
    pub async fn sign_up(&self, activity: &str, email: &str) -> Result<String, ApiError> {
        let url = self.signup_url(activity, email);
        debug!(url = %url, "Signing up participant");
        let response = self.http.post(url).send().await?;
        if response.status().is_success() {
            let ack = response.json::<Acknowledgement>().await?;
            Ok(ack
                .message
                .unwrap_or_else(|| format!("Signed up {} for {}", email, activity)))
        } else {
            Err(Self::rejection(response).await)
        }
    }

    /// Remove `email` from `activity`'s roster. The removal route is assumed
    /// to be DELETE on the same path the signup POST uses; if the server
    /// contract changes, only this method needs to move.
    pub async fn remove_participant(&self, activity: &str, email: &str) -> Result<String, ApiError> {
        let url = self.signup_url(activity, email);
        debug!(url = %url, "Removing participant");
        let response = self.http.delete(url).send().await?;
        if response.status().is_success() {
            // Some servers answer this route with an empty body; tolerate it.
            let ack = response.json::<Acknowledgement>().await.unwrap_or_default();
            Ok(ack
                .message
                .unwrap_or_else(|| format!("{} removed from {}", email, activity)))
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn rejection(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.json::<Rejection>().await.unwrap_or_default();
        ApiError::Rejected {
            status,
            detail: body.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap())
    }

    #[test]
    fn signup_url_encodes_name_and_email() {
        let url = client("http://localhost:8000").signup_url("Chess Club", "a@x.com");
        assert_eq!(url.path(), "/activities/Chess%20Club/signup");
        assert_eq!(url.query(), Some("email=a%40x.com"));
    }

    #[test]
    fn signup_url_tolerates_trailing_slash_in_base() {
        let url = client("http://localhost:8000/").signup_url("Gym Class", "b@x.com");
        assert_eq!(url.path(), "/activities/Gym%20Class/signup");
    }

    #[test]
    fn spots_left_is_capacity_minus_roster() {
        let activity = Activity {
            description: "d".into(),
            schedule: "s".into(),
            max_participants: 10,
            participants: vec!["a@x.com".into()],
        };
        assert_eq!(activity.spots_left(), 9);
    }

    #[test]
    fn spots_left_goes_negative_when_overfull() {
        let activity = Activity {
            description: "d".into(),
            schedule: "s".into(),
            max_participants: 1,
            participants: vec!["a@x.com".into(), "b@x.com".into()],
        };
        assert_eq!(activity.spots_left(), -1);
    }

    #[test]
    fn directory_decodes_and_keeps_markup_characters_literal() {
        let json = r#"{
            "Chess Club": {
                "description": "<b>Weekly</b> & \"friendly\" games",
                "schedule": "Fridays 3-5pm",
                "max_participants": 10,
                "participants": ["<script>alert('x')</script>@x.com"]
            }
        }"#;
        let directory: ActivityDirectory = serde_json::from_str(json).unwrap();
        let chess = &directory["Chess Club"];
        assert_eq!(chess.description, "<b>Weekly</b> & \"friendly\" games");
        assert_eq!(chess.participants[0], "<script>alert('x')</script>@x.com");
        assert_eq!(chess.spots_left(), 9);
    }

    #[test]
    fn directory_decodes_missing_participants_as_empty() {
        let json = r#"{"Art Club": {"description": "d", "schedule": "s", "max_participants": 5}}"#;
        let directory: ActivityDirectory = serde_json::from_str(json).unwrap();
        assert!(directory["Art Club"].participants.is_empty());
        assert_eq!(directory["Art Club"].spots_left(), 5);
    }
}
