//! Wire-level client for the activities service.
//!
//! Both halves of the app speak the same two endpoints: `GET /activities`
//! for the catalog and `POST /activities/{name}/signup?email={email}` to
//! register. The browser half goes through `gloo-net` (the fetch API), the
//! native half through `reqwest`; both share the URL builders and response
//! shapes defined here.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Escape set matching JavaScript's `encodeURIComponent`: everything except
/// ASCII alphanumerics and `-_.!~*'()` is percent-encoded. The service
/// expects names and emails in exactly this form.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// URL of the catalog endpoint. An empty base yields a page-relative URL.
pub fn activities_url(base: &str) -> String {
    format!("{}/activities", base)
}

/// URL of the signup endpoint for one activity and email, both
/// percent-encoded.
pub fn signup_url(base: &str, activity: &str, email: &str) -> String {
    format!(
        "{}/activities/{}/signup?email={}",
        base,
        encode_component(activity),
        encode_component(email)
    )
}

/// Body of a successful signup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupReceipt {
    pub message: String,
}

/// Explanation the service attaches to a refused request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Failure modes of a request to the activities service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed.
    #[error("request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success status, optionally carrying
    /// its own explanation in the body.
    #[error("status {status}")]
    Status { status: u16, detail: Option<String> },
    /// The body of a success response could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[cfg(feature = "hydrate")]
pub mod browser {
    //! Fetch-API client used by the hydrated page, always relative to the
    //! page's own origin.

    use gloo_net::http::Request;

    use super::{activities_url, signup_url, ApiError, ErrorDetail, SignupReceipt};
    use crate::model::Catalog;

    /// Fetches the catalog. Whatever decodes as a catalog is accepted; the
    /// shape is not validated beyond deserialization.
    pub async fn fetch_activities() -> Result<Catalog, ApiError> {
        let resp = Request::get(&activities_url(""))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        resp.json::<Catalog>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Registers an email for an activity. A refusal is reported with the
    /// service's own explanation when the body carries one.
    pub async fn submit_signup(activity: &str, email: &str) -> Result<SignupReceipt, ApiError> {
        let resp = Request::post(&signup_url("", activity, email))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if resp.ok() {
            resp.json::<SignupReceipt>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            let status = resp.status();
            let detail = resp.json::<ErrorDetail>().await.ok().map(|d| d.detail);
            Err(ApiError::Status { status, detail })
        }
    }
}

#[cfg(feature = "ssr")]
pub mod native {
    //! Reqwest twin of the browser client, for driving a running service
    //! from native code and integration tests.

    use super::{activities_url, signup_url, ApiError, ErrorDetail, SignupReceipt};
    use crate::model::Catalog;

    #[derive(Debug, Clone)]
    pub struct ApiClient {
        base: String,
        http: reqwest::Client,
    }

    impl ApiClient {
        /// Creates a client for a service rooted at `base`, e.g.
        /// `http://127.0.0.1:3000`.
        pub fn new(base: impl Into<String>) -> Self {
            ApiClient {
                base: base.into(),
                http: reqwest::Client::new(),
            }
        }

        pub async fn fetch_activities(&self) -> Result<Catalog, ApiError> {
            let resp = self
                .http
                .get(activities_url(&self.base))
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            resp.json::<Catalog>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        }

        pub async fn submit_signup(
            &self,
            activity: &str,
            email: &str,
        ) -> Result<SignupReceipt, ApiError> {
            let resp = self
                .http
                .post(signup_url(&self.base, activity, email))
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            if resp.status().is_success() {
                resp.json::<SignupReceipt>()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))
            } else {
                let status = resp.status().as_u16();
                let detail = resp.json::<ErrorDetail>().await.ok().map(|d| d.detail);
                Err(ApiError::Status { status, detail })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_url_encodes_path_and_query() {
        assert_eq!(
            signup_url("", "Chess Club", "b@x.com"),
            "/activities/Chess%20Club/signup?email=b%40x.com"
        );
        assert_eq!(
            signup_url("http://127.0.0.1:3000", "Gym Class", "kim@mergington.edu"),
            "http://127.0.0.1:3000/activities/Gym%20Class/signup?email=kim%40mergington.edu"
        );
    }

    #[test]
    fn test_encode_component_escape_set() {
        // The spared characters pass through untouched.
        assert_eq!(encode_component("azAZ09-_.!~*'()"), "azAZ09-_.!~*'()");
        // Everything else is escaped, including non-ASCII.
        assert_eq!(encode_component("a b+c/d&e=f#g"), "a%20b%2Bc%2Fd%26e%3Df%23g");
        assert_eq!(encode_component("café"), "caf%C3%A9");
    }

    #[test]
    fn test_activities_url() {
        assert_eq!(activities_url(""), "/activities");
        assert_eq!(
            activities_url("http://127.0.0.1:3000"),
            "http://127.0.0.1:3000/activities"
        );
    }
}
