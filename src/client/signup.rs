//! Signup submitter.
//!
//! # Responsibilities
//! - Post the signup form to the API with credentials (cookies) included
//! - On success: success alert, then navigate home after a fixed delay
//! - Alerts hide themselves after a fixed display time
//! - On rejection: error alert carrying the server's message
//!
//! # Design Decisions
//! - Exactly one request per call: no retry, no extra timeout, no double-submit guard
//! - Navigation is fire-and-forget; the handle is returned for callers that wait

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use url::Url;

use crate::client::alerts::{show_alert, AlertKind, AlertPresenter, ALERT_DURATION};
use crate::client::navigation::{navigate_after, Navigator};

pub const SIGNUP_PATH: &str = "/api/v1/users/signup";
pub const SUCCESS_MESSAGE: &str = "Sign up successfully!";
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);
pub const REDIRECT_TARGET: &str = "/";

/// Form data posted to the signup endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// What a signup attempt ended in.
#[derive(Debug)]
pub enum SignupOutcome {
    /// Account created; navigation home is pending on the handle.
    Success { navigation: JoinHandle<()> },
    /// The server, or the network, refused; the message was shown as an error alert.
    Rejected { message: String },
}

impl SignupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiReply {
    status: Option<String>,
    message: Option<String>,
}

fn status_fallback(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}

pub struct SignupClient {
    http: reqwest::Client,
    endpoint: Url,
    alerts: Arc<dyn AlertPresenter>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    alert_duration: Duration,
}

impl SignupClient {
    pub fn new(
        base_url: &str,
        alerts: Arc<dyn AlertPresenter>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SignupError> {
        let endpoint = Url::parse(base_url)?.join(SIGNUP_PATH)?;
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            endpoint,
            alerts,
            navigator,
            redirect_delay: REDIRECT_DELAY,
            alert_duration: ALERT_DURATION,
        })
    }

    /// Override the delay before navigating home.
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Override how long alerts stay visible.
    pub fn with_alert_duration(mut self, duration: Duration) -> Self {
        self.alert_duration = duration;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit `data` once and react to the outcome.
    pub async fn signup(&self, data: &SignupData) -> SignupOutcome {
        match self.submit(data).await {
            Ok(()) => {
                show_alert(
                    self.alerts.clone(),
                    AlertKind::Success,
                    SUCCESS_MESSAGE,
                    self.alert_duration,
                );
                let navigation =
                    navigate_after(self.navigator.clone(), REDIRECT_TARGET, self.redirect_delay);
                SignupOutcome::Success { navigation }
            }
            Err(message) => {
                tracing::debug!(message = %message, "Signup rejected");
                show_alert(self.alerts.clone(), AlertKind::Error, &message, self.alert_duration);
                SignupOutcome::Rejected { message }
            }
        }
    }

    /// `Ok` only for a 2xx reply whose status is "success"; otherwise the message to show.
    async fn submit(&self, data: &SignupData) -> Result<(), String> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(data)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status();
        let reply: ApiReply = response.json().await.unwrap_or_default();

        if status.is_success() && reply.status.as_deref() == Some("success") {
            Ok(())
        } else {
            Err(reply.message.unwrap_or_else(|| status_fallback(status)))
        }
    }
}

impl std::fmt::Debug for SignupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("redirect_delay", &self.redirect_delay)
            .field("alert_duration", &self.alert_duration)
            .finish_non_exhaustive()
    }
}
