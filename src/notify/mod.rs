use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::errors::SkinGenError;
use crate::profile::RoutineResult;

#[derive(Serialize)]
struct ReminderPayload<'a> {
    email: &'a str,
    routine: &'a str,
}

#[derive(Debug)]
pub enum ReminderOutcome {
    /// No email was given.
    Skipped,
    Registered,
    Failed(SkinGenError),
}

impl ReminderOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, ReminderOutcome::Registered)
    }
}

/// Best-effort, at-most-once POST of the routine to an automation webhook.
pub struct ReminderNotifier {
    webhook_url: String,
    client: Client,
}

impl ReminderNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self { webhook_url: webhook_url.into(), client: Client::new() }
    }

    pub async fn notify(&self, email: Option<&str>, routine: &RoutineResult) -> ReminderOutcome {
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) => e,
            None => return ReminderOutcome::Skipped,
        };
        let payload = ReminderPayload { email, routine: &routine.text };

        let resp = match self.client.post(&self.webhook_url).json(&payload).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "reminder webhook unreachable");
                return ReminderOutcome::Failed(SkinGenError::Notification(format!(
                    "email sending failed: {e}"
                )));
            }
        };

        match resp.status() {
            StatusCode::OK => {
                tracing::info!("registered email reminder");
                ReminderOutcome::Registered
            }
            status => {
                tracing::warn!(%status, "reminder webhook rejected the request");
                ReminderOutcome::Failed(SkinGenError::Notification(format!(
                    "could not register for email reminders (HTTP {status})"
                )))
            }
        }
    }
}
