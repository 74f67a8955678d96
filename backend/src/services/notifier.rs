//! Outbound notifications to the review channel

use async_trait::async_trait;
use shared::{changed_fields, Business, Correction, CorrectionField};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Transport(reqwest::Error),

    #[error("notification rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

// Webhook URLs are credentials
impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.without_url())
    }
}

/// Events that reviewers are told about
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A new listing awaits approval
    BusinessSubmitted { business: Business },
    /// A correction to an existing listing awaits approval
    CorrectionSubmitted {
        business: Business,
        correction: Correction,
        changes: Vec<CorrectionField>,
    },
}

impl Notification {
    pub fn business_submitted(business: &Business) -> Self {
        Notification::BusinessSubmitted {
            business: business.clone(),
        }
    }

    /// Captures which fields the correction would change against the business as it is now
    pub fn correction_submitted(business: &Business, correction: &Correction) -> Self {
        Notification::CorrectionSubmitted {
            business: business.clone(),
            correction: correction.clone(),
            changes: changed_fields(business, correction),
        }
    }

    pub fn business(&self) -> &Business {
        match self {
            Notification::BusinessSubmitted { business } => business,
            Notification::CorrectionSubmitted { business, .. } => business,
        }
    }
}

/// Review channel capability, injected into services at startup
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a submission with an approve action attached
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Answer an approval action through the callback URL it carried
    async fn respond(&self, response_url: &str, text: &str) -> Result<(), NotifyError>;
}

/// Logs notifications instead of delivering them. Used when no webhook is configured.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let business = notification.business();
        match notification {
            Notification::BusinessSubmitted { .. } => {
                tracing::info!(business_id = business.id, name = %business.name, "Business submitted");
            }
            Notification::CorrectionSubmitted {
                correction,
                changes,
                ..
            } => {
                let changes: Vec<&str> = changes.iter().map(|c| c.name()).collect();
                tracing::info!(
                    business_id = business.id,
                    correction_id = correction.id,
                    changes = ?changes,
                    "Correction submitted"
                );
            }
        }
        Ok(())
    }

    async fn respond(&self, response_url: &str, text: &str) -> Result<(), NotifyError> {
        tracing::info!(response_url, text, "Approval response");
        Ok(())
    }
}
