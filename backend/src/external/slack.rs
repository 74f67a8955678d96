//! Slack incoming webhook client
//!
//! Posts review messages with an Approve button and answers approval actions
//! through their `response_url`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use shared::{Business, Correction, CorrectionField};

use crate::services::approval::ApprovalKind;
use crate::services::notifier::{Notification, Notifier, NotifyError};

/// Slack webhook client
#[derive(Clone)]
pub struct SlackWebhookClient {
    client: Client,
    webhook_url: String,
    /// Marks every message as a test outside production
    test_mode: bool,
}

impl SlackWebhookClient {
    pub fn new(webhook_url: String, test_mode: bool) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            test_mode,
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackWebhookClient {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = render_message(notification, self.test_mode);
        self.post(&self.webhook_url, &message).await?;
        tracing::debug!(business_id = notification.business().id, "Slack notification sent");
        Ok(())
    }

    async fn respond(&self, response_url: &str, text: &str) -> Result<(), NotifyError> {
        self.post(response_url, &json!({ "text": text })).await
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Current value, struck through and followed by the proposed one when it changes
fn diff(changed: bool, current: &str, proposed: &str) -> String {
    if changed {
        format!("~{}~ {}", current, proposed)
    } else {
        current.to_string()
    }
}

/// Field values as shown to reviewers
struct Rendered {
    business_type: String,
    tags: String,
    phone: String,
    details: String,
    hours: String,
    url: String,
    donateurl: String,
    giftcard: String,
    takeout: String,
    delivery: String,
    closed: String,
}

impl Rendered {
    fn of(business: &Business) -> Self {
        Self {
            business_type: business.business_type.clone(),
            tags: business.tags.join(", "),
            phone: business.phone.clone(),
            details: text(&business.details).to_string(),
            hours: text(&business.hours).to_string(),
            url: text(&business.url).to_string(),
            donateurl: text(&business.donateurl).to_string(),
            giftcard: yes_no(business.giftcard).to_string(),
            takeout: yes_no(business.takeout).to_string(),
            delivery: yes_no(business.delivery).to_string(),
            closed: yes_no(business.closed).to_string(),
        }
    }

    fn with_changes(business: &Business, correction: &Correction, changes: &[CorrectionField]) -> Self {
        let mut rendered = Self::of(business);
        let changed = |field| changes.contains(&field);

        rendered.business_type = diff(
            changed(CorrectionField::Type),
            &business.business_type,
            &correction.business_type,
        );
        if changed(CorrectionField::Tags) {
            let struck: Vec<String> = business.tags.iter().map(|t| format!("~{}~", t)).collect();
            rendered.tags = struck
                .into_iter()
                .chain(correction.tags.iter().cloned())
                .collect::<Vec<_>>()
                .join(", ");
        }
        rendered.phone = diff(changed(CorrectionField::Phone), &business.phone, &correction.phone);
        rendered.details = diff(
            changed(CorrectionField::Details),
            text(&business.details),
            text(&correction.details),
        );
        rendered.hours = diff(
            changed(CorrectionField::Hours),
            text(&business.hours),
            text(&correction.hours),
        );
        rendered.url = diff(changed(CorrectionField::Url), text(&business.url), text(&correction.url));
        rendered.donateurl = diff(
            changed(CorrectionField::DonateUrl),
            text(&business.donateurl),
            text(&correction.donateurl),
        );
        rendered.giftcard = diff(
            changed(CorrectionField::Giftcard),
            yes_no(business.giftcard),
            yes_no(correction.giftcard),
        );
        rendered.takeout = diff(
            changed(CorrectionField::Takeout),
            yes_no(business.takeout),
            yes_no(correction.takeout),
        );
        rendered.delivery = diff(
            changed(CorrectionField::Delivery),
            yes_no(business.delivery),
            yes_no(correction.delivery),
        );
        rendered.closed = diff(
            changed(CorrectionField::Closed),
            yes_no(business.closed),
            yes_no(correction.closed),
        );
        rendered
    }
}

fn mrkdwn(text: String) -> Value {
    json!({ "type": "mrkdwn", "text": text })
}

/// Block Kit message for a review notification
pub fn render_message(notification: &Notification, test_mode: bool) -> Value {
    let business = notification.business();
    let (operation, rendered, kind, action_value, notes) = match notification {
        Notification::BusinessSubmitted { business } => (
            "SUBMITTED",
            Rendered::of(business),
            ApprovalKind::Submission,
            business.id,
            None,
        ),
        Notification::CorrectionSubmitted {
            business,
            correction,
            changes,
        } => (
            "CORRECTED",
            Rendered::with_changes(business, correction, changes),
            ApprovalKind::Correction,
            correction.id,
            Some(text(&correction.notes).to_string()),
        ),
    };

    let name = if test_mode {
        format!("**THIS IS A TEST** {}", business.name)
    } else {
        business.name.clone()
    };
    let geolocated = if business.location.is_some() {
        "Is Geolocated"
    } else {
        "Is NOT Geolocated"
    };

    let summary = format!(
        "A new business has been {}:\n*{}*\n{} {}\n{}, {} {}\n({})\n\nEmail: {} - Phone: {}\nURL: {}",
        operation,
        name,
        business.address,
        text(&business.address2),
        business.city,
        business.state,
        business.zipcode,
        geolocated,
        business.email,
        rendered.phone,
        rendered.url,
    );

    let mut blocks = vec![
        json!({ "type": "section", "text": mrkdwn(summary) }),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*Type:*\n{} ({})", rendered.business_type, rendered.tags)),
                mrkdwn(format!("*Hours:*\n{}", rendered.hours)),
                mrkdwn(format!("*Offers Giftcard:*\n{}", rendered.giftcard)),
                mrkdwn(format!("*Offers Takeout:*\n{}", rendered.takeout)),
                mrkdwn(format!("*Offers Delivery:*\n{}", rendered.delivery)),
                mrkdwn(format!("*Is Closed:*\n{}", rendered.closed)),
            ]
        }),
        json!({ "type": "divider" }),
    ];

    // Slack rejects section blocks with empty text
    if !rendered.details.is_empty() {
        blocks.push(json!({ "type": "section", "text": mrkdwn(rendered.details.clone()) }));
    }
    if !rendered.donateurl.is_empty() {
        blocks.push(json!({
            "type": "section",
            "text": mrkdwn(format!("*Donate:*\n{}", rendered.donateurl))
        }));
    }
    if let Some(notes) = notes {
        blocks.push(json!({
            "type": "section",
            "text": mrkdwn(format!("*Submission Notes*\n {}", notes))
        }));
    }

    blocks.push(json!({
        "type": "actions",
        "elements": [{
            "type": "button",
            "style": "primary",
            "action_id": kind.action_id(),
            "value": action_value.to_string(),
            "text": { "type": "plain_text", "text": "Approve" }
        }]
    }));

    json!({
        "text": format!("A new business has been {}: {}", operation, name),
        "blocks": blocks
    })
}
