//! Proposed corrections to existing listings
//!
//! A correction carries the full set of editable descriptive fields. Fields the
//! submitter did not intend to change are re-sent with their current value, so
//! applying a correction is a plain overwrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::business::Business;

/// A proposed, not yet approved edit of one business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Correction {
    pub id: i32,
    pub business_id: i32,
    #[serde(rename = "type")]
    pub business_type: String,
    pub tags: Vec<String>,
    pub phone: String,
    pub details: Option<String>,
    pub hours: Option<String>,
    pub url: Option<String>,
    pub donateurl: Option<String>,
    pub giftcard: bool,
    pub takeout: bool,
    pub delivery: bool,
    pub closed: bool,
    pub notes: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Submitted correction payload
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct CorrectionInput {
    /// Optional in the body; the route's business id is authoritative
    #[serde(default)]
    pub business_id: Option<i32>,
    #[serde(rename = "type")]
    pub business_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub donateurl: Option<String>,
    #[serde(default)]
    pub giftcard: bool,
    #[serde(default)]
    pub takeout: bool,
    #[serde(default)]
    pub delivery: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields a correction may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionField {
    Type,
    Tags,
    Phone,
    Details,
    Hours,
    Url,
    DonateUrl,
    Giftcard,
    Takeout,
    Delivery,
    Closed,
}

impl CorrectionField {
    pub const ALL: [CorrectionField; 11] = [
        CorrectionField::Type,
        CorrectionField::Tags,
        CorrectionField::Phone,
        CorrectionField::Details,
        CorrectionField::Hours,
        CorrectionField::Url,
        CorrectionField::DonateUrl,
        CorrectionField::Giftcard,
        CorrectionField::Takeout,
        CorrectionField::Delivery,
        CorrectionField::Closed,
    ];

    /// Payload field name
    pub fn name(&self) -> &'static str {
        match self {
            CorrectionField::Type => "type",
            CorrectionField::Tags => "tags",
            CorrectionField::Phone => "phone",
            CorrectionField::Details => "details",
            CorrectionField::Hours => "hours",
            CorrectionField::Url => "url",
            CorrectionField::DonateUrl => "donateurl",
            CorrectionField::Giftcard => "giftcard",
            CorrectionField::Takeout => "takeout",
            CorrectionField::Delivery => "delivery",
            CorrectionField::Closed => "closed",
        }
    }

    fn differs(&self, business: &Business, correction: &Correction) -> bool {
        match self {
            CorrectionField::Type => business.business_type != correction.business_type,
            CorrectionField::Tags => tags_key(&business.tags) != tags_key(&correction.tags),
            CorrectionField::Phone => business.phone != correction.phone,
            CorrectionField::Details => business.details != correction.details,
            CorrectionField::Hours => business.hours != correction.hours,
            CorrectionField::Url => business.url != correction.url,
            CorrectionField::DonateUrl => business.donateurl != correction.donateurl,
            CorrectionField::Giftcard => business.giftcard != correction.giftcard,
            CorrectionField::Takeout => business.takeout != correction.takeout,
            CorrectionField::Delivery => business.delivery != correction.delivery,
            CorrectionField::Closed => business.closed != correction.closed,
        }
    }
}

impl fmt::Display for CorrectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison key for tag lists: order-sensitive, case-insensitive
pub fn tags_key(tags: &[String]) -> String {
    tags.join(",").to_lowercase()
}

/// Fields whose proposed value differs from the business's current value, in schema order
pub fn changed_fields(business: &Business, correction: &Correction) -> Vec<CorrectionField> {
    CorrectionField::ALL
        .iter()
        .copied()
        .filter(|field| field.differs(business, correction))
        .collect()
}

impl Correction {
    /// A freshly submitted correction for `business_id`
    pub fn submitted(business_id: i32, input: CorrectionInput, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            business_id,
            business_type: input.business_type,
            tags: input.tags,
            phone: input.phone,
            details: input.details,
            hours: input.hours,
            url: input.url,
            donateurl: input.donateurl,
            giftcard: input.giftcard,
            takeout: input.takeout,
            delivery: input.delivery,
            closed: input.closed,
            notes: input.notes,
            approved: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Awaiting review: not yet approved and not withdrawn
    pub fn is_pending(&self) -> bool {
        !self.approved && self.deleted_at.is_none()
    }

    /// Overwrite every correctable field of `business`. Address and location are never touched.
    pub fn apply_to(&self, business: &mut Business) {
        business.business_type = self.business_type.clone();
        business.tags = self.tags.clone();
        business.phone = self.phone.clone();
        business.details = self.details.clone();
        business.hours = self.hours.clone();
        business.url = self.url.clone();
        business.donateurl = self.donateurl.clone();
        business.giftcard = self.giftcard;
        business.takeout = self.takeout;
        business.delivery = self.delivery;
        business.closed = self.closed;
    }
}
