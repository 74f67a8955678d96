//! Business listing models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::Coordinate;

/// A canonical, publicly listed establishment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub business_type: String,
    pub tags: Vec<String>,
    pub phone: String,
    pub email: String,
    pub details: Option<String>,
    pub hours: Option<String>,
    pub url: Option<String>,
    pub address: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    /// Geocoded position; rows imported before geocoding was mandatory may lack one
    pub location: Option<Coordinate>,
    pub donateurl: Option<String>,
    pub giftcard: bool,
    pub takeout: bool,
    pub delivery: bool,
    pub closed: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Submitted business payload, used for public submissions and admin edits
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct BusinessInput {
    pub name: String,
    #[serde(rename = "type")]
    pub business_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub address: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
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
}

/// Admin edit of an existing listing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BusinessUpdate {
    pub id: i32,
    #[serde(flatten)]
    pub fields: BusinessInput,
    /// Leaves the current visibility untouched when omitted
    #[serde(default)]
    pub active: Option<bool>,
}

impl BusinessInput {
    /// Street line handed to the geocoder: address and address2 joined
    pub fn street(&self) -> String {
        format!("{} {}", self.address, self.address2.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }
}

impl Business {
    /// A freshly submitted listing, pending review
    pub fn submitted(input: BusinessInput, location: Coordinate, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: input.name,
            business_type: input.business_type,
            tags: input.tags,
            phone: input.phone,
            email: input.email,
            details: input.details,
            hours: input.hours,
            url: input.url,
            address: input.address,
            address2: input.address2,
            city: input.city,
            state: input.state,
            zipcode: input.zipcode,
            location: Some(location),
            donateurl: input.donateurl,
            giftcard: input.giftcard,
            takeout: input.takeout,
            delivery: input.delivery,
            closed: input.closed,
            active: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Listed publicly only once approved and while not soft-deleted
    pub fn is_publicly_visible(&self) -> bool {
        self.active && self.deleted_at.is_none()
    }

    /// Whether any address line differs from `input`. A missing address2 equals a blank one.
    pub fn address_differs(&self, input: &BusinessInput) -> bool {
        self.address != input.address
            || self.address2.as_deref().unwrap_or("") != input.address2.as_deref().unwrap_or("")
            || self.city != input.city
            || self.state != input.state
            || self.zipcode != input.zipcode
    }

    /// Overwrite descriptive and address fields from an edit. Location, visibility
    /// and timestamps are left to the caller.
    pub fn apply_input(&mut self, input: BusinessInput) {
        self.name = input.name;
        self.business_type = input.business_type;
        self.tags = input.tags;
        self.phone = input.phone;
        self.email = input.email;
        self.details = input.details;
        self.hours = input.hours;
        self.url = input.url;
        self.address = input.address;
        self.address2 = input.address2;
        self.city = input.city;
        self.state = input.state;
        self.zipcode = input.zipcode;
        self.donateurl = input.donateurl;
        self.giftcard = input.giftcard;
        self.takeout = input.takeout;
        self.delivery = input.delivery;
        self.closed = input.closed;
    }
}

/// Deduplicated, lowercased union of the tags on `businesses`, sorted
pub fn collect_tags(businesses: &[Business]) -> Vec<String> {
    businesses
        .iter()
        .flat_map(|b| b.tags.iter())
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn sample_input() -> BusinessInput {
        BusinessInput {
            name: "Bob's Burgers".to_string(),
            business_type: "Restaurant".to_string(),
            tags: vec!["Diner".to_string(), "Burgers".to_string()],
            phone: "6055551234".to_string(),
            email: "bob@example.com".to_string(),
            details: Some("Curbside pickup".to_string()),
            hours: Some("10AM - 9PM".to_string()),
            url: Some("http://www.example.com".to_string()),
            address: "123 Main Street".to_string(),
            address2: Some("STE 3".to_string()),
            city: "Sioux Falls".to_string(),
            state: "SD".to_string(),
            zipcode: "57106".to_string(),
            donateurl: Some("http://example.org/donate".to_string()),
            giftcard: true,
            takeout: true,
            delivery: false,
            closed: false,
        }
    }

    pub fn sample_business() -> Business {
        let now = Utc.with_ymd_and_hms(2020, 4, 5, 12, 0, 0).unwrap();
        let mut business =
            Business::submitted(sample_input(), Coordinate::new(43.5446, -96.7311), now);
        business.id = 10;
        business
    }
}
