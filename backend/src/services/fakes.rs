//! In-memory test doubles for the service seams
//!
//! Every fake records what it was asked so tests can assert on side effects
//! without a database or network.

use async_trait::async_trait;
use chrono::Utc;
use shared::{Admin, Business, Coordinate, Correction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthError, IdentityVerifier};
use crate::services::admin::AdminRepository;
use crate::services::business::{BusinessRepository, LocationUpdate};
use crate::services::correction::CorrectionRepository;
use crate::services::geocoder::{AddressQuery, GeocodeError, GeocodingProvider, ZipcodeCache};
use crate::services::notifier::{Notification, Notifier, NotifyError};

pub mod fixtures {
    use shared::{Business, BusinessInput, Coordinate, CorrectionInput};

    pub fn input() -> BusinessInput {
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

    pub fn business_at(name: &str, location: Coordinate, active: bool) -> Business {
        let mut business = Business::submitted(input(), location, chrono::Utc::now());
        business.name = name.to_string();
        business.active = active;
        business
    }

    /// A correction that proposes no change to `business`
    pub fn correction_input(business: &Business) -> CorrectionInput {
        CorrectionInput {
            business_id: Some(business.id),
            business_type: business.business_type.clone(),
            tags: business.tags.clone(),
            phone: business.phone.clone(),
            details: business.details.clone(),
            hours: business.hours.clone(),
            url: business.url.clone(),
            donateurl: business.donateurl.clone(),
            giftcard: business.giftcard,
            takeout: business.takeout,
            delivery: business.delivery,
            closed: business.closed,
            notes: None,
        }
    }
}

/// Geocoder answering from a fixed table keyed by the query's display form
#[derive(Default)]
pub struct FakeGeocodingProvider {
    results: HashMap<String, Coordinate>,
    default: Option<Coordinate>,
    calls: Mutex<Vec<AddressQuery>>,
}

impl FakeGeocodingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, query: &str, coordinate: Coordinate) -> Self {
        self.results.insert(query.to_string(), coordinate);
        self
    }

    /// Answer every unmatched query with `coordinate`
    pub fn with_default(mut self, coordinate: Coordinate) -> Self {
        self.default = Some(coordinate);
        self
    }

    pub fn calls(&self) -> Vec<AddressQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeocodingProvider for FakeGeocodingProvider {
    async fn geocode(&self, query: &AddressQuery) -> Result<Coordinate, GeocodeError> {
        self.calls.lock().unwrap().push(query.clone());
        let key = query.to_string();
        self.results
            .get(&key)
            .copied()
            .or(self.default)
            .ok_or(GeocodeError::NoResults { query: key })
    }
}

#[derive(Default)]
pub struct FakeZipcodeCache {
    entries: HashMap<String, Coordinate>,
}

impl FakeZipcodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, zipcode: &str, lat: f64, lng: f64) -> Self {
        self.entries
            .insert(zipcode.to_string(), Coordinate::new(lat, lng));
        self
    }
}

#[async_trait]
impl ZipcodeCache for FakeZipcodeCache {
    async fn lookup(&self, zipcode: &str) -> AppResult<Option<Coordinate>> {
        Ok(self.entries.get(zipcode).copied())
    }
}

#[derive(Default)]
struct BusinessTable {
    rows: Vec<Business>,
    next_id: i32,
    location_writes: usize,
}

/// Business store with the same visibility and radius rules as the SQL
#[derive(Default)]
pub struct FakeBusinessRepository {
    table: Mutex<BusinessTable>,
    fail_writes: bool,
}

impl FakeBusinessRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write fails with a database error
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Insert `business` as is, assigning the next id
    pub fn seed(&self, mut business: Business) -> Business {
        let mut table = self.table.lock().unwrap();
        table.next_id += 1;
        business.id = table.next_id;
        table.rows.push(business.clone());
        business
    }

    pub fn all(&self) -> Vec<Business> {
        self.table.lock().unwrap().rows.clone()
    }

    /// Number of updates that rewrote a stored location
    pub fn location_writes(&self) -> usize {
        self.table.lock().unwrap().location_writes
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn store(&self, business: &Business, location: LocationUpdate) -> AppResult<()> {
        self.check_writable()?;
        let mut table = self.table.lock().unwrap();
        let Some(index) = table.rows.iter().position(|b| b.id == business.id) else {
            return Ok(());
        };

        let mut stored = business.clone();
        stored.created_at = table.rows[index].created_at;
        match location {
            LocationUpdate::Keep => stored.location = table.rows[index].location,
            LocationUpdate::Replace => table.location_writes += 1,
        }
        table.rows[index] = stored;
        Ok(())
    }
}

#[async_trait]
impl BusinessRepository for FakeBusinessRepository {
    async fn add(&self, business: &Business) -> AppResult<i32> {
        self.check_writable()?;
        let now = Utc::now();
        let mut stored = business.clone();
        stored.active = false;
        stored.created_at = now;
        stored.updated_at = now;
        Ok(self.seed(stored).id)
    }

    async fn get(&self, id: i32, include_inactive: bool) -> AppResult<Option<Business>> {
        let table = self.table.lock().unwrap();
        Ok(table
            .rows
            .iter()
            .find(|b| b.id == id && (include_inactive || b.is_publicly_visible()))
            .cloned())
    }

    async fn get_by_radius(&self, center: Coordinate) -> AppResult<Vec<Business>> {
        let table = self.table.lock().unwrap();
        let mut found: Vec<Business> = table
            .rows
            .iter()
            .filter(|b| b.is_publicly_visible())
            .filter(|b| b.location.is_some_and(|l| l.within_search_radius(&center)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list_all(&self) -> AppResult<Vec<Business>> {
        let table = self.table.lock().unwrap();
        let mut all: Vec<Business> = table
            .rows
            .iter()
            .filter(|b| b.deleted_at.is_none())
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update(&self, business: &Business, location: LocationUpdate) -> AppResult<()> {
        self.store(business, location)
    }
}

/// Correction store sharing the business table so approvals can be observed
pub struct FakeCorrectionRepository {
    rows: Mutex<Vec<Correction>>,
    businesses: Arc<FakeBusinessRepository>,
}

impl FakeCorrectionRepository {
    pub fn new(businesses: Arc<FakeBusinessRepository>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            businesses,
        }
    }

    pub fn seed(&self, mut correction: Correction) -> Correction {
        let mut rows = self.rows.lock().unwrap();
        correction.id = rows.len() as i32 + 1;
        rows.push(correction.clone());
        correction
    }

    pub fn all(&self) -> Vec<Correction> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CorrectionRepository for FakeCorrectionRepository {
    async fn add(&self, correction: &Correction) -> AppResult<i32> {
        let mut stored = correction.clone();
        stored.approved = false;
        Ok(self.seed(stored).id)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Correction>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|c| c.id == id && c.is_pending())
            .cloned())
    }

    async fn approve(&self, correction: &Correction, business: &Business) -> AppResult<()> {
        // Business first: a failed write leaves the correction pending
        self.businesses.store(business, LocationUpdate::Keep)?;

        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|c| c.id == correction.id) {
            row.approved = true;
        }
        Ok(())
    }
}

/// Notifier that records everything it is asked to send
#[derive(Default)]
pub struct FakeNotifier {
    notifications: Mutex<Vec<Notification>>,
    responses: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls but reports every delivery as rejected
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    /// `(response_url, text)` pairs
    pub fn responses(&self) -> Vec<(String, String)> {
        self.responses.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<(), NotifyError> {
        if self.fail {
            Err(NotifyError::Rejected {
                status: 500,
                body: "unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.notifications.lock().unwrap().push(notification.clone());
        self.outcome()
    }

    async fn respond(&self, response_url: &str, text: &str) -> Result<(), NotifyError> {
        self.responses
            .lock()
            .unwrap()
            .push((response_url.to_string(), text.to_string()));
        self.outcome()
    }
}

#[derive(Default)]
pub struct FakeAdminRepository {
    admins: Vec<Admin>,
}

impl FakeAdminRepository {
    pub fn with_admin(uid: &str) -> Self {
        Self {
            admins: vec![Admin {
                id: 1,
                email: format!("{}@example.com", uid),
                uid: uid.to_string(),
            }],
        }
    }
}

#[async_trait]
impl AdminRepository for FakeAdminRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<Admin>> {
        Ok(self.admins.iter().find(|a| a.uid == uid).cloned())
    }
}

/// Accepts exactly the tokens it was given, mapping each to a uid
#[derive(Default)]
pub struct FakeIdentityVerifier {
    tokens: HashMap<String, String>,
}

impl FakeIdentityVerifier {
    pub fn with_token(mut self, token: &str, uid: &str) -> Self {
        self.tokens.insert(token.to_string(), uid.to_string());
        self
    }
}

impl IdentityVerifier for FakeIdentityVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
