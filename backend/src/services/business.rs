//! Business listings: storage, proximity search and the submit/edit flows
//!
//! Locations are stored as `GEOGRAPHY(POINT, 4326)`, written from and read back
//! as `POINT(lng lat)` text. The read side formats the raw float8 ordinates
//! rather than using `ST_AsText`, which rounds to 15 decimal digits. Radius
//! search is delegated to PostGIS `ST_DWithin` over the spatial index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use shared::{Business, BusinessInput, BusinessUpdate, Coordinate, SEARCH_RADIUS_METERS};
use sqlx::{PgPool, Postgres};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::services::geocoder::Geocoder;
use crate::services::notifier::{Notification, Notifier};

/// Columns selected for every business read, with the location rendered as WKT.
/// float8 text output is shortest-exact, so the ordinates parse back bit for bit.
const BUSINESS_COLUMNS: &str = r#"
    id, name, type AS business_type, tags, phone, email, details, hours, url,
    address, address2, city, state, zipcode,
    'POINT(' || ST_X(location::geometry)::float8::text || ' '
        || ST_Y(location::geometry)::float8::text || ')' AS location,
    donateurl, giftcard, takeout, delivery, closed, active,
    created_at, updated_at, deleted_at
"#;

/// Whether an update rewrites the stored point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationUpdate {
    /// Leave the stored location exactly as it is
    Keep,
    /// Store the business's current `location`
    Replace,
}

/// Persistence for business listings
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Insert a pending (inactive) listing, returning its id
    async fn add(&self, business: &Business) -> AppResult<i32>;

    /// Fetch one listing. The public path (`include_inactive = false`) only sees
    /// active, undeleted listings.
    async fn get(&self, id: i32, include_inactive: bool) -> AppResult<Option<Business>>;

    /// Active, undeleted listings within the search radius of `center`, by name
    async fn get_by_radius(&self, center: Coordinate) -> AppResult<Vec<Business>>;

    /// Every undeleted listing regardless of approval state, by name
    async fn list_all(&self) -> AppResult<Vec<Business>>;

    /// Persist all mutable fields including `updated_at`; `created_at` is never written
    async fn update(&self, business: &Business, location: LocationUpdate) -> AppResult<()>;
}

#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    id: i32,
    name: String,
    business_type: String,
    tags: Vec<String>,
    phone: String,
    email: String,
    details: Option<String>,
    hours: Option<String>,
    url: Option<String>,
    address: String,
    address2: Option<String>,
    city: String,
    state: String,
    zipcode: String,
    location: Option<String>,
    donateurl: Option<String>,
    giftcard: bool,
    takeout: bool,
    delivery: bool,
    closed: bool,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<BusinessRow> for Business {
    type Error = AppError;

    fn try_from(row: BusinessRow) -> Result<Self, Self::Error> {
        let location = row
            .location
            .as_deref()
            .map(Coordinate::from_wkt)
            .transpose()?;

        Ok(Business {
            id: row.id,
            name: row.name,
            business_type: row.business_type,
            tags: row.tags,
            phone: row.phone,
            email: row.email,
            details: row.details,
            hours: row.hours,
            url: row.url,
            address: row.address,
            address2: row.address2,
            city: row.city,
            state: row.state,
            zipcode: row.zipcode,
            location,
            donateurl: row.donateurl,
            giftcard: row.giftcard,
            takeout: row.takeout,
            delivery: row.delivery,
            closed: row.closed,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn into_businesses(rows: Vec<BusinessRow>) -> AppResult<Vec<Business>> {
    rows.into_iter().map(Business::try_from).collect()
}

/// Write every mutable column of `business`. Shared with the correction
/// approval transaction, hence generic over the executor.
pub(crate) async fn write_business<'e, E>(
    executor: E,
    business: &Business,
    location: LocationUpdate,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        UPDATE businesses
        SET name = $1, type = $2, tags = $3, phone = $4, email = $5, details = $6,
            hours = $7, url = $8, address = $9, address2 = $10, city = $11, state = $12,
            zipcode = $13, donateurl = $14, giftcard = $15, takeout = $16, delivery = $17,
            closed = $18, active = $19, deleted_at = $20,
            location = CASE WHEN $21
                THEN ST_GeogFromText($22)
                ELSE location END,
            updated_at = $23
        WHERE id = $24
        "#,
    )
    .bind(&business.name)
    .bind(&business.business_type)
    .bind(&business.tags)
    .bind(&business.phone)
    .bind(&business.email)
    .bind(&business.details)
    .bind(&business.hours)
    .bind(&business.url)
    .bind(&business.address)
    .bind(&business.address2)
    .bind(&business.city)
    .bind(&business.state)
    .bind(&business.zipcode)
    .bind(&business.donateurl)
    .bind(business.giftcard)
    .bind(business.takeout)
    .bind(business.delivery)
    .bind(business.closed)
    .bind(business.active)
    .bind(business.deleted_at)
    .bind(location == LocationUpdate::Replace)
    .bind(business.location.map(|c| c.to_wkt()))
    .bind(business.updated_at)
    .bind(business.id)
    .execute(executor)
    .await?;

    Ok(())
}

/// PostGIS-backed business repository
#[derive(Clone)]
pub struct PgBusinessRepository {
    db: PgPool,
}

impl PgBusinessRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BusinessRepository for PgBusinessRepository {
    async fn add(&self, business: &Business) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO businesses (
                name, type, tags, phone, email, details, hours, url,
                address, address2, city, state, zipcode, location,
                donateurl, giftcard, takeout, delivery, closed, active,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13, ST_GeogFromText($14),
                $15, $16, $17, $18, $19, FALSE,
                NOW(), NOW()
            )
            RETURNING id
            "#,
        )
        .bind(&business.name)
        .bind(&business.business_type)
        .bind(&business.tags)
        .bind(&business.phone)
        .bind(&business.email)
        .bind(&business.details)
        .bind(&business.hours)
        .bind(&business.url)
        .bind(&business.address)
        .bind(&business.address2)
        .bind(&business.city)
        .bind(&business.state)
        .bind(&business.zipcode)
        .bind(business.location.map(|c| c.to_wkt()))
        .bind(&business.donateurl)
        .bind(business.giftcard)
        .bind(business.takeout)
        .bind(business.delivery)
        .bind(business.closed)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: i32, include_inactive: bool) -> AppResult<Option<Business>> {
        let filter = if include_inactive {
            "id = $1"
        } else {
            "id = $1 AND active = TRUE AND deleted_at IS NULL"
        };

        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {} FROM businesses WHERE {}",
            BUSINESS_COLUMNS, filter
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Business::try_from).transpose()
    }

    async fn get_by_radius(&self, center: Coordinate) -> AppResult<Vec<Business>> {
        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            r#"
            SELECT {}
            FROM businesses
            WHERE active = TRUE
              AND deleted_at IS NULL
              AND ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
            ORDER BY name ASC
            "#,
            BUSINESS_COLUMNS
        ))
        .bind(center.lng)
        .bind(center.lat)
        .bind(SEARCH_RADIUS_METERS)
        .fetch_all(&self.db)
        .await?;

        into_businesses(rows)
    }

    async fn list_all(&self) -> AppResult<Vec<Business>> {
        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {} FROM businesses WHERE deleted_at IS NULL ORDER BY name ASC",
            BUSINESS_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        into_businesses(rows)
    }

    async fn update(&self, business: &Business, location: LocationUpdate) -> AppResult<()> {
        write_business(&self.db, business, location).await?;
        Ok(())
    }
}

/// Query string of a listing search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zipcode: Option<String>,
}

/// Validate and decode a public submission
pub fn parse_submission(payload: Value) -> AppResult<BusinessInput> {
    shared::validate_business(&payload)?;
    serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid submission: {}", e)))
}

/// Validate and decode an admin edit
pub fn parse_update(payload: Value) -> AppResult<BusinessUpdate> {
    shared::validate_business_update(&payload)?;
    serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid update: {}", e)))
}

/// Business listing workflows
#[derive(Clone)]
pub struct BusinessService {
    repo: Arc<dyn BusinessRepository>,
    geocoder: Geocoder,
    notifier: Arc<dyn Notifier>,
}

impl BusinessService {
    pub fn new(
        repo: Arc<dyn BusinessRepository>,
        geocoder: Geocoder,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            geocoder,
            notifier,
        }
    }

    /// Geocode and store a new listing pending review, then tell the reviewers
    pub async fn submit(&self, input: BusinessInput) -> AppResult<i32> {
        let location = self
            .geocoder
            .resolve_address(&input.street(), &input.city, &input.state, &input.zipcode)
            .await?;

        let mut business = Business::submitted(input, location, Utc::now());
        business.id = self.repo.add(&business).await?;

        tracing::info!(business_id = business.id, name = %business.name, "Business submitted");

        // The listing is already stored; a failed announcement must not fail the submission
        if let Err(e) = self
            .notifier
            .notify(&Notification::business_submitted(&business))
            .await
        {
            tracing::warn!(business_id = business.id, "Failed to announce submission: {}", e);
        }

        Ok(business.id)
    }

    /// A publicly visible listing
    pub async fn get_public(&self, id: i32) -> AppResult<Option<Business>> {
        self.repo.get(id, false).await
    }

    /// Resolve the search center: an explicit lat/lng pair wins over a zipcode
    pub async fn resolve_center(&self, query: &SearchQuery) -> AppResult<Coordinate> {
        if let (Some(lat), Some(lng)) = (query.lat, query.lng) {
            let center = Coordinate::new(lat, lng);
            if center.is_valid() {
                return Ok(center);
            }
        }

        match query.zipcode.as_deref().map(str::trim) {
            Some(zipcode) if !zipcode.is_empty() => self.geocoder.resolve_zipcode(zipcode).await,
            _ => Err(AppError::BadRequest(
                "A valid lat/lng pair or a zipcode is required".to_string(),
            )),
        }
    }

    /// Active listings near the queried point or zipcode
    pub async fn search(&self, query: &SearchQuery) -> AppResult<Vec<Business>> {
        let center = self.resolve_center(query).await?;
        self.repo.get_by_radius(center).await
    }

    /// Every listing, for administrators
    pub async fn list_all(&self) -> AppResult<Vec<Business>> {
        self.repo.list_all().await
    }

    /// Apply an admin edit. Re-geocodes only when an address line changed.
    /// Returns `None` when the listing does not exist.
    pub async fn update(&self, update: BusinessUpdate) -> AppResult<Option<Business>> {
        let Some(mut business) = self.repo.get(update.id, true).await? else {
            return Ok(None);
        };

        let location = if business.address_differs(&update.fields) {
            let fields = &update.fields;
            let coordinate = self
                .geocoder
                .resolve_address(&fields.street(), &fields.city, &fields.state, &fields.zipcode)
                .await?;
            business.location = Some(coordinate);
            LocationUpdate::Replace
        } else {
            LocationUpdate::Keep
        };

        business.apply_input(update.fields);
        if let Some(active) = update.active {
            business.active = active;
        }
        business.updated_at = Utc::now();

        self.repo.update(&business, location).await?;
        tracing::info!(
            business_id = business.id,
            relocated = location == LocationUpdate::Replace,
            "Business updated"
        );

        Ok(Some(business))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::{
        fixtures, FakeBusinessRepository, FakeGeocodingProvider, FakeNotifier, FakeZipcodeCache,
    };
    use serde_json::json;

    struct Harness {
        repo: Arc<FakeBusinessRepository>,
        provider: Arc<FakeGeocodingProvider>,
        notifier: Arc<FakeNotifier>,
        service: BusinessService,
    }

    fn harness(provider: FakeGeocodingProvider, cache: FakeZipcodeCache) -> Harness {
        let repo = Arc::new(FakeBusinessRepository::new());
        let provider = Arc::new(provider);
        let notifier = Arc::new(FakeNotifier::new());
        let geocoder = Geocoder::new(provider.clone(), Arc::new(cache));
        let service = BusinessService::new(repo.clone(), geocoder, notifier.clone());
        Harness {
            repo,
            provider,
            notifier,
            service,
        }
    }

    fn sioux_falls() -> Coordinate {
        Coordinate::new(43.5446, -96.7311)
    }

    #[tokio::test]
    async fn test_submit_geocodes_stores_inactive_and_notifies() {
        let h = harness(
            FakeGeocodingProvider::new().with_default(sioux_falls()),
            FakeZipcodeCache::new(),
        );

        let id = h.service.submit(fixtures::input()).await.unwrap();

        assert_eq!(
            h.provider.calls(),
            vec![crate::services::geocoder::AddressQuery::new(
                "123 Main Street STE 3",
                "Sioux Falls",
                "SD",
                "57106"
            )]
        );

        let stored = h.repo.get(id, true).await.unwrap().unwrap();
        assert!(!stored.active);
        assert_eq!(stored.location, Some(sioux_falls()));
        assert!(h.repo.get(id, false).await.unwrap().is_none());

        let sent = h.notifier.notifications();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], Notification::BusinessSubmitted { business } if business.id == id));
    }

    #[tokio::test]
    async fn test_submit_round_trips_every_field() {
        let h = harness(
            FakeGeocodingProvider::new().with_default(Coordinate::new(43.123456789012345, -96.98765432101234)),
            FakeZipcodeCache::new(),
        );
        let input = fixtures::input();

        let id = h.service.submit(input.clone()).await.unwrap();
        let stored = h.repo.get(id, true).await.unwrap().unwrap();

        let expected = Business {
            id,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            ..Business::submitted(
                input,
                Coordinate::new(43.123456789012345, -96.98765432101234),
                stored.created_at,
            )
        };
        assert_eq!(stored, expected);
        let location = stored.location.unwrap();
        assert_eq!(location.lat.to_bits(), 43.123456789012345f64.to_bits());
        assert_eq!(location.lng.to_bits(), (-96.98765432101234f64).to_bits());
    }

    #[tokio::test]
    async fn test_submit_fails_when_geocoding_fails() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());

        let err = h.service.submit(fixtures::input()).await.unwrap_err();

        assert!(matches!(err, AppError::Geocode(_)));
        assert!(h.repo.all().is_empty());
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_submit_survives_notifier_failure() {
        let mut h = harness(
            FakeGeocodingProvider::new().with_default(sioux_falls()),
            FakeZipcodeCache::new(),
        );
        let notifier = Arc::new(FakeNotifier::failing());
        h.service = BusinessService::new(
            h.repo.clone(),
            Geocoder::new(h.provider.clone(), Arc::new(FakeZipcodeCache::new())),
            notifier,
        );

        let id = h.service.submit(fixtures::input()).await.unwrap();
        assert!(h.repo.get(id, true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_inactive_hidden_from_public_paths() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());
        let business = h.repo.seed(fixtures::business_at("Pending Pizza", sioux_falls(), false));

        assert!(h.service.get_public(business.id).await.unwrap().is_none());
        assert!(h.repo.get(business.id, true).await.unwrap().is_some());

        let query = SearchQuery {
            lat: Some(sioux_falls().lat),
            lng: Some(sioux_falls().lng),
            zipcode: None,
        };
        assert!(h.service.search(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_hidden_from_public_get() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());
        let mut business = fixtures::business_at("Gone Grill", sioux_falls(), true);
        business.deleted_at = Some(Utc::now());
        let business = h.repo.seed(business);

        assert!(h.service.get_public(business.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_includes_center_excludes_far_and_orders_by_name() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());
        let center = sioux_falls();
        h.repo.seed(fixtures::business_at("Zesty Tacos", center, true));
        h.repo.seed(fixtures::business_at(
            "Alpine Deli",
            Coordinate::new(center.lat + 0.2, center.lng),
            true,
        ));
        h.repo.seed(fixtures::business_at(
            "Far Away Diner",
            Coordinate::new(center.lat + 0.5, center.lng),
            true,
        ));

        let query = SearchQuery {
            lat: Some(center.lat),
            lng: Some(center.lng),
            zipcode: None,
        };
        let names: Vec<String> = h
            .service
            .search(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();

        assert_eq!(names, vec!["Alpine Deli", "Zesty Tacos"]);
    }

    #[tokio::test]
    async fn test_search_by_cached_zipcode() {
        let h = harness(
            FakeGeocodingProvider::new(),
            FakeZipcodeCache::new().with_entry("57106", 43.5446, -96.7311),
        );
        h.repo.seed(fixtures::business_at("Zesty Tacos", sioux_falls(), true));

        let query = SearchQuery {
            zipcode: Some("57106".to_string()),
            ..Default::default()
        };
        let found = h.service.search(&query).await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_location() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());

        let err = h.service.search(&SearchQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let only_lat = SearchQuery {
            lat: Some(43.0),
            ..Default::default()
        };
        assert!(matches!(
            h.service.search(&only_lat).await.unwrap_err(),
            AppError::BadRequest(_)
        ));

        let out_of_range = SearchQuery {
            lat: Some(123.0),
            lng: Some(-96.0),
            zipcode: Some("  ".to_string()),
        };
        assert!(matches!(
            h.service.search(&out_of_range).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_lat_lng_wins_over_zipcode() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());
        let query = SearchQuery {
            lat: Some(1.0),
            lng: Some(2.0),
            zipcode: Some("57106".to_string()),
        };
        assert_eq!(
            h.service.resolve_center(&query).await.unwrap(),
            Coordinate::new(1.0, 2.0)
        );
    }

    #[tokio::test]
    async fn test_update_without_address_change_keeps_location_bits() {
        let h = harness(
            FakeGeocodingProvider::new().with_default(Coordinate::new(0.0, 0.0)),
            FakeZipcodeCache::new(),
        );
        let original = Coordinate::new(43.54460000000001, -96.73110000000001);
        let seeded = h.repo.seed(fixtures::business_at("Bob's Burgers", original, false));

        let mut fields = fixtures::input();
        fields.name = "Bob's Burgers & Fries".to_string();
        fields.phone = "6055550000".to_string();
        let updated = h
            .service
            .update(BusinessUpdate {
                id: seeded.id,
                fields,
                active: None,
            })
            .await
            .unwrap()
            .unwrap();

        assert!(h.provider.calls().is_empty());
        let stored = h.repo.get(seeded.id, true).await.unwrap().unwrap();
        let location = stored.location.unwrap();
        assert_eq!(location.lat.to_bits(), original.lat.to_bits());
        assert_eq!(location.lng.to_bits(), original.lng.to_bits());
        assert_eq!(stored.name, "Bob's Burgers & Fries");
        assert_eq!(updated, stored);
        assert!(!stored.active);
        assert_eq!(h.repo.location_writes(), 0);
    }

    #[tokio::test]
    async fn test_update_with_each_address_change_regeocodes() {
        let edits: [fn(&mut BusinessInput); 5] = [
            |i| i.address = "9 Elm Street".to_string(),
            |i| i.address2 = None,
            |i| i.city = "Brandon".to_string(),
            |i| i.state = "MN".to_string(),
            |i| i.zipcode = "57005".to_string(),
        ];

        for edit in edits {
            let moved = Coordinate::new(43.59, -96.57);
            let h = harness(
                FakeGeocodingProvider::new().with_default(moved),
                FakeZipcodeCache::new(),
            );
            let seeded = h.repo.seed(fixtures::business_at("Bob's Burgers", sioux_falls(), true));

            let mut fields = fixtures::input();
            edit(&mut fields);
            h.service
                .update(BusinessUpdate {
                    id: seeded.id,
                    fields,
                    active: None,
                })
                .await
                .unwrap()
                .unwrap();

            assert_eq!(h.provider.calls().len(), 1);
            let stored = h.repo.get(seeded.id, true).await.unwrap().unwrap();
            assert_eq!(stored.location, Some(moved));
            assert!(stored.active);
        }
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());
        let result = h
            .service
            .update(BusinessUpdate {
                id: 999,
                fields: fixtures::input(),
                active: Some(true),
            })
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(h.repo.all().is_empty());
    }

    #[tokio::test]
    async fn test_update_can_toggle_active() {
        let h = harness(FakeGeocodingProvider::new(), FakeZipcodeCache::new());
        let seeded = h.repo.seed(fixtures::business_at("Bob's Burgers", sioux_falls(), true));

        h.service
            .update(BusinessUpdate {
                id: seeded.id,
                fields: fixtures::input(),
                active: Some(false),
            })
            .await
            .unwrap();

        assert!(h.service.get_public(seeded.id).await.unwrap().is_none());
    }

    #[test]
    fn test_parse_submission_rejects_before_decoding() {
        let err = parse_submission(json!({ "name": "Bob's", "giftcard": "yes" })).unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(
                    shared::failed_fields(&errors),
                    vec!["address", "city", "email", "giftcard", "phone", "state", "type", "zipcode"]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_submission_accepts_valid_payload() {
        let payload = serde_json::to_value(fixtures::input()).unwrap();
        assert_eq!(parse_submission(payload).unwrap(), fixtures::input());
    }

    #[test]
    fn test_parse_update_requires_id() {
        let payload = serde_json::to_value(fixtures::input()).unwrap();
        assert!(matches!(parse_update(payload), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_row_with_malformed_location_is_an_error() {
        let row = BusinessRow {
            id: 1,
            name: "x".to_string(),
            business_type: "y".to_string(),
            tags: vec![],
            phone: String::new(),
            email: String::new(),
            details: None,
            hours: None,
            url: None,
            address: String::new(),
            address2: None,
            city: String::new(),
            state: String::new(),
            zipcode: String::new(),
            location: Some("POINT(abc)".to_string()),
            donateurl: None,
            giftcard: false,
            takeout: false,
            delivery: false,
            closed: false,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        assert!(matches!(
            Business::try_from(row),
            Err(AppError::StoredLocation(_))
        ));
    }
}
