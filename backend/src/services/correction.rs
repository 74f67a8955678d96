//! Corrections proposed by the public against existing listings

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{Business, Correction, CorrectionInput};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::services::business::{write_business, BusinessRepository, LocationUpdate};
use crate::services::notifier::{Notification, Notifier};

/// Persistence for corrections
#[async_trait]
pub trait CorrectionRepository: Send + Sync {
    async fn add(&self, correction: &Correction) -> AppResult<i32>;

    /// A pending correction; approved or withdrawn ones are `None`
    async fn get(&self, id: i32) -> AppResult<Option<Correction>>;

    /// Store the merged `business` and mark `correction` approved, atomically
    async fn approve(&self, correction: &Correction, business: &Business) -> AppResult<()>;
}

#[derive(Debug, sqlx::FromRow)]
struct CorrectionRow {
    id: i32,
    business_id: i32,
    business_type: String,
    tags: Vec<String>,
    phone: String,
    details: Option<String>,
    hours: Option<String>,
    url: Option<String>,
    donateurl: Option<String>,
    giftcard: bool,
    takeout: bool,
    delivery: bool,
    closed: bool,
    notes: Option<String>,
    approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<CorrectionRow> for Correction {
    fn from(row: CorrectionRow) -> Self {
        Correction {
            id: row.id,
            business_id: row.business_id,
            business_type: row.business_type,
            tags: row.tags,
            phone: row.phone,
            details: row.details,
            hours: row.hours,
            url: row.url,
            donateurl: row.donateurl,
            giftcard: row.giftcard,
            takeout: row.takeout,
            delivery: row.delivery,
            closed: row.closed,
            notes: row.notes,
            approved: row.approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Clone)]
pub struct PgCorrectionRepository {
    db: PgPool,
}

impl PgCorrectionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CorrectionRepository for PgCorrectionRepository {
    async fn add(&self, correction: &Correction) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO corrections (
                business_id, type, tags, phone, details, hours, url, donateurl,
                giftcard, takeout, delivery, closed, notes, approved,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, FALSE, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(correction.business_id)
        .bind(&correction.business_type)
        .bind(&correction.tags)
        .bind(&correction.phone)
        .bind(&correction.details)
        .bind(&correction.hours)
        .bind(&correction.url)
        .bind(&correction.donateurl)
        .bind(correction.giftcard)
        .bind(correction.takeout)
        .bind(correction.delivery)
        .bind(correction.closed)
        .bind(&correction.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Correction>> {
        let row = sqlx::query_as::<_, CorrectionRow>(
            r#"
            SELECT id, business_id, type AS business_type, tags, phone, details, hours,
                   url, donateurl, giftcard, takeout, delivery, closed, notes, approved,
                   created_at, updated_at, deleted_at
            FROM corrections
            WHERE id = $1 AND approved = FALSE AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Correction::from))
    }

    async fn approve(&self, correction: &Correction, business: &Business) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        write_business(&mut *tx, business, LocationUpdate::Keep).await?;

        sqlx::query("UPDATE corrections SET approved = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(correction.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Validate and decode a correction payload
pub fn parse_correction(payload: Value) -> AppResult<CorrectionInput> {
    shared::validate_correction(&payload)?;
    serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid correction: {}", e)))
}

#[derive(Clone)]
pub struct CorrectionService {
    repo: Arc<dyn CorrectionRepository>,
    businesses: Arc<dyn BusinessRepository>,
    notifier: Arc<dyn Notifier>,
}

impl CorrectionService {
    pub fn new(
        repo: Arc<dyn CorrectionRepository>,
        businesses: Arc<dyn BusinessRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            businesses,
            notifier,
        }
    }

    /// Store a correction of a publicly listed business and announce the proposed changes
    pub async fn submit(&self, business_id: i32, input: CorrectionInput) -> AppResult<i32> {
        if let Some(body_id) = input.business_id {
            if body_id != business_id {
                return Err(AppError::BadRequest(format!(
                    "business_id {} does not match the corrected business {}",
                    body_id, business_id
                )));
            }
        }

        let business = self
            .businesses
            .get(business_id, false)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Business {}", business_id)))?;

        let mut correction = Correction::submitted(business_id, input, Utc::now());
        correction.id = self.repo.add(&correction).await?;

        tracing::info!(
            correction_id = correction.id,
            business_id,
            "Correction submitted"
        );

        if let Err(e) = self
            .notifier
            .notify(&Notification::correction_submitted(&business, &correction))
            .await
        {
            tracing::warn!(correction_id = correction.id, "Failed to announce correction: {}", e);
        }

        Ok(correction.id)
    }
}
