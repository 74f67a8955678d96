//! Administrator registry

use async_trait::async_trait;
use shared::Admin;
use sqlx::PgPool;

use crate::error::AppResult;

#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// The registered administrator whose identity is `uid`, if any
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<Admin>>;
}

#[derive(Clone)]
pub struct PgAdminRepository {
    db: PgPool,
}

impl PgAdminRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminRepository for PgAdminRepository {
    async fn find_by_uid(&self, uid: &str) -> AppResult<Option<Admin>> {
        let row = sqlx::query_as::<_, (i32, String, String)>(
            "SELECT id, email, uid FROM admins WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(id, email, uid)| Admin { id, email, uid }))
    }
}
