//! 活动仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::CampaignRepositoryTrait;
use crate::error::{GiftCardError, Result};
use crate::models::{Campaign, NewCampaign, PageRequest};

pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, campaign: &NewCampaign) -> Result<Campaign> {
        let created = sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (title)
            VALUES ($1)
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(&campaign.title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_title_error(e, &campaign.title))?;

        Ok(created)
    }

    pub async fn update(&self, campaign: &Campaign) -> Result<Campaign> {
        let updated = sqlx::query_as::<_, Campaign>(
            r#"
            UPDATE campaigns
            SET title = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(campaign.id)
        .bind(&campaign.title)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_title_error(e, &campaign.title))?;

        updated.ok_or(GiftCardError::CampaignNotFound(campaign.id))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campaign)
    }

    /// 删除活动，其下礼品卡随外键级联删除
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GiftCardError::CampaignNotFound(id));
        }
        Ok(())
    }

    pub async fn find_page(
        &self,
        page: PageRequest,
        search: Option<String>,
    ) -> Result<(Vec<Campaign>, i64)> {
        let search = search.map(|s| format!("%{}%", s));

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM campaigns WHERE ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM campaigns
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((campaigns, total.0))
    }
}

fn classify_title_error(err: sqlx::Error, title: &str) -> GiftCardError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            GiftCardError::DuplicateCampaignTitle(title.to_string())
        }
        _ => GiftCardError::Database(err),
    }
}

#[async_trait]
impl CampaignRepositoryTrait for CampaignRepository {
    async fn create(&self, campaign: &NewCampaign) -> Result<Campaign> {
        self.create(campaign).await
    }

    async fn update(&self, campaign: &Campaign) -> Result<Campaign> {
        self.update(campaign).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>> {
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.delete(id).await
    }

    async fn find_page(
        &self,
        page: PageRequest,
        search: Option<String>,
    ) -> Result<(Vec<Campaign>, i64)> {
        self.find_page(page, search).await
    }
}
