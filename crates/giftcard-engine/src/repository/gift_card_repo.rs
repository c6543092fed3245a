//! 礼品卡仓储
//!
//! 读操作统一联表带出活动标题

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::GiftCardRepositoryTrait;
use crate::error::{GiftCardError, Result};
use crate::models::{
    GiftCard, GiftCardPageFilter, GiftCardStatus, NewGiftCard, VALIDITY_GRACE_DAYS,
};

const SELECT_GIFT_CARD: &str = r#"
    SELECT g.id, g.amount, g.public_code, g.secret_code, g.owner, g.expire_date,
           g.status, g.campaign_id, c.title AS campaign_title, g.created_at, g.updated_at
    FROM gift_cards g
    LEFT JOIN campaigns c ON c.id = g.campaign_id
"#;

/// 分页查询条件，count 与列表查询共用
const PAGE_CONDITIONS: &str = r#"
    WHERE ($1::text IS NULL OR g.public_code ILIKE $1)
      AND ($2::bigint IS NULL OR g.campaign_id = $2)
      AND ($3::bool IS NULL OR
           (g.owner = '' AND g.status = 'empty'
            AND g.expire_date > NOW() - make_interval(days => $4)) = $3)
      AND ($5::timestamptz IS NULL OR g.expire_date > $5)
      AND ($6::timestamptz IS NULL OR g.expire_date < $6)
"#;

/// 礼品卡仓储
pub struct GiftCardRepository {
    pool: PgPool,
}

impl GiftCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 写入操作 ====================

    /// 插入新卡并返回完整记录
    pub async fn create(&self, card: &NewGiftCard) -> Result<GiftCard> {
        let created = sqlx::query_as::<_, GiftCard>(
            r#"
            WITH inserted AS (
                INSERT INTO gift_cards (amount, public_code, secret_code, owner, expire_date, status, campaign_id)
                VALUES ($1, $2, $3, '', $4, $5, $6)
                RETURNING *
            )
            SELECT i.id, i.amount, i.public_code, i.secret_code, i.owner, i.expire_date,
                   i.status, i.campaign_id, c.title AS campaign_title, i.created_at, i.updated_at
            FROM inserted i
            LEFT JOIN campaigns c ON c.id = i.campaign_id
            "#,
        )
        .bind(card.amount)
        .bind(&card.public_code)
        .bind(&card.secret_code)
        .bind(card.expire_date)
        .bind(GiftCardStatus::Empty)
        .bind(card.campaign_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_insert_error(e, card.campaign_id))?;

        Ok(created)
    }

    /// 修改面额和过期时间
    ///
    /// 与核销共用 `owner = ''` 条件，读取之后被核销的卡不会被改写
    pub async fn update_details(&self, card: &GiftCard) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE gift_cards
            SET amount = $2, expire_date = $3, updated_at = NOW()
            WHERE id = $1 AND owner = '' AND status = $4
            "#,
        )
        .bind(card.id)
        .bind(card.amount)
        .bind(card.expire_date)
        .bind(GiftCardStatus::Empty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        match self.find_by_id(card.id).await? {
            Some(_) => Err(GiftCardError::GiftCardNotValid(card.id)),
            None => Err(GiftCardError::GiftCardNotFound(card.id.to_string())),
        }
    }

    /// 清空用户并恢复为 Empty
    pub async fn release_owner(&self, card: &GiftCard) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE gift_cards
            SET owner = '', status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(card.id)
        .bind(GiftCardStatus::Empty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GiftCardError::GiftCardNotFound(card.secret_code.clone()));
        }
        Ok(())
    }

    /// 核销落库
    ///
    /// `WHERE owner = ''` 保证同一张卡只有第一次绑定生效
    pub async fn commit_approval(&self, card: &GiftCard) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE gift_cards
            SET owner = $2, status = $3, updated_at = NOW()
            WHERE id = $1 AND owner = ''
            "#,
        )
        .bind(card.id)
        .bind(&card.owner)
        .bind(card.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        match self.find_by_id(card.id).await? {
            Some(_) => Err(GiftCardError::CardAlreadyTaken(card.secret_code.clone())),
            None => Err(GiftCardError::GiftCardNotFound(card.secret_code.clone())),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM gift_cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GiftCardError::GiftCardNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== 查询操作 ====================

    pub async fn find_by_id(&self, id: i64) -> Result<Option<GiftCard>> {
        let sql = format!("{SELECT_GIFT_CARD} WHERE g.id = $1");
        let card = sqlx::query_as::<_, GiftCard>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    pub async fn find_by_secret_code(&self, secret_code: &str) -> Result<Option<GiftCard>> {
        let sql = format!("{SELECT_GIFT_CARD} WHERE g.secret_code = $1");
        let card = sqlx::query_as::<_, GiftCard>(&sql)
            .bind(secret_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    pub async fn find_by_public_code(&self, public_code: &str) -> Result<Option<GiftCard>> {
        let sql = format!("{SELECT_GIFT_CARD} WHERE g.public_code = $1");
        let card = sqlx::query_as::<_, GiftCard>(&sql)
            .bind(public_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    /// 列出用户绑定的全部礼品卡
    pub async fn find_by_owner(&self, owner: &str) -> Result<Vec<GiftCard>> {
        let sql = format!("{SELECT_GIFT_CARD} WHERE g.owner = $1 ORDER BY g.id DESC");
        let cards = sqlx::query_as::<_, GiftCard>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        Ok(cards)
    }

    /// 分页查询，返回当前页和总数
    pub async fn find_page(&self, filter: &GiftCardPageFilter) -> Result<(Vec<GiftCard>, i64)> {
        // 构建模糊搜索参数：提供 search 时添加 % 通配符用于 ILIKE 查询
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));
        let grace_days = VALIDITY_GRACE_DAYS as i32;

        let count_sql = format!("SELECT COUNT(*) FROM gift_cards g {PAGE_CONDITIONS}");
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&search)
            .bind(filter.campaign_id)
            .bind(filter.is_valid)
            .bind(grace_days)
            .bind(filter.expire_date_from)
            .bind(filter.expire_date_to)
            .fetch_one(&self.pool)
            .await?;

        let list_sql =
            format!("{SELECT_GIFT_CARD} {PAGE_CONDITIONS} ORDER BY g.id DESC LIMIT $7 OFFSET $8");
        let cards = sqlx::query_as::<_, GiftCard>(&list_sql)
            .bind(&search)
            .bind(filter.campaign_id)
            .bind(filter.is_valid)
            .bind(grace_days)
            .bind(filter.expire_date_from)
            .bind(filter.expire_date_to)
            .bind(filter.page.limit())
            .bind(filter.page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((cards, total.0))
    }
}

/// 插入冲突归类：唯一键冲突可重试，外键冲突说明活动不存在
fn classify_insert_error(err: sqlx::Error, campaign_id: i64) -> GiftCardError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return GiftCardError::DuplicateKey;
        }
        if db_err.is_foreign_key_violation() {
            return GiftCardError::InvalidCampaign(campaign_id);
        }
    }
    GiftCardError::Database(err)
}

#[async_trait]
impl GiftCardRepositoryTrait for GiftCardRepository {
    async fn create(&self, card: &NewGiftCard) -> Result<GiftCard> {
        self.create(card).await
    }

    async fn update_details(&self, card: &GiftCard) -> Result<()> {
        self.update_details(card).await
    }

    async fn release_owner(&self, card: &GiftCard) -> Result<()> {
        self.release_owner(card).await
    }

    async fn commit_approval(&self, card: &GiftCard) -> Result<()> {
        self.commit_approval(card).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GiftCard>> {
        self.find_by_id(id).await
    }

    async fn find_by_secret_code(&self, secret_code: &str) -> Result<Option<GiftCard>> {
        self.find_by_secret_code(secret_code).await
    }

    async fn find_by_public_code(&self, public_code: &str) -> Result<Option<GiftCard>> {
        self.find_by_public_code(public_code).await
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<GiftCard>> {
        self.find_by_owner(owner).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.delete(id).await
    }

    async fn find_page(&self, filter: &GiftCardPageFilter) -> Result<(Vec<GiftCard>, i64)> {
        self.find_page(filter).await
    }
}
