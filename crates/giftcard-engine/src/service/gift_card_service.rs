//! 礼品卡查询与维护服务

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use super::dto::{GiftCardDto, GiftCardStatusDto, IssueCommand};
use super::issuance::IssuanceService;
use crate::error::{GiftCardError, Result};
use crate::models::{GiftCardPageFilter, Page};
use crate::repository::GiftCardRepositoryTrait;

pub struct GiftCardService<R>
where
    R: GiftCardRepositoryTrait,
{
    card_repo: Arc<R>,
    issuance: IssuanceService<R>,
}

impl<R> GiftCardService<R>
where
    R: GiftCardRepositoryTrait + 'static,
{
    pub fn new(card_repo: Arc<R>, issuance: IssuanceService<R>) -> Self {
        Self {
            card_repo,
            issuance,
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<GiftCardDto> {
        self.card_repo
            .find_by_id(id)
            .await?
            .map(|card| card.to_dto())
            .ok_or_else(|| GiftCardError::GiftCardNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn find_by_public_code(&self, public_code: &str) -> Result<GiftCardStatusDto> {
        self.card_repo
            .find_by_public_code(public_code)
            .await?
            .map(|card| card.to_status())
            .ok_or_else(|| GiftCardError::GiftCardNotFound(public_code.to_string()))
    }

    /// 用户名下没有卡时返回 `NoGiftCardsForOwner`
    #[instrument(skip(self))]
    pub async fn find_by_owner(&self, owner: &str) -> Result<Vec<GiftCardDto>> {
        let cards = self.card_repo.find_by_owner(owner).await?;
        if cards.is_empty() {
            return Err(GiftCardError::NoGiftCardsForOwner(owner.to_string()));
        }
        Ok(cards.iter().map(|card| card.to_dto()).collect())
    }

    /// 发行单张卡
    pub async fn create(&self, cmd: IssueCommand) -> Result<GiftCardDto> {
        let card = self.issuance.issue_one(cmd).await?;
        Ok(card.to_dto())
    }

    /// 修改面额和过期时间，仅限有效的卡
    ///
    /// 读取后被并发核销的卡由存储的条件写入拦截，返回 `GiftCardNotValid`
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        amount: i32,
        expire_date: DateTime<Utc>,
    ) -> Result<GiftCardDto> {
        let mut card = self
            .card_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| GiftCardError::GiftCardNotFound(id.to_string()))?;

        card.update(amount, expire_date)?;
        self.card_repo.update_details(&card).await?;

        info!(card_id = id, "礼品卡已更新");
        Ok(card.to_dto())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.card_repo.delete(id).await?;
        info!(card_id = id, "礼品卡已删除");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_page(&self, filter: GiftCardPageFilter) -> Result<Page<GiftCardDto>> {
        let (cards, total) = self.card_repo.find_page(&filter).await?;
        Ok(Page::new(cards, total, filter.page).map(|card| card.to_dto()))
    }
}
