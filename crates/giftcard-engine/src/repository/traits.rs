//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试和内存实现

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Campaign, GiftCard, GiftCardPageFilter, NewCampaign, NewGiftCard, PageRequest};

/// 礼品卡仓储接口
///
/// 单行写入由存储保证原子性；跨行的批量一致性由服务层补偿负责
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GiftCardRepositoryTrait: Send + Sync {
    /// 插入新卡；公开码或密钥重复时返回 `DuplicateKey`
    async fn create(&self, card: &NewGiftCard) -> Result<GiftCard>;

    /// 修改面额和过期时间
    ///
    /// 条件写入：仅当库中的卡仍未绑定时落库，否则返回 `GiftCardNotValid`
    async fn update_details(&self, card: &GiftCard) -> Result<()>;

    /// 撤销核销：只清空用户并恢复为 Empty，不触碰面额和过期时间
    async fn release_owner(&self, card: &GiftCard) -> Result<()>;

    /// 条件写入：仅当库中 owner 仍为空时落库，否则返回 `CardAlreadyTaken`
    async fn commit_approval(&self, card: &GiftCard) -> Result<()>;

    async fn find_by_id(&self, id: i64) -> Result<Option<GiftCard>>;
    async fn find_by_secret_code(&self, secret_code: &str) -> Result<Option<GiftCard>>;
    async fn find_by_public_code(&self, public_code: &str) -> Result<Option<GiftCard>>;
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<GiftCard>>;

    /// 删除不存在的卡返回 `GiftCardNotFound`
    async fn delete(&self, id: i64) -> Result<()>;

    async fn find_page(&self, filter: &GiftCardPageFilter) -> Result<(Vec<GiftCard>, i64)>;
}

/// 活动仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepositoryTrait: Send + Sync {
    /// 标题重复时返回 `DuplicateCampaignTitle`
    async fn create(&self, campaign: &NewCampaign) -> Result<Campaign>;
    async fn update(&self, campaign: &Campaign) -> Result<Campaign>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>>;
    async fn delete(&self, id: i64) -> Result<()>;
    async fn find_page(
        &self,
        page: PageRequest,
        search: Option<String>,
    ) -> Result<(Vec<Campaign>, i64)>;
}
