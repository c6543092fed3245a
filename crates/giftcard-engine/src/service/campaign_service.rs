//! 活动管理服务

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{GiftCardError, Result};
use crate::models::{Campaign, NewCampaign, Page, PageRequest};
use crate::repository::CampaignRepositoryTrait;

pub struct CampaignService<CR>
where
    CR: CampaignRepositoryTrait,
{
    campaign_repo: Arc<CR>,
}

impl<CR> CampaignService<CR>
where
    CR: CampaignRepositoryTrait,
{
    pub fn new(campaign_repo: Arc<CR>) -> Self {
        Self { campaign_repo }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, title: &str) -> Result<Campaign> {
        let campaign = self
            .campaign_repo
            .create(&NewCampaign::new(title.trim()))
            .await?;
        info!(campaign_id = campaign.id, "活动已创建");
        Ok(campaign)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, title: &str) -> Result<Campaign> {
        let mut campaign = self
            .campaign_repo
            .find_by_id(id)
            .await?
            .ok_or(GiftCardError::CampaignNotFound(id))?;

        campaign.rename(title.trim());
        self.campaign_repo.update(&campaign).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.campaign_repo.delete(id).await?;
        info!(campaign_id = id, "活动已删除");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_page(
        &self,
        page: PageRequest,
        search: Option<String>,
    ) -> Result<Page<Campaign>> {
        let (campaigns, total) = self.campaign_repo.find_page(page, search).await?;
        Ok(Page::new(campaigns, total, page))
    }
}
