//! 应用状态定义

use std::sync::Arc;

use sqlx::PgPool;

use giftcard_engine::{
    ApprovalService, CampaignRepository, CampaignService, GiftCardRepository, GiftCardService,
    IssuanceService, KeyGenerator, ValidationService,
};
use giftcard_shared::config::IssuanceConfig;

/// Axum 应用共享状态
///
/// 服务内部只持有 Arc，克隆开销是引用计数
#[derive(Clone)]
pub struct AppState {
    pub gift_cards: Arc<GiftCardService<GiftCardRepository>>,
    pub issuance: IssuanceService<GiftCardRepository>,
    pub validation: ValidationService<GiftCardRepository>,
    pub approval: ApprovalService<GiftCardRepository>,
    pub campaigns: Arc<CampaignService<CampaignRepository>>,
    /// 单次批量请求的最大数量
    pub max_batch_size: usize,
}

impl AppState {
    pub fn new(pool: PgPool, config: &IssuanceConfig) -> Self {
        let card_repo = Arc::new(GiftCardRepository::new(pool.clone()));
        let campaign_repo = Arc::new(CampaignRepository::new(pool));

        let issuance = IssuanceService::new(
            Arc::clone(&card_repo),
            Arc::new(KeyGenerator::new()),
            config.max_key_attempts,
        );

        Self {
            gift_cards: Arc::new(GiftCardService::new(
                Arc::clone(&card_repo),
                issuance.clone(),
            )),
            validation: ValidationService::new(Arc::clone(&card_repo)),
            approval: ApprovalService::new(card_repo),
            issuance,
            campaigns: Arc::new(CampaignService::new(campaign_repo)),
            max_batch_size: config.max_batch_size,
        }
    }
}
