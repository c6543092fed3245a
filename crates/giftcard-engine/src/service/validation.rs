//! 礼品卡有效性校验（只读）

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use giftcard_shared::observability::metrics;

use super::dto::GiftCardStatusDto;
use super::run_to_completion;
use crate::error::Result;
use crate::keygen::normalize_secret;
use crate::repository::GiftCardRepositoryTrait;

/// 礼品卡校验服务，不修改任何卡片状态
pub struct ValidationService<R>
where
    R: GiftCardRepositoryTrait,
{
    card_repo: Arc<R>,
}

impl<R> Clone for ValidationService<R>
where
    R: GiftCardRepositoryTrait,
{
    fn clone(&self) -> Self {
        Self {
            card_repo: Arc::clone(&self.card_repo),
        }
    }
}

impl<R> ValidationService<R>
where
    R: GiftCardRepositoryTrait + 'static,
{
    pub fn new(card_repo: Arc<R>) -> Self {
        Self { card_repo }
    }

    /// 按密钥查询当前有效性
    ///
    /// 查不到卡时返回无效状态而不是错误；存储故障照常返回错误
    #[instrument(skip(self))]
    pub async fn validate_one(&self, secret: &str) -> Result<GiftCardStatusDto> {
        let secret = normalize_secret(secret);
        let status = match self.card_repo.find_by_secret_code(&secret).await? {
            Some(card) => card.to_status(),
            None => GiftCardStatusDto::not_found(secret),
        };

        metrics::record_validation(status.is_valid);
        Ok(status)
    }

    /// 批量校验，结果按完成顺序排列
    ///
    /// 不返回错误：单张查询失败按无效处理
    #[instrument(skip(self, secrets), fields(batch_size = secrets.len()))]
    pub async fn validate_many(&self, secrets: Vec<String>) -> Vec<GiftCardStatusDto> {
        let started = Instant::now();
        let batch_size = secrets.len();

        let units = secrets.into_iter().map(|secret| {
            let service = self.clone();
            async move {
                match service.validate_one(&secret).await {
                    Ok(status) => Ok(status),
                    Err(e) => {
                        warn!(secret = %secret, error = %e, "礼品卡校验失败，按无效处理");
                        Ok(GiftCardStatusDto::not_found(normalize_secret(&secret)))
                    }
                }
            }
        });

        let statuses: Vec<GiftCardStatusDto> = run_to_completion(units)
            .await
            .into_iter()
            .filter_map(|result| result.ok())
            .collect();

        metrics::record_batch("validate", batch_size, started.elapsed().as_secs_f64());
        info!(
            total = batch_size,
            valid = statuses.iter().filter(|s| s.is_valid).count(),
            "批量校验完成"
        );
        statuses
    }
}
