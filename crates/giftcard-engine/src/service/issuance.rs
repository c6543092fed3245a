//! 礼品卡发行服务
//!
//! ## 发行流程
//!
//! 1. 生成公开码/密钥 -> 2. 落库
//!    -> 唯一键冲突：重新生成卡号重试，超过上限返回 `KeyExhaustion`
//!    -> 其他错误：立即返回，不重试
//!
//! 批量发行不回滚：未绑定的卡留在库中无副作用，部分失败时同时返回已发行的卡和错误。

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use giftcard_shared::observability::metrics;

use super::dto::{BatchIssueOutcome, IssueCommand};
use super::{run_to_completion, split_first_error};
use crate::error::{GiftCardError, Result};
use crate::keygen::KeyGenerator;
use crate::models::{GiftCard, NewGiftCard};
use crate::repository::GiftCardRepositoryTrait;

/// 礼品卡发行服务
///
/// 卡号生成器在进程内共享，克隆开销只是引用计数
pub struct IssuanceService<R>
where
    R: GiftCardRepositoryTrait,
{
    card_repo: Arc<R>,
    key_generator: Arc<KeyGenerator>,
    max_key_attempts: u32,
}

impl<R> Clone for IssuanceService<R>
where
    R: GiftCardRepositoryTrait,
{
    fn clone(&self) -> Self {
        Self {
            card_repo: Arc::clone(&self.card_repo),
            key_generator: Arc::clone(&self.key_generator),
            max_key_attempts: self.max_key_attempts,
        }
    }
}

impl<R> IssuanceService<R>
where
    R: GiftCardRepositoryTrait + 'static,
{
    pub fn new(card_repo: Arc<R>, key_generator: Arc<KeyGenerator>, max_key_attempts: u32) -> Self {
        Self {
            card_repo,
            key_generator,
            max_key_attempts: max_key_attempts.max(1),
        }
    }

    /// 发行一张卡
    ///
    /// 恰好一次成功写入；冲突重试最多 `max_key_attempts` 次落库
    #[instrument(skip(self), fields(campaign_id = cmd.campaign_id, amount = cmd.amount))]
    pub async fn issue_one(&self, cmd: IssueCommand) -> Result<GiftCard> {
        let mut new_card = NewGiftCard::new(
            self.key_generator.generate(),
            cmd.amount,
            cmd.expire_date,
            cmd.campaign_id,
        );

        for attempt in 1..=self.max_key_attempts {
            match self.card_repo.create(&new_card).await {
                Ok(card) => {
                    metrics::record_issuance("success");
                    debug!(card_id = card.id, attempt, "礼品卡发行成功");
                    return Ok(card);
                }
                Err(e) if e.is_key_conflict() => {
                    metrics::record_key_collision();
                    debug!(attempt, "卡号冲突，重新生成");
                    new_card.regenerate_keys(&self.key_generator);
                }
                Err(e) => {
                    metrics::record_issuance("failed");
                    warn!(error = %e, attempt, "礼品卡发行失败");
                    return Err(e);
                }
            }
        }

        metrics::record_issuance("exhausted");
        warn!(attempts = self.max_key_attempts, "卡号冲突次数超限");
        Err(GiftCardError::KeyExhaustion {
            attempts: self.max_key_attempts,
        })
    }

    /// 按参数列表批量发行，每个元素一张
    ///
    /// 全部任务结束后返回，`cards` 按完成顺序排列
    #[instrument(skip(self, commands), fields(batch_size = commands.len()))]
    pub async fn issue_many_distinct(&self, commands: Vec<IssueCommand>) -> BatchIssueOutcome {
        let started = Instant::now();
        let batch_size = commands.len();

        let units = commands.into_iter().map(|cmd| {
            let service = self.clone();
            async move { service.issue_one(cmd).await }
        });
        let (cards, error) = split_first_error(run_to_completion(units).await);

        metrics::record_batch("issue", batch_size, started.elapsed().as_secs_f64());
        match &error {
            None => info!(issued = cards.len(), "批量发行完成"),
            Some(e) => warn!(
                issued = cards.len(),
                failed = batch_size - cards.len(),
                error = %e,
                "批量发行部分失败"
            ),
        }

        BatchIssueOutcome { cards, error }
    }

    /// 以相同参数批量发行 `count` 张
    #[instrument(skip(self), fields(campaign_id = cmd.campaign_id))]
    pub async fn issue_many_same(&self, cmd: IssueCommand, count: usize) -> BatchIssueOutcome {
        self.issue_many_distinct(vec![cmd; count]).await
    }
}
