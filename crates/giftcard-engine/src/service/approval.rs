//! 礼品卡核销服务
//!
//! 核销即把卡绑定到用户：Empty(未绑定) -> Approved(已绑定)。
//!
//! ## 批量核销
//!
//! 1. 每个密钥一个任务并发核销
//! 2. 等待全部任务结束（包括在首个错误之后才完成的任务）
//! 3. 有任何失败：对本批所有已成功的卡并发回滚，全部回滚结束后返回首个错误
//! 4. 全部成功：返回所有核销结果
//!
//! 存储只保证单行写入的原子性，批量的全有或全无由这里的补偿保证。
//! 回滚失败只记录日志和指标，不改变本批的返回结果。

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{Instrument, error, info, instrument, warn};

use giftcard_shared::observability::metrics;

use super::dto::GiftCardStatusDto;
use super::{run_to_completion, split_first_error};
use crate::error::{GiftCardError, Result};
use crate::keygen::normalize_secret;
use crate::repository::GiftCardRepositoryTrait;

/// 礼品卡核销服务
pub struct ApprovalService<R>
where
    R: GiftCardRepositoryTrait,
{
    card_repo: Arc<R>,
}

impl<R> Clone for ApprovalService<R>
where
    R: GiftCardRepositoryTrait,
{
    fn clone(&self) -> Self {
        Self {
            card_repo: Arc::clone(&self.card_repo),
        }
    }
}

impl<R> ApprovalService<R>
where
    R: GiftCardRepositoryTrait + 'static,
{
    pub fn new(card_repo: Arc<R>) -> Self {
        Self { card_repo }
    }

    /// 核销单张卡
    ///
    /// 先到先得：卡已绑定用户时返回 `CardAlreadyTaken`。
    /// 返回的状态有效性只看过期时间。
    #[instrument(skip(self))]
    pub async fn approve_one(&self, owner: &str, secret: &str) -> Result<GiftCardStatusDto> {
        let secret = normalize_secret(secret);

        let Some(mut card) = self.card_repo.find_by_secret_code(&secret).await? else {
            metrics::record_approval("not_found");
            return Err(GiftCardError::GiftCardNotFound(secret));
        };

        if let Err(e) = card.assign_owner(owner) {
            metrics::record_approval("taken");
            return Err(e);
        }

        if let Err(e) = self.card_repo.commit_approval(&card).await {
            let status = match e {
                GiftCardError::CardAlreadyTaken(_) => "taken",
                GiftCardError::GiftCardNotFound(_) => "not_found",
                _ => "failed",
            };
            metrics::record_approval(status);
            return Err(e);
        }

        metrics::record_approval("success");
        info!(card_id = card.id, "礼品卡核销成功");
        Ok(card.to_approved_status())
    }

    /// 批量核销，全部成功或全部回滚
    #[instrument(skip(self, secrets), fields(batch_size = secrets.len()))]
    pub async fn approve_many(
        &self,
        owner: &str,
        secrets: Vec<String>,
    ) -> Result<Vec<GiftCardStatusDto>> {
        let started = Instant::now();
        let batch_size = secrets.len();

        let units = secrets.into_iter().map(|secret| {
            let service = self.clone();
            let owner = owner.to_string();
            async move { service.approve_one(&owner, &secret).await }
        });
        let (approved, first_error) = split_first_error(run_to_completion(units).await);

        let outcome = match first_error {
            None => {
                info!(approved = approved.len(), "批量核销完成");
                Ok(approved)
            }
            Some(e) => {
                warn!(
                    error = %e,
                    compensating = approved.len(),
                    "批量核销失败，回滚已核销的卡"
                );
                self.compensate(&approved).await;
                Err(e)
            }
        };

        metrics::record_batch("approve", batch_size, started.elapsed().as_secs_f64());
        outcome
    }

    /// 撤销核销：清空用户并恢复为 Empty
    ///
    /// 对未核销的卡是幂等的空操作
    #[instrument(skip(self))]
    pub async fn roll_back(&self, secret: &str) -> Result<()> {
        let secret = normalize_secret(secret);
        let mut card = self
            .card_repo
            .find_by_secret_code(&secret)
            .await?
            .ok_or_else(|| GiftCardError::GiftCardNotFound(secret.clone()))?;

        card.roll_back();
        self.card_repo.release_owner(&card).await
    }

    /// 并发回滚本批已核销的卡，等待全部结束
    async fn compensate(&self, approved: &[GiftCardStatusDto]) {
        let handles: Vec<_> = approved
            .iter()
            .map(|status| {
                let service = self.clone();
                let secret = status.secret_code.clone();
                tokio::spawn(
                    async move {
                        let result = service.roll_back(&secret).await;
                        (secret, result)
                    }
                    .in_current_span(),
                )
            })
            .collect();

        let mut failed = 0usize;
        for joined in join_all(handles).await {
            match joined {
                Ok((_, Ok(()))) => metrics::record_compensation("success"),
                Ok((secret, Err(e))) => {
                    failed += 1;
                    metrics::record_compensation("failed");
                    error!(secret = %secret, error = %e, "礼品卡核销回滚失败");
                }
                Err(e) => {
                    failed += 1;
                    metrics::record_compensation("failed");
                    error!(error = %e, "礼品卡核销回滚任务异常退出");
                }
            }
        }

        if failed == 0 {
            info!(rolled_back = approved.len(), "批量核销回滚完成");
        } else {
            error!(
                rolled_back = approved.len() - failed,
                failed, "批量核销回滚部分失败"
            );
        }
    }
}
