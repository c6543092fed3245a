//! 服务层
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `issuance`: 发行（单张 / 批量），卡号冲突时重新生成重试
//! - `validation`: 只读有效性校验
//! - `approval`: 核销（单张 / 批量），批量失败时补偿回滚
//! - `gift_card_service` / `campaign_service`: 常规增删改查
//!
//! ## 批量执行模型
//!
//! 每个单元 spawn 一个任务，不设并发上限（批量大小由调用方限制）。
//! 协调者等待全部 N 个任务结束后再汇总，结果按完成顺序排列。
//! 已启动的任务不会被取消。

pub mod approval;
pub mod campaign_service;
pub mod dto;
pub mod gift_card_service;
pub mod issuance;
pub mod validation;

pub use approval::ApprovalService;
pub use campaign_service::CampaignService;
pub use dto::*;
pub use gift_card_service::GiftCardService;
pub use issuance::IssuanceService;
pub use validation::ValidationService;

use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{Instrument, error};

use crate::error::{GiftCardError, Result};

/// 并发执行全部单元，等待每一个结束，按完成顺序返回结果
///
/// 任务 panic 时对应单元记为 `Internal` 错误
pub(crate) async fn run_to_completion<T, F>(units: impl IntoIterator<Item = F>) -> Vec<Result<T>>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut pending: FuturesUnordered<_> = units
        .into_iter()
        .map(|unit| tokio::spawn(unit.in_current_span()))
        .collect();

    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = pending.next().await {
        results.push(joined.unwrap_or_else(|e| {
            error!(error = %e, "批量任务异常退出");
            Err(GiftCardError::Internal(format!("批量任务异常退出: {e}")))
        }));
    }
    results
}

/// 拆分成功结果和第一个观察到的错误
pub(crate) fn split_first_error<T>(results: Vec<Result<T>>) -> (Vec<T>, Option<GiftCardError>) {
    let mut succeeded = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(value) => succeeded.push(value),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }
    (succeeded, first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_to_completion_waits_for_every_unit() {
        let units = (0..5u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(50 - i * 10)).await;
            if i == 0 {
                Err(GiftCardError::Internal("boom".to_string()))
            } else {
                Ok(i)
            }
        });

        let results = run_to_completion(units).await;
        assert_eq!(results.len(), 5);

        let (succeeded, error) = split_first_error(results);
        assert_eq!(succeeded.len(), 4);
        assert!(error.is_some());
    }

    async fn panics_on_one(i: i32) -> Result<i32> {
        if i == 1 {
            panic!("unit failed");
        }
        Ok(i)
    }

    #[tokio::test]
    async fn test_panicking_unit_becomes_internal_error() {
        let results = run_to_completion((0..2).map(panics_on_one)).await;
        assert_eq!(results.len(), 2);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(GiftCardError::Internal(_))))
        );
    }

    #[test]
    fn test_split_keeps_first_error() {
        let results = vec![
            Ok(1),
            Err(GiftCardError::CardAlreadyTaken("A".to_string())),
            Ok(2),
            Err(GiftCardError::GiftCardNotFound("B".to_string())),
        ];
        let (succeeded, error) = split_first_error(results);
        assert_eq!(succeeded, vec![1, 2]);
        assert!(matches!(error, Some(GiftCardError::CardAlreadyTaken(_))));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let units: Vec<std::future::Ready<Result<i32>>> = Vec::new();
        assert!(run_to_completion(units).await.is_empty());
    }
}
