//! 响应 DTO 定义

use serde::Serialize;

use giftcard_engine::Page;
use giftcard_engine::dto::{BatchIssueOutcome, GiftCardDto};

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self::new(page.items, page.total, page.page, page.page_size)
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }

    /// 部分成功：带数据的失败响应
    pub fn partial(data: T, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 批量发行响应
///
/// 发行不回滚，部分失败时同时返回已发行的卡
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchIssueResponse {
    pub issued: usize,
    pub cards: Vec<GiftCardDto>,
}

impl BatchIssueResponse {
    /// 转为统一响应：全部成功为 success，否则带上首个错误
    pub fn into_api_response(outcome: BatchIssueOutcome) -> ApiResponse<Self> {
        let cards: Vec<GiftCardDto> = outcome.cards.iter().map(|card| card.to_dto()).collect();
        let response = Self {
            issued: cards.len(),
            cards,
        };

        match outcome.error {
            None => ApiResponse::success(response),
            Some(e) => {
                let message = crate::error::ApiError::from(e);
                ApiResponse::partial(response, message.error_code(), message.public_message())
            }
        }
    }
}
