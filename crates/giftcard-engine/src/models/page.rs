//! 分页与查询过滤

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 单页最大条数
pub const MAX_PAGE_SIZE: i64 = 50;

/// 分页参数（页码从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// 计算数据库查询的 offset，超大页码饱和到 i64::MAX
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.limit())
    }

    /// 获取限制条数（最大50）
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// 礼品卡分页查询条件
///
/// 过期时间上下界均为开区间
#[derive(Debug, Clone, Default)]
pub struct GiftCardPageFilter {
    pub page: PageRequest,
    /// 公开码子串
    pub search: Option<String>,
    pub campaign_id: Option<i64>,
    pub is_valid: Option<bool>,
    pub expire_date_from: Option<DateTime<Utc>>,
    pub expire_date_to: Option<DateTime<Utc>>,
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page.max(1),
            page_size: request.limit(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
