//! 请求 DTO 定义
//!
//! 字段级规则用 validator 声明，日期格式与密钥格式在转换时校验

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use giftcard_engine::dto::IssueCommand;
use giftcard_engine::keygen::{is_well_formed_secret, normalize_secret};
use giftcard_engine::{GiftCardPageFilter, PageRequest, SECRET_CODE_LENGTH, parse_expire_date};

use crate::error::{ApiError, Result};

/// 发行单张礼品卡请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGiftCardRequest {
    /// YYYY-MM-DD
    pub expire_date: String,
    #[validate(range(min = 1000, message = "面额不能小于1000"))]
    pub amount: i32,
    #[validate(range(min = 1, message = "活动ID不能为空"))]
    pub campaign_id: i64,
}

impl CreateGiftCardRequest {
    pub fn to_command(&self) -> Result<IssueCommand> {
        Ok(IssueCommand {
            expire_date: parse_expire_date(&self.expire_date)?,
            amount: self.amount,
            campaign_id: self.campaign_id,
        })
    }
}

/// 按参数列表批量发行请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateGiftCardRequest {
    #[validate(length(min = 1, message = "发行列表不能为空"))]
    pub items: Vec<CreateGiftCardRequest>,
}

impl BatchCreateGiftCardRequest {
    pub fn to_commands(&self, max_batch_size: usize) -> Result<Vec<IssueCommand>> {
        ensure_batch_size(self.items.len(), max_batch_size)?;
        self.items
            .iter()
            .map(|item| {
                item.validate()?;
                item.to_command()
            })
            .collect()
    }
}

/// 相同参数批量发行请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchSameGiftCardRequest {
    pub expire_date: String,
    #[validate(range(min = 1000, message = "面额不能小于1000"))]
    pub amount: i32,
    #[validate(range(min = 1, message = "活动ID不能为空"))]
    pub campaign_id: i64,
    #[validate(range(min = 1, message = "发行数量不能小于1"))]
    pub count: usize,
}

impl BatchSameGiftCardRequest {
    pub fn to_command(&self, max_batch_size: usize) -> Result<IssueCommand> {
        ensure_batch_size(self.count, max_batch_size)?;
        Ok(IssueCommand {
            expire_date: parse_expire_date(&self.expire_date)?,
            amount: self.amount,
            campaign_id: self.campaign_id,
        })
    }
}

/// 修改礼品卡请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGiftCardRequest {
    pub expire_date: String,
    #[validate(range(min = 1000, message = "面额不能小于1000"))]
    pub amount: i32,
}

impl UpdateGiftCardRequest {
    pub fn expire_date(&self) -> Result<DateTime<Utc>> {
        Ok(parse_expire_date(&self.expire_date)?)
    }
}

/// 批量校验请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateGiftCardsRequest {
    #[validate(length(min = 1, message = "密钥列表不能为空"))]
    pub secrets: Vec<String>,
}

impl ValidateGiftCardsRequest {
    pub fn normalized_secrets(&self, max_batch_size: usize) -> Result<Vec<String>> {
        ensure_batch_size(self.secrets.len(), max_batch_size)?;
        normalize_secrets(&self.secrets)
    }
}

/// 批量核销请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveGiftCardsRequest {
    #[validate(length(min = 1, message = "用户标识不能为空"))]
    pub owner: String,
    #[validate(length(min = 1, message = "密钥列表不能为空"))]
    pub secrets: Vec<String>,
}

impl ApproveGiftCardsRequest {
    pub fn normalized_secrets(&self, max_batch_size: usize) -> Result<Vec<String>> {
        ensure_batch_size(self.secrets.len(), max_batch_size)?;
        normalize_secrets(&self.secrets)
    }
}

/// 礼品卡分页查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub campaign_id: Option<i64>,
    pub is_valid: Option<bool>,
    /// YYYY-MM-DD
    pub expire_date_from: Option<String>,
    /// YYYY-MM-DD
    pub expire_date_to: Option<String>,
}

impl GiftCardQuery {
    pub fn to_filter(&self) -> Result<GiftCardPageFilter> {
        Ok(GiftCardPageFilter {
            page: page_request(self.page, self.page_size),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            campaign_id: self.campaign_id,
            is_valid: self.is_valid,
            expire_date_from: self.expire_date_from.as_deref().map(parse_date).transpose()?,
            expire_date_to: self.expire_date_to.as_deref().map(parse_date).transpose()?,
        })
    }
}

/// 创建 / 修改活动请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    #[validate(length(min = 1, max = 100, message = "活动标题长度必须在1-100个字符之间"))]
    pub title: String,
}

/// 活动分页查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

impl CampaignQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.page_size)
    }
}

fn page_request(page: Option<i64>, page_size: Option<i64>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(
        page.unwrap_or(defaults.page),
        page_size.unwrap_or(defaults.page_size),
    )
}

/// 校验单个密钥并统一为大写
pub fn normalize_checked_secret(secret: &str) -> Result<String> {
    let normalized = normalize_secret(secret);
    if !is_well_formed_secret(&normalized) {
        return Err(ApiError::Validation(format!(
            "密钥必须为{}位字母或数字: {}",
            SECRET_CODE_LENGTH, secret
        )));
    }
    Ok(normalized)
}

fn normalize_secrets(secrets: &[String]) -> Result<Vec<String>> {
    secrets.iter().map(|s| normalize_checked_secret(s)).collect()
}

fn ensure_batch_size(size: usize, max_batch_size: usize) -> Result<()> {
    if size > max_batch_size {
        return Err(ApiError::Validation(format!(
            "批量数量不能超过{}: {}",
            max_batch_size, size
        )));
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| ApiError::Validation(format!("日期格式应为 YYYY-MM-DD: {}", value)))
}
