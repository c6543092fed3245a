//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GiftCardError;
use crate::models::{GiftCard, GiftCardStatus};

/// 礼品卡 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardDto {
    pub id: i64,
    pub amount: i32,
    pub public_code: String,
    pub secret_code: String,
    pub owner: String,
    pub expire_date: DateTime<Utc>,
    pub status: GiftCardStatus,
    pub campaign_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_title: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 礼品卡状态
///
/// 查不到卡时只回填密钥，`is_valid` 为 false，其余字段为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardStatusDto {
    pub secret_code: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GiftCardStatus>,
}

impl GiftCardStatusDto {
    pub fn not_found(secret_code: impl Into<String>) -> Self {
        Self {
            secret_code: secret_code.into(),
            is_valid: false,
            public_code: None,
            amount: None,
            expire_date: None,
            owner: None,
            status: None,
        }
    }

    fn from_card(card: &GiftCard, is_valid: bool) -> Self {
        Self {
            secret_code: card.secret_code.clone(),
            is_valid,
            public_code: Some(card.public_code.clone()),
            amount: Some(card.amount),
            expire_date: Some(card.expire_date),
            owner: Some(card.owner.clone()),
            status: Some(card.status),
        }
    }
}

impl GiftCard {
    pub fn to_dto(&self) -> GiftCardDto {
        GiftCardDto {
            id: self.id,
            amount: self.amount,
            public_code: self.public_code.clone(),
            secret_code: self.secret_code.clone(),
            owner: self.owner.clone(),
            expire_date: self.expire_date,
            status: self.status,
            campaign_id: self.campaign_id,
            campaign_title: self.campaign_title.clone(),
            is_valid: self.is_valid(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// 当前状态，有效性按完整规则计算
    pub fn to_status(&self) -> GiftCardStatusDto {
        GiftCardStatusDto::from_card(self, self.is_valid())
    }

    /// 核销成功后的状态，有效性只看过期时间
    pub fn to_approved_status(&self) -> GiftCardStatusDto {
        GiftCardStatusDto::from_card(self, self.is_date_valid())
    }
}

/// 单张发行参数
#[derive(Debug, Clone, PartialEq)]
pub struct IssueCommand {
    pub expire_date: DateTime<Utc>,
    pub amount: i32,
    pub campaign_id: i64,
}

/// 批量发行结果
///
/// 发行不回滚：部分失败时 `cards` 保留已落库的卡，`error` 为第一个观察到的错误
#[derive(Debug, Default)]
pub struct BatchIssueOutcome {
    pub cards: Vec<GiftCard>,
    pub error: Option<GiftCardError>,
}

impl BatchIssueOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn approved_card() -> GiftCard {
        let now = Utc::now();
        GiftCard {
            id: 9,
            amount: 2000,
            public_code: "123456789012".to_string(),
            secret_code: "ABCDEFGHIJKLMNOP".to_string(),
            owner: "u1".to_string(),
            expire_date: now + Duration::days(3),
            status: GiftCardStatus::Approved,
            campaign_id: 1,
            campaign_title: Some("spring".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_not_found_status_only_echoes_secret() {
        let status = GiftCardStatusDto::not_found("ABC");
        assert_eq!(status.secret_code, "ABC");
        assert!(!status.is_valid);
        assert!(status.amount.is_none());

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({"secretCode": "ABC", "isValid": false}));
    }

    #[test]
    fn test_approved_status_uses_date_only_validity() {
        let card = approved_card();
        assert!(card.to_approved_status().is_valid);
        assert!(!card.to_status().is_valid);
        assert_eq!(card.to_approved_status().owner.as_deref(), Some("u1"));
    }

    #[test]
    fn test_dto_serialization() {
        let dto = approved_card().to_dto();
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["publicCode"], "123456789012");
        assert_eq!(json["status"], "APPROVED");
        assert_eq!(json["isValid"], false);
        assert_eq!(json["campaignTitle"], "spring");
    }
}
