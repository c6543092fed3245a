//! 礼品卡实体定义
//!
//! 礼品卡有效的条件：未绑定用户、状态为 Empty、过期时间不早于当前时间减去宽限期。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::GiftCardStatus;
use crate::error::{GiftCardError, Result};
use crate::keygen::{KeyGenerator, KeyPair};

/// 过期宽限天数：过期一天以内仍视为有效
pub const VALIDITY_GRACE_DAYS: i64 = 1;

/// 解析 `YYYY-MM-DD` 格式的过期日期（UTC 零点）
///
/// 早于 now - 宽限期的日期返回 `ExpireDateOutOfRange`
pub fn parse_expire_date_at(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| GiftCardError::Validation(format!("过期日期格式应为 YYYY-MM-DD: {value}")))?;
    let expire_date = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| GiftCardError::Validation(format!("无效的过期日期: {value}")))?
        .and_utc();

    if expire_date < now - Duration::days(VALIDITY_GRACE_DAYS) {
        return Err(GiftCardError::ExpireDateOutOfRange);
    }
    Ok(expire_date)
}

pub fn parse_expire_date(value: &str) -> Result<DateTime<Utc>> {
    parse_expire_date_at(value, Utc::now())
}

/// 礼品卡
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    pub id: i64,
    /// 面额（最小货币单位）
    pub amount: i32,
    /// 公开码，可对外展示的查询标识
    pub public_code: String,
    /// 密钥，核销凭证
    pub secret_code: String,
    /// 绑定的用户标识，空字符串表示未绑定
    pub owner: String,
    pub expire_date: DateTime<Utc>,
    pub status: GiftCardStatus,
    pub campaign_id: i64,
    /// 所属活动标题（联表查询时填充）
    #[sqlx(default)]
    pub campaign_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GiftCard {
    pub fn is_owned(&self) -> bool {
        !self.owner.is_empty()
    }

    /// 过期时间晚于 now - 宽限期
    pub fn is_date_valid_at(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(VALIDITY_GRACE_DAYS) < self.expire_date
    }

    pub fn is_date_valid(&self) -> bool {
        self.is_date_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_owned() && self.status == GiftCardStatus::Empty && self.is_date_valid_at(now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// 绑定用户并标记为已核销
    ///
    /// 先到先得：已绑定的卡返回 `CardAlreadyTaken`，卡片保持不变
    pub fn assign_owner(&mut self, owner: &str) -> Result<()> {
        if self.is_owned() {
            return Err(GiftCardError::CardAlreadyTaken(self.secret_code.clone()));
        }
        self.owner = owner.to_string();
        self.status = GiftCardStatus::Approved;
        Ok(())
    }

    /// 修改面额和过期时间，仅在卡有效时允许
    pub fn update(&mut self, amount: i32, expire_date: DateTime<Utc>) -> Result<()> {
        if !self.is_valid() {
            return Err(GiftCardError::GiftCardNotValid(self.id));
        }
        self.amount = amount;
        self.expire_date = expire_date;
        Ok(())
    }

    /// 撤销核销，对未核销的卡是空操作
    pub fn roll_back(&mut self) {
        self.owner.clear();
        self.status = GiftCardStatus::Empty;
    }
}

/// 尚未持久化的礼品卡
#[derive(Debug, Clone, PartialEq)]
pub struct NewGiftCard {
    pub amount: i32,
    pub public_code: String,
    pub secret_code: String,
    pub expire_date: DateTime<Utc>,
    pub campaign_id: i64,
}

impl NewGiftCard {
    pub fn new(
        keys: KeyPair,
        amount: i32,
        expire_date: DateTime<Utc>,
        campaign_id: i64,
    ) -> Self {
        Self {
            amount,
            public_code: keys.public_code,
            secret_code: keys.secret_code,
            expire_date,
            campaign_id,
        }
    }

    /// 卡号冲突后重新生成公开码和密钥
    pub fn regenerate_keys(&mut self, generator: &KeyGenerator) {
        let keys = generator.generate();
        self.public_code = keys.public_code;
        self.secret_code = keys.secret_code;
    }
}
