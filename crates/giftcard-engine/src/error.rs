//! 礼品卡服务错误类型
//!
//! 定义服务层的业务错误和系统错误，并按 NotFound / Conflict / InvalidInput / Upstream
//! 四类归档，供 API 层映射状态码。

use thiserror::Error;

/// 错误大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 礼品卡或活动不存在
    NotFound,
    /// 唯一键冲突、卡已被占用、活动标题重复
    Conflict,
    /// 入参未通过校验
    InvalidInput,
    /// 存储层或内部故障
    Upstream,
}

/// 礼品卡服务错误类型
#[derive(Debug, Error)]
pub enum GiftCardError {
    // === 礼品卡相关错误 ===
    #[error("礼品卡不存在: {0}")]
    GiftCardNotFound(String),

    #[error("该用户没有礼品卡: owner={0}")]
    NoGiftCardsForOwner(String),

    #[error("礼品卡已被其他用户占用: secret={0}")]
    CardAlreadyTaken(String),

    #[error("礼品卡已失效，无法修改: id={0}")]
    GiftCardNotValid(i64),

    #[error("过期日期必须晚于当前日期")]
    ExpireDateOutOfRange,

    // === 发行相关错误 ===
    #[error("礼品卡公开码或密钥重复")]
    DuplicateKey,

    #[error("密钥生成冲突次数超限: attempts={attempts}")]
    KeyExhaustion { attempts: u32 },

    // === 活动相关错误 ===
    #[error("活动不存在: {0}")]
    CampaignNotFound(i64),

    #[error("活动标题重复: {0}")]
    DuplicateCampaignTitle(String),

    #[error("无效的活动: campaign_id={0}")]
    InvalidCampaign(i64),

    // === 系统错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 礼品卡服务 Result 类型别名
pub type Result<T> = std::result::Result<T, GiftCardError>;

impl GiftCardError {
    /// 错误所属大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GiftCardNotFound(_) | Self::NoGiftCardsForOwner(_) | Self::CampaignNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::CardAlreadyTaken(_)
            | Self::DuplicateKey
            | Self::KeyExhaustion { .. }
            | Self::DuplicateCampaignTitle(_) => ErrorKind::Conflict,
            Self::GiftCardNotValid(_)
            | Self::ExpireDateOutOfRange
            | Self::InvalidCampaign(_)
            | Self::Validation(_) => ErrorKind::InvalidInput,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Upstream,
        }
    }

    /// 是否为公开码/密钥碰撞，发行流程仅在此情况下重新生成密钥重试
    pub fn is_key_conflict(&self) -> bool {
        matches!(self, Self::DuplicateKey)
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GiftCardNotFound(_) => "GIFT_CARD_NOT_FOUND",
            Self::NoGiftCardsForOwner(_) => "NO_GIFT_CARDS_FOR_OWNER",
            Self::CardAlreadyTaken(_) => "GIFT_CARD_TAKEN",
            Self::GiftCardNotValid(_) => "GIFT_CARD_NOT_VALID",
            Self::ExpireDateOutOfRange => "EXPIRE_DATE_OUT_OF_RANGE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::KeyExhaustion { .. } => "KEY_EXHAUSTION",
            Self::CampaignNotFound(_) => "CAMPAIGN_NOT_FOUND",
            Self::DuplicateCampaignTitle(_) => "DUPLICATE_CAMPAIGN_TITLE",
            Self::InvalidCampaign(_) => "INVALID_CAMPAIGN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
