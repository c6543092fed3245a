//! 礼品卡枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 礼品卡状态
///
/// 核销只有一次：Empty -> Approved；批量核销失败时补偿回滚 Approved -> Empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum GiftCardStatus {
    /// 未核销
    #[default]
    Empty,
    /// 已核销（已绑定用户）
    Approved,
}
