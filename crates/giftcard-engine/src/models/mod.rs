//! 礼品卡领域模型
//!
//! - `enums`: 状态枚举
//! - `gift_card`: 礼品卡实体及其状态迁移
//! - `campaign`: 活动实体
//! - `page`: 分页参数与查询条件

mod campaign;
mod enums;
mod gift_card;
mod page;

pub use campaign::{Campaign, NewCampaign};
pub use enums::GiftCardStatus;
pub use gift_card::{
    GiftCard, NewGiftCard, VALIDITY_GRACE_DAYS, parse_expire_date, parse_expire_date_at,
};
pub use page::{GiftCardPageFilter, MAX_PAGE_SIZE, Page, PageRequest};
