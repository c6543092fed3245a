//! 数据库仓储层
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 进行数据库操作，Postgres 错误在此归类为领域错误
//! - 定义 trait 接口以支持 mock 测试

mod campaign_repo;
mod gift_card_repo;
mod traits;

pub use campaign_repo::CampaignRepository;
pub use gift_card_repo::GiftCardRepository;
pub use traits::*;
