//! 礼品卡核心引擎
//!
//! 提供礼品卡的发行、校验、核销以及活动管理。
//!
//! ## 核心功能
//!
//! - **发行**：生成公开码/密钥并落库，卡号冲突时重新生成重试；支持批量发行，部分失败不回滚
//! - **校验**：按密钥只读查询有效性，支持批量
//! - **核销**：把卡绑定到用户，先到先得；批量核销全有或全无，失败时补偿回滚
//! - **维护**：按 ID / 公开码 / 用户查询，修改、删除和分页检索
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `keygen`: 卡号生成器
//! - `repository`: 数据库仓储层
//! - `service`: 业务服务层

pub mod error;
pub mod keygen;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{ErrorKind, GiftCardError, Result};
pub use keygen::{KeyGenerator, KeyPair, PUBLIC_CODE_LENGTH, SECRET_CODE_LENGTH};
pub use models::*;
pub use repository::{
    CampaignRepository, CampaignRepositoryTrait, GiftCardRepository, GiftCardRepositoryTrait,
};
pub use service::{
    ApprovalService, CampaignService, GiftCardService, IssuanceService, ValidationService, dto,
};
