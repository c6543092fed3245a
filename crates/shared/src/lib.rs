//! 共享库
//!
//! 包含礼品卡服务共用的配置加载、数据库连接、错误类型与可观测性基础设施。

pub mod config;
pub mod database;
pub mod error;
pub mod observability;
