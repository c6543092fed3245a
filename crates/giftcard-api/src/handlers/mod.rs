//! HTTP 请求处理器模块

pub mod campaign;
pub mod gift_card;
