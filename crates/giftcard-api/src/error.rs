//! HTTP 层错误类型定义
//!
//! 把引擎错误映射为状态码和统一响应体

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use giftcard_engine::{ErrorKind, GiftCardError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error(transparent)]
    Engine(#[from] GiftCardError),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    ///
    /// 卡已被占用按请求错误处理（400），其余冲突为 409
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Engine(GiftCardError::CardAlreadyTaken(_)) => StatusCode::BAD_REQUEST,
            Self::Engine(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Engine(e) => e.error_code(),
        }
    }

    /// 对外展示的错误信息，系统级错误只返回通用提示
    pub fn public_message(&self) -> String {
        match self {
            Self::Engine(e @ (GiftCardError::Database(_) | GiftCardError::Internal(_))) => {
                tracing::error!(error = %e, "服务内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": self.public_message(),
            "data": serde_json::Value::Null
        });

        (self.status_code(), axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
