//! 基础设施错误类型
//!
//! 配置加载、数据库连接与迁移等启动期错误。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, InfraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = InfraError::from(config::ConfigError::NotFound("database.url".to_string()));
        assert!(err.to_string().contains("database.url"));
    }
}
