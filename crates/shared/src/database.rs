//! 礼品卡库连接池
//!
//! 启动时建立连接池并执行工作区根目录 migrations/ 下的建表脚本，
//! 运行期为就绪探针提供连接池快照。

use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument, warn};

use crate::config::DatabaseConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// 就绪探针返回的连接池状态
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub reachable: bool,
    pub latency_ms: u64,
    pub size: u32,
    pub idle: usize,
}

impl Database {
    /// 建立连接池，至少成功建立一条连接才返回
    #[instrument(skip(config), fields(target = %redact_url(&config.url)))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "礼品卡库连接池已建立"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 执行一次 `SELECT 1` 并附带连接池占用情况
    pub async fn probe(&self) -> PoolStatus {
        let started = Instant::now();
        let reachable = match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "礼品卡库探活失败");
                false
            }
        };

        PoolStatus {
            reachable,
            latency_ms: started.elapsed().as_millis() as u64,
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    /// 建表与索引，已执行过的脚本会被跳过
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<()> {
        let migrator = sqlx::migrate!("../../migrations");
        migrator.run(&self.pool).await?;
        info!(migrations = migrator.iter().count(), "礼品卡表结构已就绪");
        Ok(())
    }

    /// 等待进行中的查询结束后关闭
    pub async fn close(&self) {
        self.pool.close().await;
        info!("礼品卡库连接池已关闭");
    }
}

/// 隐去连接串中的密码，用于日志
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    let user = userinfo.split(':').next().unwrap_or_default();
    format!("{scheme}://{user}:***@{host}")
}
