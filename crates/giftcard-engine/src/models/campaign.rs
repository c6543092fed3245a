use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 礼品卡活动，标题全局唯一
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

/// 待创建的活动
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub title: String,
}

impl NewCampaign {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}
