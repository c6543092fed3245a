//! 测试共享的内存仓储
//!
//! 行为与 Postgres 实现一致：公开码/密钥唯一、活动外键、核销与改卡的条件写入。
//! 支持注入冲突、写入失败和延迟，用于覆盖并发与补偿路径。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::RwLock;

use giftcard_engine::{
    ApprovalService, GiftCard, GiftCardError, GiftCardPageFilter, GiftCardRepositoryTrait,
    GiftCardService, GiftCardStatus, IssuanceService, KeyGenerator, NewGiftCard, Result,
    ValidationService,
};

pub const CAMPAIGN_ID: i64 = 1;

#[derive(Default)]
pub struct InMemoryGiftCardRepository {
    cards: RwLock<HashMap<i64, GiftCard>>,
    next_id: AtomicI64,
    campaigns: HashSet<i64>,

    create_attempts: AtomicUsize,
    /// 修改与撤销核销的写入次数
    write_calls: AtomicUsize,
    /// 前 N 次 create 返回卡号冲突
    conflicts_remaining: AtomicUsize,
    /// 这些面额的 create 一律返回存储错误
    failing_amounts: HashSet<i32>,
    /// 这些密钥的 release_owner 一律返回存储错误（用于回滚失败）
    failing_releases: HashSet<String>,
    /// 这些密钥的 commit_approval 一律返回存储错误
    failing_commits: HashSet<String>,
    /// 核销落库前等待的时间
    commit_delays: HashMap<String, Duration>,
    /// 修改落库前等待的时间
    update_delay: Option<Duration>,
}

impl InMemoryGiftCardRepository {
    pub fn new() -> Self {
        Self {
            campaigns: HashSet::from([CAMPAIGN_ID]),
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn with_conflicts(self, count: usize) -> Self {
        self.conflicts_remaining.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_failing_amount(mut self, amount: i32) -> Self {
        self.failing_amounts.insert(amount);
        self
    }

    pub fn with_failing_release(mut self, secret: &str) -> Self {
        self.failing_releases.insert(secret.to_string());
        self
    }

    pub fn with_failing_commit(mut self, secret: &str) -> Self {
        self.failing_commits.insert(secret.to_string());
        self
    }

    pub fn with_commit_delay(mut self, secret: &str, delay: Duration) -> Self {
        self.commit_delays.insert(secret.to_string(), delay);
        self
    }

    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    /// 直接写入一张卡，返回其 ID
    pub async fn seed(&self, secret: &str, owner: &str) -> i64 {
        self.seed_with_expiry(secret, owner, Utc::now() + ChronoDuration::days(30))
            .await
    }

    pub async fn seed_with_expiry(
        &self,
        secret: &str,
        owner: &str,
        expire_date: chrono::DateTime<Utc>,
    ) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let card = GiftCard {
            id,
            amount: 2000,
            public_code: format!("{id:012}"),
            secret_code: secret.to_string(),
            owner: owner.to_string(),
            expire_date,
            status: if owner.is_empty() {
                GiftCardStatus::Empty
            } else {
                GiftCardStatus::Approved
            },
            campaign_id: CAMPAIGN_ID,
            campaign_title: Some("spring".to_string()),
            created_at: now,
            updated_at: now,
        };
        self.cards.write().await.insert(id, card);
        id
    }

    pub async fn get(&self, secret: &str) -> Option<GiftCard> {
        self.cards
            .read()
            .await
            .values()
            .find(|c| c.secret_code == secret)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.cards.read().await.len()
    }

    pub async fn snapshot(&self) -> Vec<GiftCard> {
        let mut cards: Vec<_> = self.cards.read().await.values().cloned().collect();
        cards.sort_by_key(|c| c.id);
        cards
    }

    pub fn create_attempts(&self) -> usize {
        self.create_attempts.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

fn storage_error() -> GiftCardError {
    GiftCardError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl GiftCardRepositoryTrait for InMemoryGiftCardRepository {
    async fn create(&self, card: &NewGiftCard) -> Result<GiftCard> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);

        if self
            .conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(GiftCardError::DuplicateKey);
        }
        if self.failing_amounts.contains(&card.amount) {
            return Err(storage_error());
        }
        if !self.campaigns.contains(&card.campaign_id) {
            return Err(GiftCardError::InvalidCampaign(card.campaign_id));
        }

        let mut cards = self.cards.write().await;
        if cards
            .values()
            .any(|c| c.public_code == card.public_code || c.secret_code == card.secret_code)
        {
            return Err(GiftCardError::DuplicateKey);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let created = GiftCard {
            id,
            amount: card.amount,
            public_code: card.public_code.clone(),
            secret_code: card.secret_code.clone(),
            owner: String::new(),
            expire_date: card.expire_date,
            status: GiftCardStatus::Empty,
            campaign_id: card.campaign_id,
            campaign_title: Some("spring".to_string()),
            created_at: now,
            updated_at: now,
        };
        cards.insert(id, created.clone());
        Ok(created)
    }

    async fn update_details(&self, card: &GiftCard) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }

        let mut cards = self.cards.write().await;
        let stored = cards
            .get_mut(&card.id)
            .ok_or_else(|| GiftCardError::GiftCardNotFound(card.id.to_string()))?;
        if !stored.owner.is_empty() || stored.status != GiftCardStatus::Empty {
            return Err(GiftCardError::GiftCardNotValid(card.id));
        }
        stored.amount = card.amount;
        stored.expire_date = card.expire_date;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn release_owner(&self, card: &GiftCard) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_releases.contains(&card.secret_code) {
            return Err(storage_error());
        }

        let mut cards = self.cards.write().await;
        let stored = cards
            .get_mut(&card.id)
            .ok_or_else(|| GiftCardError::GiftCardNotFound(card.secret_code.clone()))?;
        stored.owner.clear();
        stored.status = GiftCardStatus::Empty;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn commit_approval(&self, card: &GiftCard) -> Result<()> {
        if let Some(delay) = self.commit_delays.get(&card.secret_code) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_commits.contains(&card.secret_code) {
            return Err(storage_error());
        }

        let mut cards = self.cards.write().await;
        let stored = cards
            .get_mut(&card.id)
            .ok_or_else(|| GiftCardError::GiftCardNotFound(card.secret_code.clone()))?;
        if !stored.owner.is_empty() {
            return Err(GiftCardError::CardAlreadyTaken(card.secret_code.clone()));
        }
        stored.owner = card.owner.clone();
        stored.status = card.status;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GiftCard>> {
        Ok(self.cards.read().await.get(&id).cloned())
    }

    async fn find_by_secret_code(&self, secret_code: &str) -> Result<Option<GiftCard>> {
        Ok(self.get(secret_code).await)
    }

    async fn find_by_public_code(&self, public_code: &str) -> Result<Option<GiftCard>> {
        Ok(self
            .cards
            .read()
            .await
            .values()
            .find(|c| c.public_code == public_code)
            .cloned())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<GiftCard>> {
        Ok(self
            .snapshot()
            .await
            .into_iter()
            .filter(|c| c.owner == owner)
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.cards
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| GiftCardError::GiftCardNotFound(id.to_string()))
    }

    async fn find_page(&self, filter: &GiftCardPageFilter) -> Result<(Vec<GiftCard>, i64)> {
        let mut matched: Vec<GiftCard> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|c| {
                filter
                    .search
                    .as_ref()
                    .is_none_or(|s| c.public_code.contains(s.as_str()))
            })
            .filter(|c| filter.campaign_id.is_none_or(|id| c.campaign_id == id))
            .filter(|c| filter.is_valid.is_none_or(|valid| c.is_valid() == valid))
            .filter(|c| filter.expire_date_from.is_none_or(|from| c.expire_date > from))
            .filter(|c| filter.expire_date_to.is_none_or(|to| c.expire_date < to))
            .collect();
        matched.sort_by_key(|c| std::cmp::Reverse(c.id));

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit() as usize)
            .collect();
        Ok((items, total))
    }
}

pub struct Services {
    pub repo: Arc<InMemoryGiftCardRepository>,
    pub issuance: IssuanceService<InMemoryGiftCardRepository>,
    pub validation: ValidationService<InMemoryGiftCardRepository>,
    pub approval: ApprovalService<InMemoryGiftCardRepository>,
    pub gift_cards: GiftCardService<InMemoryGiftCardRepository>,
}

pub fn services(repo: InMemoryGiftCardRepository) -> Services {
    services_with_attempts(repo, 10)
}

pub fn services_with_attempts(repo: InMemoryGiftCardRepository, max_key_attempts: u32) -> Services {
    let repo = Arc::new(repo);
    let issuance = IssuanceService::new(
        Arc::clone(&repo),
        Arc::new(KeyGenerator::new()),
        max_key_attempts,
    );
    Services {
        validation: ValidationService::new(Arc::clone(&repo)),
        approval: ApprovalService::new(Arc::clone(&repo)),
        gift_cards: GiftCardService::new(Arc::clone(&repo), issuance.clone()),
        issuance,
        repo,
    }
}
