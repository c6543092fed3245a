//! 核销流程测试：先到先得、批量全有或全无、补偿回滚

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{InMemoryGiftCardRepository, services};
use giftcard_engine::{GiftCardError, GiftCardStatus};

fn secrets(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

async fn assert_unowned(repo: &InMemoryGiftCardRepository, secret: &str) {
    let card = repo.get(secret).await.unwrap();
    assert_eq!(card.owner, "", "{secret} should be unowned");
    assert_eq!(card.status, GiftCardStatus::Empty);
}

#[tokio::test]
async fn test_approve_one_assigns_owner() {
    let s = services(InMemoryGiftCardRepository::new());
    s.repo.seed("CARDA00000000001", "").await;

    let status = s
        .approval
        .approve_one("u1", "carda00000000001")
        .await
        .unwrap();
    assert!(status.is_valid);
    assert_eq!(status.owner.as_deref(), Some("u1"));

    let stored = s.repo.get("CARDA00000000001").await.unwrap();
    assert_eq!(stored.owner, "u1");
    assert_eq!(stored.status, GiftCardStatus::Approved);
}

#[tokio::test]
async fn test_approve_one_first_assignment_wins() {
    let s = services(InMemoryGiftCardRepository::new());
    s.repo.seed("CARDA00000000001", "").await;

    s.approval
        .approve_one("u1", "CARDA00000000001")
        .await
        .unwrap();
    let err = s
        .approval
        .approve_one("u2", "CARDA00000000001")
        .await
        .unwrap_err();
    assert!(matches!(err, GiftCardError::CardAlreadyTaken(_)));
    assert_eq!(s.repo.get("CARDA00000000001").await.unwrap().owner, "u1");
}

#[tokio::test]
async fn test_concurrent_approvals_of_one_card() {
    let s = Arc::new(services(InMemoryGiftCardRepository::new()));
    s.repo.seed("CARDA00000000001", "").await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let s = Arc::clone(&s);
            tokio::spawn(async move {
                s.approval
                    .approve_one(&format!("user{i}"), "CARDA00000000001")
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert!(matches!(e, GiftCardError::CardAlreadyTaken(_))),
        }
    }
    assert_eq!(succeeded, 1);
}

#[tokio::test]
async fn test_approve_one_missing_card() {
    let s = services(InMemoryGiftCardRepository::new());
    let err = s
        .approval
        .approve_one("u1", "NOSUCHCARD000001")
        .await
        .unwrap_err();
    assert!(matches!(err, GiftCardError::GiftCardNotFound(_)));
}

#[tokio::test]
async fn test_approve_many_all_succeed() {
    let s = services(InMemoryGiftCardRepository::new());
    for secret in ["CARDA00000000001", "CARDB00000000001", "CARDC00000000001"] {
        s.repo.seed(secret, "").await;
    }

    let statuses = s
        .approval
        .approve_many(
            "u1",
            secrets(&["CARDA00000000001", "CARDB00000000001", "CARDC00000000001"]),
        )
        .await
        .unwrap();

    assert_eq!(statuses.len(), 3);
    assert!(statuses.iter().all(|s| s.owner.as_deref() == Some("u1")));
    assert_eq!(s.gift_cards.find_by_owner("u1").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_approve_many_is_all_or_nothing() {
    for n in [2usize, 3, 8] {
        for failing in 1..n {
            let s = services(InMemoryGiftCardRepository::new());
            let batch: Vec<String> = (0..n).map(|i| format!("CARD{i:012}")).collect();
            for (i, secret) in batch.iter().enumerate() {
                let owner = if i == failing { "someone" } else { "" };
                s.repo.seed(secret, owner).await;
            }

            let err = s
                .approval
                .approve_many("u1", batch.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, GiftCardError::CardAlreadyTaken(_)));

            for (i, secret) in batch.iter().enumerate() {
                if i == failing {
                    assert_eq!(s.repo.get(secret).await.unwrap().owner, "someone");
                } else {
                    assert_unowned(&s.repo, secret).await;
                }
            }
        }
    }
}

#[tokio::test]
async fn test_taken_card_rolls_back_other_member() {
    let s = services(InMemoryGiftCardRepository::new());
    s.repo.seed("A000000000000000", "other").await;
    s.repo.seed("B000000000000000", "").await;

    let err = s
        .approval
        .approve_many("u1", secrets(&["A000000000000000", "B000000000000000"]))
        .await
        .unwrap_err();

    assert!(matches!(err, GiftCardError::CardAlreadyTaken(_)));
    assert_unowned(&s.repo, "B000000000000000").await;
    assert_eq!(s.repo.get("A000000000000000").await.unwrap().owner, "other");
}

#[tokio::test]
async fn test_late_success_is_still_compensated() {
    let repo = InMemoryGiftCardRepository::new()
        .with_commit_delay("SLOW000000000001", Duration::from_millis(200));
    let s = services(repo);
    s.repo.seed("TAKEN00000000001", "other").await;
    s.repo.seed("SLOW000000000001", "").await;
    s.repo.seed("FAST000000000001", "").await;

    let err = s
        .approval
        .approve_many(
            "u1",
            secrets(&["TAKEN00000000001", "SLOW000000000001", "FAST000000000001"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GiftCardError::CardAlreadyTaken(_)));
    assert_unowned(&s.repo, "SLOW000000000001").await;
    assert_unowned(&s.repo, "FAST000000000001").await;
}

#[tokio::test]
async fn test_persistence_failure_triggers_compensation() {
    let repo = InMemoryGiftCardRepository::new().with_failing_commit("BROKEN0000000001");
    let s = services(repo);
    s.repo.seed("BROKEN0000000001", "").await;
    s.repo.seed("GOOD000000000001", "").await;

    let err = s
        .approval
        .approve_many("u1", secrets(&["BROKEN0000000001", "GOOD000000000001"]))
        .await
        .unwrap_err();

    assert!(matches!(err, GiftCardError::Database(_)));
    assert_unowned(&s.repo, "GOOD000000000001").await;
    assert_unowned(&s.repo, "BROKEN0000000001").await;
}

#[tokio::test]
async fn test_missing_card_fails_batch() {
    let s = services(InMemoryGiftCardRepository::new());
    s.repo.seed("GOOD000000000001", "").await;

    let err = s
        .approval
        .approve_many("u1", secrets(&["GOOD000000000001", "NOSUCHCARD000001"]))
        .await
        .unwrap_err();

    assert!(matches!(err, GiftCardError::GiftCardNotFound(_)));
    assert_unowned(&s.repo, "GOOD000000000001").await;
}

#[tokio::test]
async fn test_compensation_failure_keeps_batch_error() {
    let repo = InMemoryGiftCardRepository::new().with_failing_release("STUCK00000000001");
    let s = services(repo);
    s.repo.seed("TAKEN00000000001", "other").await;
    s.repo.seed("STUCK00000000001", "").await;
    s.repo.seed("GOOD000000000001", "").await;

    let err = s
        .approval
        .approve_many(
            "u1",
            secrets(&["TAKEN00000000001", "STUCK00000000001", "GOOD000000000001"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GiftCardError::CardAlreadyTaken(_)));
    assert_unowned(&s.repo, "GOOD000000000001").await;
    // 回滚失败的卡保持已核销，只记录日志
    assert_eq!(s.repo.get("STUCK00000000001").await.unwrap().owner, "u1");
}

#[tokio::test]
async fn test_duplicate_secret_in_batch_rolls_back() {
    let s = services(InMemoryGiftCardRepository::new());
    s.repo.seed("CARDA00000000001", "").await;

    let err = s
        .approval
        .approve_many("u1", secrets(&["CARDA00000000001", "carda00000000001"]))
        .await
        .unwrap_err();

    assert!(matches!(err, GiftCardError::CardAlreadyTaken(_)));
    assert_unowned(&s.repo, "CARDA00000000001").await;
}

#[tokio::test]
async fn test_roll_back_is_idempotent() {
    let s = services(InMemoryGiftCardRepository::new());
    s.repo.seed("CARDA00000000001", "").await;
    let before = s.repo.get("CARDA00000000001").await.unwrap();

    s.approval.roll_back("CARDA00000000001").await.unwrap();
    s.approval.roll_back("CARDA00000000001").await.unwrap();

    let after = s.repo.get("CARDA00000000001").await.unwrap();
    assert_eq!(after.owner, before.owner);
    assert_eq!(after.status, before.status);
    assert_eq!(after.secret_code, before.secret_code);
}
