//! 路由配置模块

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{handlers, state::AppState};

/// 礼品卡路由
fn gift_card_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/gift-cards",
            get(handlers::gift_card::list_gift_cards).post(handlers::gift_card::create_gift_card),
        )
        .route(
            "/gift-cards/{id}",
            get(handlers::gift_card::get_gift_card)
                .put(handlers::gift_card::update_gift_card)
                .delete(handlers::gift_card::delete_gift_card),
        )
        .route(
            "/gift-cards/batch",
            post(handlers::gift_card::batch_create_gift_cards),
        )
        .route(
            "/gift-cards/batch-same",
            post(handlers::gift_card::batch_create_same_gift_cards),
        )
        .route(
            "/gift-cards/public/{code}",
            get(handlers::gift_card::get_by_public_code),
        )
        // 校验与核销
        .route(
            "/gift-cards/validate",
            post(handlers::gift_card::validate_gift_cards),
        )
        .route(
            "/gift-cards/validate/{secret}",
            get(handlers::gift_card::validate_gift_card),
        )
        .route(
            "/gift-cards/approve",
            post(handlers::gift_card::approve_gift_cards),
        )
        .route(
            "/gift-cards/approve/{owner}/{secret}",
            put(handlers::gift_card::approve_gift_card),
        )
        .route(
            "/owners/{owner}/gift-cards",
            get(handlers::gift_card::list_owner_gift_cards),
        )
}

/// 活动路由
fn campaign_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/campaigns",
            get(handlers::campaign::list_campaigns).post(handlers::campaign::create_campaign),
        )
        .route(
            "/campaigns/{id}",
            put(handlers::campaign::update_campaign).delete(handlers::campaign::delete_campaign),
        )
}

/// 汇总所有 API 路由，挂载在 /api/v1 下
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(gift_card_routes())
        .merge(campaign_routes())
}
