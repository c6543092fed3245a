//! 活动管理 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use giftcard_engine::Campaign;

use crate::{
    dto::{ApiResponse, CampaignQuery, CampaignRequest, PageResponse},
    error::Result,
    state::AppState,
};

/// 创建活动
///
/// POST /api/v1/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(req): Json<CampaignRequest>,
) -> Result<Json<ApiResponse<Campaign>>> {
    req.validate()?;
    let campaign = state.campaigns.create(&req.title).await?;
    Ok(Json(ApiResponse::success(campaign)))
}

/// 分页查询活动
///
/// GET /api/v1/campaigns
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<ApiResponse<PageResponse<Campaign>>>> {
    let search = query.search.clone().filter(|s| !s.trim().is_empty());
    let page = state
        .campaigns
        .find_page(query.page_request(), search)
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

/// 修改活动标题
///
/// PUT /api/v1/campaigns/{id}
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CampaignRequest>,
) -> Result<Json<ApiResponse<Campaign>>> {
    req.validate()?;
    let campaign = state.campaigns.update(id, &req.title).await?;
    Ok(Json(ApiResponse::success(campaign)))
}

/// 删除活动
///
/// DELETE /api/v1/campaigns/{id}
pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.campaigns.delete(id).await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}
