//! 礼品卡 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;
use validator::Validate;

use giftcard_engine::dto::{GiftCardDto, GiftCardStatusDto};

use crate::{
    dto::{
        ApiResponse, ApproveGiftCardsRequest, BatchCreateGiftCardRequest, BatchIssueResponse,
        BatchSameGiftCardRequest, CreateGiftCardRequest, GiftCardQuery, PageResponse,
        UpdateGiftCardRequest, ValidateGiftCardsRequest, normalize_checked_secret,
    },
    error::{ApiError, Result},
    state::AppState,
};

/// 获取礼品卡详情
///
/// GET /api/v1/gift-cards/{id}
pub async fn get_gift_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<GiftCardDto>>> {
    let card = state.gift_cards.find_by_id(id).await?;
    Ok(Json(ApiResponse::success(card)))
}

/// 发行单张礼品卡
///
/// POST /api/v1/gift-cards
pub async fn create_gift_card(
    State(state): State<AppState>,
    Json(req): Json<CreateGiftCardRequest>,
) -> Result<Json<ApiResponse<GiftCardDto>>> {
    req.validate()?;
    let card = state.gift_cards.create(req.to_command()?).await?;

    info!(card_id = card.id, campaign_id = card.campaign_id, "Gift card issued");
    Ok(Json(ApiResponse::success(card)))
}

/// 修改礼品卡面额和过期日期
///
/// PUT /api/v1/gift-cards/{id}
pub async fn update_gift_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateGiftCardRequest>,
) -> Result<Json<ApiResponse<GiftCardDto>>> {
    req.validate()?;
    let card = state
        .gift_cards
        .update(id, req.amount, req.expire_date()?)
        .await?;
    Ok(Json(ApiResponse::success(card)))
}

/// 删除礼品卡
///
/// DELETE /api/v1/gift-cards/{id}
pub async fn delete_gift_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    state.gift_cards.delete(id).await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 分页查询礼品卡
///
/// GET /api/v1/gift-cards
pub async fn list_gift_cards(
    State(state): State<AppState>,
    Query(query): Query<GiftCardQuery>,
) -> Result<Json<ApiResponse<PageResponse<GiftCardDto>>>> {
    let page = state.gift_cards.find_page(query.to_filter()?).await?;
    Ok(Json(ApiResponse::success(page.into())))
}

/// 按参数列表批量发行
///
/// POST /api/v1/gift-cards/batch
///
/// 部分失败时返回 200，`success=false` 并携带已发行的卡
pub async fn batch_create_gift_cards(
    State(state): State<AppState>,
    Json(req): Json<BatchCreateGiftCardRequest>,
) -> Result<Json<ApiResponse<BatchIssueResponse>>> {
    req.validate()?;
    let commands = req.to_commands(state.max_batch_size)?;
    let outcome = state.issuance.issue_many_distinct(commands).await;
    Ok(Json(BatchIssueResponse::into_api_response(outcome)))
}

/// 相同参数批量发行
///
/// POST /api/v1/gift-cards/batch-same
pub async fn batch_create_same_gift_cards(
    State(state): State<AppState>,
    Json(req): Json<BatchSameGiftCardRequest>,
) -> Result<Json<ApiResponse<BatchIssueResponse>>> {
    req.validate()?;
    let command = req.to_command(state.max_batch_size)?;
    let outcome = state.issuance.issue_many_same(command, req.count).await;
    Ok(Json(BatchIssueResponse::into_api_response(outcome)))
}

/// 按公开码查询
///
/// GET /api/v1/gift-cards/public/{code}
pub async fn get_by_public_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<GiftCardStatusDto>>> {
    let status = state.gift_cards.find_by_public_code(code.trim()).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// 校验单张卡
///
/// GET /api/v1/gift-cards/validate/{secret}
pub async fn validate_gift_card(
    State(state): State<AppState>,
    Path(secret): Path<String>,
) -> Result<Json<ApiResponse<GiftCardStatusDto>>> {
    let secret = normalize_checked_secret(&secret)?;
    let status = state.validation.validate_one(&secret).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// 批量校验
///
/// POST /api/v1/gift-cards/validate
pub async fn validate_gift_cards(
    State(state): State<AppState>,
    Json(req): Json<ValidateGiftCardsRequest>,
) -> Result<Json<ApiResponse<Vec<GiftCardStatusDto>>>> {
    req.validate()?;
    let secrets = req.normalized_secrets(state.max_batch_size)?;
    let statuses = state.validation.validate_many(secrets).await;
    Ok(Json(ApiResponse::success(statuses)))
}

/// 核销单张卡
///
/// PUT /api/v1/gift-cards/approve/{owner}/{secret}
pub async fn approve_gift_card(
    State(state): State<AppState>,
    Path((owner, secret)): Path<(String, String)>,
) -> Result<Json<ApiResponse<GiftCardStatusDto>>> {
    let owner = checked_owner(&owner)?;
    let secret = normalize_checked_secret(&secret)?;
    let status = state.approval.approve_one(owner, &secret).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// 批量核销，全部成功或全部回滚
///
/// POST /api/v1/gift-cards/approve
pub async fn approve_gift_cards(
    State(state): State<AppState>,
    Json(req): Json<ApproveGiftCardsRequest>,
) -> Result<Json<ApiResponse<Vec<GiftCardStatusDto>>>> {
    req.validate()?;
    let owner = checked_owner(&req.owner)?;
    let secrets = req.normalized_secrets(state.max_batch_size)?;
    let statuses = state.approval.approve_many(owner, secrets).await?;

    info!(owner = %owner, approved = statuses.len(), "Gift cards approved");
    Ok(Json(ApiResponse::success(statuses)))
}

/// 查询用户名下的礼品卡
///
/// GET /api/v1/owners/{owner}/gift-cards
pub async fn list_owner_gift_cards(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<ApiResponse<Vec<GiftCardDto>>>> {
    let cards = state.gift_cards.find_by_owner(checked_owner(&owner)?).await?;
    Ok(Json(ApiResponse::success(cards)))
}

fn checked_owner(owner: &str) -> Result<&str> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(ApiError::Validation("用户标识不能为空".to_string()));
    }
    Ok(owner)
}
