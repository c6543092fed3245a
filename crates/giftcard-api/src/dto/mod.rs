//! 数据传输对象

mod request;
mod response;

pub use request::{
    ApproveGiftCardsRequest, BatchCreateGiftCardRequest, BatchSameGiftCardRequest,
    CampaignQuery, CampaignRequest, CreateGiftCardRequest, GiftCardQuery, UpdateGiftCardRequest,
    ValidateGiftCardsRequest, normalize_checked_secret,
};
pub use response::{ApiResponse, BatchIssueResponse, PageResponse};
