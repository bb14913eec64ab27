/// 입찰 관련 커맨드 처리
/// 1. 입찰 금액 검증 (로컬, 네트워크 요청 없음)
/// 2. 입찰 요청 후 목록 전체 다시 로드
// region:    --- Imports
use crate::api::AuctionApi;
use crate::error::AppError;
use crate::events::{AppEvent, EventBus};
use crate::listings::ListingCollection;
use crate::profile;
use crate::session::SessionStore;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: String,
    pub raw_amount: String,
}

impl PlaceBidCommand {
    pub fn new(listing_id: impl Into<String>, raw_amount: impl Into<String>) -> Self {
        Self {
            listing_id: listing_id.into(),
            raw_amount: raw_amount.into(),
        }
    }
}

/// 입찰 결과
#[derive(Debug, Clone, PartialEq)]
pub struct BidReceipt {
    pub listing_id: String,
    pub amount: f64,
    /// 다시 로드한 목록 기준 최고 입찰가. 재로드 실패 시 None
    pub highest_bid: Option<f64>,
}

/// 입찰 금액 파싱. 양의 유한한 숫자만 허용
pub fn parse_bid_amount(raw: &str) -> Result<f64, AppError> {
    let invalid = || AppError::invalid("amount", "Please enter a valid bid amount.");
    let amount: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid());
    }
    Ok(amount)
}

/// 1. 입찰
/// 성공하면 목록을 다시 로드해서 서버가 계산한 최고 입찰가를 반영한다
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    collection: &mut ListingCollection,
) -> Result<BidReceipt, AppError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    let listing_id = cmd.listing_id.trim();
    if listing_id.is_empty() {
        return Err(AppError::invalid("listingId", "No listing ID provided."));
    }

    // 로컬 검증
    let amount = parse_bid_amount(&cmd.raw_amount)?;
    let token = sessions.token().ok_or(AppError::NotAuthenticated)?;

    api.place_bid(&token, listing_id, amount).await?;
    info!(
        "{:<12} --> 입찰 성공: listing={}, amount={}",
        "Command", listing_id, amount
    );
    events.publish(AppEvent::BidPlaced {
        listing_id: listing_id.to_string(),
        amount,
    });

    // 입찰은 이미 성공했으므로 재로드 실패는 로그만 남긴다
    let highest_bid = match collection.load(api, Some(&token)).await {
        Ok(()) => collection.get(listing_id).map(|l| l.highest_bid()),
        Err(e) => {
            warn!("{:<12} --> 입찰 후 목록 재로드 실패: {}", "Command", e);
            None
        }
    };

    if let Err(e) = profile::refresh_credits(api, sessions).await {
        warn!("{:<12} --> 크레딧 갱신 실패: {}", "Command", e);
    }

    Ok(BidReceipt {
        listing_id: listing_id.to_string(),
        amount,
        highest_bid,
    })
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_amounts() {
        assert_eq!(parse_bid_amount("50").unwrap(), 50.0);
        assert_eq!(parse_bid_amount(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        for raw in ["0", "-5", "abc", "", "   ", "NaN", "inf", "1e400"] {
            let err = parse_bid_amount(raw).unwrap_err();
            assert!(
                matches!(err, AppError::Validation(_)),
                "{} should be rejected",
                raw
            );
            assert_eq!(err.to_string(), "Please enter a valid bid amount.");
        }
    }
}
