use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- Listing
/// 경매 상품 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub seller: Option<Profile>,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(rename = "_count", default)]
    pub count: Option<ListingCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingCount {
    #[serde(default)]
    pub bids: usize,
}

impl Listing {
    /// 종료 시각이 `now` 이후면 진행 중
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.ends_at > now
    }

    /// 최고 입찰가 (입찰이 없으면 0)
    pub fn highest_bid(&self) -> f64 {
        self.bids
            .iter()
            .map(|bid| bid.amount)
            .fold(0.0, f64::max)
    }

    /// 입찰 수. 입찰 목록이 포함되지 않은 응답이면 `_count` 값을 사용
    pub fn bid_count(&self) -> usize {
        if self.bids.is_empty() {
            self.count.as_ref().map(|c| c.bids).unwrap_or(0)
        } else {
            self.bids.len()
        }
    }

    pub fn seller_name(&self) -> Option<&str> {
        self.seller.as_ref().map(|s| s.name.as_str())
    }
}
// endregion: --- Listing

// region:    --- Bid
/// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub bidder: Option<Profile>,
    pub created: DateTime<Utc>,
}

/// 프로필 입찰 이력 (`_listings=true` 로 상품이 포함됨)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBid {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub bidder: Option<Profile>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub listing: Option<Listing>,
}
// endregion: --- Bid

// region:    --- Profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// 사용자 프로필 모델. 판매자/입찰자 참조에도 같은 타입을 쓴다
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
    #[serde(default)]
    pub credits: Option<i64>,
    #[serde(default)]
    pub listings: Option<Vec<Listing>>,
    #[serde(default)]
    pub wins: Option<Vec<Listing>>,
    #[serde(rename = "_count", default)]
    pub count: Option<ProfileCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileCount {
    #[serde(default)]
    pub listings: usize,
    #[serde(default)]
    pub wins: usize,
}

impl Profile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            bio: None,
            avatar: None,
            banner: None,
            credits: None,
            listings: None,
            wins: None,
            count: None,
        }
    }
}
// endregion: --- Profile

// region:    --- Auth
/// 로그인 응답 데이터
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub name: String,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
    #[serde(default)]
    pub credits: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
}
// endregion: --- Auth

// region:    --- Request Bodies
/// 상품 생성 요청 바디
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub media: Vec<Media>,
    pub ends_at: DateTime<Utc>,
}

/// 상품 수정 요청 바디. 변경된 필드만 직렬화된다
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.media.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    pub amount: f64,
}
// endregion: --- Request Bodies

// region:    --- Envelope
/// API 응답 공통 포맷 `{ data, meta }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// 페이지네이션 메타 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meta {
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub current_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub page_count: Option<u32>,
    pub total_count: Option<u32>,
}

/// 목록 조회 결과 한 페이지
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Meta,
}

/// 에러 응답 바디
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub errors: Vec<ErrorItem>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorItem {
    pub message: String,
}

impl ErrorBody {
    /// 서버가 보낸 첫 번째 에러 메시지
    pub fn first_message(&self) -> Option<String> {
        self.errors
            .iter()
            .map(|e| e.message.trim())
            .find(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| self.message.clone().filter(|m| !m.trim().is_empty()))
    }
}
// endregion: --- Envelope

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_decodes_api_shape() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Bike",
            "description": null,
            "media": [{ "url": "https://img.example/bike.jpg", "alt": "bike" }],
            "tags": [],
            "created": "2025-04-01T10:00:00.000Z",
            "updated": "2025-04-01T10:00:00.000Z",
            "endsAt": "2025-05-01T10:00:00.000Z",
            "bids": [
                { "id": "b1", "amount": 10, "bidder": { "name": "ola" }, "created": "2025-04-02T10:00:00.000Z" },
                { "id": "b2", "amount": 25, "bidder": { "name": "kari" }, "created": "2025-04-03T10:00:00.000Z" }
            ],
            "_count": { "bids": 2 }
        }))
        .unwrap();

        assert_eq!(listing.description, None);
        assert_eq!(listing.highest_bid(), 25.0);
        assert_eq!(listing.bid_count(), 2);
        assert_eq!(listing.media[0].alt, "bike");
    }

    #[test]
    fn bid_count_falls_back_to_server_count() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Lamp",
            "created": "2025-04-01T10:00:00Z",
            "endsAt": "2025-05-01T10:00:00Z",
            "_count": { "bids": 7 }
        }))
        .unwrap();

        assert_eq!(listing.bid_count(), 7);
        assert_eq!(listing.highest_bid(), 0.0);
    }

    #[test]
    fn error_body_prefers_errors_array() {
        let body: ErrorBody = serde_json::from_value(json!({
            "errors": [{ "message": "Your bid must be higher than the current bid" }],
            "message": "ignored",
            "statusCode": 400
        }))
        .unwrap();
        assert_eq!(
            body.first_message().as_deref(),
            Some("Your bid must be higher than the current bid")
        );

        let body: ErrorBody = serde_json::from_value(json!({ "message": "Profile already exists" })).unwrap();
        assert_eq!(body.first_message().as_deref(), Some("Profile already exists"));

        let body: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.first_message(), None);
    }

    #[test]
    fn listing_update_skips_unchanged_fields() {
        let update = ListingUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "title": "New title" })
        );
        assert!(ListingUpdate::default().is_empty());
    }
}
