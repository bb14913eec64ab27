/// 경매 REST API 게이트웨이
/// 원격 작업마다 함수 하나. 재시도/백오프 없이 한 번만 요청하고 실패는 그대로 돌려준다.
// region:    --- Imports
use crate::config::Config;
use crate::error::{ApiError, GENERIC_FAILURE};
use crate::model::{
    AuthData, BidRequest, Envelope, ErrorBody, Listing, ListingUpdate, LoginRequest, NewListing,
    Page, Profile, ProfileBid, ProfileUpdate, RegisterRequest,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

// endregion: --- Imports

pub mod endpoints;

// region:    --- Listings Query
/// 정렬 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// 상품 목록 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingsQuery {
    pub bids: bool,
    pub seller: bool,
    pub active: Option<bool>,
    pub sort: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ListingsQuery {
    /// 입찰/판매자 정보를 포함한 전체 목록 조회
    pub fn with_bids() -> Self {
        Self {
            bids: true,
            seller: true,
            ..Default::default()
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.bids {
            pairs.push(("_bids", "true".to_string()));
        }
        if self.seller {
            pairs.push(("_seller", "true".to_string()));
        }
        if let Some(active) = self.active {
            pairs.push(("_active", active.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder", order.as_str().to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}
// endregion: --- Listings Query

// region:    --- Auction Api Trait
/// 경매 API 트레이트
#[async_trait]
pub trait AuctionApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthData, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<Profile, ApiError>;

    async fn list_listings(&self, query: &ListingsQuery) -> Result<Page<Listing>, ApiError>;

    async fn get_listing(&self, id: &str) -> Result<Listing, ApiError>;

    async fn create_listing(&self, token: &str, listing: &NewListing)
        -> Result<Listing, ApiError>;

    async fn update_listing(
        &self,
        token: &str,
        id: &str,
        update: &ListingUpdate,
    ) -> Result<Listing, ApiError>;

    async fn delete_listing(&self, token: &str, id: &str) -> Result<(), ApiError>;

    async fn place_bid(&self, token: &str, id: &str, amount: f64) -> Result<(), ApiError>;

    async fn list_profiles(&self, token: &str) -> Result<Vec<Profile>, ApiError>;

    async fn search_profiles(&self, token: &str, query: &str) -> Result<Vec<Profile>, ApiError>;

    async fn get_profile(&self, token: &str, name: &str) -> Result<Profile, ApiError>;

    async fn update_profile(
        &self,
        token: &str,
        name: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, ApiError>;

    async fn profile_listings(&self, token: &str, name: &str) -> Result<Vec<Listing>, ApiError>;

    async fn profile_bids(&self, token: &str, name: &str) -> Result<Vec<ProfileBid>, ApiError>;

    async fn profile_wins(&self, token: &str, name: &str) -> Result<Vec<Listing>, ApiError>;
}
// endregion: --- Auction Api Trait

// region:    --- Noroff Client
/// reqwest 기반 API 클라이언트
#[derive(Clone)]
pub struct NoroffClient {
    base_url: Url,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NoroffClient {
    /// 클라이언트 생성
    pub fn try_new(config: &Config) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.api_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme: {}",
                base_url.scheme()
            )));
        }

        if config.api_key.is_none() {
            warn!(
                "{:<12} --> API 키가 없습니다. 인증이 필요한 요청은 실패할 수 있습니다.",
                "Api"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 경로 세그먼트를 인코딩해서 base url 뒤에 붙인다
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 요청 빌더 생성. 토큰이 있으면 인증 헤더와 API 키 헤더를 붙인다
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.url(segments)?;
        debug!("{:<12} --> {} {}", "Api", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
            match &self.api_key {
                Some(key) => builder = builder.header(endpoints::API_KEY_HEADER, key),
                None => warn!("{:<12} --> API 키 없이 인증 요청을 보냅니다.", "Api"),
            }
        }
        Ok(builder)
    }

    /// 요청 전송 후 `{ data, meta }` 응답을 해석
    async fn send<R: DeserializeOwned>(builder: RequestBuilder) -> Result<Envelope<R>, ApiError> {
        let response = builder.send().await.map_err(ApiError::Transport)?;
        let response = Self::check(response).await?;
        Ok(response.json::<Envelope<R>>().await?)
    }

    async fn send_json<B, R>(builder: RequestBuilder, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        Ok(Self::send::<R>(builder.json(body)).await?.data)
    }

    /// 2xx 가 아니면 서버 에러 메시지를 꺼내서 에러로 변환
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.first_message())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        warn!(
            "{:<12} --> 요청 실패: status={}, message={}",
            "Api",
            status.as_u16(),
            message
        );
        Err(ApiError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuctionApi for NoroffClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthData, ApiError> {
        let builder = self.request(Method::POST, endpoints::LOGIN, None)?;
        Self::send_json(builder, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Profile, ApiError> {
        let builder = self.request(Method::POST, endpoints::REGISTER, None)?;
        Self::send_json(builder, request).await
    }

    async fn list_listings(&self, query: &ListingsQuery) -> Result<Page<Listing>, ApiError> {
        let builder = self
            .request(Method::GET, endpoints::LISTINGS, None)?
            .query(&query.to_pairs());
        let envelope = Self::send::<Vec<Listing>>(builder).await?;
        Ok(Page {
            items: envelope.data,
            meta: envelope.meta.unwrap_or_default(),
        })
    }

    async fn get_listing(&self, id: &str) -> Result<Listing, ApiError> {
        let builder = self
            .request(Method::GET, &endpoints::listing(id), None)?
            .query(&[("_seller", "true"), ("_bids", "true")]);
        Ok(Self::send::<Listing>(builder).await?.data)
    }

    async fn create_listing(
        &self,
        token: &str,
        listing: &NewListing,
    ) -> Result<Listing, ApiError> {
        let builder = self.request(Method::POST, endpoints::LISTINGS, Some(token))?;
        Self::send_json(builder, listing).await
    }

    async fn update_listing(
        &self,
        token: &str,
        id: &str,
        update: &ListingUpdate,
    ) -> Result<Listing, ApiError> {
        let builder = self.request(Method::PUT, &endpoints::listing(id), Some(token))?;
        Self::send_json(builder, update).await
    }

    async fn delete_listing(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &endpoints::listing(id), Some(token))?
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let response = Self::check(response).await?;

        // 삭제 성공은 204 No Content 만 인정
        if response.status() != StatusCode::NO_CONTENT {
            return Err(ApiError::Decode(format!(
                "expected 204 No Content, got {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }

    async fn place_bid(&self, token: &str, id: &str, amount: f64) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, &endpoints::listing_bids(id), Some(token))?
            .json(&BidRequest { amount })
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_profiles(&self, token: &str) -> Result<Vec<Profile>, ApiError> {
        let builder = self.request(Method::GET, endpoints::PROFILES, Some(token))?;
        Ok(Self::send::<Vec<Profile>>(builder).await?.data)
    }

    async fn search_profiles(&self, token: &str, query: &str) -> Result<Vec<Profile>, ApiError> {
        let builder = self
            .request(Method::GET, endpoints::PROFILE_SEARCH, Some(token))?
            .query(&[("q", query)]);
        Ok(Self::send::<Vec<Profile>>(builder).await?.data)
    }

    async fn get_profile(&self, token: &str, name: &str) -> Result<Profile, ApiError> {
        let builder = self.request(Method::GET, &endpoints::profile(name), Some(token))?;
        Ok(Self::send::<Profile>(builder).await?.data)
    }

    async fn update_profile(
        &self,
        token: &str,
        name: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, ApiError> {
        let builder = self.request(Method::PUT, &endpoints::profile(name), Some(token))?;
        Self::send_json(builder, update).await
    }

    async fn profile_listings(&self, token: &str, name: &str) -> Result<Vec<Listing>, ApiError> {
        let builder = self
            .request(Method::GET, &endpoints::profile_listings(name), Some(token))?
            .query(&[("_bids", "true")]);
        Ok(Self::send::<Vec<Listing>>(builder).await?.data)
    }

    async fn profile_bids(&self, token: &str, name: &str) -> Result<Vec<ProfileBid>, ApiError> {
        let builder = self
            .request(Method::GET, &endpoints::profile_bids(name), Some(token))?
            .query(&[("_listings", "true")]);
        Ok(Self::send::<Vec<ProfileBid>>(builder).await?.data)
    }

    async fn profile_wins(&self, token: &str, name: &str) -> Result<Vec<Listing>, ApiError> {
        let builder = self
            .request(Method::GET, &endpoints::profile_wins(name), Some(token))?
            .query(&[("_bids", "true")]);
        Ok(Self::send::<Vec<Listing>>(builder).await?.data)
    }
}
// endregion: --- Noroff Client
