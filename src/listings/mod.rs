/// 상품 목록 관리자
/// 전체 목록(all)과 검색/정렬/필터가 적용된 목록(filtered), 현재 페이지를 들고 있다.
/// 모든 목록 화면(홈, 프로필 상품)이 같은 관리자를 쓰고 `ListingSource` 로만 구분한다.
// region:    --- Imports
use crate::api::{AuctionApi, ListingsQuery};
use crate::error::{ApiError, AppError};
use crate::model::Listing;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::{debug, info, warn};

// endregion: --- Imports

/// 한 페이지에 보여줄 상품 수
pub const PAGE_SIZE: usize = 21;

/// API 한 번에 가져오는 최대 상품 수
pub const FETCH_LIMIT: u32 = 100;

/// 전체 조회 시 따라가는 최대 페이지 수
pub const MAX_FETCH_PAGES: u32 = 50;

// region:    --- Sort / Filter
/// 정렬 기준
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    None,
    Newest,
    Oldest,
    MostBids,
    FewestBids,
    HighestBid,
    LowestBid,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::None,
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::MostBids,
        SortKey::FewestBids,
        SortKey::HighestBid,
        SortKey::LowestBid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostBids => "mostBids",
            SortKey::FewestBids => "fewestBids",
            SortKey::HighestBid => "highestBid",
            SortKey::LowestBid => "lowestBid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "No sorting",
            SortKey::Newest => "Newest First",
            SortKey::Oldest => "Oldest First",
            SortKey::MostBids => "Most Bids",
            SortKey::FewestBids => "Fewest Bids",
            SortKey::HighestBid => "Highest Bid",
            SortKey::LowestBid => "Lowest Bid",
        }
    }

    /// 같은 진행 상태 안에서의 2차 정렬
    fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortKey::None => Ordering::Equal,
            SortKey::Newest => b.created.cmp(&a.created),
            SortKey::Oldest => a.created.cmp(&b.created),
            SortKey::MostBids => b.bid_count().cmp(&a.bid_count()),
            SortKey::FewestBids => a.bid_count().cmp(&b.bid_count()),
            SortKey::HighestBid => b.highest_bid().total_cmp(&a.highest_bid()),
            SortKey::LowestBid => a.highest_bid().total_cmp(&b.highest_bid()),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown sort key '{}', expected one of: {}",
                    s,
                    SortKey::ALL.map(SortKey::as_str).join(", ")
                )
            })
    }
}

/// 검색/정렬/필터 조건
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub search: String,
    pub sort: SortKey,
    pub active_only: bool,
}

impl FilterOptions {
    pub fn new(search: impl Into<String>, sort: SortKey, active_only: bool) -> Self {
        Self {
            search: search.into(),
            sort,
            active_only,
        }
    }
}

/// `all` 에서 조건에 맞는 상품의 인덱스를 정렬된 순서로 돌려준다
pub fn derive_view(all: &[Listing], options: &FilterOptions, now: DateTime<Utc>) -> Vec<usize> {
    let needle = options.search.to_lowercase();

    let mut indices: Vec<usize> = all
        .iter()
        .enumerate()
        .filter(|(_, l)| needle.is_empty() || l.title.to_lowercase().contains(&needle))
        .filter(|(_, l)| !options.active_only || l.is_active(now))
        .map(|(i, _)| i)
        .collect();

    // 진행 중인 상품이 먼저, 같은 상태 안에서는 선택한 기준으로 (stable sort)
    indices.sort_by(|&a, &b| {
        let (a, b) = (&all[a], &all[b]);
        b.is_active(now)
            .cmp(&a.is_active(now))
            .then_with(|| options.sort.compare(a, b))
    });
    indices
}
// endregion: --- Sort / Filter

// region:    --- Listing Source
/// 목록을 가져올 곳
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListingSource {
    /// 전체 상품 (홈)
    #[default]
    All,
    /// 특정 프로필의 상품 (토큰 필요)
    Profile(String),
}

/// API 페이지를 끝까지 따라가며 전체 상품 조회
/// 요청 수는 `MAX_FETCH_PAGES` 를 넘지 않는다. `nextPage` 가 앞으로 가지 않으면 멈춘다
pub async fn fetch_all_listings(api: &impl AuctionApi) -> Result<Vec<Listing>, ApiError> {
    let mut listings = Vec::new();
    let mut page = 1;

    for fetched_pages in 1..=MAX_FETCH_PAGES {
        let query = ListingsQuery {
            limit: Some(FETCH_LIMIT),
            page: Some(page),
            ..ListingsQuery::with_bids()
        };
        let result = api.list_listings(&query).await?;
        let fetched = result.items.len();
        listings.extend(result.items);

        debug!(
            "{:<12} --> 페이지 {} 조회: {} 건",
            "Listings", page, fetched
        );

        if result.meta.is_last_page || fetched == 0 {
            break;
        }
        match result.meta.next_page {
            Some(next) if next > page => page = next,
            next => {
                warn!(
                    "{:<12} --> 다음 페이지 정보가 잘못되어 중단 (page={}, nextPage={:?})",
                    "Listings", page, next
                );
                break;
            }
        }
        if fetched_pages == MAX_FETCH_PAGES {
            warn!(
                "{:<12} --> 최대 페이지 수({}) 도달, 나머지는 생략",
                "Listings", MAX_FETCH_PAGES
            );
        }
    }

    Ok(listings)
}
// endregion: --- Listing Source

// region:    --- Listing Collection
/// 로드 요청 티켓. 더 최신 티켓이 발급되면 이전 티켓의 결과는 버린다
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// 상품 목록 관리자
#[derive(Debug, Clone, Default)]
pub struct ListingCollection {
    source: ListingSource,
    all: Vec<Listing>,
    filtered: Vec<usize>,
    options: FilterOptions,
    page: usize,
    issued: u64,
}

impl ListingCollection {
    pub fn new(source: ListingSource) -> Self {
        Self {
            source,
            page: 1,
            ..Default::default()
        }
    }

    /// 이미 가져온 목록으로 생성
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut collection = Self::new(ListingSource::All);
        collection.replace_all(listings);
        collection
    }

    pub fn source(&self) -> &ListingSource {
        &self.source
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn all(&self) -> &[Listing] {
        &self.all
    }

    /// 필터가 적용된 전체 목록
    pub fn filtered(&self) -> Vec<&Listing> {
        self.filtered.iter().map(|&i| &self.all[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.all.iter().find(|l| l.id == id)
    }

    // region:    --- Load
    /// 새 로드 시작
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// 로드 결과 반영. 더 최신 로드가 시작된 뒤라면 버리고 false
    pub fn finish_load(&mut self, ticket: LoadTicket, listings: Vec<Listing>) -> bool {
        if ticket.0 != self.issued {
            warn!(
                "{:<12} --> 오래된 응답 무시 (ticket={}, latest={})",
                "Listings", ticket.0, self.issued
            );
            return false;
        }
        self.replace_all(listings);
        true
    }

    /// 목록 전체 다시 가져오기. 페이지는 1로 돌아간다
    /// `&mut self` 를 잡고 있으므로 같은 관리자에서 `load` 는 한 번에 하나만 돈다.
    /// 요청을 밖에서 동시에 돌릴 때는 `begin_load` / `finish_load` 로 나눠 쓴다
    pub async fn load(
        &mut self,
        api: &impl AuctionApi,
        token: Option<&str>,
    ) -> Result<(), AppError> {
        let ticket = self.begin_load();
        let listings = match &self.source {
            ListingSource::All => fetch_all_listings(api).await?,
            ListingSource::Profile(name) => {
                let token = token.ok_or(AppError::NotAuthenticated)?;
                api.profile_listings(token, name).await?
            }
        };
        let count = listings.len();
        if self.finish_load(ticket, listings) {
            info!("{:<12} --> 상품 {} 건 로드", "Listings", count);
        }
        Ok(())
    }

    fn replace_all(&mut self, listings: Vec<Listing>) {
        self.all = listings;
        self.page = 1;
        self.recompute(Utc::now());
    }
    // endregion: --- Load

    // region:    --- Filter
    /// 검색/정렬/필터 적용 후 1 페이지로 이동
    pub fn apply_filters(&mut self, search: &str, sort: SortKey, active_only: bool) {
        self.apply_filters_at(FilterOptions::new(search, sort, active_only), Utc::now());
    }

    /// 기준 시각을 지정해서 필터 적용
    pub fn apply_filters_at(&mut self, options: FilterOptions, now: DateTime<Utc>) {
        self.options = options;
        self.page = 1;
        self.recompute(now);
    }

    fn recompute(&mut self, now: DateTime<Utc>) {
        self.filtered = derive_view(&self.all, &self.options, now);
        debug!(
            "{:<12} --> 필터 결과 {}/{} 건 ({:?})",
            "Listings",
            self.filtered.len(),
            self.all.len(),
            self.options
        );
    }
    // endregion: --- Filter

    // region:    --- Pagination
    /// 전체 페이지 수 (목록이 비면 0)
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// `n` 페이지로 이동 후 해당 페이지 상품 반환. 범위를 벗어나면 가장 가까운 페이지로
    pub fn page(&mut self, n: usize) -> Vec<&Listing> {
        self.page = n.clamp(1, self.total_pages().max(1));
        self.current_items()
    }

    /// 현재 페이지 상품
    pub fn current_items(&self) -> Vec<&Listing> {
        let start = (self.page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        if start >= end {
            return Vec::new();
        }
        self.filtered[start..end]
            .iter()
            .map(|&i| &self.all[i])
            .collect()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }
    // endregion: --- Pagination

    /// 삭제된 상품 제거
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.all.iter().position(|l| l.id == id) else {
            return false;
        };
        self.all.remove(index);
        self.filtered.retain(|&i| i != index);
        for i in self.filtered.iter_mut() {
            if *i > index {
                *i -= 1;
            }
        }
        self.page = self.page.clamp(1, self.total_pages().max(1));
        true
    }
}
// endregion: --- Listing Collection
