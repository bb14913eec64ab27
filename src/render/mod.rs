/// 화면 표시 계층
/// 뷰 모델 생성(순수 함수)과 터미널 출력(io::Write)을 분리한다.
// region:    --- Imports
use crate::listings::ListingCollection;
use crate::manage;
use crate::model::{Listing, Profile, ProfileBid};
use crate::profile::ProfileDashboard;
use crate::session::Session;
use chrono::{DateTime, Local, Utc};
use std::io::{self, Write};

// endregion: --- Imports

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200?text=No+image";
pub const PLACEHOLDER_ALT: &str = "Placeholder image";
pub const NO_RESULTS: &str = "No results.";

// region:    --- View Models
/// 상품 카드
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub image_alt: String,
    pub ends_at: DateTime<Utc>,
    pub highest_bid: f64,
    pub bid_count: usize,
    pub active: bool,
    pub can_bid: bool,
}

impl ListingCard {
    /// 입찰 안내는 로그인한 사용자가 남의 진행 중 상품을 볼 때만 표시
    pub fn from_listing(listing: &Listing, session: Option<&Session>, now: DateTime<Utc>) -> Self {
        let image = listing.media.first();
        let active = listing.is_active(now);
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description.".to_string()),
            image_url: image
                .map(|m| m.url.clone())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            image_alt: image
                .map(|m| m.alt.clone())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_ALT.to_string()),
            ends_at: listing.ends_at,
            highest_bid: listing.highest_bid(),
            bid_count: listing.bid_count(),
            active,
            can_bid: session.is_some() && active && !manage::can_manage(session, listing),
        }
    }
}

/// 페이지 이동 컨트롤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: usize,
    pub total: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationView {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total)
    }
}

/// 목록 화면 한 페이지
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPageView {
    pub cards: Vec<ListingCard>,
    pub pagination: PaginationView,
    pub total_results: usize,
}

impl ListingPageView {
    pub fn build(
        collection: &ListingCollection,
        session: Option<&Session>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            cards: collection
                .current_items()
                .into_iter()
                .map(|l| ListingCard::from_listing(l, session, now))
                .collect(),
            pagination: PaginationView {
                current: collection.current_page(),
                total: collection.total_pages(),
                prev_enabled: collection.has_prev(),
                next_enabled: collection.has_next(),
            },
            total_results: collection.filtered_len(),
        }
    }
}

/// 상품 상세
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetailView {
    pub id: String,
    pub title: String,
    pub images: Vec<(String, String)>,
    pub description: String,
    pub seller: String,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    pub highest_bid: f64,
    /// 최신 입찰부터 "<이름> bid <금액> kr"
    pub bid_lines: Vec<String>,
    pub owner_controls: bool,
}

impl ListingDetailView {
    pub fn build(listing: &Listing, session: Option<&Session>, now: DateTime<Utc>) -> Self {
        let images = if listing.media.is_empty() {
            vec![(PLACEHOLDER_IMAGE.to_string(), "No image available".to_string())]
        } else {
            listing
                .media
                .iter()
                .map(|m| {
                    let alt = if m.alt.is_empty() {
                        "Listing image".to_string()
                    } else {
                        m.alt.clone()
                    };
                    (m.url.clone(), alt)
                })
                .collect()
        };

        let mut bids: Vec<_> = listing.bids.iter().collect();
        bids.sort_by(|a, b| b.created.cmp(&a.created));

        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            images,
            description: listing
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description provided.".to_string()),
            seller: listing
                .seller_name()
                .unwrap_or("Unknown")
                .to_string(),
            ends_at: listing.ends_at,
            active: listing.is_active(now),
            highest_bid: listing.highest_bid(),
            bid_lines: bids
                .into_iter()
                .map(|bid| {
                    let name = bid
                        .bidder
                        .as_ref()
                        .map(|b| b.name.as_str())
                        .unwrap_or("Someone");
                    format!("{} bid {} kr", name, format_amount(bid.amount))
                })
                .collect(),
            owner_controls: manage::can_manage(session, listing),
        }
    }
}

/// 프로필 화면
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub name: String,
    pub email: Option<String>,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub credits: Option<i64>,
    pub listings: Vec<ListingCard>,
    pub active_bids: Vec<String>,
    pub wins: Vec<ListingCard>,
}

impl ProfileView {
    pub fn build(
        dashboard: &ProfileDashboard,
        session: Option<&Session>,
        now: DateTime<Utc>,
    ) -> Self {
        let profile = &dashboard.profile;
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            bio: bio_or_default(profile),
            avatar_url: profile.avatar.as_ref().map(|m| m.url.clone()),
            credits: profile.credits,
            listings: dashboard
                .listings
                .iter()
                .map(|l| ListingCard::from_listing(l, session, now))
                .collect(),
            active_bids: dashboard
                .active_bids(now)
                .into_iter()
                .map(bid_line)
                .collect(),
            wins: dashboard
                .wins
                .iter()
                .map(|l| ListingCard::from_listing(l, None, now))
                .collect(),
        }
    }
}

fn bio_or_default(profile: &Profile) -> String {
    profile
        .bio
        .clone()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| "No bio available".to_string())
}

fn bid_line(bid: &ProfileBid) -> String {
    let title = bid
        .listing
        .as_ref()
        .map(|l| l.title.as_str())
        .unwrap_or("Unknown listing");
    format!("{} kr on \"{}\"", format_amount(bid.amount), title)
}

/// 정수면 소수점 없이 표시
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

fn format_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d/%m/%Y, %H:%M").to_string()
}
// endregion: --- View Models

// region:    --- Writers
pub fn write_card(out: &mut impl Write, card: &ListingCard) -> io::Result<()> {
    writeln!(out, "[{}] {}", card.id, card.title)?;
    writeln!(out, "    {}", card.description)?;
    writeln!(out, "    Image: {} ({})", card.image_url, card.image_alt)?;
    let status = if card.active { "Ends" } else { "Ended" };
    writeln!(out, "    {}: {}", status, format_time(card.ends_at))?;
    writeln!(
        out,
        "    Highest bid: {} kr ({} bids)",
        format_amount(card.highest_bid),
        card.bid_count
    )?;
    if card.can_bid {
        writeln!(out, "    Bid: auction-house bid {} <amount>", card.id)?;
    }
    Ok(())
}

pub fn write_listing_page(out: &mut impl Write, view: &ListingPageView) -> io::Result<()> {
    if view.cards.is_empty() {
        writeln!(out, "{}", NO_RESULTS)?;
        return Ok(());
    }
    for card in &view.cards {
        write_card(out, card)?;
        writeln!(out)?;
    }

    let p = &view.pagination;
    writeln!(
        out,
        "{}{}{}  ({} results)",
        if p.prev_enabled { "< Previous  " } else { "" },
        p.label(),
        if p.next_enabled { "  Next >" } else { "" },
        view.total_results
    )
}

pub fn write_listing_detail(out: &mut impl Write, view: &ListingDetailView) -> io::Result<()> {
    writeln!(out, "{}", view.title)?;
    writeln!(out, "{}", "=".repeat(view.title.chars().count().max(3)))?;
    for (url, alt) in &view.images {
        writeln!(out, "Image: {} ({})", url, alt)?;
    }
    writeln!(out, "{}", view.description)?;
    writeln!(out, "Seller: {}", view.seller)?;
    let status = if view.active { "Ends" } else { "Ended" };
    writeln!(out, "{}: {}", status, format_time(view.ends_at))?;
    writeln!(out, "Highest bid: {} kr", format_amount(view.highest_bid))?;
    writeln!(out)?;
    writeln!(out, "Bids:")?;
    if view.bid_lines.is_empty() {
        writeln!(out, "  No bids yet.")?;
    }
    for line in &view.bid_lines {
        writeln!(out, "  {}", line)?;
    }
    if view.owner_controls {
        writeln!(out)?;
        writeln!(
            out,
            "You own this listing: auction-house edit {0} | auction-house delete {0}",
            view.id
        )?;
    }
    Ok(())
}

pub fn write_profile(out: &mut impl Write, view: &ProfileView) -> io::Result<()> {
    writeln!(out, "{}", view.name)?;
    if let Some(email) = &view.email {
        writeln!(out, "E-mail: {}", email)?;
    }
    if let Some(url) = &view.avatar_url {
        writeln!(out, "Avatar: {}", url)?;
    }
    if let Some(credits) = view.credits {
        writeln!(out, "Credits: {} kr", credits)?;
    }
    writeln!(out, "{}", view.bio)?;

    writeln!(out)?;
    writeln!(out, "Listings")?;
    if view.listings.is_empty() {
        writeln!(out, "  No listings yet.")?;
    }
    for card in &view.listings {
        write_card(out, card)?;
    }

    writeln!(out)?;
    writeln!(out, "Listings with active bids")?;
    if view.active_bids.is_empty() {
        writeln!(out, "  No active bids.")?;
    }
    for line in &view.active_bids {
        writeln!(out, "  {}", line)?;
    }

    writeln!(out)?;
    writeln!(out, "Auctions won")?;
    if view.wins.is_empty() {
        writeln!(out, "  No auctions won yet.")?;
    }
    for card in &view.wins {
        write_card(out, card)?;
    }
    Ok(())
}

pub fn write_profiles(out: &mut impl Write, profiles: &[Profile]) -> io::Result<()> {
    if profiles.is_empty() {
        writeln!(out, "{}", NO_RESULTS)?;
    }
    for profile in profiles {
        writeln!(out, "{}", profile.name)?;
        writeln!(out, "    {}", bio_or_default(profile))?;
    }
    Ok(())
}
// endregion: --- Writers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bid, Media};
    use chrono::Duration;

    fn listing(ends_in_hours: i64) -> Listing {
        Listing {
            id: "l1".to_string(),
            title: "Bike".to_string(),
            description: None,
            media: Vec::new(),
            tags: Vec::new(),
            created: Utc::now(),
            updated: None,
            ends_at: Utc::now() + Duration::hours(ends_in_hours),
            seller: Some(Profile::named("ola")),
            bids: vec![
                Bid {
                    id: "b1".to_string(),
                    amount: 20.0,
                    bidder: Some(Profile::named("kari")),
                    created: Utc::now() - Duration::hours(2),
                },
                Bid {
                    id: "b2".to_string(),
                    amount: 35.5,
                    bidder: Some(Profile::named("per")),
                    created: Utc::now() - Duration::hours(1),
                },
            ],
            count: None,
        }
    }

    #[test]
    fn card_uses_placeholders_and_bid_gating() {
        let now = Utc::now();
        let viewer = Session::new("t", Profile::named("kari"));
        let card = ListingCard::from_listing(&listing(5), Some(&viewer), now);
        assert_eq!(card.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(card.description, "No description.");
        assert_eq!(card.highest_bid, 35.5);
        assert!(card.can_bid);

        assert!(!ListingCard::from_listing(&listing(5), None, now).can_bid);
        assert!(!ListingCard::from_listing(&listing(-5), Some(&viewer), now).can_bid);
    }

    #[test]
    fn seller_gets_no_bid_hint_on_own_listing() {
        let now = Utc::now();
        let seller = Session::new("t", Profile::named("Ola"));
        assert!(!ListingCard::from_listing(&listing(5), Some(&seller), now).can_bid);

        let dashboard = ProfileDashboard {
            profile: Profile::named("ola"),
            listings: vec![listing(5)],
            bids: Vec::new(),
            wins: Vec::new(),
        };
        let view = ProfileView::build(&dashboard, Some(&seller), now);
        assert!(!view.listings[0].can_bid);

        let mut out = Vec::new();
        write_profile(&mut out, &view).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("Bid: "));

        let visitor = Session::new("t", Profile::named("kari"));
        let view = ProfileView::build(&dashboard, Some(&visitor), now);
        assert!(view.listings[0].can_bid);
    }

    #[test]
    fn card_uses_first_image() {
        let mut l = listing(5);
        l.media = vec![Media {
            url: "https://img.example/1.png".to_string(),
            alt: String::new(),
        }];
        let card = ListingCard::from_listing(&l, None, Utc::now());
        assert_eq!(card.image_url, "https://img.example/1.png");
        assert_eq!(card.image_alt, PLACEHOLDER_ALT);
    }

    #[test]
    fn detail_lists_newest_bid_first_and_owner_controls() {
        let owner = Session::new("t", Profile::named("OLA"));
        let view = ListingDetailView::build(&listing(5), Some(&owner), Utc::now());
        assert_eq!(view.bid_lines, vec!["per bid 35.50 kr", "kari bid 20 kr"]);
        assert!(view.owner_controls);
        assert_eq!(view.seller, "ola");

        let view = ListingDetailView::build(&listing(5), None, Utc::now());
        assert!(!view.owner_controls);
    }

    #[test]
    fn empty_page_prints_no_results() {
        let collection = ListingCollection::from_listings(Vec::new());
        let view = ListingPageView::build(&collection, None, Utc::now());
        assert_eq!(view.pagination.total, 0);

        let mut out = Vec::new();
        write_listing_page(&mut out, &view).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No results.\n");
    }

    #[test]
    fn page_view_reports_pagination() {
        let listings: Vec<Listing> = (0..25)
            .map(|i| Listing {
                id: format!("l{}", i),
                ..listing(5)
            })
            .collect();
        let mut collection = ListingCollection::from_listings(listings);
        collection.page(2);

        let viewer = Session::new("t", Profile::named("kari"));
        let view = ListingPageView::build(&collection, Some(&viewer), Utc::now());
        assert_eq!(view.cards.len(), 4);
        assert_eq!(view.pagination.label(), "Page 2 of 2");
        assert!(view.pagination.prev_enabled);
        assert!(!view.pagination.next_enabled);

        let mut out = Vec::new();
        write_listing_page(&mut out, &view).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("< Previous  Page 2 of 2  (25 results)"));
    }

    #[test]
    fn amounts_drop_trailing_zeroes() {
        assert_eq!(format_amount(50.0), "50");
        assert_eq!(format_amount(12.5), "12.50");
    }
}
