/// 내 상품 관리 커맨드
/// 1. 상품 생성
/// 2. 상품 수정 (변경된 필드만 전송)
/// 3. 상품 삭제 (확인 후 삭제, 204 응답만 성공)
/// 판매자 확인은 화면 제어용일 뿐이고 실제 권한 검사는 서버가 한다.
// region:    --- Imports
use crate::api::AuctionApi;
use crate::error::{AppError, FieldError};
use crate::events::{AppEvent, EventBus};
use crate::listings::ListingCollection;
use crate::model::{Listing, ListingUpdate, Media, NewListing};
use crate::session::{Session, SessionStore};
use crate::validation;
use chrono::{DateTime, Utc};
use tracing::info;

// endregion: --- Imports

// region:    --- Ownership
/// 로그인 사용자가 판매자인지 (대소문자 무시)
pub fn can_manage(session: Option<&Session>, listing: &Listing) -> bool {
    match (session, listing.seller_name()) {
        (Some(session), Some(seller)) => session.is_user(seller),
        _ => false,
    }
}
// endregion: --- Ownership

// region:    --- Create
/// 상품 생성 입력값
#[derive(Debug, Clone, Default)]
pub struct CreateListingForm {
    pub title: String,
    pub description: Option<String>,
    pub media: Vec<Media>,
    /// RFC 3339 또는 로컬 `YYYY-MM-DDTHH:MM`
    pub ends_at: String,
}

/// 쉼표로 구분된 URL 목록을 미디어 목록으로
pub fn parse_media_list(raw: &str) -> Vec<Media> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| Media {
            url: url.to_string(),
            alt: String::new(),
        })
        .collect()
}

impl CreateListingForm {
    /// 검증 후 요청 바디 생성
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewListing, AppError> {
        let title = self.title.trim();
        let mut errors = Vec::new();

        if title.is_empty() {
            errors.push(FieldError::new("title", "Title is required."));
        }

        let ends_at = match validation::parse_ends_at(&self.ends_at) {
            Ok(ts) if ts <= now => {
                errors.push(FieldError::new("endsAt", "End date must be in the future."));
                None
            }
            Ok(ts) => Some(ts),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        errors.extend(validation::collect(
            self.media
                .iter()
                .map(|m| validation::validate_url("media", "Media", &m.url)),
        ));

        match ends_at {
            Some(ends_at) if errors.is_empty() => Ok(NewListing {
                title: title.to_string(),
                description: self
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                media: self
                    .media
                    .iter()
                    .map(|m| Media {
                        url: m.url.trim().to_string(),
                        alt: m.alt.trim().to_string(),
                    })
                    .collect(),
                ends_at,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// 1. 상품 생성
pub async fn create_listing(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    form: CreateListingForm,
) -> Result<Listing, AppError> {
    let token = sessions.token().ok_or(AppError::NotAuthenticated)?;
    let body = form.validate(Utc::now())?;
    info!("{:<12} --> 상품 생성 요청: {}", "Manage", body.title);

    let listing = api.create_listing(&token, &body).await?;
    events.publish(AppEvent::ListingCreated {
        id: listing.id.clone(),
        title: listing.title.clone(),
    });
    Ok(listing)
}
// endregion: --- Create

// region:    --- Update
/// 상품 수정 입력값. None 이면 해당 필드는 건드리지 않는다
#[derive(Debug, Clone, Default)]
pub struct ListingEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub media_alt: Option<String>,
}

impl ListingEdit {
    /// 원본과 비교해서 바뀐 필드만 담은 수정 요청 생성
    pub fn diff(&self, original: &Listing) -> Result<ListingUpdate, AppError> {
        let mut update = ListingUpdate::default();

        if let Some(title) = self.title.as_deref().map(str::trim) {
            if title.is_empty() {
                return Err(AppError::invalid("title", "Title is required."));
            }
            if title != original.title {
                update.title = Some(title.to_string());
            }
        }

        if let Some(description) = self.description.as_deref().map(str::trim) {
            if description != original.description.as_deref().unwrap_or("") {
                update.description = Some(description.to_string());
            }
        }

        let first = original.media.first();
        let url = self
            .media_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        let alt = self.media_alt.as_deref().map(str::trim);
        let current_url = first.map(|m| m.url.as_str());
        let current_alt = first.map(|m| m.alt.as_str()).unwrap_or("");

        let url_changed = url.is_some_and(|u| Some(u) != current_url);
        let alt_changed = alt.is_some_and(|a| a != current_alt);
        if url_changed || (alt_changed && (url.is_some() || current_url.is_some())) {
            let Some(url) = url.or(current_url) else {
                return Err(AppError::invalid("media", "Media must be a valid URL."));
            };
            validation::validate_url("media", "Media", url)
                .map_err(|e| AppError::Validation(vec![e]))?;

            // 첫 번째 이미지만 바꾸고 나머지는 유지
            let mut media = original.media.clone();
            let replacement = Media {
                url: url.to_string(),
                alt: alt.unwrap_or(current_alt).to_string(),
            };
            match media.first_mut() {
                Some(slot) => *slot = replacement,
                None => media.push(replacement),
            }
            update.media = Some(media);
        }

        if update.is_empty() {
            return Err(AppError::NoChanges);
        }
        Ok(update)
    }
}

/// 2. 상품 수정
pub async fn update_listing(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    original: &Listing,
    edit: &ListingEdit,
) -> Result<Listing, AppError> {
    let session = sessions.current().ok_or(AppError::NotAuthenticated)?;
    if !can_manage(Some(&session), original) {
        return Err(AppError::NotOwner);
    }

    let update = edit.diff(original)?;
    info!(
        "{:<12} --> 상품 수정 요청: id={}, {:?}",
        "Manage", original.id, update
    );

    let listing = api
        .update_listing(&session.access_token, &original.id, &update)
        .await?;
    events.publish(AppEvent::ListingUpdated {
        id: listing.id.clone(),
    });
    Ok(listing)
}
// endregion: --- Update

// region:    --- Delete
/// 사용자 확인
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 항상 확인 (`--yes`)
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this listing?";

/// 3. 상품 삭제. 성공하면 목록에서도 제거
pub async fn delete_listing(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    confirm: &impl Confirm,
    listing: &Listing,
    collection: Option<&mut ListingCollection>,
) -> Result<DeleteOutcome, AppError> {
    let session = sessions.current().ok_or(AppError::NotAuthenticated)?;
    if !can_manage(Some(&session), listing) {
        return Err(AppError::NotOwner);
    }
    if !confirm.confirm(DELETE_PROMPT) {
        info!("{:<12} --> 상품 삭제 취소: {}", "Manage", listing.id);
        return Ok(DeleteOutcome::Cancelled);
    }

    api.delete_listing(&session.access_token, &listing.id).await?;
    if let Some(collection) = collection {
        collection.remove(&listing.id);
    }
    events.publish(AppEvent::ListingDeleted {
        id: listing.id.clone(),
    });
    Ok(DeleteOutcome::Deleted)
}
// endregion: --- Delete

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Profile;
    use chrono::Duration;

    fn listing() -> Listing {
        Listing {
            id: "l1".to_string(),
            title: "Bike".to_string(),
            description: Some("Red bike".to_string()),
            media: vec![
                Media {
                    url: "https://img.example/1.png".to_string(),
                    alt: "front".to_string(),
                },
                Media {
                    url: "https://img.example/2.png".to_string(),
                    alt: "back".to_string(),
                },
            ],
            tags: Vec::new(),
            created: Utc::now(),
            updated: None,
            ends_at: Utc::now() + Duration::days(1),
            seller: Some(Profile::named("Ola")),
            bids: Vec::new(),
            count: None,
        }
    }

    #[test]
    fn diff_contains_only_changed_fields() {
        let edit = ListingEdit {
            title: Some("Bike".to_string()),
            description: Some("Blue bike".to_string()),
            ..Default::default()
        };
        let update = edit.diff(&listing()).unwrap();
        assert_eq!(update.title, None);
        assert_eq!(update.description.as_deref(), Some("Blue bike"));
        assert_eq!(update.media, None);
    }

    #[test]
    fn diff_without_changes_is_rejected() {
        let edit = ListingEdit {
            title: Some(" Bike ".to_string()),
            description: Some("Red bike".to_string()),
            media_url: Some("https://img.example/1.png".to_string()),
            media_alt: Some("front".to_string()),
        };
        assert!(matches!(edit.diff(&listing()), Err(AppError::NoChanges)));
    }

    #[test]
    fn diff_replaces_only_first_image() {
        let edit = ListingEdit {
            media_url: Some("https://img.example/new.png".to_string()),
            ..Default::default()
        };
        let media = edit.diff(&listing()).unwrap().media.unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].url, "https://img.example/new.png");
        assert_eq!(media[0].alt, "front");
        assert_eq!(media[1].url, "https://img.example/2.png");
    }

    #[test]
    fn diff_rejects_invalid_image_url() {
        let edit = ListingEdit {
            media_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(edit.diff(&listing()), Err(AppError::Validation(_))));
    }

    #[test]
    fn create_form_validation() {
        let now = Utc::now();
        let form = CreateListingForm {
            title: "  ".to_string(),
            description: None,
            media: parse_media_list("https://img.example/a.png, nope"),
            ends_at: "2000-01-01T00:00:00Z".to_string(),
        };
        let fields: Vec<_> = form
            .validate(now)
            .unwrap_err()
            .field_errors()
            .iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["title", "endsAt", "media"]);
    }

    #[test]
    fn create_form_builds_body() {
        let now = Utc::now();
        let ends = now + Duration::days(3);
        let form = CreateListingForm {
            title: "Bike".to_string(),
            description: Some("  ".to_string()),
            media: parse_media_list("https://img.example/a.png,,https://img.example/b.png"),
            ends_at: ends.to_rfc3339(),
        };
        let body = form.validate(now).unwrap();
        assert_eq!(body.description, None);
        assert_eq!(body.media.len(), 2);
        assert_eq!(body.ends_at.timestamp(), ends.timestamp());
    }

    #[test]
    fn only_seller_can_manage() {
        let listing = listing();
        let owner = Session::new("t", Profile::named("ola"));
        let other = Session::new("t", Profile::named("kari"));
        assert!(can_manage(Some(&owner), &listing));
        assert!(!can_manage(Some(&other), &listing));
        assert!(!can_manage(None, &listing));
    }
}
