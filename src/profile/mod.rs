/// 프로필 관련 흐름
/// 1. 크레딧 갱신
/// 2. 프로필 대시보드 (프로필, 내 상품, 입찰, 낙찰 동시 조회)
/// 3. 프로필 수정
/// 4. 프로필 목록/검색
// region:    --- Imports
use crate::api::AuctionApi;
use crate::error::AppError;
use crate::events::{AppEvent, EventBus};
use crate::model::{Listing, Media, Profile, ProfileBid, ProfileUpdate};
use crate::session::SessionStore;
use crate::validation;
use chrono::{DateTime, Utc};
use tracing::info;

// endregion: --- Imports

// region:    --- Credits
/// 1. 내 프로필을 다시 읽어서 캐시된 크레딧 갱신
pub async fn refresh_credits(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
) -> Result<i64, AppError> {
    let session = sessions.current().ok_or(AppError::NotAuthenticated)?;
    let profile = api
        .get_profile(&session.access_token, &session.user_name)
        .await?;
    let credits = profile.credits.unwrap_or(0);
    sessions.update_credits(credits)?;
    info!(
        "{:<12} --> 크레딧 갱신: {} = {}",
        "Profile", session.user_name, credits
    );
    Ok(credits)
}
// endregion: --- Credits

// region:    --- Dashboard
/// 프로필 화면 데이터
#[derive(Debug, Clone)]
pub struct ProfileDashboard {
    pub profile: Profile,
    pub listings: Vec<Listing>,
    pub bids: Vec<ProfileBid>,
    pub wins: Vec<Listing>,
}

impl ProfileDashboard {
    /// 아직 끝나지 않은 상품에 대한 입찰
    pub fn active_bids(&self, now: DateTime<Utc>) -> Vec<&ProfileBid> {
        self.bids
            .iter()
            .filter(|bid| bid.listing.as_ref().is_some_and(|l| l.is_active(now)))
            .collect()
    }
}

/// 2. 프로필 대시보드 조회. 네 요청을 동시에 보낸다
pub async fn load_dashboard(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    name: Option<&str>,
) -> Result<ProfileDashboard, AppError> {
    let session = sessions.current().ok_or(AppError::NotAuthenticated)?;
    let token = session.access_token.as_str();
    let name = name.unwrap_or(&session.user_name);
    info!("{:<12} --> 프로필 조회: {}", "Profile", name);

    let (profile, listings, bids, wins) = tokio::try_join!(
        api.get_profile(token, name),
        api.profile_listings(token, name),
        api.profile_bids(token, name),
        api.profile_wins(token, name),
    )?;

    // 내 프로필이면 캐시도 갱신
    if session.is_user(&profile.name) {
        sessions.update_profile(profile.clone())?;
    }

    Ok(ProfileDashboard {
        profile,
        listings,
        bids,
        wins,
    })
}
// endregion: --- Dashboard

// region:    --- Edit Profile
/// 프로필 수정 입력값. 비어 있는 값은 변경하지 않는다
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub bio: Option<String>,
}

impl ProfileEdit {
    /// 검증 후 요청 바디 생성
    pub fn into_update(self) -> Result<ProfileUpdate, AppError> {
        let avatar_url = non_blank(self.avatar_url);
        let banner_url = non_blank(self.banner_url);
        let bio = self.bio.map(|b| b.trim().to_string());

        let errors = validation::collect([
            avatar_url
                .as_deref()
                .map_or(Ok(()), |u| validation::validate_url("avatar", "Avatar", u)),
            banner_url
                .as_deref()
                .map_or(Ok(()), |u| validation::validate_url("banner", "Banner", u)),
            bio.as_deref().map_or(Ok(()), validation::validate_bio),
        ]);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let update = ProfileUpdate {
            bio,
            avatar: avatar_url.map(|url| Media {
                url,
                alt: "User avatar".to_string(),
            }),
            banner: banner_url.map(|url| Media {
                url,
                alt: "Profile banner".to_string(),
            }),
        };
        if update == ProfileUpdate::default() {
            return Err(AppError::NoChanges);
        }
        Ok(update)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 3. 프로필 수정
pub async fn edit_profile(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    edit: ProfileEdit,
) -> Result<Profile, AppError> {
    let update = edit.into_update()?;
    let session = sessions.current().ok_or(AppError::NotAuthenticated)?;

    let profile = api
        .update_profile(&session.access_token, &session.user_name, &update)
        .await?;
    sessions.update_profile(profile.clone())?;
    events.publish(AppEvent::ProfileUpdated {
        name: profile.name.clone(),
    });
    Ok(profile)
}
// endregion: --- Edit Profile

// region:    --- Directory
/// 4. 프로필 목록. 검색어가 있으면 검색
pub async fn find_profiles(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    query: Option<&str>,
) -> Result<Vec<Profile>, AppError> {
    let token = sessions.token().ok_or(AppError::NotAuthenticated)?;
    let profiles = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => api.search_profiles(&token, q).await?,
        None => api.list_profiles(&token).await?,
    };
    info!("{:<12} --> 프로필 {} 건 조회", "Profile", profiles.len());
    Ok(profiles)
}
// endregion: --- Directory

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_edit_is_no_change() {
        let err = ProfileEdit {
            avatar_url: Some("  ".to_string()),
            ..Default::default()
        }
        .into_update()
        .unwrap_err();
        assert!(matches!(err, AppError::NoChanges));
    }

    #[test]
    fn edit_collects_every_field_error() {
        let err = ProfileEdit {
            avatar_url: Some("nope".to_string()),
            banner_url: Some("also nope".to_string()),
            bio: Some("x".repeat(200)),
        }
        .into_update()
        .unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["avatar", "banner", "bio"]);
    }

    #[test]
    fn edit_builds_partial_update() {
        let update = ProfileEdit {
            avatar_url: Some("https://img.example/me.png".to_string()),
            ..Default::default()
        }
        .into_update()
        .unwrap();
        assert_eq!(update.avatar.unwrap().url, "https://img.example/me.png");
        assert!(update.banner.is_none());
        assert!(update.bio.is_none());
    }
}
