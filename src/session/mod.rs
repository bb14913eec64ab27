/// 세션 저장소
/// 액세스 토큰과 캐시된 프로필 정보(이름, 크레딧)를 보관한다.
/// 값이 없으면 "로그인 안 됨" 으로 취급한다.
// region:    --- Imports
use crate::error::AppError;
use crate::model::{AuthData, Profile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Session Model
/// 로그인 세션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user_name: String,
    #[serde(default)]
    pub credits: Option<i64>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, profile: Profile) -> Self {
        Self {
            access_token: access_token.into(),
            user_name: profile.name.clone(),
            credits: profile.credits,
            profile: Some(profile),
        }
    }

    /// 로그인 응답으로 세션 생성
    pub fn from_auth(auth: AuthData) -> Self {
        let profile = Profile {
            email: Some(auth.email),
            avatar: auth.avatar,
            banner: auth.banner,
            credits: auth.credits,
            ..Profile::named(auth.name)
        };
        Self::new(auth.access_token, profile)
    }

    /// 로그인한 사용자가 해당 이름의 주인인지 (대소문자 무시)
    pub fn is_user(&self, name: &str) -> bool {
        self.user_name.eq_ignore_ascii_case(name)
    }
}
// endregion: --- Session Model

// region:    --- Session Store Trait
/// 세션 저장소 트레이트
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, AppError>;

    fn save(&self, session: &Session) -> Result<(), AppError>;

    fn clear(&self) -> Result<(), AppError>;

    /// 현재 세션. 읽기 실패는 로그인 안 됨으로 취급
    fn current(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("{:<12} --> 세션 읽기 실패: {}", "Session", e);
                None
            }
        }
    }

    /// 액세스 토큰
    fn token(&self) -> Option<String> {
        self.current()
            .map(|s| s.access_token)
            .filter(|t| !t.is_empty())
    }

    /// 로그인/회원가입 후 세션 저장
    fn set_session(&self, token: &str, profile: Profile) -> Result<Session, AppError> {
        let session = Session::new(token, profile);
        self.save(&session)?;
        info!("{:<12} --> 세션 저장: {}", "Session", session.user_name);
        Ok(session)
    }

    /// 캐시된 크레딧 갱신 (토큰은 유지)
    fn update_credits(&self, credits: i64) -> Result<(), AppError> {
        if let Some(mut session) = self.load()? {
            session.credits = Some(credits);
            if let Some(profile) = session.profile.as_mut() {
                profile.credits = Some(credits);
            }
            self.save(&session)?;
        }
        Ok(())
    }

    /// 캐시된 프로필 갱신
    fn update_profile(&self, profile: Profile) -> Result<(), AppError> {
        if let Some(mut session) = self.load()? {
            if profile.credits.is_some() {
                session.credits = profile.credits;
            }
            session.profile = Some(profile);
            self.save(&session)?;
        }
        Ok(())
    }
}
// endregion: --- Session Store Trait

// region:    --- File Session Store
/// JSON 파일 세션 저장소
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(e: io::Error) -> AppError {
    AppError::Session(e.to_string())
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };

        // 손상된 파일은 세션 없음으로 취급
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(
                    "{:<12} --> 세션 파일이 손상되었습니다 ({}): {}",
                    "Session",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error)?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| AppError::Session(e.to_string()))?;

        // 임시 파일에 쓴 뒤 rename
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(io_error)?;
        fs::rename(&tmp, &self.path).map_err(io_error)?;

        debug!("{:<12} --> 세션 파일 저장: {}", "Session", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("{:<12} --> 세션 삭제", "Session");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
}
// endregion: --- File Session Store

// region:    --- Memory Session Store
/// 메모리 세션 저장소
#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Session("session lock poisoned".to_string())
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, AppError> {
        Ok(self.session.read().map_err(poisoned)?.clone())
    }

    fn save(&self, session: &Session) -> Result<(), AppError> {
        *self.session.write().map_err(poisoned)? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.session.write().map_err(poisoned)? = None;
        Ok(())
    }
}
// endregion: --- Memory Session Store
