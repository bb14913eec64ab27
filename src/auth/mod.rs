/// 인증 흐름
/// 1. 로그인
/// 2. 회원가입 (가입 후 같은 정보로 로그인)
/// 3. 로그아웃
// region:    --- Imports
use crate::api::AuctionApi;
use crate::error::{AppError, FieldError};
use crate::events::{AppEvent, EventBus};
use crate::model::{LoginRequest, Media, RegisterRequest};
use crate::session::{Session, SessionStore};
use crate::validation;
use tracing::info;

// endregion: --- Imports

// region:    --- Login
/// 로그인 입력값 검증
pub fn validate_login(email: &str, password: &str) -> Result<LoginRequest, AppError> {
    let errors = validation::collect([
        validation::validate_email(email),
        if password.is_empty() {
            Err(FieldError::new("password", "Password is required."))
        } else {
            Ok(())
        },
    ]);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

/// 1. 로그인
pub async fn login(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let request = validate_login(email, password)?;
    info!("{:<12} --> 로그인 요청: {}", "Auth", request.email);

    let auth = api.login(&request).await?;
    let session = Session::from_auth(auth);
    sessions.save(&session)?;

    events.publish(AppEvent::LoggedIn {
        name: session.user_name.clone(),
    });
    Ok(session)
}
// endregion: --- Login

// region:    --- Register
/// 회원가입 입력값
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
}

impl RegisterForm {
    /// 모든 필드를 검사하고 에러를 한꺼번에 돌려준다
    pub fn validate(&self) -> Result<RegisterRequest, AppError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let password = self.password.trim();
        let bio = trimmed(&self.bio);
        let avatar = trimmed(&self.avatar);
        let banner = trimmed(&self.banner);

        let errors = validation::collect([
            validation::validate_username(name),
            validation::validate_email(email),
            validation::validate_password(password),
            bio.map_or(Ok(()), validation::validate_bio),
            avatar.map_or(Ok(()), |u| validation::validate_url("avatar", "Avatar", u)),
            banner.map_or(Ok(()), |u| validation::validate_url("banner", "Banner", u)),
        ]);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            bio: bio.map(str::to_string),
            avatar: avatar.map(|url| Media {
                url: url.to_string(),
                alt: "User avatar".to_string(),
            }),
            banner: banner.map(|url| Media {
                url: url.to_string(),
                alt: "User banner".to_string(),
            }),
        })
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 2. 회원가입 후 로그인
pub async fn register(
    api: &impl AuctionApi,
    sessions: &impl SessionStore,
    events: &EventBus,
    form: RegisterForm,
) -> Result<Session, AppError> {
    let request = form.validate()?;
    info!("{:<12} --> 회원가입 요청: {}", "Auth", request.name);

    let profile = api.register(&request).await?;
    info!("{:<12} --> 회원가입 성공: {}", "Auth", profile.name);

    login(api, sessions, events, &request.email, &request.password).await
}
// endregion: --- Register

// region:    --- Logout
/// 3. 로그아웃
pub fn logout(sessions: &impl SessionStore, events: &EventBus) -> Result<(), AppError> {
    sessions.clear()?;
    events.publish(AppEvent::LoggedOut);
    Ok(())
}
// endregion: --- Logout

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            name: "ola_nordmann".to_string(),
            email: "ola@stud.noroff.no".to_string(),
            password: "supersecret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn login_requires_student_email() {
        let err = validate_login("ola@gmail.com", "pw").unwrap_err();
        assert_eq!(err.field_errors()[0].field, "email");
        assert!(validate_login("ola@stud.noroff.no", "pw").is_ok());
        assert!(validate_login("ola@stud.noroff.no", "").is_err());
    }

    #[test]
    fn register_form_reports_every_problem() {
        let err = RegisterForm {
            name: "ola nordmann".to_string(),
            email: "ola@example.com".to_string(),
            password: "short".to_string(),
            bio: Some("b".repeat(161)),
            avatar: Some("not-a-url".to_string()),
            banner: Some("https://img.example/banner.png".to_string()),
        }
        .validate()
        .unwrap_err();

        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "password", "bio", "avatar"]);
    }

    #[test]
    fn register_form_builds_request() {
        let request = RegisterForm {
            avatar: Some(" https://img.example/a.png ".to_string()),
            bio: Some("   ".to_string()),
            ..form()
        }
        .validate()
        .unwrap();

        assert_eq!(request.name, "ola_nordmann");
        assert_eq!(request.bio, None);
        let avatar = request.avatar.unwrap();
        assert_eq!(avatar.url, "https://img.example/a.png");
        assert_eq!(avatar.alt, "User avatar");
        assert!(request.banner.is_none());
    }
}
