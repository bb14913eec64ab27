// region:    --- Imports
use crate::error::FieldError;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use url::Url;

// endregion: --- Imports

/// 가입/로그인 가능한 이메일 도메인
pub const EMAIL_DOMAIN: &str = "@stud.noroff.no";
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_BIO_LEN: usize = 160;

// region:    --- Field Validators
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FieldError::new("email", "Email is required."));
    }
    if !email.ends_with(EMAIL_DOMAIN) || email.len() == EMAIL_DOMAIN.len() {
        return Err(FieldError::new(
            "email",
            format!("Email must end with {}.", EMAIL_DOMAIN),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.trim().is_empty() {
        return Err(FieldError::new("password", "Password is required."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// 사용자 이름: 영문, 숫자, 밑줄만 허용
pub fn validate_username(name: &str) -> Result<(), FieldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::new("name", "Username is required."));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FieldError::new(
            "name",
            "Username can only contain letters, numbers, and underscores.",
        ));
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), FieldError> {
    if bio.chars().count() > MAX_BIO_LEN {
        return Err(FieldError::new(
            "bio",
            format!("Bio must be less than {} characters.", MAX_BIO_LEN),
        ));
    }
    Ok(())
}

/// http(s) URL 인지 검사
pub fn validate_url(field: &'static str, label: &str, value: &str) -> Result<(), FieldError> {
    let invalid = || FieldError::new(field, format!("{} must be a valid URL.", label));
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(()),
        _ => Err(invalid()),
    }
}

/// 종료 시각 파싱. RFC 3339 또는 로컬 시각 `YYYY-MM-DDTHH:MM` 을 받는다
pub fn parse_ends_at(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::new("endsAt", "End date is required."));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            FieldError::new(
                "endsAt",
                "End date must look like 2025-06-01T18:00 or an RFC 3339 timestamp.",
            )
        })
}

/// 여러 검증 결과를 모은다
pub fn collect(results: impl IntoIterator<Item = Result<(), FieldError>>) -> Vec<FieldError> {
    results.into_iter().filter_map(Result::err).collect()
}
// endregion: --- Field Validators

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn email_domain_is_enforced() {
        assert!(validate_email("ola@stud.noroff.no").is_ok());
        assert!(validate_email("ola@gmail.com").is_err());
        assert!(validate_email("@stud.noroff.no").is_err());
        assert_eq!(
            validate_email("  ").unwrap_err().message,
            "Email is required."
        );
    }

    #[test]
    fn password_needs_eight_characters() {
        assert!(validate_password("hunter2").is_err());
        assert!(validate_password("hunter22").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("ola_nordmann2").is_ok());
        assert!(validate_username("ola nordmann").is_err());
        assert!(validate_username("ola-nordmann").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn bio_length_limit() {
        assert!(validate_bio(&"a".repeat(160)).is_ok());
        assert!(validate_bio(&"a".repeat(161)).is_err());
    }

    #[test]
    fn url_validation() {
        assert!(validate_url("avatar", "Avatar", "https://img.example/a.png").is_ok());
        assert!(validate_url("avatar", "Avatar", "not a url").is_err());
        assert!(validate_url("avatar", "Avatar", "ftp://img.example/a.png").is_err());
        assert_eq!(
            validate_url("banner", "Banner", "x").unwrap_err().message,
            "Banner must be a valid URL."
        );
    }

    #[test]
    fn ends_at_accepts_rfc3339_and_local() {
        let ts = parse_ends_at("2030-01-02T03:04:05Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2030-01-02T03:04:05+00:00");

        let local = parse_ends_at("2030-06-01T18:00").unwrap();
        assert_eq!(local.year(), 2030);

        assert!(parse_ends_at("tomorrow").is_err());
        assert!(parse_ends_at("").is_err());
    }

    #[test]
    fn collect_keeps_only_errors() {
        let errors = collect([
            validate_email("ola@stud.noroff.no"),
            validate_password("short"),
            validate_username("bad name"),
        ]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "password");
        assert_eq!(errors[1].field, "name");
    }
}
