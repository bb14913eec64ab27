// region:    --- Imports
use std::fmt;
use thiserror::Error;

// endregion: --- Imports

/// 서버가 메시지를 주지 않았을 때 쓰는 기본 메시지
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

// region:    --- Api Error
/// API 게이트웨이 에러
#[derive(Debug, Error)]
pub enum ApiError {
    /// 2xx 가 아닌 응답
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// 네트워크/전송 실패
    #[error("Request failed. Check your connection and try again.")]
    Transport(#[source] reqwest::Error),

    /// 응답 바디 해석 실패
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Invalid API url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e)
        }
    }
}
// endregion: --- Api Error

// region:    --- Field Error
/// 입력 검증 실패 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
// endregion: --- Field Error

// region:    --- App Error
/// 화면 흐름(로그인, 입찰, 상품 관리 등)에서 쓰는 에러
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", join_messages(.0))]
    Validation(Vec<FieldError>),

    #[error("You are not authenticated. Please log in first.")]
    NotAuthenticated,

    #[error("No changes made.")]
    NoChanges,

    #[error("Only the seller can manage this listing.")]
    NotOwner,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session storage failed: {0}")]
    Session(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
// endregion: --- App Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_joins_messages() {
        let err = AppError::Validation(vec![
            FieldError::new("email", "Email is required."),
            FieldError::new("password", "Password is required."),
        ]);
        assert_eq!(err.to_string(), "Email is required. Password is required.");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn remote_error_shows_server_message() {
        let err = AppError::from(ApiError::Remote {
            status: 400,
            message: "Bid too low".to_string(),
        });
        assert_eq!(err.to_string(), "Bid too low");
    }
}
