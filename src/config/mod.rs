/// 클라이언트 설정
/// 환경 변수(.env 포함)에서 읽고, 값이 없거나 잘못되면 기본값을 쓴다.
// region:    --- Imports
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

// endregion: --- Imports

pub const DEFAULT_API_URL: &str = "https://v2.api.noroff.dev/";
pub const DEFAULT_SESSION_FILE: &str = ".auction-house/session.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// region:    --- Config
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn load() -> Self {
        let api_key = var("AUCTION_API_KEY").filter(|k| !k.trim().is_empty());

        Self {
            api_url: try_load("AUCTION_API_URL", DEFAULT_API_URL.to_string()),
            api_key,
            session_file: PathBuf::from(try_load::<String>(
                "AUCTION_SESSION_FILE",
                DEFAULT_SESSION_FILE.to_string(),
            )),
            timeout: Duration::from_secs(try_load("AUCTION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// CLI 인자로 덮어쓰기
    pub fn with_overrides(mut self, api_url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
        self
    }
}
// endregion: --- Config

// region:    --- Helpers
fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{:<12} --> {} 미설정, 기본값 사용: {}", "Config", key, default);
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!(
                "{:<12} --> {} 값이 잘못되었습니다 ({}), 기본값 사용: {}",
                "Config", key, e, default
            );
            default
        }),
    }
}
// endregion: --- Helpers
