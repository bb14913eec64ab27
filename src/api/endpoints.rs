/// 로그인
pub const LOGIN: &[&str] = &["auth", "login"];

/// 회원가입
pub const REGISTER: &[&str] = &["auth", "register"];

/// 모든 상품 조회 / 상품 생성
pub const LISTINGS: &[&str] = &["auction", "listings"];

/// 모든 프로필 조회
pub const PROFILES: &[&str] = &["auction", "profiles"];

/// 프로필 검색 (`?q=`)
pub const PROFILE_SEARCH: &[&str] = &["auction", "profiles", "search"];

/// API 키 헤더 이름
pub const API_KEY_HEADER: &str = "X-Noroff-API-Key";

/// 상품 단건 조회 / 수정 / 삭제
pub fn listing(id: &str) -> Vec<&str> {
    vec!["auction", "listings", id]
}

/// 상품 입찰
pub fn listing_bids(id: &str) -> Vec<&str> {
    vec!["auction", "listings", id, "bids"]
}

/// 프로필 단건 조회 / 수정
pub fn profile(name: &str) -> Vec<&str> {
    vec!["auction", "profiles", name]
}

/// 프로필의 상품 목록
pub fn profile_listings(name: &str) -> Vec<&str> {
    vec!["auction", "profiles", name, "listings"]
}

/// 프로필의 입찰 이력
pub fn profile_bids(name: &str) -> Vec<&str> {
    vec!["auction", "profiles", name, "bids"]
}

/// 프로필의 낙찰 목록
pub fn profile_wins(name: &str) -> Vec<&str> {
    vec!["auction", "profiles", name, "wins"]
}
