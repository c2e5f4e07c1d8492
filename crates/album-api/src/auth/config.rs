//! 검증된 인증 런타임 설정.
//!
//! [`AuthSettings`](album_core::AuthSettings)의 원시 값을 시작 시점에 한 번 검증하여
//! 불변 [`AuthConfig`]로 변환합니다. 이후에는 `Arc`로 공유되며 변경되지 않습니다.

use std::str::FromStr;

use album_core::{AuthSettings, ConfigError, ConfigResult};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use secrecy::{ExposeSecret, SecretString};

use super::claims::RESERVED_CLAIMS;

/// 토큰 유효 시간과 갱신 기간의 상한 (10년, 초).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

fn seconds(field: &'static str, value: i64) -> ConfigResult<Duration> {
    Duration::try_seconds(value)
        .ok_or_else(|| ConfigError::invalid(field, format!("범위를 벗어난 값: {}", value)))
}

/// 토큰 조회 위치.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// 요청 헤더 (예: `Authorization`)
    Header(String),
    /// 쿼리 파라미터 (예: `token`)
    Query(String),
    /// 쿠키 (예: `jwt`)
    Cookie(String),
}

impl TokenSource {
    /// `"header: Authorization, query: token, cookie: jwt"` 형식의 문자열을 파싱합니다.
    ///
    /// 순서가 유지되며, 빈 항목은 무시합니다.
    pub fn parse_lookup(lookup: &str) -> ConfigResult<Vec<TokenSource>> {
        let mut sources = Vec::new();

        for entry in lookup.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let (kind, name) = entry.split_once(':').ok_or_else(|| {
                ConfigError::invalid("auth.token_lookup", format!("'{}'에 ':'가 없습니다", entry))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::invalid(
                    "auth.token_lookup",
                    format!("'{}'의 이름이 비어 있습니다", entry),
                ));
            }

            let source = match kind.trim().to_ascii_lowercase().as_str() {
                "header" => TokenSource::Header(name.to_string()),
                "query" => TokenSource::Query(name.to_string()),
                "cookie" => TokenSource::Cookie(name.to_string()),
                other => {
                    return Err(ConfigError::invalid(
                        "auth.token_lookup",
                        format!("알 수 없는 조회 위치: {}", other),
                    ))
                }
            };
            sources.push(source);
        }

        if sources.is_empty() {
            return Err(ConfigError::invalid(
                "auth.token_lookup",
                "최소 하나의 조회 위치가 필요합니다",
            ));
        }

        Ok(sources)
    }
}

/// 토큰 쿠키 설정.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// 로그인 응답에 `Set-Cookie`를 포함할지 여부
    pub send_cookie: bool,
    /// 쿠키 이름
    pub name: String,
    /// Secure 속성
    pub secure: bool,
    /// HttpOnly 속성
    pub http_only: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            send_cookie: false,
            name: "jwt".to_string(),
            secure: false,
            http_only: true,
        }
    }
}

/// 인증 런타임 설정.
///
/// `Clone`을 구현하지 않습니다. 서명 키의 복사본이 퍼지지 않도록
/// [`TokenService`](super::TokenService)가 소유하고 `Arc`로 공유합니다.
#[derive(Debug)]
pub struct AuthConfig {
    secret_key: SecretString,
    /// 토큰 유효 시간
    pub timeout: Duration,
    /// 최초 발급 시점 기준 최대 갱신 가능 시간
    pub max_refresh: Duration,
    /// `WWW-Authenticate` realm
    pub realm: String,
    /// Authorization 헤더 스킴 (빈 문자열이면 헤더 값 전체를 토큰으로 사용)
    pub token_head_name: String,
    /// 토큰 조회 순서
    pub token_lookup: Vec<TokenSource>,
    /// 사용자 식별자 claim 키
    pub identity_key: String,
    /// HMAC 서명 알고리즘
    pub algorithm: Algorithm,
    /// 쿠키 설정
    pub cookie: CookieSettings,
}

impl AuthConfig {
    /// 기본값으로 설정을 생성합니다.
    ///
    /// 기본값: timeout/max_refresh 1시간, realm `"album zone"`, 식별자 키 `"id"`,
    /// HS256, 조회 순서 `header: Authorization, query: token, cookie: jwt`.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::from(secret_key.into()),
            timeout: Duration::hours(1),
            max_refresh: Duration::hours(1),
            realm: "album zone".to_string(),
            token_head_name: "Bearer".to_string(),
            token_lookup: vec![
                TokenSource::Header("Authorization".to_string()),
                TokenSource::Query("token".to_string()),
                TokenSource::Cookie("jwt".to_string()),
            ],
            identity_key: "id".to_string(),
            algorithm: Algorithm::HS256,
            cookie: CookieSettings::default(),
        }
    }

    /// 토큰 유효 시간 설정.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 최대 갱신 가능 시간 설정.
    pub fn with_max_refresh(mut self, max_refresh: Duration) -> Self {
        self.max_refresh = max_refresh;
        self
    }

    /// 토큰 조회 순서 설정.
    pub fn with_token_lookup(mut self, lookup: Vec<TokenSource>) -> Self {
        self.token_lookup = lookup;
        self
    }

    /// 서명 알고리즘 설정.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 쿠키 설정.
    pub fn with_cookie(mut self, cookie: CookieSettings) -> Self {
        self.cookie = cookie;
        self
    }

    /// 서명 키 바이트.
    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.secret_key.expose_secret().as_bytes()
    }

    /// 설정 값 검증.
    ///
    /// # Errors
    ///
    /// - 서명 키가 비어 있음
    /// - `timeout <= 0` 또는 `max_refresh < timeout`
    /// - `max_refresh`가 [`MAX_TOKEN_LIFETIME_SECS`]를 넘음
    /// - 식별자 키가 비어 있거나 예약된 claim 이름과 겹침
    /// - HMAC 계열이 아닌 알고리즘
    /// - 조회 위치가 없음
    pub fn validate(&self) -> ConfigResult<()> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(ConfigError::Missing("auth.secret_key"));
        }

        if self.timeout <= Duration::zero() {
            return Err(ConfigError::invalid(
                "auth.timeout_secs",
                "0보다 커야 합니다",
            ));
        }

        if self.max_refresh < self.timeout {
            return Err(ConfigError::invalid(
                "auth.max_refresh_secs",
                "timeout 이상이어야 합니다",
            ));
        }

        if self.max_refresh > Duration::seconds(MAX_TOKEN_LIFETIME_SECS) {
            return Err(ConfigError::invalid(
                "auth.max_refresh_secs",
                format!("{}초 이하여야 합니다", MAX_TOKEN_LIFETIME_SECS),
            ));
        }

        if self.identity_key.is_empty() || RESERVED_CLAIMS.contains(&self.identity_key.as_str()) {
            return Err(ConfigError::invalid(
                "auth.identity_key",
                format!("사용할 수 없는 claim 이름: '{}'", self.identity_key),
            ));
        }

        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::invalid(
                "auth.signing_algorithm",
                format!("지원하지 않는 알고리즘: {:?}", self.algorithm),
            ));
        }

        if self.token_lookup.is_empty() {
            return Err(ConfigError::invalid(
                "auth.token_lookup",
                "최소 하나의 조회 위치가 필요합니다",
            ));
        }

        Ok(())
    }
}

impl TryFrom<&AuthSettings> for AuthConfig {
    type Error = ConfigError;

    fn try_from(settings: &AuthSettings) -> Result<Self, Self::Error> {
        let algorithm = Algorithm::from_str(settings.signing_algorithm.trim()).map_err(|_| {
            ConfigError::invalid(
                "auth.signing_algorithm",
                format!("알 수 없는 알고리즘: {}", settings.signing_algorithm),
            )
        })?;

        let config = AuthConfig {
            secret_key: SecretString::from(settings.secret_key.clone()),
            timeout: seconds("auth.timeout_secs", settings.timeout_secs)?,
            max_refresh: seconds("auth.max_refresh_secs", settings.max_refresh_secs)?,
            realm: settings.realm.clone(),
            token_head_name: settings.token_head_name.trim().to_string(),
            token_lookup: TokenSource::parse_lookup(&settings.token_lookup)?,
            identity_key: settings.identity_key.clone(),
            algorithm,
            cookie: CookieSettings {
                send_cookie: settings.send_cookie,
                name: settings.cookie_name.clone(),
                secure: settings.cookie_secure,
                http_only: settings.cookie_http_only,
            },
        };

        config.validate()?;
        Ok(config)
    }
}
