//! 설정 관리.
//!
//! 기본값 → 설정 파일 → 환경 변수 순서로 애플리케이션 설정을 구성합니다.
//!
//! # 환경 변수
//!
//! `ALBUM` 접두사와 `__` 구분자를 사용합니다.
//!
//! - `ALBUM__SERVER__PORT=9000`
//! - `ALBUM__AUTH__SECRET_KEY=...`
//! - `ALBUM__AUTH__TIMEOUT_SECS=900`
//!
//! `DATABASE_URL`은 `database.url`이 비어 있을 때의 대체값으로 사용됩니다.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// 설정 파일 기본 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 허용할 CORS origin 목록 (비어 있으면 모두 허용)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `ConfigError::Invalid`를 반환합니다.
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid("server.host", e.to_string()))
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL (없으면 인메모리 저장소 사용)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 인증 설정 (원시 값).
///
/// 검증된 런타임 설정으로의 변환은 API 크레이트의 `AuthConfig`가 담당합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSettings {
    /// 인증 레이어 활성화 여부
    pub enabled: bool,
    /// HMAC 서명 키
    pub secret_key: String,
    /// `WWW-Authenticate` 헤더에 표시할 realm
    pub realm: String,
    /// 토큰 유효 시간 (초)
    pub timeout_secs: i64,
    /// 최초 발급 시점부터 갱신 가능한 최대 시간 (초)
    pub max_refresh_secs: i64,
    /// 토큰 조회 순서 (예: "header: Authorization, query: token, cookie: jwt")
    pub token_lookup: String,
    /// Authorization 헤더의 스킴 이름
    pub token_head_name: String,
    /// Claims 안에서 사용자 식별자를 담는 키
    pub identity_key: String,
    /// 서명 알고리즘 (HS256, HS384, HS512)
    pub signing_algorithm: String,
    /// 로그인 시 토큰을 쿠키로도 전달할지 여부
    pub send_cookie: bool,
    /// 토큰 쿠키 이름
    pub cookie_name: String,
    /// 쿠키 Secure 속성
    pub cookie_secure: bool,
    /// 쿠키 HttpOnly 속성
    pub cookie_http_only: bool,
    /// 허용 계정 목록
    pub users: Vec<UserAccount>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            secret_key: String::new(),
            realm: "album zone".to_string(),
            timeout_secs: 3600,
            max_refresh_secs: 3600,
            token_lookup: "header: Authorization, query: token, cookie: jwt".to_string(),
            token_head_name: "Bearer".to_string(),
            identity_key: "id".to_string(),
            signing_algorithm: "HS256".to_string(),
            send_cookie: false,
            cookie_name: "jwt".to_string(),
            cookie_secure: false,
            cookie_http_only: true,
            users: default_users(),
        }
    }
}

/// 허용 계정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAccount {
    /// 로그인 ID
    pub username: String,
    /// 평문 비밀번호 (시작 시 해싱 후 폐기)
    pub password: String,
    /// 이름
    #[serde(default)]
    pub first_name: String,
    /// 성
    #[serde(default)]
    pub last_name: String,
}

fn default_users() -> Vec<UserAccount> {
    ["admin", "test"]
        .into_iter()
        .map(|name| UserAccount {
            username: name.to_string(),
            password: name.to_string(),
            first_name: "Wu".to_string(),
            last_name: "Bo-Yi".to_string(),
        })
        .collect()
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "album_api=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("ALBUM")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;

        if config.database.url.is_none() {
            config.database.url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        }

        Ok(config)
    }

    /// 기본 경로(`ALBUM_CONFIG` 또는 `config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> ConfigResult<Self> {
        let path = std::env::var("ALBUM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }
}
