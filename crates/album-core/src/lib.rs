//! # Album Core
//!
//! 앨범 서비스의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! - 앨범 도메인 타입
//! - 설정 관리
//! - 로깅 인프라
//! - 공통 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use self::config::{
    AppConfig, AuthSettings, DatabaseConfig, LoggingConfig, ServerConfig, UserAccount,
    DEFAULT_CONFIG_PATH,
};
pub use self::domain::*;
pub use self::error::{ConfigError, ConfigResult};
pub use self::logging::{init_logging, LogConfig, LogFormat};
