//! 앨범 서비스 공통 에러 타입.

use thiserror::Error;

/// 설정 로드/검증 에러.
///
/// 모두 시작 시점에 발생하며 프로세스를 종료시키는 치명적 에러로 취급됩니다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 설정 소스(파일, 환경 변수) 로드 실패
    #[error("설정 로드 실패: {0}")]
    Load(#[from] config::ConfigError),

    /// 필수 값 누락
    #[error("필수 설정 누락: {0}")]
    Missing(&'static str),

    /// 잘못된 설정 값
    #[error("잘못된 설정 값 ({field}): {reason}")]
    Invalid {
        /// 설정 키
        field: &'static str,
        /// 사유
        reason: String,
    },
}

impl ConfigError {
    /// `Invalid` 에러를 생성합니다.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// 설정 작업을 위한 Result 타입.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_contains_field() {
        let err = ConfigError::invalid("auth.timeout_secs", "0 이하");
        let message = err.to_string();
        assert!(message.contains("auth.timeout_secs"));
        assert!(message.contains("0 이하"));
    }
}
