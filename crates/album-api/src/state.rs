//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유되며, 서빙 시작 후에는 변경되지 않습니다.

use std::sync::Arc;

use crate::auth::{AuthProvider, CredentialVerifier, TokenService};
use crate::repository::{AlbumStore, InMemoryAlbumStore};

/// 인증 구성 요소.
#[derive(Clone)]
pub struct AuthServices {
    /// 토큰 발급/검증
    pub tokens: Arc<TokenService>,
    /// 자격증명 검증기
    pub verifier: Arc<dyn CredentialVerifier>,
}

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 앨범 저장소 (PostgreSQL 또는 인메모리)
    pub albums: Arc<dyn AlbumStore>,

    /// 인증 구성 요소 (인증 비활성화 시 None)
    pub auth: Option<AuthServices>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `albums` - 앨범 저장소
    pub fn new(albums: Arc<dyn AlbumStore>) -> Self {
        Self {
            albums,
            auth: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 샘플 데이터가 들어 있는 인메모리 저장소로 상태를 생성합니다.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAlbumStore::seeded()))
    }

    /// 인증 구성 요소 설정.
    pub fn with_auth(
        mut self,
        tokens: Arc<TokenService>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        self.auth = Some(AuthServices { tokens, verifier });
        self
    }

    /// 인증 활성화 여부.
    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 앨범 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        match self.albums.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(backend = self.albums.backend(), error = %e, "Album store health check failed");
                false
            }
        }
    }
}

impl AuthProvider for AppState {
    fn token_service(&self) -> Option<&TokenService> {
        self.auth.as_ref().map(|auth| auth.tokens.as_ref())
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 인메모리 저장소와 기본 계정(admin/admin, test/test)으로 인증을 구성합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use crate::auth::{AuthConfig, StaticCredentialVerifier};
    use album_core::AuthSettings;

    let tokens = TokenService::new(AuthConfig::new("test-secret-key-for-album-api"))
        .expect("valid test auth config");
    let verifier = StaticCredentialVerifier::new(&AuthSettings::default().users)
        .expect("hash test accounts");

    AppState::in_memory().with_auth(Arc::new(tokens), Arc::new(verifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_state() {
        let state = AppState::in_memory();
        assert!(!state.has_auth());
        assert!(state.token_service().is_none());
        assert!(state.is_store_healthy().await);
        assert!(state.uptime_secs() >= 0);
    }

    #[test]
    fn test_state_with_auth() {
        let state = Arc::new(create_test_state());
        assert!(state.has_auth());
        assert!(state.token_service().is_some());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}
