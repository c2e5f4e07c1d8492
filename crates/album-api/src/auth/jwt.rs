//! JWT 토큰 발급, 검증, 갱신.
//!
//! 만료 판정은 호출자가 전달한 `now` 기준으로 직접 수행합니다.
//! jsonwebtoken의 `Validation`은 서명과 알고리즘만 검사합니다.

use axum::http::{HeaderMap, Uri};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use album_core::ConfigError;

use super::{
    claims::{CLAIM_EXPIRES_AT, CLAIM_ISSUED_AT, CLAIM_ORIG_ISSUED_AT},
    extract_token, AuthConfig, AuthError, AuthRejection, Claims, ClaimsCodec, Identity,
};
use crate::metrics;

/// 발급된 토큰.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// 서명된 JWT 문자열
    pub token: String,
    /// 만료 시각
    pub expire: DateTime<Utc>,
}

/// 검증된 토큰.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// 토큰에서 복원한 사용자
    pub identity: Identity,
    /// 전체 Claims
    pub claims: Claims,
}

/// 토큰 서비스.
///
/// 시작 시점에 한 번 생성되며 이후 읽기 전용입니다. 락 없이 여러 요청에서 공유됩니다.
pub struct TokenService {
    config: AuthConfig,
    codec: ClaimsCodec,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// 설정을 검증하고 서비스를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `ConfigError`.
    pub fn new(config: AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Ok(Self {
            codec: ClaimsCodec::new(config.identity_key.clone()),
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// 설정.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Claims 코덱.
    pub fn codec(&self) -> &ClaimsCodec {
        &self.codec
    }

    /// 새 토큰 발급.
    ///
    /// `iat = orig_iat = now`, `exp = now + timeout`. 무작위 claim이 없으므로
    /// 같은 입력에 대해 같은 토큰을 만듭니다.
    ///
    /// # Errors
    ///
    /// 서명 실패 또는 만료 시각이 표현 범위를 벗어나면 `Internal`.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let issued_at = now.timestamp();
        let expire = self.expire_after(now)?;

        let mut claims = self.codec.encode(identity);
        claims.insert(CLAIM_ISSUED_AT, issued_at);
        claims.insert(CLAIM_ORIG_ISSUED_AT, issued_at);
        claims.insert(CLAIM_EXPIRES_AT, expire.timestamp());

        let token = self.sign(&claims)?;
        metrics::record_token_issued("login");

        Ok(IssuedToken { token, expire })
    }

    /// 토큰 검증.
    ///
    /// # Errors
    ///
    /// - 서명 불일치, 다른 알고리즘, 잘못된 인코딩, `exp` 누락: `TokenInvalid`
    /// - `now >= exp`: `TokenExpired`
    /// - 식별자 claim 이상: `InvalidClaims`
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, AuthError> {
        let claims = self.decode_signed(token)?;

        let expires_at = claims.expires_at().ok_or(AuthError::TokenInvalid)?;
        if now.timestamp() >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        let identity = self.codec.decode(&claims)?;
        Ok(VerifiedToken { identity, claims })
    }

    /// 토큰 갱신.
    ///
    /// 기존 토큰의 만료는 무시하지만 `now <= orig_iat + max_refresh`는 지켜야 합니다.
    /// 새 토큰은 원래의 `orig_iat`를 유지하고, 만료 시각은 갱신 상한을 넘지 않습니다.
    ///
    /// 상한 시각과 정확히 같은 `now`에 갱신하면 성공하지만 `expire == now`인 토큰이
    /// 발급되며, 이 토큰은 `verify`에서 곧바로 `TokenExpired`가 됩니다.
    /// 갱신 기간이 끝났다는 신호로 다루면 됩니다.
    ///
    /// # Errors
    ///
    /// - 서명 불일치 또는 `orig_iat` 누락: `TokenInvalid`
    /// - 갱신 가능 기간 초과: `RefreshExpired`
    /// - 만료 시각이 표현 범위를 벗어남: `Internal`
    pub fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let old = self.decode_signed(token)?;

        let orig_iat = old.original_issued_at().ok_or(AuthError::TokenInvalid)?;
        let ceiling = orig_iat.saturating_add(self.config.max_refresh.num_seconds());
        if now.timestamp() > ceiling {
            return Err(AuthError::RefreshExpired);
        }

        let identity = self.codec.decode(&old)?;

        let expire_ts = self.expire_after(now)?.timestamp().min(ceiling);
        let expire = DateTime::<Utc>::from_timestamp(expire_ts, 0).unwrap_or(now);

        let mut claims = self.codec.encode(&identity);
        claims.insert(CLAIM_ISSUED_AT, now.timestamp());
        claims.insert(CLAIM_ORIG_ISSUED_AT, orig_iat);
        claims.insert(CLAIM_EXPIRES_AT, expire_ts);

        let token = self.sign(&claims)?;
        metrics::record_token_issued("refresh");

        Ok(IssuedToken { token, expire })
    }

    /// 요청 헤더/URI에서 토큰 문자열을 추출합니다.
    pub fn extract(&self, headers: &HeaderMap, uri: &Uri) -> Result<String, AuthError> {
        extract_token(
            &self.config.token_lookup,
            &self.config.token_head_name,
            headers,
            uri,
        )
    }

    /// 인증 실패를 기록하고 응답으로 변환합니다.
    ///
    /// 사유는 로그와 메트릭에만 남습니다.
    pub fn reject(&self, error: AuthError) -> AuthRejection {
        tracing::debug!(reason = error.reason(), "Authentication rejected");
        metrics::record_token_rejected(error.reason());
        AuthRejection::new(error, self.config.realm.clone())
    }

    fn expire_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AuthError> {
        now.checked_add_signed(self.config.timeout).ok_or_else(|| {
            tracing::error!(%now, "Token expiry out of range");
            AuthError::Internal
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            AuthError::Internal
        })
    }

    fn decode_signed(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::trace!(error = %e, "Token decoding failed");
                AuthError::TokenInvalid
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn service() -> TokenService {
        TokenService::new(
            AuthConfig::new(TEST_SECRET)
                .with_timeout(Duration::hours(1))
                .with_max_refresh(Duration::hours(3)),
        )
        .unwrap()
    }

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    fn admin() -> Identity {
        Identity::new("admin", "Wu", "Bo-Yi")
    }

    const T: i64 = 1_700_000_000;

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let issued = service.issue(&admin(), at(T)).unwrap();

        assert_eq!(issued.expire, at(T + 3600));

        let verified = service.verify(&issued.token, at(T)).unwrap();
        assert_eq!(verified.identity, admin());
        assert_eq!(verified.claims.issued_at(), Some(T));
        assert_eq!(verified.claims.original_issued_at(), Some(T));
        assert_eq!(verified.claims.expires_at(), Some(T + 3600));
    }

    #[test]
    fn test_issue_is_deterministic() {
        let service = service();
        let a = service.issue(&admin(), at(T)).unwrap();
        let b = service.issue(&admin(), at(T)).unwrap();
        assert_eq!(a.token, b.token);
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let token = service.issue(&admin(), at(T)).unwrap().token;

        assert!(service.verify(&token, at(T + 3599)).is_ok());
        assert_eq!(
            service.verify(&token, at(T + 3600)).unwrap_err(),
            AuthError::TokenExpired
        );
        assert_eq!(
            service.verify(&token, at(T + 7200)).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn test_tampered_signature() {
        let service = service();
        let token = service.issue(&admin(), at(T)).unwrap().token;

        let signature_start = token.rfind('.').unwrap() + 1;
        let index = signature_start + (token.len() - signature_start) / 2;
        let original = token.as_bytes()[index] as char;
        let replacement = if original == 'A' { 'B' } else { 'A' };

        let mut tampered = token.clone();
        tampered.replace_range(index..=index, &replacement.to_string());

        assert_eq!(
            service.verify(&tampered, at(T)).unwrap_err(),
            AuthError::TokenInvalid
        );
    }

    #[test]
    fn test_wrong_secret_and_algorithm() {
        let token = service().issue(&admin(), at(T)).unwrap().token;

        let other = TokenService::new(AuthConfig::new("another-secret")).unwrap();
        assert_eq!(other.verify(&token, at(T)).unwrap_err(), AuthError::TokenInvalid);

        let hs512 = TokenService::new(
            AuthConfig::new(TEST_SECRET).with_algorithm(jsonwebtoken::Algorithm::HS512),
        )
        .unwrap();
        assert_eq!(hs512.verify(&token, at(T)).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_garbage_token() {
        let service = service();
        for token in ["", "invalid", "invalid.token.here", "a.b"] {
            assert_eq!(
                service.verify(token, at(T)).unwrap_err(),
                AuthError::TokenInvalid
            );
        }
    }

    #[test]
    fn test_refresh_window() {
        let service = service();
        let token = service.issue(&admin(), at(T)).unwrap().token;

        // 원래 토큰이 만료된 후에도 갱신 가능
        let refreshed = service.refresh(&token, at(T + 7200)).unwrap();
        let verified = service.verify(&refreshed.token, at(T + 7200)).unwrap();
        assert_eq!(verified.identity.user_name(), "admin");
        assert_eq!(verified.claims.original_issued_at(), Some(T));
        assert_eq!(verified.claims.issued_at(), Some(T + 7200));
        assert_eq!(refreshed.expire, at(T + 7200 + 3600));

        // 상한 경계: 포함
        assert!(service.refresh(&token, at(T + 3 * 3600)).is_ok());
        assert_eq!(
            service.refresh(&token, at(T + 3 * 3600 + 1)).unwrap_err(),
            AuthError::RefreshExpired
        );
    }

    #[test]
    fn test_refresh_never_moves_ceiling() {
        let service = service();
        let token = service.issue(&admin(), at(T)).unwrap().token;

        // 상한 30분 전 갱신: 만료는 상한으로 잘림
        let late = service.refresh(&token, at(T + 3 * 3600 - 1800)).unwrap();
        assert_eq!(late.expire, at(T + 3 * 3600));

        // 갱신된 토큰을 다시 갱신해도 orig_iat 기준 상한은 동일
        assert_eq!(
            service.refresh(&late.token, at(T + 3 * 3600 + 1)).unwrap_err(),
            AuthError::RefreshExpired
        );
    }

    #[test]
    fn test_refresh_at_ceiling_yields_already_expired_token() {
        let service = service();
        let token = service.issue(&admin(), at(T)).unwrap().token;

        let last = service.refresh(&token, at(T + 3 * 3600)).unwrap();
        assert_eq!(last.expire, at(T + 3 * 3600));
        assert_eq!(
            service.verify(&last.token, at(T + 3 * 3600)).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn test_signed_token_without_identity_claim() {
        let service = service();

        let mut claims = Claims::new();
        claims.insert(CLAIM_ISSUED_AT, T);
        claims.insert(CLAIM_ORIG_ISSUED_AT, T);
        claims.insert(CLAIM_EXPIRES_AT, T + 3600);
        let token = service.sign(&claims).unwrap();

        assert_eq!(
            service.verify(&token, at(T)).unwrap_err(),
            AuthError::InvalidClaims
        );
        assert_eq!(
            service.refresh(&token, at(T)).unwrap_err(),
            AuthError::InvalidClaims
        );
    }

    #[test]
    fn test_expiry_overflow_is_internal_error() {
        let service = service();
        assert_eq!(
            service.issue(&admin(), DateTime::<Utc>::MAX_UTC).unwrap_err(),
            AuthError::Internal
        );
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        let huge = Duration::seconds(9_000_000_000_000);
        assert!(TokenService::new(
            AuthConfig::new(TEST_SECRET)
                .with_timeout(huge)
                .with_max_refresh(huge)
        )
        .is_err());
    }

    #[test]
    fn test_custom_identity_key_round_trip() {
        let mut config = AuthConfig::new(TEST_SECRET);
        config.identity_key = "user".to_string();
        let service = TokenService::new(config).unwrap();

        let token = service.issue(&admin(), at(T)).unwrap().token;
        let verified = service.verify(&token, at(T)).unwrap();
        assert_eq!(verified.claims.get_str("user"), Some("admin"));
        assert!(verified.claims.get("id").is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(TokenService::new(AuthConfig::new("")).is_err());
        assert!(TokenService::new(
            AuthConfig::new(TEST_SECRET)
                .with_timeout(Duration::hours(2))
                .with_max_refresh(Duration::hours(1))
        )
        .is_err());
    }
}
