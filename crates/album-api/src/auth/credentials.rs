//! 자격증명 검증.
//!
//! Argon2 기반 비밀번호 해싱과 허용 계정 목록 검증기.

use std::collections::HashMap;

use album_core::UserAccount;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use serde::Deserialize;

use super::{AuthError, Identity};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하며 솔트는 자동으로 생성됩니다.
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 비밀번호가 일치하면 Ok(()), 불일치하면 Err.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 로그인 자격증명.
///
/// 저장되지 않으며 로그에도 남지 않습니다.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 자격증명 검증기.
///
/// 토큰 서비스와 분리되어 있어 실제 사용자 저장소로 교체할 수 있습니다.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// 자격증명을 검증하고 Identity를 반환합니다.
    ///
    /// # Errors
    ///
    /// - 아이디 또는 비밀번호가 비어 있으면 `MissingLoginValues`
    /// - 일치하는 계정이 없으면 `FailedAuthentication`
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
}

struct StoredAccount {
    password_hash: String,
    first_name: String,
    last_name: String,
}

/// 고정 허용 목록 기반 검증기.
///
/// 평문 비밀번호는 생성 시 해싱 후 버립니다.
pub struct StaticCredentialVerifier {
    accounts: HashMap<String, StoredAccount>,
}

impl StaticCredentialVerifier {
    /// 계정 목록으로 검증기를 생성합니다.
    ///
    /// 같은 아이디가 여러 번 나오면 마지막 항목이 사용됩니다.
    pub fn new(accounts: &[UserAccount]) -> Result<Self, PasswordError> {
        let accounts = accounts
            .iter()
            .filter(|account| !account.username.is_empty())
            .map(|account| {
                let stored = StoredAccount {
                    password_hash: hash_password(&account.password)?,
                    first_name: account.first_name.clone(),
                    last_name: account.last_name.clone(),
                };
                Ok((account.username.clone(), stored))
            })
            .collect::<Result<HashMap<_, _>, PasswordError>>()?;

        tracing::debug!(accounts = accounts.len(), "Credential allow-list loaded");

        Ok(Self { accounts })
    }

    /// 등록된 계정 수.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl std::fmt::Debug for StaticCredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialVerifier")
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingLoginValues);
        }

        let account = self
            .accounts
            .get(&credentials.username)
            .ok_or(AuthError::FailedAuthentication)?;

        verify_password(&credentials.password, &account.password_hash)
            .map_err(|_| AuthError::FailedAuthentication)?;

        Ok(Identity::new(
            credentials.username.clone(),
            account.first_name.clone(),
            account.last_name.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use album_core::AuthSettings;
    use proptest::prelude::*;

    fn verifier() -> StaticCredentialVerifier {
        StaticCredentialVerifier::new(&AuthSettings::default().users).unwrap()
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("admin").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin", &hash).is_ok());
        assert!(verify_password("Admin", &hash).is_err());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[tokio::test]
    async fn test_allow_list_accounts() {
        let verifier = verifier();
        assert_eq!(verifier.len(), 2);

        for name in ["admin", "test"] {
            let identity = verifier
                .authenticate(&Credentials::new(name, name))
                .await
                .unwrap();
            assert_eq!(identity, Identity::new(name, "Wu", "Bo-Yi"));
        }
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let verifier = verifier();

        let wrong = verifier.authenticate(&Credentials::new("admin", "test")).await;
        assert_eq!(wrong, Err(AuthError::FailedAuthentication));

        let unknown = verifier.authenticate(&Credentials::new("guest", "guest")).await;
        assert_eq!(unknown, Err(AuthError::FailedAuthentication));
    }

    #[tokio::test]
    async fn test_missing_values() {
        let verifier = verifier();

        for credentials in [
            Credentials::new("", "admin"),
            Credentials::new("admin", ""),
            Credentials::default(),
        ] {
            assert_eq!(
                verifier.authenticate(&credentials).await,
                Err(AuthError::MissingLoginValues)
            );
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    fn shared_verifier() -> &'static StaticCredentialVerifier {
        static VERIFIER: std::sync::OnceLock<StaticCredentialVerifier> = std::sync::OnceLock::new();
        VERIFIER.get_or_init(verifier)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_only_allow_list_pairs_authenticate(
            username in prop_oneof![Just("admin".to_string()), Just("test".to_string()), "[a-z]{1,8}"],
            password in "[a-zA-Z0-9]{1,12}",
        ) {
            prop_assume!(!(username == password && (username == "admin" || username == "test")));

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = runtime.block_on(
                shared_verifier().authenticate(&Credentials::new(username, password)),
            );
            prop_assert_eq!(result, Err(AuthError::FailedAuthentication));
        }
    }
}
