//! Album Repository
//!
//! 앨범 레코드 저장소. PostgreSQL 구현과 인메모리 구현을 제공합니다.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use album_core::{seed_albums, Album, DatabaseConfig, NewAlbum};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::RwLock;

// ================================================================================================
// Errors
// ================================================================================================

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
    #[error("ID 할당 실패")]
    IdExhausted,
}

pub type StorageResult<T> = Result<T, StorageError>;

// ================================================================================================
// Trait
// ================================================================================================

/// 앨범 저장소.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// 전체 앨범 조회 (ID 오름차순).
    async fn list_albums(&self) -> StorageResult<Vec<Album>>;

    /// 새 앨범 저장. 저장소가 새 ID를 할당합니다.
    async fn insert_album(&self, album: NewAlbum) -> StorageResult<Album>;

    /// ID로 앨범 조회.
    async fn get_album(&self, id: i64) -> StorageResult<Option<Album>>;

    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> StorageResult<()>;

    /// 저장소 종류 (로그/헬스체크 표시용).
    fn backend(&self) -> &'static str;
}

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// PostgreSQL 앨범 저장소.
#[derive(Debug, Clone)]
pub struct PgAlbumStore {
    pool: PgPool,
}

impl PgAlbumStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 설정으로 연결 풀을 생성하고 테이블을 준비합니다.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// `album` 테이블이 없으면 생성합니다.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS album (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                artist VARCHAR(255) NOT NULL,
                price DOUBLE PRECISION NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AlbumStore for PgAlbumStore {
    async fn list_albums(&self) -> StorageResult<Vec<Album>> {
        let albums = sqlx::query_as::<_, Album>(
            r#"
            SELECT id::bigint AS id, title, artist, price::float8 AS price
            FROM album
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    async fn insert_album(&self, album: NewAlbum) -> StorageResult<Album> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO album (title, artist, price)
            VALUES ($1, $2, $3)
            RETURNING id::bigint
            "#,
        )
        .bind(&album.title)
        .bind(&album.artist)
        .bind(album.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(album.into_album(id))
    }

    async fn get_album(&self, id: i64) -> StorageResult<Option<Album>> {
        let album = sqlx::query_as::<_, Album>(
            r#"
            SELECT id::bigint AS id, title, artist, price::float8 AS price
            FROM album
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(album)
    }

    async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ================================================================================================
// In-memory
// ================================================================================================

/// 인메모리 앨범 저장소.
///
/// 데이터베이스 URL이 없을 때와 테스트에서 사용합니다.
#[derive(Debug)]
pub struct InMemoryAlbumStore {
    albums: RwLock<Vec<Album>>,
    next_id: AtomicI64,
}

impl InMemoryAlbumStore {
    /// 빈 저장소.
    pub fn new() -> Self {
        Self::with_albums(Vec::new())
    }

    /// 샘플 앨범 3개가 들어 있는 저장소.
    pub fn seeded() -> Self {
        Self::with_albums(seed_albums())
    }

    pub fn with_albums(albums: Vec<Album>) -> Self {
        let next_id = albums.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        Self {
            albums: RwLock::new(albums),
            next_id: AtomicI64::new(next_id),
        }
    }
}

impl Default for InMemoryAlbumStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl AlbumStore for InMemoryAlbumStore {
    async fn list_albums(&self) -> StorageResult<Vec<Album>> {
        let mut albums = self.albums.read().await.clone();
        albums.sort_by_key(|a| a.id);
        Ok(albums)
    }

    async fn insert_album(&self, album: NewAlbum) -> StorageResult<Album> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if id <= 0 {
            return Err(StorageError::IdExhausted);
        }

        let album = album.into_album(id);
        self.albums.write().await.push(album.clone());
        Ok(album)
    }

    async fn get_album(&self, id: i64) -> StorageResult<Option<Album>> {
        Ok(self.albums.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
