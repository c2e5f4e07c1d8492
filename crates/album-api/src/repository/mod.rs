//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 핸들러는 [`AlbumStore`] 트레이트에만 의존하므로 저장소 구현을 교체할 수 있습니다.

pub mod albums;

pub use albums::{AlbumStore, InMemoryAlbumStore, PgAlbumStore, StorageError, StorageResult};
