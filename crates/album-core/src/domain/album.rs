//! 앨범 도메인 모델.
//!
//! 레코드 컬렉션 리소스(`album`)와 생성 요청 입력을 정의합니다.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 저장된 앨범 레코드.
///
/// `album` 테이블의 컬럼 순서(`id, title, artist, price`)와 일치합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Album {
    /// 앨범 ID (저장소가 할당)
    pub id: i64,
    /// 앨범 제목
    pub title: String,
    /// 아티스트 이름
    pub artist: String,
    /// 가격
    pub price: f64,
}

/// 새 앨범 입력.
///
/// 클라이언트가 `id`를 함께 보내더라도 무시되며, 저장소가 새 ID를 할당합니다.
#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewAlbum {
    /// 앨범 제목
    #[validate(length(min = 1, max = 255, message = "제목은 1-255자여야 합니다"))]
    pub title: String,
    /// 아티스트 이름
    #[validate(length(min = 1, max = 255, message = "아티스트는 1-255자여야 합니다"))]
    pub artist: String,
    /// 가격 (0 이상)
    #[validate(range(min = 0.0, message = "가격은 0 이상이어야 합니다"))]
    pub price: f64,
}

impl NewAlbum {
    /// 할당된 ID로 앨범 레코드를 만듭니다.
    pub fn into_album(self, id: i64) -> Album {
        Album {
            id,
            title: self.title,
            artist: self.artist,
            price: self.price,
        }
    }
}

/// 인메모리 저장소 초기 데이터.
pub fn seed_albums() -> Vec<Album> {
    vec![
        Album {
            id: 1,
            title: "Blue Train".to_string(),
            artist: "John Coltrane".to_string(),
            price: 56.99,
        },
        Album {
            id: 2,
            title: "Jeru".to_string(),
            artist: "Gerry Mulligan".to_string(),
            price: 17.99,
        },
        Album {
            id: 3,
            title: "Sarah Vaughan and Clifford Brown".to_string(),
            artist: "Sarah Vaughan".to_string(),
            price: 39.99,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_albums_have_unique_ids() {
        let albums = seed_albums();
        assert_eq!(albums.len(), 3);

        let mut ids: Vec<i64> = albums.iter().map(|a| a.id).collect();
        ids.dedup();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_new_album_validation() {
        let valid = NewAlbum {
            title: "Giant Steps".to_string(),
            artist: "John Coltrane".to_string(),
            price: 24.5,
        };
        assert!(valid.validate().is_ok());

        let empty_title = NewAlbum {
            title: String::new(),
            ..valid.clone()
        };
        assert!(empty_title.validate().is_err());

        let negative_price = NewAlbum {
            price: -1.0,
            ..valid
        };
        assert!(negative_price.validate().is_err());
    }

    #[test]
    fn test_new_album_ignores_client_id() {
        let input: NewAlbum = serde_json::from_str(
            r#"{"id": 99, "title": "Kind of Blue", "artist": "Miles Davis", "price": 30.0}"#,
        )
        .unwrap();

        let album = input.into_album(4);
        assert_eq!(album.id, 4);
        assert_eq!(album.title, "Kind of Blue");
    }
}
