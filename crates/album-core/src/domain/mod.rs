//! 앨범 서비스 도메인 모델.

mod album;

pub use album::*;
