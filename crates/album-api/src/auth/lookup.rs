//! 요청에서 토큰 추출.
//!
//! 설정된 조회 순서대로 헤더, 쿼리, 쿠키를 확인하며 처음 토큰을 돌려준 위치에서 멈춥니다.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{header::COOKIE, HeaderMap, Uri},
};

use super::{AuthError, TokenSource};

/// 단일 조회 위치 결과.
#[derive(Debug, PartialEq, Eq)]
enum Lookup {
    Found(String),
    Absent,
    Malformed,
}

/// 조회 순서에 따라 요청에서 토큰을 추출합니다.
///
/// # Errors
///
/// - 어떤 위치에서도 값을 찾지 못하면 `TokenMissing`
/// - 값은 있었지만 형식이 잘못되었고(예: 다른 스킴) 이후 위치에서도 토큰을 찾지 못하면 `TokenInvalid`
pub fn extract_token(
    sources: &[TokenSource],
    token_head_name: &str,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<String, AuthError> {
    let mut malformed = false;

    for source in sources {
        let lookup = match source {
            TokenSource::Header(name) => from_header(headers, name, token_head_name),
            TokenSource::Query(name) => from_query(uri, name),
            TokenSource::Cookie(name) => from_cookie(headers, name),
        };

        match lookup {
            Lookup::Found(token) => return Ok(token),
            Lookup::Malformed => malformed = true,
            Lookup::Absent => {}
        }
    }

    if malformed {
        Err(AuthError::TokenInvalid)
    } else {
        Err(AuthError::TokenMissing)
    }
}

fn from_header(headers: &HeaderMap, name: &str, token_head_name: &str) -> Lookup {
    let Some(value) = headers.get(name) else {
        return Lookup::Absent;
    };
    let Ok(value) = value.to_str() else {
        return Lookup::Malformed;
    };

    let token = if token_head_name.is_empty() {
        Some(value.trim())
    } else {
        value
            .strip_prefix(token_head_name)
            .and_then(|rest| rest.strip_prefix(' '))
            .map(str::trim)
    };

    match token {
        Some(token) if !token.is_empty() => Lookup::Found(token.to_string()),
        _ => Lookup::Malformed,
    }
}

fn from_query(uri: &Uri, name: &str) -> Lookup {
    let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(uri) else {
        return Lookup::Malformed;
    };

    match params.get(name) {
        Some(token) if !token.is_empty() => Lookup::Found(token.clone()),
        _ => Lookup::Absent,
    }
}

fn from_cookie(headers: &HeaderMap, name: &str) -> Lookup {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| Lookup::Found(value.to_string()))
        .unwrap_or(Lookup::Absent)
}
