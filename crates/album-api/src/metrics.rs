//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # Errors
///
/// 버킷 설정이 잘못되었거나 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(group: &str, method: &str, path: &str) {
    counter!(
        "http_requests_total",
        "group" => group.to_string(),
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(group: &str, method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "group" => group.to_string(),
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(group: &str, method: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "group" => group.to_string(),
        "method" => method.to_string()
    )
    .record(duration_secs);
}

/// 401/403 응답 카운터 증가.
///
/// `credentials`는 요청에 토큰이나 로그인 본문이 실려 있었는지 여부입니다.
pub fn record_http_denied(group: &str, status: u16, credentials: bool) {
    counter!(
        "http_denied_total",
        "group" => group.to_string(),
        "status" => status.to_string(),
        "credentials" => if credentials { "present" } else { "absent" }
    )
    .increment(1);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 로그인 시도 결과 카운터 증가 (`success` 또는 실패 사유).
pub fn record_login(result: &str) {
    counter!("auth_login_total", "result" => result.to_string()).increment(1);
}

/// 토큰 발급 카운터 증가 (`login` 또는 `refresh`).
pub fn record_token_issued(kind: &str) {
    counter!("auth_tokens_issued_total", "kind" => kind.to_string()).increment(1);
}

/// 토큰 거절 카운터 증가.
pub fn record_token_rejected(reason: &str) {
    counter!("auth_token_rejected_total", "reason" => reason.to_string()).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/albums/42` → `/albums/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            if is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/albums/12345"), "/albums/:id");
    }

    #[test]
    fn test_normalize_path_no_params() {
        assert_eq!(normalize_path("/albums"), "/albums");
        assert_eq!(normalize_path("/refresh_token"), "/refresh_token");
    }

    #[test]
    fn test_normalize_path_non_numeric_id() {
        assert_eq!(normalize_path("/albums/abc"), "/albums/abc");
        assert_eq!(normalize_path("/albums/12a"), "/albums/12a");
    }

    #[test]
    fn test_auth_counters_without_recorder() {
        // 레코더가 없으면 no-op
        record_http_denied("protected", 401, false);
        record_login("success");
        record_token_issued("login");
        record_token_rejected("token_expired");
    }
}
