//! # CSP 违规报告接收路由
//!
//! `POST /api/csp-report`：接收浏览器上报的内容安全策略违规报告，
//! 附加请求元数据（接收时间、客户端 IP、User-Agent）后以一行 JSON 写入日志。
//! `OPTIONS /api/csp-report`：CORS 预检，返回宽松的跨域头。
//!
//! 只在生产模式下启用；非生产模式返回 200 与禁用提示，不写任何日志。
//!
//! | 情况 | HTTP |
//! |------|------|
//! | 非生产模式 | 200 |
//! | 缺少 `csp-report` 对象 / JSON 无效 | 400 |
//! | 记录成功 | 204 |
//! | 意外失败 | 500 |

use std::error::Error;
use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue, USER_AGENT,
};
use http::{HeaderMap, Request, StatusCode};
use hyper::body::Body;
use serde_json::Value;

use crate::commands::{AppState, HttpResponse, json_response, read_body};
use crate::models::api::{CspViolationRecord, MessageReply};

/// 日志 target：便于单独过滤 CSP 报告
pub const CSP_LOG_TARGET: &str = "csp";

/// 为响应附加宽松的 CORS 头
fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn message(status: StatusCode, text: &str) -> HttpResponse {
    with_cors(json_response(status, &MessageReply::new(text)))
}

/// `OPTIONS /api/csp-report`
pub fn preflight() -> HttpResponse {
    with_cors(json_response(StatusCode::NO_CONTENT, &MessageReply::new("ok")))
}

/// 提取客户端 IP：`X-Forwarded-For` 第一跳 → `X-Real-IP` → 对端地址
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| header_str("x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// 校验报告并构造附带元数据的记录
///
/// # 错误
/// 缺少 `csp-report` 对象时返回错误描述
fn build_record(
    payload: Value,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
) -> Result<CspViolationRecord, &'static str> {
    let report = match payload {
        Value::Object(mut map) => match map.remove("csp-report") {
            Some(report @ Value::Object(_)) => report,
            _ => return Err("missing csp-report"),
        },
        _ => return Err("missing csp-report"),
    };

    Ok(CspViolationRecord {
        report,
        timestamp: chrono::Utc::now().to_rfc3339(),
        ip: client_ip(headers, peer),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string(),
    })
}

/// `POST /api/csp-report`
pub async fn report<B>(req: Request<B>, state: &AppState, peer: Option<SocketAddr>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    if !state.config.production {
        return message(StatusCode::OK, "CSP reporting is disabled outside production");
    }

    let (parts, body) = req.into_parts();
    let bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("{}", e);
            return message(StatusCode::BAD_REQUEST, "invalid report body");
        }
    };
    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(_) => return message(StatusCode::BAD_REQUEST, "invalid JSON payload"),
    };

    let record = match build_record(payload, &parts.headers, peer) {
        Ok(record) => record,
        Err(reason) => return message(StatusCode::BAD_REQUEST, reason),
    };

    match serde_json::to_string(&record) {
        Ok(line) => {
            log::warn!(target: CSP_LOG_TARGET, "{}", line);
            message(StatusCode::NO_CONTENT, "report received")
        }
        Err(e) => {
            log::error!("序列化 CSP 报告失败: {}", e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "failed to record report")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{body_json, state_with};
    use http_body_util::Full;
    use serde_json::json;

    fn post(body: &str) -> Request<Full<Bytes>> {
        Request::post("/api/csp-report")
            .header("content-type", "application/csp-report")
            .header("user-agent", "Mozilla/5.0")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    fn sample_report() -> String {
        json!({
            "csp-report": {
                "document-uri": "https://example.com/",
                "violated-directive": "script-src",
                "blocked-uri": "https://evil.example/x.js"
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_disabled_outside_production() {
        let state = state_with(|c| c.production = false);
        let response = report(post(&sample_report()), &state, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "CSP reporting is disabled outside production" })
        );
    }

    #[tokio::test]
    async fn test_valid_report_is_accepted() {
        let state = state_with(|c| c.production = true);
        let response = report(post(&sample_report()), &state, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_missing_report_object_is_400() {
        let state = state_with(|c| c.production = true);
        for body in [r#"{}"#, r#"{"csp-report":"text"}"#, "[]"] {
            let response = report(post(body), &state, None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        }

        let response = report(post("not json"), &state, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_preflight_headers() {
        let response = preflight();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "POST, OPTIONS"
        );
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type"
        );
    }

    #[test]
    fn test_record_carries_request_metadata() {
        let req = post("");
        let peer: SocketAddr = "192.0.2.1:5555".parse().unwrap();
        let record = build_record(
            serde_json::from_str(&sample_report()).unwrap(),
            req.headers(),
            Some(peer),
        )
        .unwrap();

        assert_eq!(record.ip, "203.0.113.7");
        assert_eq!(record.user_agent, "Mozilla/5.0");
        assert_eq!(record.report["violated-directive"], "script-src");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.1:5555".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(peer)), "192.0.2.1");
        assert_eq!(client_ip(&headers, None), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, Some(peer)), "198.51.100.2");
    }
}
