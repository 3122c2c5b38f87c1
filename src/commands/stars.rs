//! # GitHub Star 数路由
//!
//! `GET /api/github/stars?owner=<owner>&repo=<repo>`
//!
//! 读穿透转发到 GitHub 仓库元数据接口，返回 `{ ok: true, stars: number | null }`。
//! 任何失败（参数非法、上游错误、网络错误）都返回 HTTP 200 与 `{ ok: false }`。
//! 成功结果在进程内缓存 5 分钟，并通过 `Cache-Control` 允许边缘缓存同样时长。

use http::header::{CACHE_CONTROL, HeaderValue};
use http::{StatusCode, Uri};

use crate::commands::{AppState, HttpResponse, json_response};
use crate::models::api::{ApiReply, StarsOutcome};
use crate::services::upstream;

/// 成功响应的缓存头：边缘缓存 5 分钟，过期后 10 分钟内可先返回旧值再后台刷新
const SUCCESS_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

/// 从查询字符串中取出 owner 与 repo，缺省时使用配置中的默认仓库
fn owner_and_repo(uri: &Uri, state: &AppState) -> (String, String) {
    let mut owner = None;
    let mut repo = None;
    if let Some(query) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match &*key {
                "owner" => owner = Some(value),
                "repo" => repo = Some(value),
                _ => {}
            }
        }
    }
    (
        owner.unwrap_or_else(|| state.config.github_owner.clone()),
        repo.unwrap_or_else(|| state.config.github_repo.clone()),
    )
}

/// GitHub 用户名与仓库名只允许字母、数字和 `-` `_` `.`
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= 100
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// 查询 Star 数：先查缓存，未命中再访问上游
pub async fn lookup_stars(state: &AppState, owner: &str, repo: &str) -> StarsOutcome {
    if !is_valid_segment(owner) || !is_valid_segment(repo) {
        log::debug!("非法的仓库参数: {}/{}", owner, repo);
        return StarsOutcome::Failed;
    }

    if let Some(stars) = state.stars_cache.get(owner, repo) {
        return StarsOutcome::Found { stars };
    }

    match upstream::fetch_stars(
        &state.client,
        &state.config.github_api_base_url,
        owner,
        repo,
        state.config.github_token.as_deref(),
    )
    .await
    {
        Ok(stars) => {
            state.stars_cache.set(owner, repo, stars);
            StarsOutcome::Found { stars }
        }
        Err(e) => {
            log::warn!("查询 {}/{} 的 Star 数失败: {}", owner, repo, e);
            StarsOutcome::Failed
        }
    }
}

/// `GET /api/github/stars`
pub async fn get_stars(uri: &Uri, state: &AppState) -> HttpResponse {
    let (owner, repo) = owner_and_repo(uri, state);
    let outcome = lookup_stars(state, &owner, &repo).await;
    let found = matches!(outcome, StarsOutcome::Found { .. });

    let mut response = json_response(StatusCode::OK, &ApiReply::from(outcome));
    let cache_control = if found {
        HeaderValue::from_static(SUCCESS_CACHE_CONTROL)
    } else {
        HeaderValue::from_static("no-store")
    };
    response.headers_mut().insert(CACHE_CONTROL, cache_control);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{body_json, state_with};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_stars_success_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "stargazers_count": 1234 })),
            )
            .expect(1)
            .mount(&server)
            .await;
        let state = state_with(|c| c.github_api_base_url = server.uri());
        let uri: Uri = "/api/github/stars?owner=acme&repo=widgets".parse().unwrap();

        let first = get_stars(&uri, &state).await;
        assert_eq!(
            first.headers().get(CACHE_CONTROL).unwrap(),
            SUCCESS_CACHE_CONTROL
        );
        assert_eq!(body_json(first).await, json!({ "ok": true, "stars": 1234 }));

        // 第二次命中进程内缓存，mock 只允许被调用一次
        let second = get_stars(&uri, &state).await;
        assert_eq!(body_json(second).await, json!({ "ok": true, "stars": 1234 }));
    }

    #[tokio::test]
    async fn test_defaults_used_without_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/chat-arena/chat-arena"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_with(|c| c.github_api_base_url = server.uri());
        let uri: Uri = "/api/github/stars".parse().unwrap();

        let response = get_stars(&uri, &state).await;
        assert_eq!(body_json(response).await, json!({ "ok": true, "stars": null }));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_ok_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let state = state_with(|c| c.github_api_base_url = server.uri());
        let uri: Uri = "/api/github/stars?owner=acme&repo=widgets".parse().unwrap();

        let response = get_stars(&uri, &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");
        assert_eq!(body_json(response).await, json!({ "ok": false }));
        assert_eq!(state.stars_cache.get("acme", "widgets"), None);
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected_without_upstream_call() {
        let state = state_with(|c| c.github_api_base_url = "http://127.0.0.1:9".into());
        let uri: Uri = "/api/github/stars?owner=..&repo=x%2Fy".parse().unwrap();

        let response = get_stars(&uri, &state).await;
        assert_eq!(body_json(response).await, json!({ "ok": false }));
    }
}
