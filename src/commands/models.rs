//! # 模型存在性校验路由
//!
//! 提供两个可互换的校验路由，前端在添加自定义模型时调用：
//! - `POST /api/models/openrouter/validate` - 在 OpenRouter 模型列表中查找 slug
//! - `POST /api/models/ollama/validate` - 在 Ollama 本地模型列表中查找 slug
//!
//! 请求体：`{ "slug": string, "apiKey"?: string }`。Ollama 路由中 `apiKey` 被复用为服务地址。
//!
//! ## 响应约定
//! | 情况 | HTTP | 响应体 |
//! |------|------|--------|
//! | 上游成功 | 200 | `{ ok: true, exists }` |
//! | 上游非成功状态码 | 200 | `{ ok: false, error, status }` |
//! | 网络/解析等意外错误 | 200 | `{ ok: false, error }` |
//! | slug 缺失或请求体无效 | 400 | `{ ok: false, error }` |
//!
//! 上游状态码只放在响应体的 `status` 字段里，从不作为 HTTP 状态码透传。

use std::error::Error;

use bytes::Bytes;
use http::{Request, StatusCode};
use hyper::body::Body;

use crate::commands::{AppState, HttpResponse, json_response, read_body};
use crate::models::api::{ApiReply, CheckOutcome, ValidateRequest};
use crate::services::upstream::{self, UpstreamError};

/// 解析并校验请求体
///
/// # 错误
/// 返回可直接发送给客户端的 400 响应
async fn parse_request<B>(req: Request<B>) -> Result<(ValidateRequest, String), HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let bad_request = |msg: &str| json_response(StatusCode::BAD_REQUEST, &ApiReply::invalid(msg));

    let bytes = read_body(req.into_body()).await.map_err(|e| {
        log::debug!("{}", e);
        bad_request("invalid request body")
    })?;
    let body: ValidateRequest =
        serde_json::from_slice(&bytes).map_err(|_| bad_request("invalid JSON body"))?;

    let slug = body
        .trimmed_slug()
        .ok_or_else(|| bad_request("slug is required"))?
        .to_string();
    Ok((body, slug))
}

/// 把上游查询结果映射为校验结果
///
/// 标识比较区分大小写，必须完全相等。
fn to_outcome(provider: &str, slug: &str, result: Result<Vec<String>, UpstreamError>) -> CheckOutcome {
    match result {
        Ok(ids) => CheckOutcome::Checked {
            exists: ids.iter().any(|id| id == slug),
        },
        Err(UpstreamError::Status(status)) => {
            log::warn!("{} 模型列表返回非成功状态码 {}", provider, status);
            CheckOutcome::UpstreamFailed {
                error: UpstreamError::Status(status).to_string(),
                status,
            }
        }
        Err(e) => {
            log::warn!("{} 模型校验失败: {}", provider, e);
            CheckOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// 在 OpenRouter 中检查模型是否存在
///
/// # 参数
/// - `api_key` - 请求携带的 Key；为 `None` 时使用服务端配置的默认 Key
pub async fn check_openrouter(state: &AppState, slug: &str, api_key: Option<&str>) -> CheckOutcome {
    let key = api_key.or(state.config.openrouter_api_key.as_deref());
    let result =
        upstream::list_openrouter_models(&state.client, &state.config.openrouter_base_url, key)
            .await;
    to_outcome("OpenRouter", slug, result)
}

/// 在 Ollama 中检查模型是否存在
///
/// # 参数
/// - `base_url` - 请求携带的服务地址；为 `None` 时使用服务端配置的默认地址
pub async fn check_ollama(state: &AppState, slug: &str, base_url: Option<&str>) -> CheckOutcome {
    let base = base_url.unwrap_or(&state.config.ollama_base_url);
    let result = upstream::list_ollama_models(&state.client, base).await;
    to_outcome("Ollama", slug, result)
}

/// `POST /api/models/openrouter/validate`
pub async fn validate_openrouter<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let (body, slug) = match parse_request(req).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let outcome = check_openrouter(state, &slug, body.override_value()).await;
    json_response(StatusCode::OK, &ApiReply::from(outcome))
}

/// `POST /api/models/ollama/validate`
pub async fn validate_ollama<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let (body, slug) = match parse_request(req).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    let outcome = check_ollama(state, &slug, body.override_value()).await;
    json_response(StatusCode::OK, &ApiReply::from(outcome))
}
