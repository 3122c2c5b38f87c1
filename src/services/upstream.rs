//! # 上游服务客户端
//!
//! 通过共享的 `reqwest::Client` 查询第三方服务：
//! - OpenRouter 模型列表：`GET {base}/models`，描述符字段 `data[].id`
//! - Ollama 本地模型列表：`GET {base}/api/tags`，描述符字段 `models[].name` / `models[].model`
//! - GitHub 仓库元数据：`GET {base}/repos/{owner}/{repo}`，字段 `stargazers_count`
//!
//! 每个函数只发起一次请求，不做重试；超时由客户端构建时的配置统一控制。
//! 所有模型列表查询都带 `Cache-Control: no-store`，确保拿到的是实时结果。

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// 上游查询错误
///
/// `Display` 文本会出现在返回给浏览器的 `error` 字段中。
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(u16),

    #[error("invalid upstream response: {0}")]
    Decode(String),
}

/// 构建共享 HTTP 客户端
///
/// # 参数
/// - `timeout` - 单次上游请求的总超时
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("chat-arena/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| format!("创建 HTTP 客户端失败: {}", e))
}

#[derive(Deserialize)]
struct OpenRouterModels {
    data: Vec<OpenRouterModel>,
}

#[derive(Deserialize)]
struct OpenRouterModel {
    id: String,
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct GithubRepo {
    #[serde(default)]
    stargazers_count: Option<u64>,
}

/// 发送请求，校验状态码并解析 JSON 响应体
async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, UpstreamError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// 去掉 base URL 末尾的 `/`
fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// 查询 OpenRouter 可用模型的 ID 列表
///
/// # 参数
/// - `base_url` - API 根地址（如 `https://openrouter.ai/api/v1`）
/// - `api_key` - 可选的 Bearer Token；为 `None` 时以匿名方式访问
pub async fn list_openrouter_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
) -> Result<Vec<String>, UpstreamError> {
    let mut request = client
        .get(format!("{}/models", trim_base(base_url)))
        .header(CACHE_CONTROL, "no-store")
        .header(ACCEPT, "application/json");
    if let Some(key) = api_key {
        request = request.header(AUTHORIZATION, format!("Bearer {}", key));
    }

    let models: OpenRouterModels = send_json(request).await?;
    Ok(models.data.into_iter().map(|m| m.id).collect())
}

/// 把用户输入的 Ollama 地址规范化为带协议、无尾部 `/` 的 base URL
pub fn normalize_ollama_base(raw: &str) -> String {
    let raw = trim_base(raw.trim());
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

/// 查询 Ollama 本地已拉取模型的标识列表
///
/// 每个描述符的 `name` 与 `model` 字段都会收集（去重），两者任一命中即视为存在。
pub async fn list_ollama_models(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<String>, UpstreamError> {
    let request = client
        .get(format!("{}/api/tags", normalize_ollama_base(base_url)))
        .header(CACHE_CONTROL, "no-store")
        .header(ACCEPT, "application/json");

    let tags: OllamaTags = send_json(request).await?;
    let mut ids = Vec::with_capacity(tags.models.len());
    for m in tags.models {
        for id in [m.name, m.model].into_iter().flatten() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// 查询 GitHub 仓库的 Star 数
///
/// # 返回值
/// 响应中缺少 `stargazers_count` 字段时返回 `Ok(None)`
pub async fn fetch_stars(
    client: &reqwest::Client,
    base_url: &str,
    owner: &str,
    repo: &str,
    token: Option<&str>,
) -> Result<Option<u64>, UpstreamError> {
    let mut request = client
        .get(format!("{}/repos/{}/{}", trim_base(base_url), owner, repo))
        .header(ACCEPT, "application/vnd.github+json");
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }

    let repo: GithubRepo = send_json(request).await?;
    Ok(repo.stargazers_count)
}
