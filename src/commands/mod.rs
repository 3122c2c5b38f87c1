//! # HTTP 路由处理模块
//!
//! 本模块包含代理服务所有路由的处理函数，以及它们共享的状态与辅助函数。
//! 每个子模块对应一个功能域：
//! - `models` - OpenRouter / Ollama 模型存在性校验
//! - `stars` - GitHub 仓库 Star 数查询
//! - `csp` - CSP 违规报告接收
//!
//! 处理函数对请求 body 类型保持泛型，既能直接处理 hyper 的 `Incoming`，
//! 也能在测试中传入 `Full<Bytes>`，无需真正打开端口。

pub mod csp;
pub mod models;
pub mod stars;

use std::error::Error;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::models::api::ApiReply;
use crate::services::cache::StarsCache;
use crate::services::counter::RequestCounter;
use crate::services::upstream;

/// 所有路由统一的响应类型
pub type HttpResponse = Response<Full<Bytes>>;

/// 请求 body 的最大字节数
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// 服务全局共享状态
///
/// 在服务启动时创建一次，通过 `Arc` 在所有连接任务之间共享。
/// 除活跃请求计数器外没有任何可变的跨请求状态（缓存内部自带锁）。
pub struct AppState {
    /// 启动时加载的服务配置
    pub config: ServerConfig,
    /// 共享 HTTP 客户端：复用连接池，统一超时
    pub client: reqwest::Client,
    /// GitHub Star 数缓存
    pub stars_cache: StarsCache,
    /// 当前活跃请求计数
    pub counter: Arc<RequestCounter>,
}

impl AppState {
    /// 根据配置创建共享状态
    ///
    /// # 错误
    /// HTTP 客户端创建失败时返回错误信息
    pub fn new(config: ServerConfig) -> Result<Self, String> {
        let client = upstream::build_client(config.upstream_timeout())?;
        Ok(Self {
            config,
            client,
            stars_cache: StarsCache::new(),
            counter: Arc::new(RequestCounter::new()),
        })
    }
}

/// 构造 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> HttpResponse {
    // 这里的 payload 都是本模块定义的结构体，序列化不会失败；兜底返回空对象
    let body = serde_json::to_vec(payload).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// 读取完整的请求 body，超过 `MAX_BODY_BYTES` 时返回错误
pub(crate) async fn read_body<B>(body: B) -> Result<Bytes, String>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| format!("读取请求 body 失败: {}", e))
}

/// 健康检查：返回当前进程内的活跃请求数（仅供参考）
pub fn health(state: &AppState) -> HttpResponse {
    json_response(StatusCode::OK, &ApiReply::health(state.counter.active()))
}

/// 未知路径
pub fn not_found() -> HttpResponse {
    json_response(StatusCode::NOT_FOUND, &ApiReply::invalid("not found"))
}

/// 已知路径但方法不支持
pub fn method_not_allowed() -> HttpResponse {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ApiReply::invalid("method not allowed"),
    )
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_read_body_rejects_oversized() {
        let big = Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1]));
        assert!(read_body(big).await.is_err());

        let small = Full::new(Bytes::from_static(b"{}"));
        assert_eq!(read_body(small).await.unwrap(), Bytes::from_static(b"{}"));
    }

    #[tokio::test]
    async fn test_health_reports_active_requests() {
        let state = state_with(|_| {});
        let _guard = state.counter.enter();
        let response = health(&state);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "ok": true, "activeRequests": 1 })
        );
    }
}
