//! # HTTP 服务
//!
//! 基于 hyper 1.x 的 HTTP/1.1 服务：
//! - `serve` 负责监听端口、为每个连接派生一个 tokio 任务，收到 Ctrl+C 后停止接收新连接
//! - `dispatch` 按 (方法, 路径) 分发到 `commands` 中的处理函数
//!
//! 每个请求在处理期间持有一个 `RequestGuard`，用于维护活跃请求计数。

use std::convert::Infallible;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::commands::{self, AppState, HttpResponse, csp, models, stars};

/// 路由分发
///
/// # 参数
/// - `req` - HTTP 请求
/// - `state` - 共享状态
/// - `peer` - 对端地址，CSP 报告在缺少代理头时用作客户端 IP
pub async fn dispatch<B>(req: Request<B>, state: Arc<AppState>, peer: Option<SocketAddr>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let _guard = state.counter.enter();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    log::debug!(
        "{} {} (活跃请求 {})",
        method,
        path,
        state.counter.active()
    );

    match (method, path.as_str()) {
        (Method::POST, "/api/models/openrouter/validate") => {
            models::validate_openrouter(req, &state).await
        }
        (Method::POST, "/api/models/ollama/validate") => models::validate_ollama(req, &state).await,
        (Method::GET, "/api/github/stars") => stars::get_stars(req.uri(), &state).await,
        (Method::POST, "/api/csp-report") => csp::report(req, &state, peer).await,
        (Method::OPTIONS, "/api/csp-report") => csp::preflight(),
        (Method::GET, "/api/health") => commands::health(&state),
        (
            _,
            "/api/models/openrouter/validate"
            | "/api/models/ollama/validate"
            | "/api/github/stars"
            | "/api/csp-report"
            | "/api/health",
        ) => commands::method_not_allowed(),
        _ => commands::not_found(),
    }
}

/// 启动 HTTP 服务并阻塞直到收到 Ctrl+C
///
/// # 错误
/// 端口绑定失败时返回错误信息
pub async fn serve(state: Arc<AppState>) -> Result<(), String> {
    let listener = TcpListener::bind(state.config.bind)
        .await
        .map_err(|e| format!("绑定地址 {} 失败: {}", state.config.bind, e))?;
    log::info!(
        "服务已启动: http://{} (生产模式: {})",
        state.config.bind,
        state.config.production
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        log::warn!("接受连接失败: {}", e);
                        continue;
                    }
                };
                spawn_connection(stream, peer, state.clone());
            }
            _ = &mut shutdown => {
                log::info!("收到退出信号，停止接收新连接");
                break;
            }
        }
    }

    Ok(())
}

/// 为单个连接派生处理任务
fn spawn_connection(stream: tokio::net::TcpStream, peer: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let service = service_fn(move |req: Request<Incoming>| {
            let state = state.clone();
            async move { Ok::<_, Infallible>(dispatch(req, state, Some(peer)).await) }
        });

        if let Err(e) = http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            log::debug!("连接 {} 处理结束: {}", peer, e);
        }
    });
}
