//! # Chat Arena - 代理服务入口点
//!
//! 初始化日志后调用 `app_lib::run()` 启动服务。
//! 所有配置加载、状态创建和路由注册均在 `app_lib`（即 `lib.rs`）中完成。

/// 应用程序主入口函数
///
/// 日志级别默认为 `info`，可通过 `RUST_LOG` 环境变量调整，
/// 例如 `RUST_LOG=debug` 或 `RUST_LOG=info,csp=warn`。
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = app_lib::run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
