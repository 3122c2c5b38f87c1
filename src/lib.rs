//! # Chat Arena - 应用核心模块
//!
//! 多模型对比聊天应用的 Rust 端实现，包含两部分互不依赖的功能：
//! - **本地设置持久化层**：API Key、主题、自定义模型、项目与激活项目，
//!   以"挂载 → 水合 → 同步"的生命周期镜像到本地存储
//! - **轻量代理服务**：模型存在性校验、GitHub Star 数查询、CSP 违规报告接收
//!
//! ## 模块结构
//! - `commands/` - HTTP 路由处理函数
//! - `models/` - 数据模型（对应前端 TypeScript 类型）
//! - `services/` - 核心业务逻辑（存储、状态管理、上游查询、缓存）
//! - `utils/` - 通用工具函数
//! - `config` - 服务配置加载
//! - `server` - HTTP 服务与路由分发

pub mod commands;
pub mod config;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

use std::sync::Arc;

use commands::AppState;
use config::ServerConfig;
use services::workspace::Workspace;

/// 应用启动函数
///
/// 完成以下工作：
/// 1. 解析数据目录（`~/.chat-arena/` 或 `ARENA_DATA_DIR`）
/// 2. 加载服务配置（默认值 → 配置文件 → 环境变量）
/// 3. 打开并水合本地设置存储；未配置 OpenRouter 密钥时使用保存的密钥
/// 4. 创建共享状态（HTTP 客户端、缓存、计数器）
/// 5. 启动 HTTP 服务，直到收到退出信号
///
/// # 错误
/// 数据目录无法确定、配置无效或端口绑定失败时返回错误信息
pub async fn run() -> Result<(), String> {
    let data_dir = utils::path::get_data_dir()?;
    let mut config = ServerConfig::load(&data_dir)
        .await
        .map_err(|e| e.to_string())?;
    log::info!("数据目录: {}", data_dir.display());

    let workspace = Workspace::open(&data_dir);
    log::info!(
        "已加载 {} 个项目、{} 个自定义模型，主题 {:?}",
        workspace.projects.list().len(),
        workspace.custom_models.list().len(),
        workspace.theme.get()
    );
    log::debug!(
        "已配置 API Key 的提供商: {:?}",
        workspace.api_keys.get().configured_providers()
    );
    if config.apply_stored_keys(workspace.api_keys.get()) {
        log::info!("使用已保存的 OpenRouter API Key");
    }

    let state = Arc::new(AppState::new(config)?);
    server::serve(state).await
}
