//! # 服务配置
//!
//! 代理服务的配置按三层合并：
//! 1. 内置默认值
//! 2. `<数据目录>/server-config.json`（文件不存在时跳过）
//! 3. 环境变量覆盖（`ARENA_BIND`、`OPENROUTER_API_KEY`、`OLLAMA_BASE_URL`、
//!    `GITHUB_TOKEN`、`ARENA_ENV`）
//!
//! 配置文件使用 camelCase 字段名，所有字段均可省略。
//! 三层合并后仍未设置 OpenRouter 密钥时，回退到工作区中保存的 `openrouter` API Key。

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::model::ModelProvider;
use crate::models::settings::ApiKeySet;
use crate::utils::path;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path} 失败: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("解析配置文件 {path} 失败: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("环境变量 {name} 的值无效: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// 代理服务配置
///
/// 对应配置文件 `server-config.json`：
/// ```json
/// {
///   "bind": "127.0.0.1:8787",
///   "ollamaBaseUrl": "http://localhost:11434",
///   "githubOwner": "chat-arena",
///   "githubRepo": "chat-arena",
///   "production": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind: SocketAddr,

    /// OpenRouter API 根地址
    pub openrouter_base_url: String,

    /// 服务端默认的 OpenRouter Key：请求未携带 `apiKey` 时使用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,

    /// 请求未携带覆盖地址时使用的 Ollama 服务地址
    pub ollama_base_url: String,

    /// GitHub REST API 地址，测试时指向 mock 服务
    pub github_api_base_url: String,

    /// Star 数路由缺省的仓库所有者
    pub github_owner: String,

    /// Star 数路由缺省的仓库名
    pub github_repo: String,

    /// GitHub 访问令牌（可选），用于提高匿名请求的速率限制
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// 是否为生产模式：CSP 上报只在生产模式下启用
    pub production: bool,

    /// 单次上游请求的超时（秒）
    pub upstream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            openrouter_api_key: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            github_api_base_url: "https://api.github.com".to_string(),
            github_owner: "chat-arena".to_string(),
            github_repo: "chat-arena".to_string(),
            github_token: None,
            production: false,
            upstream_timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    /// 从数据目录加载配置并应用环境变量覆盖
    ///
    /// # 错误
    /// 配置文件存在但无法读取或解析、环境变量值无效时返回错误
    pub async fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(&path::server_config_path(data_dir)).await?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 读取配置文件；文件不存在时返回默认配置
    async fn read_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let display = config_path.display().to_string();
        let content = tokio::fs::read_to_string(config_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: display.clone(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// 应用环境变量覆盖
    ///
    /// # 参数
    /// - `lookup` - 环境变量查询函数，便于测试时注入
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(bind) = non_empty("ARENA_BIND") {
            self.bind = bind.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "ARENA_BIND",
                value: bind.clone(),
            })?;
        }
        if let Some(key) = non_empty("OPENROUTER_API_KEY") {
            self.openrouter_api_key = Some(key);
        }
        if let Some(url) = non_empty("OLLAMA_BASE_URL") {
            self.ollama_base_url = url;
        }
        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
        if let Some(env) = non_empty("ARENA_ENV") {
            self.production = env.trim().eq_ignore_ascii_case("production");
        }
        Ok(())
    }

    /// 配置与环境变量都未提供 OpenRouter 密钥时，使用工作区中保存的密钥
    ///
    /// # 返回值
    /// 采用了保存的密钥时返回 `true`
    pub fn apply_stored_keys(&mut self, keys: &ApiKeySet) -> bool {
        if self.openrouter_api_key.is_some() {
            return false;
        }
        match keys.get(ModelProvider::OpenRouter.as_str()) {
            Some(key) => {
                self.openrouter_api_key = Some(key.to_string());
                true
            }
            None => false,
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}
