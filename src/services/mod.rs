//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与 HTTP 路由层解耦：
//! - `store` - 可失败的本地键值存储能力接口及其实现
//! - `persisted` - 挂载/水合/同步三阶段的持久化状态原语
//! - `catalog` - 内置模型目录与合并
//! - `custom_models` - 自定义模型管理
//! - `projects` - 项目与激活项目管理
//! - `workspace` - 所有持久化设置的统一门面
//! - `upstream` - OpenRouter / Ollama / GitHub 上游客户端
//! - `cache` - Star 数内存缓存
//! - `counter` - 活跃请求计数器

pub mod cache;
pub mod catalog;
pub mod counter;
pub mod custom_models;
pub mod persisted;
pub mod projects;
pub mod store;
pub mod upstream;
pub mod workspace;
