//! # 数据模型模块
//!
//! 定义了与前端 TypeScript 类型一一对应的 Rust 数据结构。
//! 所有结构体均派生 `Serialize` 和 `Deserialize`，用于 HTTP JSON 传输和本地存储读写。
//! - `settings` - API Key 集合与主题偏好
//! - `model` - 模型目录条目与自定义模型
//! - `project` - 项目、对话与消息的数据结构
//! - `api` - 代理路由的请求与响应结构

pub mod api;
pub mod model;
pub mod project;
pub mod settings;
