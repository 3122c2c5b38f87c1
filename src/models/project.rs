//! # 项目和对话数据模型
//!
//! 定义了项目（Project）、对话（Conversation）和聊天消息（ChatMessage）的 Rust 结构体，
//! 对应前端 TypeScript 中的 `Project`、`Conversation` 和 `ChatMessage` 接口。
//!
//! 项目是用户保存的工作上下文：一组选中的模型、可选的系统提示词，
//! 以及在该上下文中进行过的多模型对比对话。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 项目数据结构
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface Project {
///   id: string;
///   name: string;
///   description?: string;
///   systemPrompt?: string;
///   selectedModels: string[];
///   conversations: Conversation[];
///   createdAt: string;
///   updatedAt: string;
/// }
/// ```
///
/// 设计决策：
/// - 未识别的字段收集到 `extra` 中，保证新版本前端写入的字段在读取后保存时不会丢失
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// 唯一标识符：`Project::new` 生成 UUID v4，也可由调用方自行指定
    pub id: String,

    /// 项目名称：用户自定义的可读名称
    pub name: String,

    /// 项目描述（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 系统提示词：对该项目下所有模型生效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// 选中的模型 ID 列表（引用模型目录中的 `ModelEntry::id`）
    #[serde(default)]
    pub selected_models: Vec<String>,

    /// 已保存的对话，按创建先后排列
    #[serde(default)]
    pub conversations: Vec<Conversation>,

    /// 创建时间：RFC 3339 格式
    #[serde(default)]
    pub created_at: String,

    /// 更新时间：RFC 3339 格式
    #[serde(default)]
    pub updated_at: String,

    /// 未识别的字段，原样保留以免丢失较新客户端写入的数据
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// 创建一个带随机 ID 和当前时间戳的新项目
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            system_prompt: None,
            selected_models: Vec::new(),
            conversations: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            extra: Map::new(),
        }
    }
}

/// 对话数据结构
///
/// 一次多模型对比对话：用户消息与各模型的回复按时间顺序排列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// 对话唯一标识符
    pub id: String,

    /// 对话标题
    pub title: String,

    /// 按时间顺序排列的消息
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 单条聊天消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// 消息发送方
    pub role: Role,

    /// 消息正文
    pub content: String,

    /// 产生该回复的模型 ID；用户消息为 `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// 发送时间（RFC 3339）
    #[serde(default)]
    pub created_at: String,
}
