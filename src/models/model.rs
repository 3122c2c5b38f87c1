//! # 模型目录数据模型
//!
//! 定义了模型目录条目（ModelEntry）和模型提供商（ModelProvider）。
//! 内置模型与用户自定义模型共用同一结构，区别仅在于 `custom` 字段。
//!
//! 对应前端 TypeScript 接口：
//! ```typescript
//! interface ModelOption {
//!   id: string;
//!   label: string;
//!   provider: 'openai' | 'anthropic' | 'gemini' | 'mistral' | 'openrouter' | 'ollama';
//!   model: string;
//!   custom?: true;
//! }
//! ```

use serde::{Deserialize, Serialize};

/// 模型提供商
///
/// 自定义模型只会落在 `OpenRouter`（slug 含 `/`）或 `Ollama`（其余情况）两类，
/// 其他变体仅用于内置目录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
    #[serde(rename = "gemini")]
    Google,
    Mistral,
    OpenRouter,
    Ollama,
}

impl ModelProvider {
    /// 根据 slug 推导自定义模型的提供商
    ///
    /// 含 `/` 的 slug（如 `meta-llama/llama-3-8b`）归为 OpenRouter，
    /// 否则（如 `llama3:8b`）归为本地 Ollama。
    pub fn classify_slug(slug: &str) -> Self {
        if slug.contains('/') {
            ModelProvider::OpenRouter
        } else {
            ModelProvider::Ollama
        }
    }

    /// API Key 集合中使用的提供商名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::Google => "gemini",
            ModelProvider::Mistral => "mistral",
            ModelProvider::OpenRouter => "openrouter",
            ModelProvider::Ollama => "ollama",
        }
    }
}

/// 模型目录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// 唯一标识符：内置模型为固定 ID，自定义模型等于去空白后的 slug
    pub id: String,

    /// 显示名称
    pub label: String,

    /// 模型提供商
    pub provider: ModelProvider,

    /// 发送给提供商的原始模型 slug
    pub model: String,

    /// 是否为用户自定义模型：内置模型序列化时省略该字段
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom: bool,
}

/// 自定义模型：`custom` 恒为 `true` 的目录条目
pub type CustomModel = ModelEntry;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_slug() {
        assert_eq!(
            ModelProvider::classify_slug("anthropic/claude-3-haiku"),
            ModelProvider::OpenRouter
        );
        assert_eq!(ModelProvider::classify_slug("llama3:8b"), ModelProvider::Ollama);
        assert_eq!(ModelProvider::classify_slug(""), ModelProvider::Ollama);
    }

    #[test]
    fn test_builtin_entry_omits_custom_flag() {
        let entry = ModelEntry {
            id: "gpt-4o".into(),
            label: "GPT-4o".into(),
            provider: ModelProvider::OpenAi,
            model: "gpt-4o".into(),
            custom: false,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("custom").is_none());
        assert_eq!(json["provider"], "openai");
    }

    #[test]
    fn test_custom_entry_round_trips_flag() {
        let raw = r#"{"id":"qwen2:7b","label":"Qwen","provider":"ollama","model":"qwen2:7b","custom":true}"#;
        let entry: CustomModel = serde_json::from_str(raw).unwrap();
        assert!(entry.custom);
        assert_eq!(entry.provider, ModelProvider::Ollama);
        assert_eq!(serde_json::to_string(&entry).unwrap(), raw);
    }
}
