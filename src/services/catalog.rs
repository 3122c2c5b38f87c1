//! # 内置模型目录
//!
//! 提供内置模型列表，以及将自定义模型合并进目录的函数。
//! 合并结果中 `id` 的唯一性由调用方保证，这里不做去重。

use crate::models::model::{ModelEntry, ModelProvider};

/// 内置模型定义：(id, 显示名称, 提供商, 模型 slug)
const BUILTIN_MODELS: &[(&str, &str, ModelProvider, &str)] = &[
    ("gpt-4o", "GPT-4o", ModelProvider::OpenAi, "gpt-4o"),
    ("gpt-4o-mini", "GPT-4o mini", ModelProvider::OpenAi, "gpt-4o-mini"),
    (
        "claude-3-5-sonnet",
        "Claude 3.5 Sonnet",
        ModelProvider::Anthropic,
        "claude-3-5-sonnet-latest",
    ),
    (
        "claude-3-5-haiku",
        "Claude 3.5 Haiku",
        ModelProvider::Anthropic,
        "claude-3-5-haiku-latest",
    ),
    ("gemini-1.5-pro", "Gemini 1.5 Pro", ModelProvider::Google, "gemini-1.5-pro"),
    ("gemini-1.5-flash", "Gemini 1.5 Flash", ModelProvider::Google, "gemini-1.5-flash"),
    (
        "mistral-large",
        "Mistral Large",
        ModelProvider::Mistral,
        "mistral-large-latest",
    ),
    (
        "llama-3.1-70b",
        "Llama 3.1 70B (OpenRouter)",
        ModelProvider::OpenRouter,
        "meta-llama/llama-3.1-70b-instruct",
    ),
    ("llama3", "Llama 3 (Ollama)", ModelProvider::Ollama, "llama3"),
];

/// 内置模型目录，顺序固定
pub fn builtin_models() -> Vec<ModelEntry> {
    BUILTIN_MODELS
        .iter()
        .map(|&(id, label, provider, model)| ModelEntry {
            id: id.to_string(),
            label: label.to_string(),
            provider,
            model: model.to_string(),
            custom: false,
        })
        .collect()
}

/// 合并内置目录与自定义模型：内置模型在前，自定义模型在后，各自保持原有顺序
pub fn merge(customs: &[ModelEntry]) -> Vec<ModelEntry> {
    let mut merged = builtin_models();
    merged.extend_from_slice(customs);
    merged
}

/// 在合并后的目录中按 id 查找模型
pub fn find<'a>(catalog: &'a [ModelEntry], id: &str) -> Option<&'a ModelEntry> {
    catalog.iter().find(|m| m.id == id)
}
