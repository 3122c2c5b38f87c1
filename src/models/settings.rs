//! # 用户设置数据模型
//!
//! 定义了 API Key 集合（ApiKeySet）与界面主题（Theme）的 Rust 结构体。
//!
//! 对应前端 TypeScript 中的 `ApiKeys` 与 `Theme` 类型，两者均以 JSON 形式
//! 保存在本地持久化存储中，由 `PersistedState` 负责加载与同步。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// API Key 集合
///
/// 以提供商名称（如 `"openrouter"`、`"openai"`）为 key，映射到可选的密钥字符串。
/// 本地不校验密钥格式；缺失的 key 表示该提供商使用默认/公共访问方式。
///
/// 设计决策：
/// - 使用 `BTreeMap` 保证序列化后的字段顺序稳定，便于比对存储内容
/// - 值为 `Option<String>`，前端写入 `null` 时能原样保留
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// type ApiKeys = Record<string, string | null | undefined>;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeySet(BTreeMap<String, Option<String>>);

impl ApiKeySet {
    /// 创建空的 API Key 集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定提供商的密钥
    ///
    /// 空字符串或纯空白的密钥视为未设置，返回 `None`，
    /// 与"缺失即使用默认访问"的语义保持一致。
    pub fn get(&self, provider: &str) -> Option<&str> {
        self.0
            .get(provider)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 设置指定提供商的密钥，传入 `None` 表示显式清空
    pub fn set(&mut self, provider: impl Into<String>, key: Option<String>) {
        self.0.insert(provider.into(), key);
    }

    /// 已配置有效密钥的提供商名称列表
    pub fn configured_providers(&self) -> Vec<&str> {
        self.0
            .keys()
            .filter(|name| self.get(name).is_some())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 界面主题偏好
///
/// `System` 表示跟随操作系统的明暗设置，是首次启动时的默认值。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}
