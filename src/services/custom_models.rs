//! # 自定义模型管理服务
//!
//! 在 `PersistedState` 之上提供自定义模型的领域操作：
//! - `list` - 当前持久化的自定义模型列表（初始为空）
//! - `merge` - 内置目录 + 自定义模型
//! - `make` / `make_validated` - 由用户输入的名称和 slug 构造自定义模型
//! - `add` / `remove` - 增删自定义模型（只替换、不原地修改）

use std::sync::Arc;

use thiserror::Error;

use crate::models::model::{CustomModel, ModelEntry, ModelProvider};
use crate::services::catalog;
use crate::services::persisted::PersistedState;
use crate::services::store::DurableStore;

/// 自定义模型列表的存储 key
pub const CUSTOM_MODELS_KEY: &str = "arena.customModels";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomModelError {
    #[error("模型 slug 不能为空")]
    EmptySlug,
}

/// 由名称和 slug 构造自定义模型（宽松版本）
///
/// - 两个输入都会去除首尾空白
/// - `id` 与 `model` 均为去空白后的 slug；slug 为空时产出空 `id`，调用方需自行视为无效
/// - slug 含 `/` 时提供商为 OpenRouter，否则为 Ollama
/// - 名称为空时以 slug 作为显示名称
pub fn make(label: &str, slug: &str) -> CustomModel {
    let slug = slug.trim();
    let label = label.trim();

    ModelEntry {
        id: slug.to_string(),
        label: if label.is_empty() { slug } else { label }.to_string(),
        provider: ModelProvider::classify_slug(slug),
        model: slug.to_string(),
        custom: true,
    }
}

/// 由名称和 slug 构造自定义模型（严格版本），拒绝空 slug
pub fn make_validated(label: &str, slug: &str) -> Result<CustomModel, CustomModelError> {
    let model = make(label, slug);
    if model.id.is_empty() {
        return Err(CustomModelError::EmptySlug);
    }
    Ok(model)
}

/// 自定义模型管理器
pub struct CustomModels {
    /// 按添加顺序排列的自定义模型
    state: PersistedState<Vec<CustomModel>>,
}

impl CustomModels {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            state: PersistedState::new(store, CUSTOM_MODELS_KEY, Vec::new()),
        }
    }

    pub fn hydrate(&mut self) -> bool {
        self.state.hydrate()
    }

    pub fn list(&self) -> &[CustomModel] {
        self.state.get()
    }

    /// 当前自定义模型与内置目录合并后的完整目录
    pub fn merge(&self) -> Vec<ModelEntry> {
        catalog::merge(self.list())
    }

    /// 添加一个自定义模型
    ///
    /// 已存在相同 `id`（即相同 slug）的条目时原位替换，保持列表顺序。
    pub fn add(&mut self, label: &str, slug: &str) -> Result<CustomModel, CustomModelError> {
        let model = make_validated(label, slug)?;
        let added = model.clone();

        self.state.update(|list| {
            match list.iter_mut().find(|m| m.id == model.id) {
                Some(existing) => *existing = model,
                None => list.push(model),
            }
        });

        Ok(added)
    }

    /// 按 id 删除自定义模型，返回是否有条目被删除
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.list().iter().any(|m| m.id == id) {
            return false;
        }
        self.state.update(|list| list.retain(|m| m.id != id));
        true
    }
}
