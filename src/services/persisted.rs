//! # 持久化状态同步服务
//!
//! `PersistedState<T>` 把一个内存中的值与 `DurableStore` 中的某个 key 同步起来，
//! 是 API Key、主题、自定义模型、项目列表等所有本地设置共用的基础原语。
//!
//! ## 三阶段生命周期
//! 1. **挂载阶段**（`new`）：值等于调用方给定的默认值，此时不读取存储
//! 2. **水合阶段**（`hydrate`，仅执行一次）：尝试读取存储；内容存在且能解析时替换内存值，
//!    读取或解析失败时静默保留默认值；随后把当前值写回一次，完成旧格式迁移
//! 3. **稳定阶段**：每次通过 `set`/`update` 修改值后立即序列化并写入存储
//!
//! 水合完成之前绝不写入存储，避免默认值覆盖上次会话保存的内容。
//!
//! ## 存储格式
//! 值以版本信封的形式保存：`{"version":1,"data":<值>}`。
//! 水合时也接受不带信封的旧格式裸值，并在写回时升级为信封格式。
//! 版本号高于当前版本的内容视为无法识别：内存中保留默认值，且水合时不写回，
//! 直到调用方显式修改值为止，避免覆盖较新客户端写入的数据。

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::store::{DurableStore, StoreError};

/// 当前存储格式版本
pub const SCHEMA_VERSION: u32 = 1;

/// 写入存储时使用的版本信封
#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

/// 读取存储时使用的版本信封
#[derive(Deserialize)]
struct Envelope {
    version: u32,
    data: Value,
}

/// 存储内容的解码结果
#[derive(Debug)]
enum Decoded<T> {
    Current(T),
    Legacy(T),
    /// 信封版本高于 `SCHEMA_VERSION`
    Unsupported(u32),
}

/// 与持久化存储中某个 key 同步的状态
pub struct PersistedState<T> {
    /// 注入的持久化存储
    store: Arc<dyn DurableStore>,
    /// 存储 key，如 `arena.theme`
    key: String,
    /// 当前内存中的值，读取永远不会失败
    value: T,
    /// 是否已完成水合；为 `false` 时所有修改只作用于内存
    hydrated: bool,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned,
{
    /// 挂载阶段：以默认值创建状态，不访问存储
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>, default: T) -> Self {
        Self {
            store,
            key: key.into(),
            value: default,
            hydrated: false,
        }
    }

    /// 当前内存中的值
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// 水合阶段：从存储加载一次
    ///
    /// # 返回值
    /// 成功从存储加载到值时返回 `true`；已经水合过、key 不存在、
    /// 读取失败或解析失败时返回 `false`（内存值保持不变）
    pub fn hydrate(&mut self) -> bool {
        if self.hydrated {
            return false;
        }

        let mut write_back = true;
        let loaded = match self.store.get(&self.key) {
            Ok(Some(raw)) => match decode::<T>(&raw) {
                Ok(Decoded::Current(value)) => {
                    self.value = value;
                    true
                }
                Ok(Decoded::Legacy(value)) => {
                    log::debug!("存储项 {} 为旧格式，将升级为版本 {}", self.key, SCHEMA_VERSION);
                    self.value = value;
                    true
                }
                Ok(Decoded::Unsupported(version)) => {
                    log::warn!(
                        "存储项 {} 的版本 {} 高于当前版本 {}，保留默认值且不覆盖",
                        self.key,
                        version,
                        SCHEMA_VERSION
                    );
                    write_back = false;
                    false
                }
                Err(e) => {
                    log::warn!("解析存储项 {} 失败，保留默认值: {}", self.key, e);
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                log::debug!("读取存储项 {} 失败，退化为内存模式: {}", self.key, e);
                false
            }
        };

        self.hydrated = true;
        if write_back {
            self.persist();
        }
        loaded
    }

    /// 替换当前值；水合完成后同步写入存储
    pub fn set(&mut self, value: T) {
        self.value = value;
        if self.hydrated {
            self.persist();
        }
    }

    /// 以函数式方式原地修改当前值；水合完成后同步写入存储
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.value);
        if self.hydrated {
            self.persist();
        }
    }

    /// 把当前值写入存储，失败时只记录日志
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            log::debug!("写入存储项 {} 失败，已忽略: {}", self.key, e);
        }
    }

    fn try_persist(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string(&EnvelopeRef {
            version: SCHEMA_VERSION,
            data: &self.value,
        })?;
        self.store.set(&self.key, &content)
    }
}

/// 解码存储内容：优先识别版本信封，否则按旧格式裸值解析
fn decode<T: DeserializeOwned>(raw: &str) -> Result<Decoded<T>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("JSON 无效: {}", e))?;

    let is_envelope = value
        .as_object()
        .is_some_and(|obj| obj.len() == 2 && obj.contains_key("version") && obj.contains_key("data"));

    if is_envelope {
        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| format!("信封格式无效: {}", e))?;
        if envelope.version > SCHEMA_VERSION {
            return Ok(Decoded::Unsupported(envelope.version));
        }
        let data = serde_json::from_value(envelope.data).map_err(|e| e.to_string())?;
        return Ok(Decoded::Current(data));
    }

    serde_json::from_value(value)
        .map(Decoded::Legacy)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::Theme;
    use crate::services::store::{MemoryStore, UnavailableStore};

    fn theme_state(store: &Arc<MemoryStore>) -> PersistedState<Theme> {
        PersistedState::new(store.clone() as Arc<dyn DurableStore>, "arena.theme", Theme::System)
    }

    #[test]
    fn test_default_before_hydration_even_if_store_differs() {
        let store = Arc::new(MemoryStore::with_entries([(
            "arena.theme",
            r#"{"version":1,"data":"dark"}"#,
        )]));
        let mut state = theme_state(&store);

        assert_eq!(*state.get(), Theme::System);
        assert!(!state.is_hydrated());

        assert!(state.hydrate());
        assert_eq!(*state.get(), Theme::Dark);
        assert!(state.is_hydrated());
    }

    #[test]
    fn test_no_write_before_hydration() {
        let store = Arc::new(MemoryStore::with_entries([(
            "arena.theme",
            r#"{"version":1,"data":"dark"}"#,
        )]));
        let mut state = theme_state(&store);

        state.set(Theme::Light);
        assert_eq!(
            store.get("arena.theme").unwrap().as_deref(),
            Some(r#"{"version":1,"data":"dark"}"#)
        );

        // 水合以存储内容为准
        state.hydrate();
        assert_eq!(*state.get(), Theme::Dark);
    }

    #[test]
    fn test_writes_after_hydration() {
        let store = Arc::new(MemoryStore::new());
        let mut state = theme_state(&store);

        assert!(!state.hydrate());
        assert_eq!(
            store.get("arena.theme").unwrap().as_deref(),
            Some(r#"{"version":1,"data":"system"}"#)
        );

        state.set(Theme::Light);
        assert_eq!(
            store.get("arena.theme").unwrap().as_deref(),
            Some(r#"{"version":1,"data":"light"}"#)
        );
    }

    #[test]
    fn test_hydrate_runs_once() {
        let store = Arc::new(MemoryStore::new());
        let mut state = theme_state(&store);
        state.hydrate();
        state.set(Theme::Dark);

        store.set("arena.theme", r#"{"version":1,"data":"light"}"#).unwrap();
        assert!(!state.hydrate());
        assert_eq!(*state.get(), Theme::Dark);
    }

    #[test]
    fn test_invalid_json_keeps_default() {
        let store = Arc::new(MemoryStore::with_entries([("arena.theme", "{not json")]));
        let mut state = theme_state(&store);

        assert!(!state.hydrate());
        assert_eq!(*state.get(), Theme::System);
    }

    #[test]
    fn test_legacy_bare_value_is_migrated() {
        let store = Arc::new(MemoryStore::with_entries([("arena.theme", "\"dark\"")]));
        let mut state = theme_state(&store);

        assert!(state.hydrate());
        assert_eq!(*state.get(), Theme::Dark);
        assert_eq!(
            store.get("arena.theme").unwrap().as_deref(),
            Some(r#"{"version":1,"data":"dark"}"#)
        );
    }

    #[test]
    fn test_future_version_keeps_default() {
        let store = Arc::new(MemoryStore::with_entries([(
            "arena.theme",
            r#"{"version":99,"data":"dark"}"#,
        )]));
        let mut state = theme_state(&store);

        assert!(!state.hydrate());
        assert_eq!(*state.get(), Theme::System);
    }

    #[test]
    fn test_future_version_is_not_overwritten_by_hydrate() {
        let newer = r#"{"version":2,"data":"dark"}"#;
        let store = Arc::new(MemoryStore::with_entries([("arena.theme", newer)]));
        let mut state = theme_state(&store);

        state.hydrate();
        assert_eq!(store.get("arena.theme").unwrap().as_deref(), Some(newer));

        // 显式修改后才写入当前版本
        state.set(Theme::Light);
        assert_eq!(
            store.get("arena.theme").unwrap().as_deref(),
            Some(r#"{"version":1,"data":"light"}"#)
        );
    }

    #[test]
    fn test_corrupt_value_is_replaced_with_default() {
        let store = Arc::new(MemoryStore::with_entries([("arena.theme", "{not json")]));
        let mut state = theme_state(&store);

        state.hydrate();
        assert_eq!(
            store.get("arena.theme").unwrap().as_deref(),
            Some(r#"{"version":1,"data":"system"}"#)
        );
    }

    #[test]
    fn test_unavailable_store_degrades_to_memory() {
        let mut state: PersistedState<Vec<String>> =
            PersistedState::new(Arc::new(UnavailableStore), "arena.list", Vec::new());

        assert!(!state.hydrate());
        state.update(|list| list.push("a".into()));
        state.update(|list| list.push("b".into()));
        assert_eq!(state.get(), &vec!["a".to_string(), "b".to_string()]);
    }
}
