//! # 本地持久化存储服务
//!
//! 定义了可失败的键值存储能力接口 `DurableStore`，以及三种实现：
//! - `FileStore`：每个 key 对应数据目录下的一个 JSON 文件，是桌面端的默认实现
//! - `MemoryStore`：进程内存储，用于测试和无磁盘环境
//! - `UnavailableStore`：所有操作都失败，模拟隐私模式或存储配额耗尽
//!
//! ## 失败策略
//! 存储接口的每个操作都返回 `Result`，由调用方（`PersistedState`）决定如何处理。
//! 本地持久化只是用户意图的缓存，而不是数据的唯一来源：
//! 调用方在失败时记录日志并退化为纯内存运行，不会向界面抛出错误。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("存储不可用: {0}")]
    Unavailable(String),

    #[error("存储读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储内容序列化失败: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("非法的存储 key: {0}")]
    InvalidKey(String),
}

/// 可失败的持久化键值存储能力
///
/// 值统一为 JSON 字符串；序列化与反序列化由调用方负责。
/// 实现必须是线程安全的，以便在多个状态管理器之间共享同一实例。
pub trait DurableStore: Send + Sync {
    /// 读取指定 key 的原始字符串；key 不存在时返回 `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 写入指定 key，覆盖已有内容
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// 删除指定 key；key 不存在时视为成功
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============ FileStore ============

/// 基于文件系统的持久化存储
///
/// 每个 key 存储为 `<root>/<key>.json`。写入时先写临时文件再重命名，
/// 避免进程中途退出时留下半截内容。
#[derive(Debug, Clone)]
pub struct FileStore {
    /// 存储根目录
    root: PathBuf,
}

impl FileStore {
    /// 在指定目录上创建存储，目录不存在时自动递归创建
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 将 key 映射为文件路径
    ///
    /// 只允许 ASCII 字母、数字和 `.` `-` `_`，拒绝路径分隔符和 `..`，
    /// 防止 key 逃逸出存储目录。
    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.contains("..")
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============ MemoryStore ============

/// 进程内存储
///
/// 使用 `RwLock<HashMap>` 保证多线程安全访问。锁中毒时按存储不可用处理。
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// key → 原始字符串内容
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以预置内容创建存储，便于模拟"上次会话留下的数据"
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("内存存储锁已损坏".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("内存存储锁已损坏".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
        Ok(())
    }
}

// ============ UnavailableStore ============

/// 永远不可用的存储
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl DurableStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("本地存储已禁用".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("本地存储已禁用".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("本地存储已禁用".into()))
    }
}
