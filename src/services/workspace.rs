//! # 工作区状态门面
//!
//! 把所有持久化设置（API Key、主题、自定义模型、项目与激活项目）
//! 绑定到同一个注入的 `DurableStore` 上，并提供统一的水合入口。
//! 界面层只通过这里暴露的窄接口读写状态。
//!
//! 服务启动时通过 `open` 在 `<数据目录>/store/` 上打开文件存储；
//! 目录无法创建时退化为不可用存储，所有设置只保存在内存中。

use std::path::Path;
use std::sync::Arc;

use crate::models::model::ModelEntry;
use crate::models::settings::{ApiKeySet, Theme};
use crate::services::custom_models::CustomModels;
use crate::services::persisted::PersistedState;
use crate::services::projects::Projects;
use crate::services::store::{DurableStore, FileStore, UnavailableStore};
use crate::utils::path;

/// API Key 集合的存储 key
pub const API_KEYS_KEY: &str = "arena.apiKeys";

/// 主题偏好的存储 key
pub const THEME_KEY: &str = "arena.theme";

pub struct Workspace {
    /// 各提供商的 API Key（`arena.apiKeys`）
    pub api_keys: PersistedState<ApiKeySet>,
    /// 界面主题偏好（`arena.theme`）
    pub theme: PersistedState<Theme>,
    /// 用户自定义模型（`arena.customModels`）
    pub custom_models: CustomModels,
    /// 项目列表与激活项目（`arena.projects`、`arena.activeProjectId`）
    pub projects: Projects,
}

impl Workspace {
    /// 挂载阶段：所有状态均为默认值
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            api_keys: PersistedState::new(store.clone(), API_KEYS_KEY, ApiKeySet::new()),
            theme: PersistedState::new(store.clone(), THEME_KEY, Theme::default()),
            custom_models: CustomModels::new(store.clone()),
            projects: Projects::new(store),
        }
    }

    /// 在数据目录下打开文件存储并完成水合
    ///
    /// # 参数
    /// - `data_dir` - 数据目录，存储位于其下的 `store/` 子目录
    pub fn open(data_dir: &Path) -> Self {
        let store: Arc<dyn DurableStore> = match FileStore::open(path::store_dir(data_dir)) {
            Ok(store) => {
                log::info!("设置存储目录: {}", store.root().display());
                Arc::new(store)
            }
            Err(e) => {
                log::warn!("无法打开设置存储，退化为内存模式: {}", e);
                Arc::new(UnavailableStore)
            }
        };
        Self::load(store)
    }

    /// 创建并立即完成水合
    pub fn load(store: Arc<dyn DurableStore>) -> Self {
        let mut workspace = Self::new(store);
        workspace.hydrate();
        workspace
    }

    pub fn hydrate(&mut self) {
        self.api_keys.hydrate();
        self.theme.hydrate();
        self.custom_models.hydrate();
        self.projects.hydrate();
    }

    /// 内置目录与自定义模型合并后的完整模型目录
    pub fn catalog(&self) -> Vec<ModelEntry> {
        self.custom_models.merge()
    }

    /// 为指定提供商设置或清空 API Key
    pub fn set_api_key(&mut self, provider: &str, key: Option<String>) {
        self.api_keys.update(|keys| keys.set(provider, key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::Project;
    use crate::services::store::FileStore;

    #[test]
    fn test_workspace_round_trip_through_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DurableStore> = Arc::new(FileStore::open(dir.path()).unwrap());

        let mut workspace = Workspace::load(store.clone());
        workspace.set_api_key("openrouter", Some("sk-or-1".into()));
        workspace.theme.set(Theme::Dark);
        workspace.custom_models.add("Phi", "phi3").unwrap();
        let project = Project::new("Compare");
        workspace.projects.create(project.clone());
        workspace.projects.select(Some(&project.id));

        let reopened = Workspace::load(store);
        assert_eq!(reopened.api_keys.get().get("openrouter"), Some("sk-or-1"));
        assert_eq!(*reopened.theme.get(), Theme::Dark);
        assert_eq!(reopened.catalog().last().map(|m| m.id.as_str()), Some("phi3"));
        assert_eq!(reopened.projects.active(), Some(&project));
    }

    #[test]
    fn test_open_uses_store_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        Workspace::open(dir.path()).theme.set(Theme::Dark);

        assert!(dir.path().join("store").join("arena.theme.json").exists());
        assert_eq!(*Workspace::open(dir.path()).theme.get(), Theme::Dark);
    }

    #[test]
    fn test_open_degrades_when_store_dir_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("store"), "not a directory").unwrap();

        let mut workspace = Workspace::open(dir.path());
        workspace.theme.set(Theme::Light);
        assert_eq!(*workspace.theme.get(), Theme::Light);
    }

    #[test]
    fn test_unhydrated_workspace_exposes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DurableStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        Workspace::load(store.clone()).theme.set(Theme::Light);

        let mounted = Workspace::new(store);
        assert_eq!(*mounted.theme.get(), Theme::System);
        assert!(mounted.api_keys.get().is_empty());
        assert!(mounted.projects.list().is_empty());
    }
}
