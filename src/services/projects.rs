//! # 项目管理服务
//!
//! 在两个 `PersistedState` 之上提供项目的增删改查与激活项目选择：
//! - 项目列表（`arena.projects`），新建项目插入列表头部
//! - 激活项目 ID（`arena.activeProjectId`），同一时刻最多一个激活项目
//!
//! ## 激活指针
//! `select` 不检查目标是否存在；指向不存在项目的指针在 `active` 中
//! 解析为"没有激活项目"，但不会修改状态。删除当前激活项目时同时清空指针。
//!
//! 所有修改都以整个列表为单位"最后写入者胜出"，不做多标签页之间的合并。

use std::sync::Arc;

use crate::models::project::Project;
use crate::services::persisted::PersistedState;
use crate::services::store::DurableStore;

/// 项目列表的存储 key
pub const PROJECTS_KEY: &str = "arena.projects";

/// 激活项目 ID 的存储 key
pub const ACTIVE_PROJECT_KEY: &str = "arena.activeProjectId";

/// 项目管理器
pub struct Projects {
    /// 项目列表，最近创建的在前
    projects: PersistedState<Vec<Project>>,
    /// 激活项目 ID，`None` 表示没有激活项目
    active_id: PersistedState<Option<String>>,
}

impl Projects {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            projects: PersistedState::new(store.clone(), PROJECTS_KEY, Vec::new()),
            active_id: PersistedState::new(store, ACTIVE_PROJECT_KEY, None),
        }
    }

    /// 水合项目列表与激活指针
    pub fn hydrate(&mut self) {
        self.projects.hydrate();
        self.active_id.hydrate();
    }

    /// 全部项目，最近创建的在前
    pub fn list(&self) -> &[Project] {
        self.projects.get()
    }

    /// 当前激活指针的原始值（可能悬空）
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.get().as_deref()
    }

    /// 新建项目：插入列表头部，不会自动设为激活项目
    pub fn create(&mut self, project: Project) {
        self.projects.update(|list| list.insert(0, project));
    }

    /// 按 id 整体替换项目；找不到匹配项时不做任何修改
    ///
    /// # 返回值
    /// 有项目被替换时返回 `true`
    pub fn update(&mut self, project: Project) -> bool {
        if self.get_by_id(&project.id).is_none() {
            return false;
        }
        self.projects.update(|list| {
            if let Some(slot) = list.iter_mut().find(|p| p.id == project.id) {
                *slot = project;
            }
        });
        true
    }

    /// 按 id 删除项目；若删除的是激活项目则清空激活指针
    ///
    /// # 返回值
    /// 有项目被删除时返回 `true`
    pub fn delete(&mut self, id: &str) -> bool {
        let existed = self.get_by_id(id).is_some();
        if existed {
            self.projects.update(|list| list.retain(|p| p.id != id));
        }
        if self.active_id() == Some(id) {
            self.active_id.set(None);
        }
        existed
    }

    /// 设置激活指针；传入 `None` 表示取消激活
    pub fn select(&mut self, id: Option<&str>) {
        self.active_id.set(id.map(str::to_string));
    }

    /// 当前激活的项目；指针为空或悬空时返回 `None`
    pub fn active(&self) -> Option<&Project> {
        self.active_id().and_then(|id| self.get_by_id(id))
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Project> {
        self.list().iter().find(|p| p.id == id)
    }
}
