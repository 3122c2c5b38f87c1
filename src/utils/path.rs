//! # 路径工具函数
//!
//! 提供与本地数据目录相关的路径函数：
//! - 获取应用数据目录（`~/.chat-arena/`，可由 `ARENA_DATA_DIR` 覆盖）
//! - 获取持久化存储目录与服务配置文件路径

use std::path::{Path, PathBuf};

/// 覆盖数据目录的环境变量名
pub const DATA_DIR_ENV: &str = "ARENA_DATA_DIR";

/// 获取应用数据目录的绝对路径
///
/// 优先使用 `ARENA_DATA_DIR` 环境变量，否则使用 `dirs` crate
/// 获取跨平台的主目录并拼接 `.chat-arena`。
///
/// # 错误
/// 未设置环境变量且无法确定用户主目录时返回错误信息
///
/// # 示例
/// - Windows: `C:\Users\username\.chat-arena`
/// - Linux/macOS: `/home/username/.chat-arena`
pub fn get_data_dir() -> Result<PathBuf, String> {
    resolve_data_dir(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
}

/// 根据可选的覆盖值解析数据目录
fn resolve_data_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
    Ok(home.join(".chat-arena"))
}

/// 持久化存储目录：`<数据目录>/store`
pub fn store_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("store")
}

/// 服务配置文件路径：`<数据目录>/server-config.json`
pub fn server_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("server-config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/tmp/arena"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/arena"));
        assert_eq!(store_dir(&dir), PathBuf::from("/tmp/arena/store"));
        assert_eq!(
            server_config_path(&dir),
            PathBuf::from("/tmp/arena/server-config.json")
        );
    }

    #[test]
    fn test_empty_override_falls_back_to_home() {
        if let Some(home) = dirs::home_dir() {
            let dir = resolve_data_dir(Some(PathBuf::new())).unwrap();
            assert_eq!(dir, home.join(".chat-arena"));
        }
    }
}
