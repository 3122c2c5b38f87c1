//! # 通用工具函数模块
//!
//! - `path` - 数据目录与配置文件路径

pub mod path;
