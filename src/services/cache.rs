//! # 内存缓存管理服务
//!
//! 为 GitHub Star 数路由提供进程内缓存，减少对 GitHub API 的重复请求
//! （未认证访问有严格的速率限制）。
//!
//! ## 缓存失效策略
//! - 基于 TTL（生存时间）：条目写入后 5 分钟内有效，与响应头中的边缘缓存时长一致
//! - 基于容量：使用 `lru::LruCache`，超过容量时淘汰最久未访问的仓库
//!
//! 只缓存成功的查询结果；失败不写入缓存，下次请求会重新访问上游。
//!
//! ## 线程安全
//! 使用 `std::sync::Mutex` 保护内部 LRU：LRU 的读操作也会更新访问顺序，
//! 因此不适合使用 RwLock。

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

/// Star 数缓存的默认有效期（秒）
pub const STARS_CACHE_TTL_SECS: u64 = 300;

/// 缓存的最大仓库数量
const STARS_CACHE_MAX_ENTRIES: usize = 64;

/// 单个缓存条目
struct StarsCacheEntry {
    /// Star 数；上游未返回该字段时为 `None`
    stars: Option<u64>,
    /// 写入缓存的时间，用于 TTL 过期判断
    cached_at: Instant,
}

/// GitHub Star 数缓存
pub struct StarsCache {
    /// 以 (owner, repo) 为 key 的 LRU 缓存
    entries: Mutex<LruCache<(String, String), StarsCacheEntry>>,
    /// 缓存有效期
    ttl: Duration,
}

impl StarsCache {
    /// 创建使用默认 TTL 的空缓存
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(STARS_CACHE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(STARS_CACHE_MAX_ENTRIES).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// 获取缓存的 Star 数（如果缓存仍然有效）
    ///
    /// # 返回值
    /// - `Some(stars)` - 缓存有效；内层 `None` 表示上游未提供该字段
    /// - `None` - 缓存不存在或已过期（过期条目会被顺带移除）
    pub fn get(&self, owner: &str, repo: &str) -> Option<Option<u64>> {
        let mut cache = self.entries.lock().ok()?;
        let key = (owner.to_string(), repo.to_string());
        let entry = cache.get(&key)?;

        if entry.cached_at.elapsed() <= self.ttl {
            Some(entry.stars)
        } else {
            cache.pop(&key);
            None
        }
    }

    /// 写入一次成功的查询结果
    pub fn set(&self, owner: &str, repo: &str, stars: Option<u64>) {
        if let Ok(mut cache) = self.entries.lock() {
            cache.put(
                (owner.to_string(), repo.to_string()),
                StarsCacheEntry {
                    stars,
                    cached_at: Instant::now(),
                },
            );
        }
    }

    /// 清空全部缓存
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.entries.lock() {
            cache.clear();
        }
    }
}

impl Default for StarsCache {
    fn default() -> Self {
        Self::new()
    }
}
