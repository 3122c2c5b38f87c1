//! # 活跃请求计数器
//!
//! 进程内的原子计数器，记录当前正在处理的请求数，仅作诊断参考：
//! 多个服务实例之间不共享，也不参与任何正确性判断。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct RequestCounter {
    /// 当前正在处理的请求数
    active: AtomicUsize,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前活跃请求数
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// 登记一个新请求；返回的守卫在 drop 时自动减一
    pub fn enter(self: &Arc<Self>) -> RequestGuard {
        self.active.fetch_add(1, Ordering::Relaxed);
        RequestGuard {
            counter: Arc::clone(self),
        }
    }
}

/// 请求守卫：生命周期覆盖一次请求的处理过程
pub struct RequestGuard {
    /// guard 释放时需要递减的计数器
    counter: Arc<RequestCounter>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.counter.active.fetch_sub(1, Ordering::Relaxed);
    }
}
