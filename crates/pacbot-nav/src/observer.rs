//! 状态观察者
//!
//! 控制循环每个 tick 发布一次 [`NavSnapshot`]，其他线程无锁读取最新快照。

use arc_swap::ArcSwap;
use pacbot_protocol::{CellPosition, Command, Heading};
use std::sync::Arc;

/// 控制器状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavSnapshot {
    pub heading: Heading,
    pub position: Option<CellPosition>,
    pub pending: Option<Command>,
    pub ticks: u64,
}

/// 快照的共享句柄（Clone 后指向同一份状态）
#[derive(Debug, Clone, Default)]
pub struct NavObserver {
    state: Arc<ArcSwap<NavSnapshot>>,
}

impl NavObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取最新快照
    pub fn snapshot(&self) -> NavSnapshot {
        **self.state.load()
    }

    /// 发布新快照（由控制循环调用）
    pub fn publish(&self, snapshot: NavSnapshot) {
        self.state.store(Arc::new(snapshot));
    }
}
