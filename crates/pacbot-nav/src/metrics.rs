//! 导航指标
//!
//! 原子计数器，控制循环线程写入，任意线程读取快照。

use std::sync::atomic::{AtomicU64, Ordering};

/// 导航控制器实时指标
#[derive(Debug, Default)]
pub struct NavMetrics {
    /// 已运行的 tick 数
    pub ticks: AtomicU64,

    /// 已执行的指令数（含 STOP）
    pub commands_executed: AtomicU64,

    /// 尚未执行就被新指令覆盖的次数
    ///
    /// 持续增长说明指令到达频率高于 tick 频率，或某条指令执行时间过长（卡住恢复）。
    pub commands_overwritten: AtomicU64,

    /// 收到的位置观测数
    pub positions_observed: AtomicU64,

    /// 根据位置差值修正朝向的次数（推断朝向与记录朝向不一致）
    pub heading_corrections: AtomicU64,

    /// 下发的原子运动数
    pub primitives_issued: AtomicU64,

    /// 卡住恢复（左转 + 前进）次数
    pub recovery_attempts: AtomicU64,

    /// 恢复次数耗尽而放弃的指令数
    pub stuck_aborts: AtomicU64,
}

impl NavMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 读取所有计数器
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            commands_executed: self.commands_executed.load(Ordering::Relaxed),
            commands_overwritten: self.commands_overwritten.load(Ordering::Relaxed),
            positions_observed: self.positions_observed.load(Ordering::Relaxed),
            heading_corrections: self.heading_corrections.load(Ordering::Relaxed),
            primitives_issued: self.primitives_issued.load(Ordering::Relaxed),
            recovery_attempts: self.recovery_attempts.load(Ordering::Relaxed),
            stuck_aborts: self.stuck_aborts.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.commands_executed.store(0, Ordering::Relaxed);
        self.commands_overwritten.store(0, Ordering::Relaxed);
        self.positions_observed.store(0, Ordering::Relaxed);
        self.heading_corrections.store(0, Ordering::Relaxed);
        self.primitives_issued.store(0, Ordering::Relaxed);
        self.recovery_attempts.store(0, Ordering::Relaxed);
        self.stuck_aborts.store(0, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub commands_executed: u64,
    pub commands_overwritten: u64,
    pub positions_observed: u64,
    pub heading_corrections: u64,
    pub primitives_issued: u64,
    pub recovery_attempts: u64,
    pub stuck_aborts: u64,
}

impl MetricsSnapshot {
    /// 被覆盖指令占全部到达指令的百分比
    ///
    /// 没有指令时返回 0.0。
    pub fn overwrite_rate(&self) -> f64 {
        let arrived = self.commands_executed + self.commands_overwritten;
        if arrived == 0 {
            return 0.0;
        }
        (self.commands_overwritten as f64 / arrived as f64) * 100.0
    }
}
