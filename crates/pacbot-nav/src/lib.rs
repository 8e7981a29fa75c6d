//! 导航控制器
//!
//! 把期望方向指令翻译为原子运动序列，并维护机器人朝向：
//! - 指令执行（`NavController`）：先转向再前进，反向时后退
//! - 卡住恢复：前进后位置未变化则左转重试（`RecoveryPolicy` 限制次数）
//! - 朝向同步：根据相邻两次位置观测的差值修正朝向
//! - 定频循环（`run_nav_loop`）：默认 60Hz，每个 tick 最多执行一条指令
//!
//! # 线程模型
//!
//! 控制器按值持有、通过 `&mut self` 修改，所有事件和 tick 都在循环线程上串行处理，
//! 不需要锁。传输线程只向收件箱（`crossbeam_channel`）投递事件；
//! 其他线程通过 [`NavObserver`] 无锁读取状态快照。

pub mod config;
pub mod controller;
mod error;
pub mod inbox;
pub mod metrics;
pub mod observer;
pub mod plan;
pub mod policy;
pub mod runner;

pub use config::{BrokerConfig, ControllerConfig, NavConfig, SettleMode};
pub use controller::{NavController, TickOutcome};
pub use error::{ConfigError, NavError};
pub use inbox::{EventSource, Recv};
pub use metrics::{MetricsSnapshot, NavMetrics};
pub use observer::{NavObserver, NavSnapshot};
pub use plan::{MotionPlan, plan_motion};
pub use policy::{RecoveryPolicy, SettlePolicy};
pub use runner::{ExitReason, LoopConfig, LoopExit, run_nav_loop};
