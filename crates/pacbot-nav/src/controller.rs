//! 导航控制器
//!
//! 状态：当前朝向、最近一次观测到的位置、待执行指令。
//!
//! - `on_command`：覆盖待执行指令（后到者生效）
//! - `on_position_observed`：记录位置，并根据与上一次位置的差值推断朝向
//! - `on_tick`：取出待执行指令并执行（每个 tick 最多一条）
//! - `on_shutdown`：停止电机
//!
//! 朝向只在两处改变：执行指令时的转向，以及位置观测推断。
//! 后退不改变朝向，但后退之后的位置观测会把朝向推断为运动方向（即车尾方向）。

use crate::config::ControllerConfig;
use crate::error::NavError;
use crate::inbox::{EventSource, Recv};
use crate::metrics::NavMetrics;
use crate::observer::NavSnapshot;
use crate::plan::plan_motion;
use crate::policy::{RecoveryPolicy, SettlePolicy};
use pacbot_driver::{MotorDriver, Primitive};
use pacbot_protocol::{CellPosition, Command, Heading, InboundEvent};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// `on_tick` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 没有待执行指令
    Idle,
    /// 执行了一条指令
    Executed(Command),
}

/// 导航控制器
///
/// 按值持有电机驱动，所有方法都在控制循环线程上通过 `&mut self` 调用。
pub struct NavController<M> {
    motor: M,
    heading: Heading,
    position: Option<CellPosition>,
    pending: Option<Command>,
    settle: SettlePolicy,
    recovery: RecoveryPolicy,
    shutdown_requested: bool,
    metrics: Arc<NavMetrics>,
}

impl<M: MotorDriver> NavController<M> {
    /// 使用默认策略创建（朝东，位置未知）
    pub fn new(motor: M) -> Self {
        Self {
            motor,
            heading: Heading::default(),
            position: None,
            pending: None,
            settle: SettlePolicy::default(),
            recovery: RecoveryPolicy::default(),
            shutdown_requested: false,
            metrics: Arc::new(NavMetrics::new()),
        }
    }

    /// 按配置创建
    pub fn from_config(motor: M, config: &ControllerConfig) -> Self {
        Self::new(motor)
            .with_heading(config.initial_heading)
            .with_settle_policy(config.settle_policy())
            .with_recovery_policy(config.recovery_policy())
    }

    #[must_use]
    pub fn with_heading(mut self, heading: Heading) -> Self {
        self.heading = heading;
        self
    }

    #[must_use]
    pub fn with_settle_policy(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    #[must_use]
    pub fn with_recovery_policy(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// 共享外部指标实例（例如 CLI 在循环结束后打印）
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<NavMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn position(&self) -> Option<CellPosition> {
        self.position
    }

    pub fn pending(&self) -> Option<Command> {
        self.pending
    }

    pub fn settle_policy(&self) -> SettlePolicy {
        self.settle
    }

    pub fn recovery_policy(&self) -> RecoveryPolicy {
        self.recovery
    }

    /// 是否收到过 `Shutdown` 事件
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    pub fn metrics(&self) -> &Arc<NavMetrics> {
        &self.metrics
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    pub fn into_motor(self) -> M {
        self.motor
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> NavSnapshot {
        NavSnapshot {
            heading: self.heading,
            position: self.position,
            pending: self.pending,
            ticks: self.metrics.ticks.load(Ordering::Relaxed),
        }
    }

    /// 记录新的期望方向，覆盖尚未执行的指令
    pub fn on_command(&mut self, command: Command) {
        if let Some(previous) = self.pending.replace(command) {
            NavMetrics::incr(&self.metrics.commands_overwritten);
            debug!("Pending command {} overwritten by {}", previous, command);
        } else {
            trace!("Command {} pending", command);
        }
    }

    /// 记录位置观测并推断朝向
    ///
    /// x 轴优先：(0,0) → (1,1) 推断为 EAST。位置未变化时保持朝向。
    pub fn on_position_observed(&mut self, position: CellPosition) {
        NavMetrics::incr(&self.metrics.positions_observed);
        let Some(previous) = self.position.replace(position) else {
            debug!("First position observation: {}", position);
            return;
        };
        if let Some(inferred) = Heading::infer(previous, position) {
            if inferred != self.heading {
                NavMetrics::incr(&self.metrics.heading_corrections);
                debug!(
                    "Heading corrected {} -> {} ({} -> {})",
                    self.heading, inferred, previous, position
                );
            }
            self.heading = inferred;
        }
    }

    /// 分发一个入站事件
    pub fn handle_event(&mut self, event: InboundEvent) {
        self.apply_event(event);
    }

    /// 返回事件是否为位置观测
    fn apply_event(&mut self, event: InboundEvent) -> bool {
        match event {
            InboundEvent::Command(command) => {
                self.on_command(command);
                false
            },
            InboundEvent::Position(position) => {
                self.on_position_observed(position);
                true
            },
            InboundEvent::Shutdown => {
                if !self.shutdown_requested {
                    info!("Shutdown requested");
                }
                self.shutdown_requested = true;
                false
            },
        }
    }

    /// 执行待执行指令（如果有）
    ///
    /// 指令在执行开始前清除；执行期间到达的新指令留到下一个 tick。
    /// `source` 用于前进之后等待位置观测。
    pub fn on_tick<S: EventSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<TickOutcome, NavError> {
        NavMetrics::incr(&self.metrics.ticks);
        let Some(command) = self.pending.take() else {
            return Ok(TickOutcome::Idle);
        };
        self.execute_command(command, source)?;
        Ok(TickOutcome::Executed(command))
    }

    /// 把一条指令转为原子运动并下发
    ///
    /// # 错误
    /// - `NavError::Motor`：电机返回错误，剩余运动不再下发
    /// - `NavError::Stuck`：前进后位置一直不变，恢复次数耗尽
    pub fn execute_command<S: EventSource + ?Sized>(
        &mut self,
        command: Command,
        source: &mut S,
    ) -> Result<(), NavError> {
        NavMetrics::incr(&self.metrics.commands_executed);
        debug!("Executing {} (heading {})", command, self.heading);

        for primitive in plan_motion(self.heading, command) {
            if primitive == Primitive::Advance {
                self.advance_with_recovery(source)?;
            } else {
                self.issue(primitive)?;
            }
        }
        Ok(())
    }

    /// 停止电机（正常退出时调用）
    pub fn on_shutdown(&mut self) -> Result<(), NavError> {
        info!("Stopping motors");
        self.issue(Primitive::Stop)
    }

    /// 下发一个原子运动；转向成功后更新朝向
    fn issue(&mut self, primitive: Primitive) -> Result<(), NavError> {
        NavMetrics::incr(&self.metrics.primitives_issued);
        trace!("motor {} (heading {})", primitive, self.heading);
        self.motor.apply(primitive)?;
        match primitive {
            Primitive::RotateLeft => self.heading = self.heading.rotated_left(),
            Primitive::RotateRight => self.heading = self.heading.rotated_right(),
            Primitive::Advance | Primitive::Reverse | Primitive::Stop => {},
        }
        Ok(())
    }

    /// 前进一格；位置未变化时左转再前进，直到位置变化或恢复次数耗尽
    fn advance_with_recovery<S: EventSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<(), NavError> {
        let before = self.position;
        self.issue(Primitive::Advance)?;
        self.settle(source);

        let Some(before) = before else {
            warn!("Position unknown before advance, skipping stuck detection");
            return Ok(());
        };

        let mut attempts = 0u32;
        while self.position == Some(before) {
            if self.recovery.exhausted(attempts) {
                NavMetrics::incr(&self.metrics.stuck_aborts);
                error!(
                    "Robot stuck at {} after {} recovery attempts, giving up",
                    before, attempts
                );
                return Err(NavError::Stuck {
                    position: before,
                    attempts,
                });
            }
            attempts += 1;
            NavMetrics::incr(&self.metrics.recovery_attempts);
            warn!(
                "Advance did not leave {} (heading {}), rotating left (attempt {})",
                before, self.heading, attempts
            );
            self.issue(Primitive::RotateLeft)?;
            self.issue(Primitive::Advance)?;
            self.settle(source);
        }

        if attempts > 0 {
            info!(
                "Recovered after {} attempts, now heading {}",
                attempts, self.heading
            );
        }
        Ok(())
    }

    /// 按 `SettlePolicy` 读取前进之后的事件
    fn settle<S: EventSource + ?Sized>(&mut self, source: &mut S) {
        let mut observed = false;
        loop {
            match source.try_next() {
                Recv::Event(event) => observed |= self.apply_event(event),
                Recv::Empty | Recv::Closed => break,
            }
        }

        let SettlePolicy::AwaitObservation { timeout } = self.settle else {
            return;
        };
        let deadline = Instant::now() + timeout;
        while !observed {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                trace!("No position observation within {:?}", timeout);
                break;
            }
            match source.next_timeout(remaining) {
                Recv::Event(event) => observed |= self.apply_event(event),
                Recv::Empty => {
                    trace!("No position observation within {:?}", timeout);
                    break;
                },
                Recv::Closed => break,
            }
        }
    }
}
